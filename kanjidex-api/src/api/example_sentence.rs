//! Example sentence resource handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kanjidex_common::models::{ExampleSentence, ExampleSentenceUpdate};
use kanjidex_common::repo::Repository;
use kanjidex_common::Error;
use tracing::debug;

use super::{ApiError, ListQuery};
use crate::AppState;

fn repo(state: &AppState) -> Repository<ExampleSentence> {
    Repository::new(&state.store)
}

/// GET /api/v1/example_sentence
pub async fn list_example_sentences(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ExampleSentence>>, ApiError> {
    let filter = query.into_filter()?;
    let sentences = repo(&state).list(&filter).await?;
    Ok(Json(sentences))
}

/// GET /api/v1/example_sentence/:doc_id
pub async fn get_example_sentence(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<ExampleSentence>, ApiError> {
    let sentence = repo(&state)
        .find_by_id(&doc_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("example sentence '{doc_id}' not found")))?;
    Ok(Json(sentence))
}

/// POST /api/v1/example_sentence
pub async fn create_example_sentence(
    State(state): State<AppState>,
    Json(mut sentence): Json<ExampleSentence>,
) -> Result<(StatusCode, Json<ExampleSentence>), ApiError> {
    if sentence.example_sentence.is_empty() {
        return Err(
            Error::MalformedInput("example sentence key must not be empty".into()).into(),
        );
    }
    debug!(example_sentence = %sentence.example_sentence, "create example sentence request");

    sentence.doc_id = None;
    sentence.updated_at = None;

    let created = repo(&state).create(sentence).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/example_sentence/:doc_id
pub async fn update_example_sentence(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    Json(update): Json<ExampleSentenceUpdate>,
) -> Result<Json<ExampleSentence>, ApiError> {
    let updated = repo(&state).update_by_id(&doc_id, &update).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/example_sentence/:doc_id
pub async fn delete_example_sentence(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    repo(&state).delete_by_id(&doc_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
