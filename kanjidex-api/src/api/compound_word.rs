//! Compound word resource handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kanjidex_common::models::{CompoundWord, CompoundWordUpdate};
use kanjidex_common::repo::Repository;
use kanjidex_common::Error;
use tracing::debug;

use super::{ApiError, ListQuery};
use crate::AppState;

fn repo(state: &AppState) -> Repository<CompoundWord> {
    Repository::new(&state.store)
}

/// GET /api/v1/compound_word
pub async fn list_compound_words(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CompoundWord>>, ApiError> {
    let filter = query.into_filter()?;
    let words = repo(&state).list(&filter).await?;
    Ok(Json(words))
}

/// GET /api/v1/compound_word/:doc_id
pub async fn get_compound_word(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<CompoundWord>, ApiError> {
    let word = repo(&state)
        .find_by_id(&doc_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("compound word '{doc_id}' not found")))?;
    Ok(Json(word))
}

/// POST /api/v1/compound_word
pub async fn create_compound_word(
    State(state): State<AppState>,
    Json(mut word): Json<CompoundWord>,
) -> Result<(StatusCode, Json<CompoundWord>), ApiError> {
    if word.compound_word.is_empty() {
        return Err(Error::MalformedInput("compound word key must not be empty".into()).into());
    }
    debug!(compound_word = %word.compound_word, "create compound word request");

    word.doc_id = None;
    word.updated_at = None;

    let created = repo(&state).create(word).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/compound_word/:doc_id
pub async fn update_compound_word(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    Json(update): Json<CompoundWordUpdate>,
) -> Result<Json<CompoundWord>, ApiError> {
    let updated = repo(&state).update_by_id(&doc_id, &update).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/compound_word/:doc_id
pub async fn delete_compound_word(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    repo(&state).delete_by_id(&doc_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
