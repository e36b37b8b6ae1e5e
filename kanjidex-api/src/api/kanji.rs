//! Kanji resource handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kanjidex_common::models::{Kanji, KanjiUpdate};
use kanjidex_common::repo::Repository;
use kanjidex_common::Error;
use tracing::debug;

use super::{ApiError, PageQuery};
use crate::AppState;

fn repo(state: &AppState) -> Repository<Kanji> {
    Repository::new(&state.store)
}

/// GET /api/v1/kanji
pub async fn list_kanji(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Kanji>>, ApiError> {
    let kanjis = repo(&state).list(&query.into_filter()).await?;
    Ok(Json(kanjis))
}

/// GET /api/v1/kanji/:doc_id
pub async fn get_kanji(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<Kanji>, ApiError> {
    let kanji = repo(&state)
        .find_by_id(&doc_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("kanji '{doc_id}' not found")))?;
    Ok(Json(kanji))
}

/// POST /api/v1/kanji
pub async fn create_kanji(
    State(state): State<AppState>,
    Json(mut kanji): Json<Kanji>,
) -> Result<(StatusCode, Json<Kanji>), ApiError> {
    if kanji.kanji.is_empty() {
        return Err(Error::MalformedInput("kanji key must not be empty".into()).into());
    }
    debug!(kanji = %kanji.kanji, "create kanji request");

    // Server-assigned fields are never taken from the request
    kanji.doc_id = None;
    kanji.updated_at = None;

    let created = repo(&state).create(kanji).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/kanji/:doc_id
pub async fn update_kanji(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    Json(update): Json<KanjiUpdate>,
) -> Result<Json<Kanji>, ApiError> {
    let updated = repo(&state).update_by_id(&doc_id, &update).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/kanji/:doc_id
pub async fn delete_kanji(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    repo(&state).delete_by_id(&doc_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
