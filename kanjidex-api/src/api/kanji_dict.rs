//! Dictionary view and bulk import handlers

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use kanjidex_common::dict::{Dictionary, ImportReport};
use kanjidex_common::models::KanjiDict;
use serde::Deserialize;
use tracing::info;

use super::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    /// Drop all three collections before importing. Defaults to true,
    /// matching the bulk-replace workflow the importer was built for.
    #[serde(default = "default_replace_all")]
    pub replace_all: bool,
}

fn default_replace_all() -> bool {
    true
}

/// GET /api/v1/kanji_dict
///
/// Denormalized view joining the three collections. Kanji referenced by no
/// compound word or sentence are omitted.
pub async fn get_kanji_dicts(
    State(state): State<AppState>,
) -> Result<Json<Vec<KanjiDict>>, ApiError> {
    let dicts = Dictionary::new(&state.store).build_all().await?;
    Ok(Json(dicts))
}

/// POST /api/v1/kanji_dict?replace_all=
pub async fn import_kanji_dicts(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    Json(entries): Json<Vec<KanjiDict>>,
) -> Result<(StatusCode, Json<ImportReport>), ApiError> {
    info!(
        entries = entries.len(),
        replace_all = query.replace_all,
        "bulk import requested"
    );
    let report = Dictionary::new(&state.store)
        .import_all(&entries, query.replace_all)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}
