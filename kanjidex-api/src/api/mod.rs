//! HTTP handlers for the kanjidex API

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kanjidex_common::models::ListFilter;
use kanjidex_common::Error;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

mod compound_word;
mod example_sentence;
mod health;
mod kanji;
mod kanji_dict;

pub use compound_word::{
    create_compound_word, delete_compound_word, get_compound_word, list_compound_words,
    update_compound_word,
};
pub use example_sentence::{
    create_example_sentence, delete_example_sentence, get_example_sentence,
    list_example_sentences, update_example_sentence,
};
pub use health::health;
pub use kanji::{create_kanji, delete_kanji, get_kanji, list_kanji, update_kanji};
pub use kanji_dict::{get_kanji_dicts, import_kanji_dicts};

/// Error wrapper mapping the core taxonomy onto HTTP status codes.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        ApiError(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {}", self.0);
        }
        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::AlreadyExists(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::MalformedInput(_) => StatusCode::BAD_REQUEST,
        // A reconcile abort caused by bad input is still the client's fault
        Error::Reconcile { source, .. } => status_for(source),
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Listing query parameters for compound words and example sentences.
/// `related_kanji` and `ratings` are comma-separated lists.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub related_kanji: Option<String>,
    pub ratings: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn into_filter(self) -> Result<ListFilter, ApiError> {
        let related_kanji = self
            .related_kanji
            .map(|raw| split_csv(&raw))
            .unwrap_or_default();

        let mut ratings = Vec::new();
        if let Some(raw) = &self.ratings {
            for item in split_csv(raw) {
                let rating = item.parse::<i64>().map_err(|_| {
                    ApiError(Error::MalformedInput(format!(
                        "rating '{item}' is not an integer"
                    )))
                })?;
                ratings.push(rating);
            }
        }

        Ok(ListFilter {
            related_kanji,
            ratings,
            offset: self.offset,
            limit: self.limit,
        })
    }
}

/// Listing query parameters for the kanji resource (pagination only).
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl PageQuery {
    pub fn into_filter(self) -> ListFilter {
        ListFilter {
            offset: self.offset,
            limit: self.limit,
            ..ListFilter::default()
        }
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
