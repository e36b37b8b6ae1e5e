//! kanjidex-api library - HTTP surface over the kanjidex core

use axum::http::HeaderValue;
use axum::Router;
use kanjidex_common::store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers. The store handle is
/// constructed in `main` and injected here; there is no global connection
/// state.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

/// Build the application router.
///
/// `cors_origin` restricts browsers to the configured frontend origin;
/// absent (or unparseable) it falls back to a permissive policy suitable
/// for local development.
pub fn build_router(state: AppState, cors_origin: Option<&str>) -> Router {
    use axum::routing::get;

    let kanji = Router::new()
        .route("/", get(api::list_kanji).post(api::create_kanji))
        .route(
            "/:doc_id",
            get(api::get_kanji)
                .put(api::update_kanji)
                .delete(api::delete_kanji),
        );

    let compound_word = Router::new()
        .route(
            "/",
            get(api::list_compound_words).post(api::create_compound_word),
        )
        .route(
            "/:doc_id",
            get(api::get_compound_word)
                .put(api::update_compound_word)
                .delete(api::delete_compound_word),
        );

    let example_sentence = Router::new()
        .route(
            "/",
            get(api::list_example_sentences).post(api::create_example_sentence),
        )
        .route(
            "/:doc_id",
            get(api::get_example_sentence)
                .put(api::update_example_sentence)
                .delete(api::delete_example_sentence),
        );

    let kanji_dict = Router::new().route(
        "/",
        get(api::get_kanji_dicts).post(api::import_kanji_dicts),
    );

    Router::new()
        .nest("/api/v1/kanji", kanji)
        .nest("/api/v1/compound_word", compound_word)
        .nest("/api/v1/example_sentence", example_sentence)
        .nest("/api/v1/kanji_dict", kanji_dict)
        .route("/health", get(api::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin))
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|o| o.parse::<HeaderValue>().ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}
