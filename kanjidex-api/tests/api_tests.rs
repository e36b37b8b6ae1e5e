//! Integration tests for kanjidex-api endpoints
//!
//! Drives the full router against an in-memory store: health, per-resource
//! CRUD and status mapping, list filtering, and the bulk import plus
//! denormalized dictionary view.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use kanjidex_api::{build_router, AppState};
use kanjidex_common::store::Store;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app over a fresh in-memory store
async fn setup_app() -> axum::Router {
    let store = Store::in_memory().await.expect("in-memory store");
    build_router(AppState::new(store), None)
}

/// Test helper: request without a body
fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: request with a JSON body
fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("should read body");
    serde_json::from_slice(&bytes).expect("should parse JSON")
}

#[tokio::test]
async fn health_endpoint_reports_module_and_version() {
    let app = setup_app().await;

    let response = app.oneshot(request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "kanjidex-api");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn kanji_crud_flow() {
    let app = setup_app().await;

    // Create
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/kanji",
            json!({
                "kanji": "亜",
                "jouyou_number": 1,
                "kanji_section": "あ",
                "strokes": 7,
                "onyomi": ["ア"],
                "meaning": ["-sub", "asia"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = extract_json(response.into_body()).await;
    let doc_id = created["doc_id"].as_str().expect("doc_id assigned").to_string();
    assert!(created["updated_at"].is_string());

    // Duplicate natural key is rejected
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/kanji",
            json!({"kanji": "亜"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Get by id
    let response = app
        .clone()
        .oneshot(request("GET", &format!("/api/v1/kanji/{doc_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = extract_json(response.into_body()).await;
    assert_eq!(fetched["kanji"], "亜");
    assert_eq!(fetched["kanji_section"], "あ");

    // Partial update leaves other fields alone
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/kanji/{doc_id}"),
            json!({"strokes": 8}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = extract_json(response.into_body()).await;
    assert_eq!(updated["strokes"], 8);
    assert_eq!(updated["jouyou_number"], 1);
    assert_eq!(updated["meaning"], json!(["-sub", "asia"]));

    // List
    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/kanji"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = extract_json(response.into_body()).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Delete, then the id is gone
    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/api/v1/kanji/{doc_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/api/v1/kanji/{doc_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_kanji_returns_not_found() {
    let app = setup_app().await;
    let response = app
        .oneshot(request("GET", "/api/v1/kanji/no-such-id"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("no-such-id"));
}

#[tokio::test]
async fn create_with_empty_key_is_bad_request() {
    let app = setup_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/compound_word",
            json!({"compound_word": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn compound_word_list_filters() {
    let app = setup_app().await;

    for body in [
        json!({"compound_word": "亜鉛", "hiragana": "あえん", "translation": "zinc",
               "rating": 5, "related_kanji": ["亜", "鉛"]}),
        json!({"compound_word": "鉛筆", "hiragana": "えんぴつ", "translation": "pencil",
               "rating": 2, "related_kanji": ["鉛", "筆"]}),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/compound_word", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Filter by related kanji (in-set semantics)
    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/compound_word?related_kanji=%E4%BA%9C"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = extract_json(response.into_body()).await;
    let words = list.as_array().unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0]["compound_word"], "亜鉛");

    // Filter by rating set
    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/compound_word?ratings=2,3"))
        .await
        .unwrap();
    let list = extract_json(response.into_body()).await;
    let words = list.as_array().unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0]["compound_word"], "鉛筆");

    // Pagination applies after filtering
    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/compound_word?offset=1&limit=5"))
        .await
        .unwrap();
    let list = extract_json(response.into_body()).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Non-integer rating is rejected
    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/compound_word?ratings=high"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bulk_import_builds_the_dictionary_view() {
    let app = setup_app().await;

    let entries = json!([
        {
            "kanji": "亜",
            "jouyou_number": 1,
            "kanji_section": "あ",
            "compound_words": [
                {"compound_word": "亜鉛", "hiragana": "あえん", "translation": "zinc",
                 "related_kanji": []}
            ],
            "example_sentences": [
                {"example_sentence": "亜鉛は金属です。", "translation": "Zinc is a metal.",
                 "related_kanji": []}
            ]
        },
        {
            "kanji": "鉛",
            "compound_words": [
                {"compound_word": "亜鉛", "related_kanji": []}
            ]
        }
    ]);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/kanji_dict", entries))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let report = extract_json(response.into_body()).await;
    assert_eq!(report["truncated"], true);
    assert_eq!(report["entries"].as_array().unwrap().len(), 2);
    assert_eq!(report["entries"][1]["compound_words"][0]["action"], "linked");

    // The shared compound word fans out under both kanji
    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/kanji_dict"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let dicts = extract_json(response.into_body()).await;
    let dicts = dicts.as_array().unwrap();
    assert_eq!(dicts.len(), 2);
    for dict in dicts {
        assert_eq!(dict["compound_words"][0]["compound_word"], "亜鉛");
    }
    let zinc = dicts
        .iter()
        .find(|d| d["kanji"] == "亜")
        .expect("亜 entry present");
    assert_eq!(
        zinc["compound_words"][0]["related_kanji"],
        json!(["亜", "鉛"])
    );
    assert_eq!(zinc["example_sentences"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn import_with_replace_all_discards_prior_records() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/kanji",
            json!({"kanji": "旧"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/kanji_dict?replace_all=true",
            json!([{"kanji": "亜"}]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/kanji"))
        .await
        .unwrap();
    let list = extract_json(response.into_body()).await;
    let kanjis = list.as_array().unwrap();
    assert_eq!(kanjis.len(), 1);
    assert_eq!(kanjis[0]["kanji"], "亜");
}

#[tokio::test]
async fn import_entry_without_kanji_key_is_bad_request() {
    let app = setup_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/kanji_dict?replace_all=false",
            json!([{"jouyou_number": 1}]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
