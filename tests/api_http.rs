// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /healthz
// - POST /api/v1/sentiment/analyze + check-spam
// - GET  /api/v1/sentiment/tour/{slug} (found, empty, unknown)
// - GET  /api/v1/search (+ validation) and suggestions
// - POST /api/v1/chat/message (+ validation)
// - GET  /api/v1/recommendations/*

use serde_json::json;
use serde_json::Value as Json;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Build the same Router the binary uses, over the built-in seed.
fn test_router() -> Router {
    tour_insight::app()
}

async fn json_body(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json body")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET request")
}

fn post_json(uri: &str, payload: Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST request")
}

#[tokio::test]
async fn healthz_returns_200_and_ok_body() {
    let resp = test_router()
        .oneshot(get("/healthz"))
        .await
        .expect("oneshot /healthz");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn sentiment_analyze_returns_expected_json_fields() {
    let payload = json!({ "text": "Amazing tour, the guides were very friendly" });
    let resp = test_router()
        .oneshot(post_json("/api/v1/sentiment/analyze", payload))
        .await
        .expect("oneshot analyze");
    assert!(resp.status().is_success(), "got {}", resp.status());

    let v = json_body(resp).await;
    let s = v.get("sentiment").expect("missing 'sentiment'");
    assert!(s.get("score").is_some(), "missing 'score'");
    assert!(s.get("label").is_some(), "missing 'label'");
    assert!(s.get("confidence").is_some(), "missing 'confidence'");
    assert!(s["score"].as_f64().expect("score number") > 0.0);
    // No rating in the request, so no spam block in the response.
    assert!(v.get("spam").is_none(), "spam must be absent without rating");
}

#[tokio::test]
async fn sentiment_analyze_with_rating_includes_spam_flags() {
    let payload = json!({ "text": "GREAT!!!! AMAZING!!!! BEST!!!!", "rating": 5 });
    let resp = test_router()
        .oneshot(post_json("/api/v1/sentiment/analyze", payload))
        .await
        .expect("oneshot analyze");
    let v = json_body(resp).await;
    let spam = v.get("spam").expect("missing 'spam'");
    assert_eq!(spam["is_potential_spam"], json!(true));
}

#[tokio::test]
async fn check_spam_defaults_rating_to_five() {
    // 14 chars: short text + the default extreme rating trips the check.
    let payload = json!({ "text": "Best tour ever" });
    let resp = test_router()
        .oneshot(post_json("/api/v1/sentiment/check-spam", payload))
        .await
        .expect("oneshot check-spam");
    assert!(resp.status().is_success());

    let v = json_body(resp).await;
    let flags = v["spam"]["flags"].as_array().expect("flags array");
    assert!(
        flags.contains(&json!("Very short review with extreme rating")),
        "{flags:?}"
    );
    assert!(v.get("sentiment").is_some(), "missing 'sentiment'");
}

#[tokio::test]
async fn tour_sentiment_aggregates_seed_reviews() {
    let resp = test_router()
        .oneshot(get("/api/v1/sentiment/tour/the-forest-hiker"))
        .await
        .expect("oneshot tour sentiment");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert_eq!(v["slug"], json!("the-forest-hiker"));
    let analysis = v.get("analysis").expect("missing 'analysis'");
    assert_eq!(analysis["total_reviews"], json!(3));
    assert!(analysis.get("distribution").is_some());
    assert!(analysis.get("highlights").is_some());
}

#[tokio::test]
async fn tour_without_reviews_gets_null_analysis_and_message() {
    // t3 has no seed reviews.
    let resp = test_router()
        .oneshot(get("/api/v1/sentiment/tour/the-snow-adventurer"))
        .await
        .expect("oneshot tour sentiment");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert!(v["analysis"].is_null(), "analysis must be null: {v}");
    assert!(v.get("message").is_some(), "missing 'message'");
}

#[tokio::test]
async fn unknown_tour_slug_is_404() {
    let resp = test_router()
        .oneshot(get("/api/v1/sentiment/tour/no-such-tour"))
        .await
        .expect("oneshot tour sentiment");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn all_tours_sentiment_is_sorted_by_average_desc() {
    let resp = test_router()
        .oneshot(get("/api/v1/sentiment/all-tours"))
        .await
        .expect("oneshot all-tours");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    let arr = v.as_array().expect("array response");
    // Seed has reviews for t1, t2, t5 only.
    assert_eq!(arr.len(), 3, "{arr:?}");
    let scores: Vec<f64> = arr
        .iter()
        .map(|e| e["analysis"]["average_score"].as_f64().expect("score"))
        .collect();
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1], "not sorted: {scores:?}");
    }
}

#[tokio::test]
async fn search_without_query_is_400() {
    let resp = test_router()
        .oneshot(get("/api/v1/search"))
        .await
        .expect("oneshot search");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let v = json_body(resp).await;
    assert!(v.get("error").is_some(), "missing 'error'");
}

#[tokio::test]
async fn search_returns_parse_bundle_and_matching_tours() {
    let resp = test_router()
        .oneshot(get("/api/v1/search?q=easy%20hiking%20under%20%24800"))
        .await
        .expect("oneshot search");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert!(v.get("parsed_filters").is_some(), "missing 'parsed_filters'");
    assert!(v.get("search_summary").is_some(), "missing 'search_summary'");
    let tours = v["tours"].as_array().expect("tours array");
    assert_eq!(v["results"], json!(tours.len()));
    // Seed: only the forest hiker is easy, hiking-related and under $800.
    assert_eq!(tours.len(), 1, "{tours:?}");
    assert_eq!(tours[0]["slug"], json!("the-forest-hiker"));
}

#[tokio::test]
async fn suggestions_need_at_least_two_chars() {
    let resp = test_router()
        .oneshot(get("/api/v1/search/suggestions?q=h"))
        .await
        .expect("oneshot suggestions");
    let v = json_body(resp).await;
    assert_eq!(v, json!([]));

    let resp = test_router()
        .oneshot(get("/api/v1/search/suggestions?q=hik"))
        .await
        .expect("oneshot suggestions");
    let v = json_body(resp).await;
    let arr = v.as_array().expect("array");
    assert!(!arr.is_empty());
    assert!(arr.len() <= 5);
}

#[tokio::test]
async fn chat_greeting_is_a_fixed_welcome() {
    let a = json_body(
        test_router()
            .oneshot(get("/api/v1/chat/greeting"))
            .await
            .expect("oneshot greeting"),
    )
    .await;
    let b = json_body(
        test_router()
            .oneshot(get("/api/v1/chat/greeting"))
            .await
            .expect("oneshot greeting"),
    )
    .await;
    assert_eq!(a["message"], b["message"], "welcome must not be randomized");
    assert_eq!(a["suggestions"].as_array().expect("suggestions").len(), 4);
}

#[tokio::test]
async fn empty_chat_message_is_400() {
    let resp = test_router()
        .oneshot(post_json("/api/v1/chat/message", json!({ "message": "  " })))
        .await
        .expect("oneshot chat");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_message_routes_to_an_intent_handler() {
    let resp = test_router()
        .oneshot(post_json(
            "/api/v1/chat/message",
            json!({ "message": "show me the most popular tours" }),
        ))
        .await
        .expect("oneshot chat");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    let tours = v["tours"].as_array().expect("tours array");
    assert!(!tours.is_empty(), "popular intent must return tours");
    assert!(tours.len() <= 4);
    assert!(tours[0].get("slug").is_some(), "tour card needs slug");
}

#[tokio::test]
async fn recommendations_require_a_user() {
    let resp = test_router()
        .oneshot(get("/api/v1/recommendations"))
        .await
        .expect("oneshot recommendations");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn popular_recommendations_carry_reasons() {
    let resp = test_router()
        .oneshot(get("/api/v1/recommendations/popular?limit=3"))
        .await
        .expect("oneshot popular");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    let recs = v["recommendations"].as_array().expect("recommendations");
    assert_eq!(recs.len(), 3);
    for rec in recs {
        assert!(rec.get("tour").is_some(), "missing 'tour'");
        assert!(
            !rec["reason"].as_str().expect("reason string").is_empty(),
            "empty reason"
        );
    }
}

#[tokio::test]
async fn similar_recommendations_for_unknown_slug_are_empty() {
    let resp = test_router()
        .oneshot(get("/api/v1/recommendations/similar/no-such-tour"))
        .await
        .expect("oneshot similar");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert_eq!(v["recommendations"], json!([]));
}
