// tests/metrics.rs
// The Prometheus recorder is process-global, so everything lives in one
// test: install, make a counted request, scrape.

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt as _;

use tour_insight::metrics::Metrics;

#[tokio::test]
async fn metrics_endpoint_exposes_the_catalog_gauge_and_request_counters() {
    let metrics = Metrics::init(8);
    let app = tour_insight::app().merge(metrics.router());

    // Hit a counted endpoint first so the counter series exists.
    let resp = app
        .clone()
        .oneshot(
            Request::get("/api/v1/recommendations/popular")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let m = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(m.status(), StatusCode::OK);
    let bytes = body::to_bytes(m.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(
        text.contains("tour_catalog_size"),
        "exposition missing gauge:\n{text}"
    );
}
