//! JSON API over the analyzers, mounted under `/api/v1`. Handlers stay
//! thin: validate, delegate to the analyzer or catalog, count the call,
//! serialize.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::catalog::{InMemoryCatalog, ReviewDirectory, TourDirectory};
use crate::chat::{ChatEngine, ChatResponse};
use crate::debug;
use crate::recommend::{Recommendation, Recommender, DEFAULT_LIMIT};
use crate::search::{self, ParsedQuery, SearchOutcome};
use crate::sentiment::{self, AggregateSentiment, SentimentResult, SpamFlagResult};

#[derive(Clone)]
pub struct AppState {
    tours: Arc<dyn TourDirectory>,
    reviews: Arc<dyn ReviewDirectory>,
    chat: Arc<ChatEngine>,
    recommender: Arc<Recommender>,
}

impl AppState {
    /// Wire every collaborator off one shared catalog.
    pub fn from_catalog(catalog: Arc<InMemoryCatalog>) -> Self {
        Self {
            tours: catalog.clone(),
            reviews: catalog.clone(),
            chat: Arc::new(ChatEngine::new(catalog.clone())),
            recommender: Arc::new(Recommender::new(catalog.clone(), catalog)),
        }
    }
}

pub fn create_router(state: AppState, permissive_cors: bool) -> Router {
    let api = Router::new()
        .route("/sentiment/analyze", post(sentiment_analyze))
        .route("/sentiment/check-spam", post(sentiment_check_spam))
        .route("/sentiment/tour/{slug}", get(sentiment_tour))
        .route("/sentiment/all-tours", get(sentiment_all_tours))
        .route("/search", get(search_tours))
        .route("/search/suggestions", get(search_suggestions))
        .route("/search/parse", get(search_parse))
        .route("/chat/greeting", get(chat_greeting))
        .route("/chat/message", post(chat_message))
        .route("/recommendations", get(recommendations))
        .route("/recommendations/popular", get(recommendations_popular))
        .route("/recommendations/trending", get(recommendations_trending))
        .route("/recommendations/similar/{slug}", get(recommendations_similar))
        .with_state(state);

    let router = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .nest("/api/v1", api)
        .nest("/debug", debug::router());

    if permissive_cors {
        router.layer(CorsLayer::very_permissive())
    } else {
        router
    }
}

/// Handler failure. Catalog errors surface as 500; input problems as 400.
pub enum ApiError {
    BadRequest(&'static str),
    NotFound(&'static str),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.to_string()),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.to_string()),
            ApiError::Internal(e) => {
                tracing::error!("request failed: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn count(endpoint: &'static str) {
    counter!("api_requests_total", "endpoint" => endpoint).increment(1);
}

#[derive(Deserialize)]
struct AnalyzeReq {
    text: String,
    #[serde(default)]
    rating: Option<u8>,
}

#[derive(Serialize)]
struct AnalyzeResp {
    sentiment: SentimentResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    spam: Option<SpamFlagResult>,
}

async fn sentiment_analyze(Json(body): Json<AnalyzeReq>) -> Json<AnalyzeResp> {
    count("sentiment_analyze");
    let sentiment = sentiment::analyze(&body.text);
    let spam = body.rating.map(|r| sentiment::detect_spam(&body.text, r));
    debug::record_request(
        "sentiment_analyze",
        &body.text,
        format!("{:?}", sentiment.label),
    );
    Json(AnalyzeResp { sentiment, spam })
}

#[derive(Serialize)]
struct SpamCheckResp {
    spam: SpamFlagResult,
    sentiment: SentimentResult,
}

async fn sentiment_check_spam(Json(body): Json<AnalyzeReq>) -> Json<SpamCheckResp> {
    count("sentiment_check_spam");
    let rating = body.rating.unwrap_or(5);
    let spam = sentiment::detect_spam(&body.text, rating);
    let sentiment = sentiment::analyze(&body.text);
    debug::record_request(
        "sentiment_check_spam",
        &body.text,
        format!("spam={}", spam.is_potential_spam),
    );
    Json(SpamCheckResp { spam, sentiment })
}

#[derive(Serialize)]
struct TourSentimentResp {
    slug: String,
    tour_name: String,
    analysis: Option<AggregateSentiment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

async fn sentiment_tour(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<TourSentimentResp> {
    count("sentiment_tour");
    let Some(tour) = state.tours.by_slug(&slug).await? else {
        return Err(ApiError::NotFound("tour not found"));
    };
    let reviews = state.reviews.for_tour(&tour.id).await?;
    debug::record_request("sentiment_tour", "", format!("reviews={}", reviews.len()));

    if reviews.is_empty() {
        return Ok(Json(TourSentimentResp {
            slug,
            tour_name: tour.name,
            analysis: None,
            message: Some("No reviews yet for this tour".to_string()),
        }));
    }
    Ok(Json(TourSentimentResp {
        slug,
        tour_name: tour.name,
        analysis: Some(sentiment::analyze_reviews(&reviews)),
        message: None,
    }))
}

#[derive(Serialize)]
struct AllToursSentimentResp {
    slug: String,
    tour_name: String,
    analysis: AggregateSentiment,
}

/// Aggregate for every tour that has reviews, best average first.
async fn sentiment_all_tours(
    State(state): State<AppState>,
) -> ApiResult<Vec<AllToursSentimentResp>> {
    count("sentiment_all_tours");
    let tours = state.tours.find(&Default::default()).await?;

    let mut out = Vec::new();
    for tour in tours {
        let reviews = state.reviews.for_tour(&tour.id).await?;
        if reviews.is_empty() {
            continue;
        }
        out.push(AllToursSentimentResp {
            slug: tour.slug,
            tour_name: tour.name,
            analysis: sentiment::analyze_reviews(&reviews),
        });
    }
    out.sort_by(|a, b| b.analysis.average_score.total_cmp(&a.analysis.average_score));
    debug::record_request("sentiment_all_tours", "", format!("tours={}", out.len()));
    Ok(Json(out))
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: Option<String>,
}

async fn search_tours(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<SearchOutcome> {
    count("search");
    let q = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(ApiError::BadRequest("query parameter 'q' is required"))?;
    let outcome = search::search(state.tours.as_ref(), q).await?;
    debug::record_request("search", q, format!("results={}", outcome.results));
    Ok(Json(outcome))
}

async fn search_suggestions(Query(params): Query<SearchParams>) -> Json<Vec<String>> {
    count("search_suggestions");
    let q = params.q.unwrap_or_default();
    if q.trim().chars().count() < 2 {
        return Json(Vec::new());
    }
    Json(search::suggestions(q.trim()))
}

async fn search_parse(Query(params): Query<SearchParams>) -> ApiResult<ParsedQuery> {
    count("search_parse");
    let q = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(ApiError::BadRequest("query parameter 'q' is required"))?;
    Ok(Json(search::parse_query(q)))
}

async fn chat_greeting(State(state): State<AppState>) -> Json<ChatResponse> {
    count("chat_greeting");
    Json(state.chat.welcome())
}

#[derive(Deserialize)]
struct ChatReq {
    #[serde(default)]
    message: String,
}

async fn chat_message(
    State(state): State<AppState>,
    Json(body): Json<ChatReq>,
) -> ApiResult<ChatResponse> {
    count("chat_message");
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty"));
    }
    let response = state.chat.process_message(message).await?;
    debug::record_request(
        "chat_message",
        message,
        format!("tours={}", response.tours.len()),
    );
    Ok(Json(response))
}

#[derive(Deserialize)]
struct RecommendParams {
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Serialize)]
struct RecommendResp {
    recommendations: Vec<Recommendation>,
}

async fn recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> ApiResult<RecommendResp> {
    count("recommendations");
    let user = params
        .user
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or(ApiError::BadRequest("query parameter 'user' is required"))?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let recommendations = state.recommender.personalized(user, limit).await?;
    debug::record_request(
        "recommendations",
        user,
        format!("count={}", recommendations.len()),
    );
    Ok(Json(RecommendResp { recommendations }))
}

async fn recommendations_popular(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> ApiResult<RecommendResp> {
    count("recommendations_popular");
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let recommendations = state.recommender.popular(limit).await?;
    Ok(Json(RecommendResp { recommendations }))
}

async fn recommendations_trending(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> ApiResult<RecommendResp> {
    count("recommendations_trending");
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let recommendations = state.recommender.trending(limit).await?;
    Ok(Json(RecommendResp { recommendations }))
}

async fn recommendations_similar(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<RecommendParams>,
) -> ApiResult<RecommendResp> {
    count("recommendations_similar");
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let recommendations = state.recommender.similar(&slug, limit).await?;
    Ok(Json(RecommendResp { recommendations }))
}
