//! Bounded in-memory request introspection: a rolling trace of recent
//! analyzer calls plus per-endpoint counters, exposed under `/debug`.
//! Raw user text never lands here; traces carry a short anonymized
//! hash instead.

use axum::{extract::Query, routing::get, Json, Router};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
    time::Instant,
};
use tracing::info;

const HISTORY_CAP: usize = 500;

pub const ENV_DEV_LOG: &str = "TOUR_INSIGHT_DEV_LOG";

#[derive(Clone, Serialize)]
pub struct RequestTrace {
    pub at_ms: u128,
    pub endpoint: &'static str,
    /// 6-byte SHA-256 prefix of the input text; empty for text-less calls.
    pub anon_id: String,
    pub outcome: String,
}

#[derive(Default, Clone, Serialize)]
pub struct Stats {
    pub total_requests: u64,
    pub by_endpoint: HashMap<String, u64>,
}

static HISTORY: Lazy<Mutex<VecDeque<RequestTrace>>> =
    Lazy::new(|| Mutex::new(VecDeque::with_capacity(HISTORY_CAP)));
static STATS: Lazy<Mutex<Stats>> = Lazy::new(|| Mutex::new(Stats::default()));

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub fn router() -> Router {
    Router::new()
        .route("/history", get(history))
        .route("/stats", get(stats))
}

/// Count a request and remember a trace of it.
pub fn record_request(endpoint: &'static str, text: &str, outcome: impl Into<String>) {
    {
        let mut s = STATS.lock().expect("debug stats mutex poisoned");
        s.total_requests += 1;
        *s.by_endpoint.entry(endpoint.to_string()).or_insert(0) += 1;
    }

    let anon_id = if text.is_empty() {
        String::new()
    } else {
        anon_hash(text)
    };
    let trace = RequestTrace {
        at_ms: now_ms(),
        endpoint,
        anon_id,
        outcome: outcome.into(),
    };

    dev_log_trace(&trace);

    let mut h = HISTORY.lock().expect("debug history mutex poisoned");
    if h.len() >= HISTORY_CAP {
        h.pop_front();
    }
    h.push_back(trace);
}

/// Dev logging gate: TOUR_INSIGHT_DEV_LOG=1 AND a dev environment
/// (debug build, or APP_ENV in {local, development, dev}).
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("APP_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// 6-byte SHA-256 prefix, hex-encoded. Stable per input, useless for
/// recovering it.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn dev_log_trace(trace: &RequestTrace) {
    if !dev_logging_enabled() {
        return;
    }
    // Never log raw text, only the hashed id.
    info!(
        target: "tour_insight",
        endpoint = trace.endpoint,
        id = %trace.anon_id,
        outcome = %trace.outcome,
        "request"
    );
}

async fn history(Query(q): Query<HistoryQuery>) -> Json<Vec<RequestTrace>> {
    let limit = q.limit.unwrap_or(50);
    let h = HISTORY.lock().expect("debug history mutex poisoned");
    let start = h.len().saturating_sub(limit);
    Json(h.iter().skip(start).cloned().collect())
}

async fn stats() -> Json<Stats> {
    Json(STATS.lock().expect("debug stats mutex poisoned").clone())
}

fn now_ms() -> u128 {
    static START: Lazy<Instant> = Lazy::new(Instant::now);
    START.elapsed().as_millis()
}
