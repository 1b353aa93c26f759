// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod debug;
pub mod metrics;
pub mod recommend;
pub mod search;
pub mod sentiment;

use std::sync::Arc;

pub use crate::api::{create_router, AppState};
pub use crate::catalog::InMemoryCatalog;
pub use crate::config::ServiceConfig;

/// Router over the built-in seed catalog, permissive CORS. Integration
/// tests and quick demos start here; `main` wires the configured variant.
pub fn app() -> axum::Router {
    let state = AppState::from_catalog(Arc::new(InMemoryCatalog::default_seed()));
    create_router(state, true)
}
