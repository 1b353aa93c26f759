//! Tour Insight service binary.
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.
//!
//! See `README.md` for quickstart.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tour_insight::{api, config::ServiceConfig, metrics::Metrics, InMemoryCatalog};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tour_insight=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments. This enables
    // TOUR_INSIGHT_CONFIG_PATH / TOUR_INSIGHT_DEV_LOG from .env.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = ServiceConfig::load()?;
    let catalog = Arc::new(InMemoryCatalog::load_from_file(&cfg.catalog_path));
    tracing::info!(
        tours = catalog.tour_count(),
        "catalog loaded from {}",
        cfg.catalog_path
    );

    let metrics = Metrics::init(catalog.tour_count());

    let state = api::AppState::from_catalog(catalog);
    let router = api::create_router(state, cfg.permissive_cors).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, router).await?;

    Ok(())
}
