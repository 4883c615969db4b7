// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dataset_assembler::{DatasetAssembler, SystemClock};
use crate::application::query_executor::QueryExecutor;
use crate::application::result_cache::ResultCache;
use crate::domain::calendar::LocaleTable;
use crate::infrastructure::config::{load_dashboard_config, load_sections_config};
use crate::infrastructure::rpc_store::RpcQueryStore;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_section, health_check, list_sections};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config().context("loading config/dashboard")?;
    let sections = load_sections_config().context("loading config/sections")?;

    // Create store (infrastructure layer)
    let store = Arc::new(RpcQueryStore::new(
        config.store.base_url.clone(),
        config.store.api_key.clone(),
        config.store.rpc_function.clone(),
        config.store.query_timeout(),
    )?);

    // Create pipeline (application layer)
    let executor = QueryExecutor::new(store, config.store.query_timeout());
    let cache = Arc::new(ResultCache::new(
        executor,
        config.cache.capacity,
        config.cache.ttl(),
    ));
    let clock = Arc::new(SystemClock);
    let assembler = DatasetAssembler::new(
        cache,
        sections.sections,
        LocaleTable::for_locale(config.locale),
        clock.clone(),
    );

    // Create application state
    let state = Arc::new(AppState {
        assembler,
        clock,
        refresh_interval_secs: config.server.refresh_interval_secs,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/sections", get(list_sections))
        .route("/sections/:id", get(get_section))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting ecommerce-monitor on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
