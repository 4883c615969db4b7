// HTTP request handlers
use crate::application::dataset_assembler::{AssemblerError, SectionSummary};
use crate::domain::dashboard::{SectionId, TickId};
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct TickQuery {
    pub tick: Option<u64>,
}

#[derive(Serialize)]
struct SectionsResponse {
    refresh_interval_secs: u64,
    sections: Vec<SectionSummary>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List dashboard sections for tab navigation
pub async fn list_sections(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let body = SectionsResponse {
        refresh_interval_secs: state.refresh_interval_secs,
        sections: state.assembler.sections(),
    };

    match json_response(StatusCode::OK, &body, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Snapshot of one section for the current refresh tick
pub async fn get_section(
    Path(id): Path<String>,
    Query(query): Query<TickQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let tick = query.tick.map(TickId).unwrap_or_else(|| {
        TickId::from_unix_secs(state.clock.now().timestamp(), state.refresh_interval_secs)
    });

    let result = match state.assembler.get_snapshot(&SectionId::new(id), tick).await {
        Ok(snapshot) => json_response(StatusCode::OK, snapshot.as_ref(), compress).await,
        Err(e @ AssemblerError::UnknownSection(_)) => {
            tracing::warn!("{}", e);
            let body = ErrorBody {
                error: e.to_string(),
            };
            json_response(StatusCode::NOT_FOUND, &body, compress).await
        }
    };

    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
