//! HTTP layer — thin axum wrapper over the queue service.
//!
//! Three operations: submit, query, list recent. Everything else (forms,
//! sessions, page rendering) belongs to whatever front-end sits on top.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::error::Error;
use crate::job::JobSpec;
use crate::service::QueueService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: QueueService,
}

/// Build the axum router for the queue API.
pub fn routes(service: QueueService) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/health", get(health))
        .route("/api/jobs", get(list_jobs).post(submit_job))
        .route("/api/jobs/{id}", get(job_status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "jobq"
    }))
}

// ── Submit ──────────────────────────────────────────────────────────────

async fn submit_job(
    State(state): State<AppState>,
    Json(spec): Json<JobSpec>,
) -> impl IntoResponse {
    let spec = match spec {
        JobSpec::RepeatText { text, repeat } => JobSpec::RepeatText {
            text: text.trim().to_string(),
            repeat,
        },
        other => other,
    };

    match state.service.submit(spec).await {
        Ok(id) => (StatusCode::OK, Json(serde_json::json!({ "job_id": id }))).into_response(),
        Err(e) => error_response(e),
    }
}

// ── Query ───────────────────────────────────────────────────────────────

async fn job_status(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let Ok(id) = Uuid::parse_str(&id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "invalid job id" })),
        )
            .into_response();
    };

    match state.service.query(id) {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<usize>,
}

async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(10);
    Json(state.service.list_recent(limit).await)
}

// ── Error mapping ───────────────────────────────────────────────────────

fn error_response(err: Error) -> axum::response::Response {
    let status = match &err {
        Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Broker(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Job(_) => StatusCode::NOT_FOUND,
        Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}
