use crate::error::ServerResult;
use crate::state::{ServerMetadata, ServerState};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;
use vawg::{Embedder, Predictor};

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "vawg-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// The state only exists once the dataset and model loaded, so reaching this
/// handler means the pipeline can serve.
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let ctx = &state.context;
    Ok(Json(json!({
        "status": "ready",
        "service": "vawg-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "dataset": { "status": "ready", "records": ctx.dataset().len() },
            "model": { "status": "ready", "columns": ctx.predictor().schema().len() },
            "embedding": {
                "status": "ready",
                "model": ctx.assembler().embedder().model_name(),
                "dim": ctx.assembler().embedder().dim(),
            },
        }
    })))
}

/// Server metadata endpoint
pub async fn server_metadata(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let ctx = &state.context;
    let metadata = ServerMetadata {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime_seconds(),
        records: ctx.dataset().len(),
        model_columns: ctx.predictor().schema().len(),
        embedding_model: ctx.assembler().embedder().model_name().to_string(),
    };

    Ok(Json(serde_json::to_value(metadata)?))
}
