use crate::error::{ServerError, ServerResult};
use crate::render::chart_spec;
use crate::state::ServerState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use vawg::ChartKind;

/// Vega-Lite spec for one of the four chart views
pub async fn chart(
    State(state): State<Arc<ServerState>>,
    Path(kind): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let kind: ChartKind = kind.parse().map_err(ServerError::NotFound)?;
    let data = state.context.chart(kind);
    Ok(Json(chart_spec(kind, &data)))
}
