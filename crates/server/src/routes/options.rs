use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Distinct values for every select on the form
pub async fn list_options(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    Ok(Json(state.context.options()))
}

#[derive(Debug, Deserialize)]
pub struct ResponsesQuery {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResponsesResponse {
    pub question: String,
    pub responses: Vec<String>,
}

/// Demographics Response values paired with `question`. Empty when the
/// dataset has no such question.
pub async fn list_responses(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ResponsesQuery>,
) -> ServerResult<impl IntoResponse> {
    let responses = state.context.dataset().responses_for(&query.question);
    tracing::debug!(question = %query.question, count = responses.len(), "responses listed");
    Ok(Json(ResponsesResponse {
        question: query.question,
        responses,
    }))
}
