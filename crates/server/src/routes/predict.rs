use crate::error::ServerResult;
use crate::middleware::RequestId;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vawg::Selection;

/// Response from a single prediction
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Predicted justification percentage
    pub prediction: f64,
    /// The same value as shown on the form, e.g. `"12.34%"`
    pub formatted: String,
    /// Id the prediction was logged under
    pub request_id: String,
}

/// Run the pipeline for one selection.
///
/// # Example
/// ```json
/// // Request
/// {
///   "country": "Kenya",
///   "gender": "Female",
///   "demographics_question": "Age",
///   "demographics_response": "15-19",
///   "question": "Wife is unfaithful",
///   "survey_year": 2014
/// }
///
/// // Response
/// { "prediction": 36.85, "formatted": "36.85%", "request_id": "..." }
/// ```
///
/// An unknown value is a 400 when strict selection checks are on; a feature
/// or model failure is a 422. Neither affects later requests.
pub async fn predict(
    State(state): State<Arc<ServerState>>,
    Extension(request_id): Extension<RequestId>,
    Json(selection): Json<Selection>,
) -> ServerResult<impl IntoResponse> {
    let prediction = state.context.predict(&selection)?;
    Ok(Json(PredictResponse {
        prediction: prediction.value,
        formatted: prediction.formatted(),
        request_id: request_id.0,
    }))
}
