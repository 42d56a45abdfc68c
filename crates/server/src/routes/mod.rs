//! API route handlers
//!
//! - `health`: liveness, readiness and server metadata
//! - `form`: the server-rendered selection form and its submit
//! - `options`: the values each select offers
//! - `predict`: JSON prediction
//! - `charts`: Vega-Lite specs for the chart views

pub mod charts;
pub mod form;
pub mod health;
pub mod options;
pub mod predict;

use crate::error::ServerError;
use axum::http::Uri;

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found(uri: Uri) -> ServerError {
    ServerError::NotFound(format!("no route for {}", uri.path()))
}
