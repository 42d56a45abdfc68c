//! HTTP front end for the justification predictor.
//!
//! Serves the selection form, a small JSON API over the same pipeline and the
//! four chart views as Vega-Lite specs. Everything is read from one
//! [`vawg::AppContext`] built before the listener binds; a dataset or model
//! that fails to load stops startup.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Endpoints
//!
//! - `GET /` - selection form (`?demographics_question=` filters responses)
//! - `POST /predict` - form submit, re-renders the page with the result
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /api/v1/options` - every select's values
//! - `GET /api/v1/responses?question=` - responses paired with a question
//! - `POST /api/v1/predict` - JSON prediction
//! - `GET /api/v1/charts/{kind}` - Vega-Lite spec for one chart view
//! - `GET /api/v1/metadata` - Server metadata

pub mod config;
pub mod error;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
