use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a model artifact. Fatal at startup.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    /// The artifact parsed but is structurally unusable.
    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// Per-request prediction failure. Recoverable: the caller reports it and keeps serving.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    /// Column count or column name/order differs from the trained schema.
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),
    /// A column carries a categorical value where a number is expected, or vice versa.
    #[error("feature type mismatch for '{column}': expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
    },
    /// The model could not be evaluated.
    #[error("inference failure: {0}")]
    Inference(String),
    #[error("model produced a non-finite prediction")]
    NonFinite,
}

/// Failure while turning a selection into a feature row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssembleError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] embedding::EmbeddingError),
}
