use thiserror::Error;

/// Errors surfaced by [`Embedder`](crate::Embedder) implementations and
/// [`build_embedder`](crate::build_embedder).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbeddingError {
    /// Configuration is inconsistent (unknown mode, zero dimension, ...).
    #[error("invalid embedding config: {0}")]
    InvalidConfig(String),
    /// The encoder failed to produce a vector for the given text.
    #[error("embedding failure: {0}")]
    Inference(String),
    /// An encoder returned a vector whose length differs from its advertised dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
