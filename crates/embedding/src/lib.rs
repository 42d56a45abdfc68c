//! Question-text embeddings for the justification predictor.
//!
//! The regression model was trained on BERT `[CLS]` vectors of the survey's
//! "Question" text. This crate hides that step behind the [`Embedder`] trait so
//! a real transformer encoder can slot in later without touching feature
//! assembly or prediction.
//!
//! Today there is exactly one encoder:
//!
//! - **Simulated** - a deterministic placeholder. Hashes the text with XXH3,
//!   seeds wyrand with it and draws uniform values in `[0, 1)`. No semantics,
//!   but the same text always yields the same vector, in every process.
//!
//! [`CachedEmbedder`] adds an LRU memo on top of any encoder.
//!
//! ## Quick example
//!
//! ```
//! use embedding::{Embedder, SimulatedEmbedder};
//!
//! let embedder = SimulatedEmbedder::new(768);
//! let e = embedder.embed("Wife is unfaithful").unwrap();
//! assert_eq!(e.vector.len(), 768);
//! ```

pub mod config;
pub mod error;
pub mod types;

mod cache;
mod simulated;

pub use crate::cache::CachedEmbedder;
pub use crate::config::{EmbeddingConfig, DEFAULT_EMBEDDING_DIM};
pub use crate::error::EmbeddingError;
pub use crate::simulated::{seed_for, SimulatedEmbedder, SIMULATED_MODEL_NAME};
pub use crate::types::Embedding;

use std::sync::Arc;

/// Text → fixed-length vector capability.
pub trait Embedder: Send + Sync {
    /// Number of values every returned vector carries.
    fn dim(&self) -> usize;

    /// Label identifying the encoder (and its algorithm version).
    fn model_name(&self) -> &str;

    /// Encode `text`. Must be a pure function of `text`.
    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// [`embed`](Self::embed), then verify the vector length matches [`dim`](Self::dim).
    fn embed_checked(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let embedding = self.embed(text)?;
        if embedding.vector.len() != self.dim() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dim(),
                actual: embedding.vector.len(),
            });
        }
        Ok(embedding)
    }
}

impl<T: Embedder + ?Sized> Embedder for Arc<T> {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        (**self).embed(text)
    }
}

/// Build the encoder described by `cfg`, wrapped in a memo when `cache_capacity > 0`.
pub fn build_embedder(cfg: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    cfg.validate()?;
    let base = SimulatedEmbedder::new(cfg.dim);
    tracing::debug!(
        mode = %cfg.mode,
        dim = cfg.dim,
        cache_capacity = cfg.cache_capacity,
        "building embedder"
    );
    if cfg.cache_capacity == 0 {
        return Ok(Arc::new(base));
    }
    Ok(Arc::new(CachedEmbedder::new(base, cfg.cache_capacity)))
}
