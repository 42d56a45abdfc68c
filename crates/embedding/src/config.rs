use serde::{Deserialize, Serialize};

use crate::EmbeddingError;

/// Dimension of the BERT-base style vectors the regression model was trained on.
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

/// Runtime configuration describing which encoder to build and how to memoize it.
///
/// # Example
/// ```
/// use embedding::{build_embedder, Embedder, EmbeddingConfig};
///
/// let cfg = EmbeddingConfig {
///     cache_capacity: 0,
///     ..Default::default()
/// };
/// let embedder = build_embedder(&cfg).unwrap();
/// assert_eq!(embedder.dim(), 768);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Encoder selector. Only `"simulated"` is implemented.
    pub mode: String,
    /// Number of dimensions each vector carries.
    pub dim: usize,
    /// Maximum number of memoized texts. `0` disables the memo.
    pub cache_capacity: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            mode: "simulated".into(),
            dim: DEFAULT_EMBEDDING_DIM,
            cache_capacity: 1024,
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.dim == 0 {
            return Err(EmbeddingError::InvalidConfig(
                "dim must be greater than zero".into(),
            ));
        }
        match self.mode.as_str() {
            "simulated" => Ok(()),
            other => Err(EmbeddingError::InvalidConfig(format!(
                "unknown embedding mode '{other}'"
            ))),
        }
    }
}
