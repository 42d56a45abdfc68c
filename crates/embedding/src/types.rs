use serde::{Deserialize, Serialize};

/// Embedding output for a single piece of text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embedding {
    /// Embedding values, one per dimension.
    pub vector: Vec<f64>,
    /// Name of the encoder that produced the vector.
    pub model_name: String,
}

impl Embedding {
    /// Dimension of [`vector`](Self::vector).
    pub fn dim(&self) -> usize {
        self.vector.len()
    }
}
