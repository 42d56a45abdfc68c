use xxhash_rust::xxh3::xxh3_64;

use crate::{Embedder, Embedding, EmbeddingError};

/// Name reported by [`SimulatedEmbedder`]. Bump the suffix whenever the hash, the PRNG
/// or the draw order changes, since every stored prediction depends on them.
pub const SIMULATED_MODEL_NAME: &str = "simulated-xxh3-wyrand-v1";

const SEED_MODULUS: u64 = u32::MAX as u64;

/// Placeholder encoder standing in for a BERT `[CLS]` vector.
///
/// The text is hashed with XXH3-64, reduced modulo `2^32 - 1`, and used to seed a wyrand
/// generator that draws `dim` uniform values in `[0, 1)`. The output carries no semantics
/// but is stable across runs, processes and platforms.
#[derive(Debug, Clone)]
pub struct SimulatedEmbedder {
    dim: usize,
}

impl SimulatedEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

/// Seed derived from `text`; exposed so tests can pin the algorithm.
pub fn seed_for(text: &str) -> u64 {
    xxh3_64(text.as_bytes()) % SEED_MODULUS
}

impl Embedder for SimulatedEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        SIMULATED_MODEL_NAME
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut rng = fastrand::Rng::with_seed(seed_for(text));
        let vector = (0..self.dim).map(|_| rng.f64()).collect();
        Ok(Embedding {
            vector,
            model_name: SIMULATED_MODEL_NAME.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embed(text: &str) -> Vec<f64> {
        SimulatedEmbedder::new(768).embed(text).unwrap().vector
    }

    #[test]
    fn simulated_embedding_has_requested_dim() {
        assert_eq!(embed("Wife is unfaithful").len(), 768);
        let small = SimulatedEmbedder::new(16).embed("x").unwrap();
        assert_eq!(small.vector.len(), 16);
    }

    #[test]
    fn simulated_embedding_deterministic() {
        assert_eq!(embed("same text"), embed("same text"));
    }

    #[test]
    fn simulated_embedding_separate_instances_agree() {
        let a = SimulatedEmbedder::new(768).embed("Burns the food").unwrap();
        let b = SimulatedEmbedder::new(768).embed("Burns the food").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn simulated_embedding_different_text() {
        assert_ne!(embed("hello"), embed("world"));
    }

    #[test]
    fn simulated_embedding_values_in_unit_interval() {
        for text in ["", "Argues with him", "Hello 世界 🌍", "!@#$%^&*()"] {
            for (i, &val) in embed(text).iter().enumerate() {
                assert!(
                    (0.0..1.0).contains(&val),
                    "value at index {i} for {text:?} is {val}, outside [0, 1)"
                );
            }
        }
    }

    #[test]
    fn simulated_embedding_empty_text() {
        let v = embed("");
        assert_eq!(v.len(), 768);
        assert!(!v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn simulated_embedding_long_text() {
        let long_text = "a".repeat(10_000);
        assert_eq!(embed(&long_text).len(), 768);
    }

    #[test]
    fn seed_fits_below_modulus() {
        for text in ["", "a", "Refuses to have sex with him"] {
            assert!(seed_for(text) < u32::MAX as u64);
        }
    }

    #[test]
    fn seed_is_pinned_to_xxh3() {
        assert_eq!(seed_for("Kenya"), xxh3_64(b"Kenya") % (u32::MAX as u64));
    }

    #[test]
    fn simulated_embedding_reports_model_name() {
        let e = SimulatedEmbedder::new(4).embed("test").unwrap();
        assert_eq!(e.model_name, SIMULATED_MODEL_NAME);
    }
}
