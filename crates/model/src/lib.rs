//! Feature assembly and prediction for the justification predictor.
//!
//! A [`Selection`] becomes a [`FeatureRow`] through the [`FeatureAssembler`]
//! (four categorical columns, Survey Year, then the Question embedding spread
//! over `embed_0..embed_{dim-1}`), and a [`Predictor`] turns that row into a
//! single percentage.
//!
//! [`TreeEnsemble`] is the shipped predictor: a gradient-boosted regression
//! tree ensemble read from a JSON artifact (see [`ensemble`] for the format).
//! It validates every row against the schema it was trained on, so a row with
//! the wrong column count, order or types fails with a [`PredictionError`]
//! instead of silently producing a number.

pub mod assemble;
pub mod ensemble;
pub mod error;
pub mod features;
pub mod predictor;
pub mod selection;

pub use crate::assemble::FeatureAssembler;
pub use crate::ensemble::{EnsembleArtifact, Node, Tree, TreeEnsemble, ARTIFACT_FORMAT_VERSION};
pub use crate::error::{AssembleError, ModelError, PredictionError};
pub use crate::features::{
    feature_names, FeatureRow, FeatureValue, BASE_COLUMNS, DEFAULT_EMBEDDING_PREFIX,
};
pub use crate::predictor::{check_schema, FeatureKind, FeatureSpec, Predictor};
pub use crate::selection::Selection;
