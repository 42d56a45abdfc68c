//! Gradient-boosted regression trees loaded from a JSON artifact.
//!
//! ## Artifact format (version 1)
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "objective": "regression",
//!   "base_score": 21.4,
//!   "feature_names": ["Country", "Gender", "...", "embed_767"],
//!   "categorical_features": { "Country": ["Chad", "Kenya", "..."] },
//!   "trees": [
//!     { "nodes": [
//!       { "type": "categorical", "feature": 1, "categories": ["Female"], "left": 1, "right": 2 },
//!       { "type": "leaf", "value": 3.2 },
//!       { "type": "numeric", "feature": 4, "threshold": 2010.5, "default_left": true, "left": 3, "right": 4 },
//!       { "type": "leaf", "value": -1.0 },
//!       { "type": "leaf", "value": 0.4 }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Node 0 is the root. Numeric splits send `x <= threshold` left and NaN to
//! `default_left`. Categorical splits send members of `categories` left and
//! everything else, unseen levels included, right. A feature is categorical iff
//! it is a key of `categorical_features`. The prediction is `base_score` plus
//! the leaf reached in every tree.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

use crate::features::{FeatureRow, FeatureValue};
use crate::predictor::{check_schema, FeatureKind, FeatureSpec, Predictor};
use crate::{ModelError, PredictionError};

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Serialized form of a [`TreeEnsemble`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleArtifact {
    pub format_version: u32,
    #[serde(default = "default_objective")]
    pub objective: String,
    #[serde(default)]
    pub base_score: f64,
    pub feature_names: Vec<String>,
    /// Known levels per categorical feature.
    #[serde(default)]
    pub categorical_features: BTreeMap<String, Vec<String>>,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Numeric {
        feature: usize,
        threshold: f64,
        #[serde(default)]
        default_left: bool,
        left: usize,
        right: usize,
    },
    Categorical {
        feature: usize,
        categories: Vec<String>,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

fn default_objective() -> String {
    "regression".to_string()
}

/// Loaded, validated tree ensemble.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    artifact: EnsembleArtifact,
    schema: Vec<FeatureSpec>,
}

impl TreeEnsemble {
    /// Read and validate the artifact at `path`. A missing file is [`ModelError::NotFound`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ModelError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ModelError::Io(err),
        })?;
        let model = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            trees = model.num_trees(),
            features = model.schema.len(),
            "model artifact loaded"
        );
        Ok(model)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let artifact: EnsembleArtifact = serde_json::from_str(raw)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: EnsembleArtifact) -> Result<Self, ModelError> {
        let schema = validate(&artifact)?;
        Ok(Self { artifact, schema })
    }

    pub fn artifact(&self) -> &EnsembleArtifact {
        &self.artifact
    }

    pub fn num_trees(&self) -> usize {
        self.artifact.trees.len()
    }

    fn eval_tree(
        &self,
        tree_idx: usize,
        tree: &Tree,
        values: &[FeatureValue],
    ) -> Result<f64, PredictionError> {
        let mut idx = 0usize;
        // A walk longer than the node count means the tree contains a cycle.
        for _ in 0..tree.nodes.len() {
            let node = tree.nodes.get(idx).ok_or_else(|| {
                PredictionError::Inference(format!("tree {tree_idx} has no node {idx}"))
            })?;
            idx = match node {
                Node::Leaf { value } => return Ok(*value),
                Node::Numeric {
                    feature,
                    threshold,
                    default_left,
                    left,
                    right,
                } => {
                    let x = match values.get(*feature) {
                        Some(FeatureValue::Numeric(x)) => *x,
                        _ => return Err(unexpected_cell(tree_idx, *feature)),
                    };
                    let go_left = if x.is_nan() {
                        *default_left
                    } else {
                        x <= *threshold
                    };
                    if go_left {
                        *left
                    } else {
                        *right
                    }
                }
                Node::Categorical {
                    feature,
                    categories,
                    left,
                    right,
                } => {
                    let level = match values.get(*feature) {
                        Some(FeatureValue::Categorical(level)) => level,
                        _ => return Err(unexpected_cell(tree_idx, *feature)),
                    };
                    if categories.iter().any(|c| c == level) {
                        *left
                    } else {
                        *right
                    }
                }
            };
        }
        Err(PredictionError::Inference(format!(
            "tree {tree_idx} did not reach a leaf"
        )))
    }
}

fn unexpected_cell(tree_idx: usize, feature: usize) -> PredictionError {
    PredictionError::Inference(format!(
        "tree {tree_idx} split on feature {feature} found an incompatible value"
    ))
}

impl Predictor for TreeEnsemble {
    fn schema(&self) -> &[FeatureSpec] {
        &self.schema
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, PredictionError> {
        check_schema(&self.schema, row)?;
        let values = row.values();
        let mut total = self.artifact.base_score;
        for (tree_idx, tree) in self.artifact.trees.iter().enumerate() {
            total += self.eval_tree(tree_idx, tree, values)?;
        }
        if !total.is_finite() {
            return Err(PredictionError::NonFinite);
        }
        Ok(total)
    }
}

fn invalid(msg: impl Into<String>) -> ModelError {
    ModelError::Invalid(msg.into())
}

/// Structural checks that let [`TreeEnsemble::predict`] index without panicking.
fn validate(artifact: &EnsembleArtifact) -> Result<Vec<FeatureSpec>, ModelError> {
    if artifact.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(invalid(format!(
            "unsupported format_version {}",
            artifact.format_version
        )));
    }
    if artifact.objective != "regression" {
        return Err(invalid(format!(
            "unsupported objective '{}'",
            artifact.objective
        )));
    }
    if !artifact.base_score.is_finite() {
        return Err(invalid("base_score must be finite"));
    }
    if artifact.feature_names.is_empty() {
        return Err(invalid("feature_names is empty"));
    }

    let mut seen = HashSet::new();
    for name in &artifact.feature_names {
        if !seen.insert(name.as_str()) {
            return Err(invalid(format!("duplicate feature '{name}'")));
        }
    }
    for name in artifact.categorical_features.keys() {
        if !seen.contains(name.as_str()) {
            return Err(invalid(format!(
                "categorical feature '{name}' is not in feature_names"
            )));
        }
    }

    let schema: Vec<FeatureSpec> = artifact
        .feature_names
        .iter()
        .map(|name| FeatureSpec {
            name: name.clone(),
            kind: if artifact.categorical_features.contains_key(name) {
                FeatureKind::Categorical
            } else {
                FeatureKind::Numeric
            },
        })
        .collect();

    for (t, tree) in artifact.trees.iter().enumerate() {
        if tree.nodes.is_empty() {
            return Err(invalid(format!("tree {t} has no nodes")));
        }
        let n = tree.nodes.len();
        for (i, node) in tree.nodes.iter().enumerate() {
            let (feature, expected, left, right) = match node {
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(invalid(format!("tree {t} node {i}: non-finite leaf")));
                    }
                    continue;
                }
                Node::Numeric {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if threshold.is_nan() {
                        return Err(invalid(format!("tree {t} node {i}: NaN threshold")));
                    }
                    (*feature, FeatureKind::Numeric, *left, *right)
                }
                Node::Categorical {
                    feature,
                    left,
                    right,
                    ..
                } => (*feature, FeatureKind::Categorical, *left, *right),
            };
            let spec = schema.get(feature).ok_or_else(|| {
                invalid(format!("tree {t} node {i}: feature {feature} out of range"))
            })?;
            if spec.kind != expected {
                return Err(invalid(format!(
                    "tree {t} node {i}: {} split on {} feature '{}'",
                    expected.as_str(),
                    spec.kind.as_str(),
                    spec.name
                )));
            }
            if left >= n || right >= n {
                return Err(invalid(format!(
                    "tree {t} node {i}: child index out of range"
                )));
            }
        }
    }

    Ok(schema)
}
