use serde::{Deserialize, Serialize};

/// Raw columns that precede the embedding, in the order the model was trained on.
/// Question is absent on purpose: only its embedding is a feature.
pub const BASE_COLUMNS: [&str; 5] = [
    "Country",
    "Gender",
    "Demographics Question",
    "Demographics Response",
    "Survey Year",
];

pub const DEFAULT_EMBEDDING_PREFIX: &str = "embed_";

/// A single cell of a feature row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
}

impl FeatureValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FeatureValue::Numeric(_) => "numeric",
            FeatureValue::Categorical(_) => "categorical",
        }
    }
}

/// Ordered, named cells handed to a [`Predictor`](crate::Predictor).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    names: Vec<String>,
    values: Vec<FeatureValue>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            names: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: FeatureValue) {
        self.names.push(name.into());
        self.values.push(value);
    }

    pub fn push_categorical(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.push(name, FeatureValue::Categorical(value.into()));
    }

    pub fn push_numeric(&mut self, name: impl Into<String>, value: f64) {
        self.push(name, FeatureValue::Numeric(value));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| &self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

/// Column layout produced for an embedding of `dim` values.
pub fn feature_names(dim: usize, prefix: &str) -> Vec<String> {
    BASE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain((0..dim).map(|i| format!("{prefix}{i}")))
        .collect()
}
