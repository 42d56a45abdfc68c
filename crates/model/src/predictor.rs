use serde::{Deserialize, Serialize};

use crate::features::{FeatureRow, FeatureValue};
use crate::PredictionError;

/// Kind of value a trained feature accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Numeric,
    Categorical,
}

impl FeatureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKind::Numeric => "numeric",
            FeatureKind::Categorical => "categorical",
        }
    }
}

/// One column of the schema a model was trained against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
}

/// A pretrained regression model.
pub trait Predictor: Send + Sync {
    /// Columns, in order, that [`predict`](Self::predict) expects.
    fn schema(&self) -> &[FeatureSpec];

    /// Point estimate for `row`. Never panics on a malformed row.
    fn predict(&self, row: &FeatureRow) -> Result<f64, PredictionError>;
}

/// Reject rows whose column count, names, order or value kinds differ from `schema`.
pub fn check_schema(schema: &[FeatureSpec], row: &FeatureRow) -> Result<(), PredictionError> {
    if row.len() != schema.len() {
        return Err(PredictionError::SchemaMismatch(format!(
            "expected {} columns, got {}",
            schema.len(),
            row.len()
        )));
    }
    for (pos, (spec, (name, value))) in schema.iter().zip(row.iter()).enumerate() {
        if spec.name != name {
            return Err(PredictionError::SchemaMismatch(format!(
                "column {pos} is '{name}', expected '{}'",
                spec.name
            )));
        }
        let matches = matches!(
            (spec.kind, value),
            (FeatureKind::Numeric, FeatureValue::Numeric(_))
                | (FeatureKind::Categorical, FeatureValue::Categorical(_))
        );
        if !matches {
            return Err(PredictionError::TypeMismatch {
                column: spec.name.clone(),
                expected: spec.kind.as_str(),
            });
        }
    }
    Ok(())
}
