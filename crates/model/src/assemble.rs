use embedding::Embedder;
use std::sync::Arc;

use crate::features::{FeatureRow, BASE_COLUMNS, DEFAULT_EMBEDDING_PREFIX};
use crate::{AssembleError, Selection};

/// Turns a [`Selection`] into the exact row layout the regression model expects:
/// the four categorical columns, Survey Year, then one numeric column per
/// embedding dimension of the selection's Question.
///
/// The assembler never pads or truncates. A layout that does not match the
/// model is for the [`Predictor`](crate::Predictor) to reject.
#[derive(Clone)]
pub struct FeatureAssembler {
    embedder: Arc<dyn Embedder>,
    prefix: String,
}

impl FeatureAssembler {
    pub fn new(embedder: Arc<dyn Embedder>, prefix: impl Into<String>) -> Self {
        Self {
            embedder,
            prefix: prefix.into(),
        }
    }

    pub fn with_default_prefix(embedder: Arc<dyn Embedder>) -> Self {
        Self::new(embedder, DEFAULT_EMBEDDING_PREFIX)
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of columns every assembled row carries.
    pub fn width(&self) -> usize {
        BASE_COLUMNS.len() + self.embedder.dim()
    }

    pub fn assemble(&self, selection: &Selection) -> Result<FeatureRow, AssembleError> {
        let embedding = self.embedder.embed_checked(&selection.question)?;

        let mut row = FeatureRow::with_capacity(BASE_COLUMNS.len() + embedding.vector.len());
        row.push_categorical(BASE_COLUMNS[0], selection.country.as_str());
        row.push_categorical(BASE_COLUMNS[1], selection.gender.as_str());
        row.push_categorical(BASE_COLUMNS[2], selection.demographics_question.as_str());
        row.push_categorical(BASE_COLUMNS[3], selection.demographics_response.as_str());
        row.push_numeric(BASE_COLUMNS[4], f64::from(selection.survey_year));
        for (i, value) in embedding.vector.into_iter().enumerate() {
            row.push_numeric(format!("{}{i}", self.prefix), value);
        }

        tracing::debug!(
            columns = row.len(),
            model = self.embedder.model_name(),
            "assembled feature row"
        );
        Ok(row)
    }
}

impl std::fmt::Debug for FeatureAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureAssembler")
            .field("model", &self.embedder.model_name())
            .field("dim", &self.embedder.dim())
            .field("prefix", &self.prefix)
            .finish()
    }
}
