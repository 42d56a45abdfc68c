//! Justification predictor: survey dataset, simulated question embeddings and a
//! tree-ensemble regression model behind one pipeline.
//!
//! [`AppContext`] owns everything loaded at startup (dataset, embedder, model)
//! and is shared read-only afterwards. A prediction request runs
//! [`AppContext::predict`]: optional selection checks, feature assembly,
//! model inference. Startup failures are [`StartupError`]s and stop the
//! process; request failures are [`PipelineError`]s and only fail that request.

pub mod config;

pub use crate::config::{AppConfig, ConfigLoadError};
pub use dataset::{Column, Dataset, DatasetError, GroupMean, HistogramBin, LoadStats, SurveyRecord};
pub use embedding::{
    build_embedder, CachedEmbedder, Embedder, Embedding, EmbeddingConfig, EmbeddingError,
    SimulatedEmbedder,
};
pub use model::{
    AssembleError, FeatureAssembler, FeatureRow, ModelError, PredictionError, Predictor,
    Selection, TreeEnsemble,
};

use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

/// Fatal errors raised while building the [`AppContext`].
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigLoadError),
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// Errors that can occur while serving one prediction request.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    InvalidSelection { field: &'static str, value: String },
    Assemble(AssembleError),
    Prediction(PredictionError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidSelection { field, value } => {
                write!(f, "invalid selection: {field} {value:?} is not in the dataset")
            }
            PipelineError::Assemble(err) => write!(f, "feature assembly failed: {err}"),
            PipelineError::Prediction(err) => write!(f, "prediction failed: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Assemble(err) => Some(err),
            PipelineError::Prediction(err) => Some(err),
            PipelineError::InvalidSelection { .. } => None,
        }
    }
}

impl From<AssembleError> for PipelineError {
    fn from(value: AssembleError) -> Self {
        PipelineError::Assemble(value)
    }
}

impl From<PredictionError> for PipelineError {
    fn from(value: PredictionError) -> Self {
        PipelineError::Prediction(value)
    }
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    fn record_assemble(&self, latency: Duration, result: Result<(), AssembleError>);
    fn record_predict(&self, latency: Duration, result: Result<(), PredictionError>);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record_assemble(self, result: Result<(), AssembleError>) {
        self.recorder.record_assemble(self.start.elapsed(), result);
    }

    fn record_predict(self, result: Result<(), PredictionError>) {
        self.recorder.record_predict(self.start.elapsed(), result);
    }
}

/// A model point estimate of the justification percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub value: f64,
}

impl Prediction {
    /// `"12.34%"`
    pub fn formatted(&self) -> String {
        format!("{:.2}%", self.value)
    }
}

/// Assemble the feature row for `selection` and run the predictor on it.
pub fn predict_selection(
    assembler: &FeatureAssembler,
    predictor: &dyn Predictor,
    selection: &Selection,
) -> Result<Prediction, PipelineError> {
    let assemble_metrics = MetricsSpan::start();
    let row = match assembler.assemble(selection) {
        Ok(row) => {
            if let Some(span) = assemble_metrics {
                span.record_assemble(Ok(()));
            }
            row
        }
        Err(err) => {
            if let Some(span) = assemble_metrics {
                span.record_assemble(Err(err.clone()));
            }
            return Err(PipelineError::Assemble(err));
        }
    };

    predict_row(predictor, &row)
}

/// Run the predictor on an already assembled row.
pub fn predict_row(predictor: &dyn Predictor, row: &FeatureRow) -> Result<Prediction, PipelineError> {
    let predict_metrics = MetricsSpan::start();
    match predictor.predict(row) {
        Ok(value) => {
            if let Some(span) = predict_metrics {
                span.record_predict(Ok(()));
            }
            Ok(Prediction { value })
        }
        Err(err) => {
            if let Some(span) = predict_metrics {
                span.record_predict(Err(err.clone()));
            }
            Err(PipelineError::Prediction(err))
        }
    }
}

/// Every value list the selection form offers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionOptions {
    pub countries: Vec<String>,
    pub genders: Vec<String>,
    pub demographics_questions: Vec<String>,
    pub demographics_responses: Vec<String>,
    pub questions: Vec<String>,
    pub survey_years: Vec<i32>,
}

/// The four canned chart views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    ValueDistribution,
    MeanByGender,
    MeanByDemographicsQuestion,
    TopCountries,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::ValueDistribution,
        ChartKind::MeanByGender,
        ChartKind::MeanByDemographicsQuestion,
        ChartKind::TopCountries,
    ];

    /// URL segment identifying the view.
    pub fn slug(self) -> &'static str {
        match self {
            ChartKind::ValueDistribution => "distribution",
            ChartKind::MeanByGender => "gender",
            ChartKind::MeanByDemographicsQuestion => "demographics-question",
            ChartKind::TopCountries => "top-countries",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::ValueDistribution => "Distribution of 'Value'",
            ChartKind::MeanByGender => "Average 'Value' by Gender",
            ChartKind::MeanByDemographicsQuestion => "Average 'Value' by Demographics Question",
            ChartKind::TopCountries => "Average 'Value' by Top Countries",
        }
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .into_iter()
            .find(|k| k.slug() == s)
            .ok_or_else(|| format!("unknown chart '{s}'"))
    }
}

/// Aggregated data behind one chart view.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Histogram(Vec<HistogramBin>),
    Means { column: Column, rows: Vec<GroupMean> },
}

/// Long-lived state built once at startup and shared read-only afterwards.
pub struct AppContext {
    config: AppConfig,
    dataset: Arc<Dataset>,
    assembler: FeatureAssembler,
    predictor: Arc<dyn Predictor>,
}

impl AppContext {
    /// Load the dataset and model named by `config` and build the embedder.
    /// Any failure is fatal: no partial context is ever returned.
    pub fn load(config: AppConfig) -> Result<Self, StartupError> {
        config.validate()?;
        let dataset = Dataset::load(&config.dataset.path)?;
        let predictor = TreeEnsemble::load(&config.model.path)?;
        let embedder = build_embedder(&config.embedding)?;
        Ok(Self::new(
            config,
            Arc::new(dataset),
            embedder,
            Arc::new(predictor),
        ))
    }

    /// Assemble a context from already loaded parts.
    pub fn new(
        config: AppConfig,
        dataset: Arc<Dataset>,
        embedder: Arc<dyn Embedder>,
        predictor: Arc<dyn Predictor>,
    ) -> Self {
        let assembler = FeatureAssembler::new(embedder, config.features.column_prefix.clone());
        if assembler.width() != predictor.schema().len() {
            // Not fatal: every request will report the mismatch.
            tracing::warn!(
                row_width = assembler.width(),
                model_width = predictor.schema().len(),
                "feature layout does not match the model schema"
            );
        }
        Self {
            config,
            dataset,
            assembler,
            predictor,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    pub fn predictor(&self) -> &Arc<dyn Predictor> {
        &self.predictor
    }

    pub fn options(&self) -> SelectionOptions {
        let ds = &self.dataset;
        SelectionOptions {
            countries: ds.distinct_values(Column::Country),
            genders: ds.distinct_values(Column::Gender),
            demographics_questions: ds.distinct_values(Column::DemographicsQuestion),
            demographics_responses: ds.distinct_values(Column::DemographicsResponse),
            questions: ds.distinct_values(Column::Question),
            survey_years: ds.distinct_years(),
        }
    }

    /// Check every field against the values the dataset offers.
    pub fn validate_selection(&self, selection: &Selection) -> Result<(), PipelineError> {
        let ds = &self.dataset;
        let checks = [
            (Column::Country, "Country", &selection.country),
            (Column::Gender, "Gender", &selection.gender),
            (
                Column::DemographicsQuestion,
                "Demographics Question",
                &selection.demographics_question,
            ),
            (Column::Question, "Question", &selection.question),
        ];
        for (column, field, value) in checks {
            if !ds.contains(column, value) {
                return Err(invalid_selection(field, value));
            }
        }
        if !ds
            .response_options(&selection.demographics_question)
            .contains(&selection.demographics_response)
        {
            return Err(invalid_selection(
                "Demographics Response",
                &selection.demographics_response,
            ));
        }
        if !ds.contains_year(selection.survey_year) {
            return Err(invalid_selection(
                "Survey Year",
                &selection.survey_year.to_string(),
            ));
        }
        Ok(())
    }

    /// Run the full request pipeline for `selection`.
    pub fn predict(&self, selection: &Selection) -> Result<Prediction, PipelineError> {
        if self.config.selection.strict {
            self.validate_selection(selection)?;
        }
        let result = predict_selection(&self.assembler, self.predictor.as_ref(), selection);
        match &result {
            Ok(prediction) => tracing::debug!(
                country = %selection.country,
                question = %selection.question,
                value = prediction.value,
                "prediction served"
            ),
            Err(err) => tracing::warn!(
                country = %selection.country,
                question = %selection.question,
                error = %err,
                "prediction failed"
            ),
        }
        result
    }

    /// Aggregate the data behind one chart view.
    pub fn chart(&self, kind: ChartKind) -> ChartData {
        let charts = &self.config.charts;
        match kind {
            ChartKind::ValueDistribution => {
                ChartData::Histogram(self.dataset.value_histogram(charts.histogram_max_bins))
            }
            ChartKind::MeanByGender => ChartData::Means {
                column: Column::Gender,
                rows: self.dataset.mean_by(Column::Gender),
            },
            ChartKind::MeanByDemographicsQuestion => ChartData::Means {
                column: Column::DemographicsQuestion,
                rows: self.dataset.mean_by(Column::DemographicsQuestion),
            },
            ChartKind::TopCountries => ChartData::Means {
                column: Column::Country,
                rows: self.dataset.top_by_mean(Column::Country, charts.top_n),
            },
        }
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("records", &self.dataset.len())
            .field("assembler", &self.assembler)
            .field("model_columns", &self.predictor.schema().len())
            .finish()
    }
}

fn invalid_selection(field: &'static str, value: &str) -> PipelineError {
    PipelineError::InvalidSelection {
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{EnsembleArtifact, FeatureSpec, Node, Tree};
    use std::collections::BTreeMap;

    fn record(
        country: &str,
        gender: &str,
        demographics: (&str, &str),
        question: &str,
        year: i32,
        value: f64,
    ) -> SurveyRecord {
        SurveyRecord {
            country: Some(country.into()),
            gender: Some(gender.into()),
            demographics_question: Some(demographics.0.into()),
            demographics_response: Some(demographics.1.into()),
            question: Some(question.into()),
            survey_year: Some(year),
            value,
        }
    }

    fn dataset() -> Arc<Dataset> {
        Arc::new(Dataset::from_records(vec![
            record("Kenya", "Female", ("Age", "15-19"), "Wife is unfaithful", 2014, 20.0),
            record("Kenya", "Male", ("Age", "20-24"), "Burns the food", 2014, 10.0),
            record("Peru", "Female", ("Education", "Higher"), "Burns the food", 2012, 6.0),
        ]))
    }

    fn ensemble(dim: usize) -> TreeEnsemble {
        TreeEnsemble::from_artifact(EnsembleArtifact {
            format_version: 1,
            objective: "regression".into(),
            base_score: 12.0,
            feature_names: model::feature_names(dim, "embed_"),
            categorical_features: BTreeMap::from([
                ("Country".to_string(), vec!["Kenya".to_string()]),
                ("Gender".to_string(), vec!["Female".to_string()]),
                ("Demographics Question".to_string(), vec!["Age".to_string()]),
                ("Demographics Response".to_string(), vec!["15-19".to_string()]),
            ]),
            trees: vec![Tree {
                nodes: vec![
                    Node::Categorical {
                        feature: 1,
                        categories: vec!["Female".into()],
                        left: 1,
                        right: 2,
                    },
                    Node::Leaf { value: 3.5 },
                    Node::Leaf { value: -3.5 },
                ],
            }],
        })
        .unwrap()
    }

    fn context(strict: bool) -> AppContext {
        let mut config = AppConfig::default();
        config.embedding.dim = 8;
        config.selection.strict = strict;
        AppContext::new(
            config,
            dataset(),
            Arc::new(SimulatedEmbedder::new(8)),
            Arc::new(ensemble(8)),
        )
    }

    fn selection() -> Selection {
        Selection {
            country: "Kenya".into(),
            gender: "Female".into(),
            demographics_question: "Age".into(),
            demographics_response: "15-19".into(),
            question: "Wife is unfaithful".into(),
            survey_year: 2014,
        }
    }

    #[test]
    fn predict_returns_model_value() {
        let prediction = context(true).predict(&selection()).unwrap();
        assert_eq!(prediction.value, 15.5);
        assert_eq!(prediction.formatted(), "15.50%");
    }

    #[test]
    fn strict_mode_rejects_unknown_values() {
        let ctx = context(true);

        let mut s = selection();
        s.country = "Atlantis".into();
        assert_eq!(
            ctx.predict(&s),
            Err(PipelineError::InvalidSelection {
                field: "Country",
                value: "Atlantis".into()
            })
        );

        let mut s = selection();
        s.demographics_response = "Higher".into();
        assert!(matches!(
            ctx.predict(&s),
            Err(PipelineError::InvalidSelection {
                field: "Demographics Response",
                ..
            })
        ));

        let mut s = selection();
        s.survey_year = 1990;
        assert!(matches!(
            ctx.predict(&s),
            Err(PipelineError::InvalidSelection {
                field: "Survey Year",
                ..
            })
        ));
    }

    #[test]
    fn lenient_mode_accepts_free_text_question() {
        let mut s = selection();
        s.question = "A reason nobody surveyed".into();
        assert!(context(false).predict(&s).is_ok());
        assert!(context(true).predict(&s).is_err());
    }

    #[test]
    fn schema_mismatch_is_recoverable() {
        let ctx = AppContext::new(
            AppConfig::default(),
            dataset(),
            Arc::new(SimulatedEmbedder::new(7)),
            Arc::new(ensemble(8)),
        );
        let err = ctx.predict(&selection()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Prediction(PredictionError::SchemaMismatch(_))
        ));
        // The context keeps serving.
        assert!(ctx.predict(&selection()).is_err());
        assert_eq!(ctx.options().countries, vec!["Kenya", "Peru"]);
    }

    #[test]
    fn in_memory_records_count_as_read() {
        let ctx = context(true);
        assert_eq!(ctx.dataset().len(), 3);
        assert_eq!(
            ctx.dataset().stats(),
            LoadStats {
                rows_read: 3,
                rows_dropped: 0
            }
        );
    }

    #[test]
    fn options_cover_every_field() {
        let options = context(true).options();
        assert_eq!(options.genders, vec!["Female", "Male"]);
        assert_eq!(options.demographics_questions, vec!["Age", "Education"]);
        assert_eq!(options.questions, vec!["Burns the food", "Wife is unfaithful"]);
        assert_eq!(options.survey_years, vec![2012, 2014]);
    }

    #[test]
    fn chart_views() {
        let ctx = context(true);
        match ctx.chart(ChartKind::MeanByGender) {
            ChartData::Means { column, rows } => {
                assert_eq!(column, Column::Gender);
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].group, "Female");
                assert_eq!(rows[0].mean, 13.0);
            }
            other => panic!("unexpected chart data {other:?}"),
        }
        match ctx.chart(ChartKind::ValueDistribution) {
            ChartData::Histogram(bins) => {
                assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
            }
            other => panic!("unexpected chart data {other:?}"),
        }
    }

    #[test]
    fn chart_kind_slugs_roundtrip() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.slug().parse::<ChartKind>().unwrap(), kind);
        }
        assert!("pie".parse::<ChartKind>().is_err());
    }

    #[test]
    fn pipeline_error_sources() {
        let err = PipelineError::from(PredictionError::NonFinite);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("prediction failed"));
        let err = invalid_selection("Country", "X");
        assert!(err.source().is_none());
    }

    #[derive(Default)]
    struct CountingMetrics {
        events: RwLock<Vec<&'static str>>,
    }

    impl CountingMetrics {
        fn snapshot(&self) -> Vec<&'static str> {
            self.events.read().unwrap().clone()
        }
    }

    impl PipelineMetrics for CountingMetrics {
        fn record_assemble(&self, _latency: Duration, result: Result<(), AssembleError>) {
            let label = if result.is_ok() {
                "assemble_ok"
            } else {
                "assemble_err"
            };
            self.events.write().unwrap().push(label);
        }

        fn record_predict(&self, _latency: Duration, result: Result<(), PredictionError>) {
            let label = if result.is_ok() {
                "predict_ok"
            } else {
                "predict_err"
            };
            self.events.write().unwrap().push(label);
        }
    }

    #[test]
    fn metrics_recorder_tracks_pipeline_outcome() {
        let metrics = Arc::new(CountingMetrics::default());
        set_pipeline_metrics(Some(metrics.clone()));

        let ctx = context(true);
        let ok = predict_selection(ctx.assembler(), ctx.predictor().as_ref(), &selection());
        assert!(ok.is_ok());

        let mut short = FeatureRow::new();
        short.push_numeric("embed_0", 0.5);
        let err = predict_row(ctx.predictor().as_ref(), &short);
        assert!(err.is_err());

        set_pipeline_metrics(None);

        let events = metrics.snapshot();
        assert!(events.contains(&"assemble_ok"));
        assert!(events.contains(&"predict_ok"));
        assert!(events.contains(&"predict_err"));
    }

    #[test]
    fn schema_is_exposed_through_context() {
        let ctx = context(true);
        let schema: &[FeatureSpec] = ctx.predictor().schema();
        assert_eq!(schema.len(), 13);
        assert_eq!(ctx.assembler().width(), 13);
    }
}
