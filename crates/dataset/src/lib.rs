//! Survey dataset access for the justification predictor.
//!
//! The dataset is loaded once at startup and never mutated afterwards. Every
//! query here is a pure function over that immutable snapshot:
//!
//! - [`Dataset::distinct_values`] / [`Dataset::distinct_years`] feed the form's
//!   select boxes.
//! - [`Dataset::responses_for`] filters Demographics Response by the chosen
//!   Demographics Question.
//! - [`Dataset::value_histogram`], [`Dataset::mean_by`] and
//!   [`Dataset::top_by_mean`] back the four chart views.
//!
//! ```no_run
//! use dataset::{Column, Dataset};
//!
//! let ds = Dataset::load("data/sample_survey.csv").unwrap();
//! let countries = ds.distinct_values(Column::Country);
//! let ages = ds.responses_for("Age");
//! ```

pub mod error;
pub mod record;

mod aggregate;
mod load;

pub use crate::aggregate::{GroupMean, HistogramBin};
pub use crate::error::DatasetError;
pub use crate::load::LoadStats;
pub use crate::record::{Column, SurveyRecord, REQUIRED_COLUMNS};

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Immutable, in-memory survey records with null-Value rows already removed.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<SurveyRecord>,
    stats: LoadStats,
}

impl Dataset {
    /// Load the CSV at `path`. A missing file is [`DatasetError::NotFound`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => DatasetError::NotFound {
                path: path.to_path_buf(),
            },
            _ => DatasetError::Io(err),
        })?;
        let dataset = Self::from_reader(BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            rows_read = dataset.stats.rows_read,
            rows_dropped = dataset.stats.rows_dropped,
            rows_kept = dataset.records.len(),
            "survey dataset loaded"
        );
        Ok(dataset)
    }

    /// Parse CSV from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let (records, stats) = load::read_records(reader)?;
        Ok(Self { records, stats })
    }

    pub fn from_records(records: Vec<SurveyRecord>) -> Self {
        let stats = LoadStats {
            rows_read: records.len(),
            rows_dropped: 0,
        };
        Self { records, stats }
    }

    pub fn records(&self) -> &[SurveyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    /// Sorted, duplicate-free non-null values of `column`.
    pub fn distinct_values(&self, column: Column) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.get(column))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Sorted, duplicate-free survey years.
    pub fn distinct_years(&self) -> Vec<i32> {
        self.records
            .iter()
            .filter_map(|r| r.survey_year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted Demographics Response values paired with `question`. Empty iff no row has
    /// that Demographics Question.
    pub fn responses_for(&self, question: &str) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.demographics_question.as_deref() == Some(question))
            .filter_map(|r| r.demographics_response.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Responses offered by the form: [`responses_for`](Self::responses_for), falling back to
    /// every response when the question has none.
    pub fn response_options(&self, question: &str) -> Vec<String> {
        let filtered = self.responses_for(question);
        if filtered.is_empty() {
            return self.distinct_values(Column::DemographicsResponse);
        }
        filtered
    }

    /// True when some row has `value` in `column`.
    pub fn contains(&self, column: Column, value: &str) -> bool {
        self.records.iter().any(|r| r.get(column) == Some(value))
    }

    pub fn contains_year(&self, year: i32) -> bool {
        self.records.iter().any(|r| r.survey_year == Some(year))
    }

    /// Distribution of Value in at most `max_bins` equal-width bins.
    pub fn value_histogram(&self, max_bins: usize) -> Vec<HistogramBin> {
        aggregate::value_histogram(&self.records, max_bins)
    }

    /// Mean Value per distinct value of `column`, highest first.
    pub fn mean_by(&self, column: Column) -> Vec<GroupMean> {
        aggregate::mean_by(&self.records, column)
    }

    /// The `n` groups of `column` with the highest mean Value.
    pub fn top_by_mean(&self, column: Column, n: usize) -> Vec<GroupMean> {
        let mut means = self.mean_by(column);
        means.truncate(n);
        means
    }
}
