//! CSV parsing for the survey dataset.
//!
//! Columns are located by header name so extra columns (e.g. `RecordID`) and
//! reordered files load the same way. Rows whose Value is null are dropped
//! before the [`Dataset`](crate::Dataset) is built, so every aggregate and
//! distinct-value query only ever sees rows with a Value.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::io::Read;

use crate::record::{
    SurveyRecord, COUNTRY, DEMOGRAPHICS_QUESTION, DEMOGRAPHICS_RESPONSE, GENDER, QUESTION,
    REQUIRED_COLUMNS, SURVEY_YEAR, VALUE,
};
use crate::DatasetError;

const NULL_TOKENS: [&str; 5] = ["", "na", "nan", "null", "none"];

const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Counters reported after a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LoadStats {
    /// Data rows present in the file (header excluded).
    pub rows_read: usize,
    /// Rows discarded because their Value was null.
    pub rows_dropped: usize,
}

struct ColumnIndex {
    country: usize,
    gender: usize,
    demographics_question: usize,
    demographics_response: usize,
    question: usize,
    survey_year: usize,
    value: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, DatasetError> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let find = |name: &str| {
            names
                .iter()
                .position(|h| *h == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };
        // Report the first missing header in a stable order.
        for name in REQUIRED_COLUMNS {
            find(name)?;
        }
        Ok(Self {
            country: find(COUNTRY)?,
            gender: find(GENDER)?,
            demographics_question: find(DEMOGRAPHICS_QUESTION)?,
            demographics_response: find(DEMOGRAPHICS_RESPONSE)?,
            question: find(QUESTION)?,
            survey_year: find(SURVEY_YEAR)?,
            value: find(VALUE)?,
        })
    }
}

pub(crate) fn read_records<R: Read>(
    reader: R,
) -> Result<(Vec<SurveyRecord>, LoadStats), DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let index = ColumnIndex::from_headers(csv_reader.headers()?)?;

    let mut records = Vec::new();
    let mut stats = LoadStats::default();
    for row in csv_reader.records() {
        let row = row?;
        stats.rows_read += 1;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let Some(value) = parse_value(cell(&row, index.value), line)? else {
            stats.rows_dropped += 1;
            continue;
        };

        records.push(SurveyRecord {
            country: text_cell(&row, index.country),
            gender: text_cell(&row, index.gender),
            demographics_question: text_cell(&row, index.demographics_question),
            demographics_response: text_cell(&row, index.demographics_response),
            question: text_cell(&row, index.question),
            survey_year: parse_year(cell(&row, index.survey_year), line)?,
            value,
        });
    }

    Ok((records, stats))
}

fn cell(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("")
}

fn is_null(raw: &str) -> bool {
    NULL_TOKENS.iter().any(|t| raw.eq_ignore_ascii_case(t))
}

fn text_cell(row: &StringRecord, idx: usize) -> Option<String> {
    let raw = cell(row, idx);
    (!raw.is_empty()).then(|| raw.to_string())
}

/// `Ok(None)` for null cells, which the caller drops.
fn parse_value(raw: &str, line: u64) -> Result<Option<f64>, DatasetError> {
    if is_null(raw) {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(DatasetError::InvalidValue {
            line,
            value: raw.to_string(),
        }),
    }
}

/// Truncate a date-like cell to its year.
pub(crate) fn parse_year(raw: &str, line: u64) -> Result<Option<i32>, DatasetError> {
    if is_null(raw) {
        return Ok(None);
    }
    if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(year) = raw.parse::<i32>() {
            return Ok(Some(year));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Ok(Some(date.year()));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Some(dt.year()));
        }
    }
    Err(DatasetError::InvalidDate {
        line,
        value: raw.to_string(),
    })
}
