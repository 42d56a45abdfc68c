use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const COUNTRY: &str = "Country";
pub const GENDER: &str = "Gender";
pub const DEMOGRAPHICS_QUESTION: &str = "Demographics Question";
pub const DEMOGRAPHICS_RESPONSE: &str = "Demographics Response";
pub const QUESTION: &str = "Question";
pub const SURVEY_YEAR: &str = "Survey Year";
pub const VALUE: &str = "Value";

/// Every header the loader requires, in file-agnostic order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COUNTRY,
    GENDER,
    DEMOGRAPHICS_QUESTION,
    DEMOGRAPHICS_RESPONSE,
    QUESTION,
    SURVEY_YEAR,
    VALUE,
];

/// One row of the survey. String fields are `None` when the cell was empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub country: Option<String>,
    pub gender: Option<String>,
    pub demographics_question: Option<String>,
    pub demographics_response: Option<String>,
    pub question: Option<String>,
    /// Year component of the Survey Year date.
    pub survey_year: Option<i32>,
    /// Percentage of respondents agreeing the reason justifies violence.
    pub value: f64,
}

impl SurveyRecord {
    pub fn get(&self, column: Column) -> Option<&str> {
        match column {
            Column::Country => self.country.as_deref(),
            Column::Gender => self.gender.as_deref(),
            Column::DemographicsQuestion => self.demographics_question.as_deref(),
            Column::DemographicsResponse => self.demographics_response.as_deref(),
            Column::Question => self.question.as_deref(),
        }
    }
}

/// Categorical string columns that can be enumerated or grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Country,
    Gender,
    DemographicsQuestion,
    DemographicsResponse,
    Question,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Country,
        Column::Gender,
        Column::DemographicsQuestion,
        Column::DemographicsResponse,
        Column::Question,
    ];

    /// CSV header for this column.
    pub fn header(self) -> &'static str {
        match self {
            Column::Country => COUNTRY,
            Column::Gender => GENDER,
            Column::DemographicsQuestion => DEMOGRAPHICS_QUESTION,
            Column::DemographicsResponse => DEMOGRAPHICS_RESPONSE,
            Column::Question => QUESTION,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|c| c.header().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown column '{s}'"))
    }
}
