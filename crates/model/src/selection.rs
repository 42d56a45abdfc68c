use serde::{Deserialize, Serialize};

/// The six choices a user makes for one prediction request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub country: String,
    pub gender: String,
    pub demographics_question: String,
    pub demographics_response: String,
    /// The reason being asked about. Only its embedding reaches the model.
    pub question: String,
    pub survey_year: i32,
}
