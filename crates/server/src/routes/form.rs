use crate::error::ServerError;
use crate::render::{FormPage, Outcome, Preselect};
use crate::state::ServerState;
use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use serde::Deserialize;
use std::sync::Arc;
use vawg::Selection;

#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    #[serde(default)]
    pub demographics_question: Option<String>,
}

/// Submitted form fields. Survey Year arrives as text.
#[derive(Debug, Deserialize)]
pub struct PredictForm {
    pub country: String,
    pub gender: String,
    pub demographics_question: String,
    pub demographics_response: String,
    pub question: String,
    pub survey_year: String,
}

impl PredictForm {
    fn preselect(&self) -> Preselect {
        Preselect {
            country: Some(self.country.clone()),
            gender: Some(self.gender.clone()),
            demographics_question: Some(self.demographics_question.clone()),
            demographics_response: Some(self.demographics_response.clone()),
            question: Some(self.question.clone()),
            survey_year: Some(self.survey_year.clone()),
        }
    }

    fn into_selection(self) -> Result<Selection, ServerError> {
        let survey_year = self.survey_year.trim().parse::<i32>().map_err(|_| {
            ServerError::BadRequest(format!("invalid survey year '{}'", self.survey_year))
        })?;
        Ok(Selection {
            country: self.country,
            gender: self.gender,
            demographics_question: self.demographics_question,
            demographics_response: self.demographics_response,
            question: self.question,
            survey_year,
        })
    }
}

/// Render the form with `selected` preselected. The response select is
/// filtered by the preselected Demographics Question, or the first one.
fn render(state: &ServerState, selected: &Preselect, outcome: Option<Outcome>) -> String {
    let options = state.context.options();
    let question = selected
        .demographics_question
        .clone()
        .or_else(|| options.demographics_questions.first().cloned())
        .unwrap_or_default();
    let responses = state.context.dataset().response_options(&question);
    let selected = Preselect {
        demographics_question: Some(question),
        ..selected.clone()
    };
    FormPage {
        options: &options,
        responses: &responses,
        selected: &selected,
        outcome,
    }
    .render()
}

/// The selection form. `?demographics_question=` narrows the response select
/// and keeps that question selected.
pub async fn form_page(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<FormQuery>,
) -> impl IntoResponse {
    let selected = query
        .demographics_question
        .as_deref()
        .map(Preselect::question)
        .unwrap_or_default();
    Html(render(&state, &selected, None))
}

/// Form submit: run the pipeline and re-render the page with the result.
pub async fn submit_form(
    State(state): State<Arc<ServerState>>,
    Form(form): Form<PredictForm>,
) -> impl IntoResponse {
    let selected = form.preselect();
    let selection = match form.into_selection() {
        Ok(selection) => selection,
        Err(err) => {
            let page = render(&state, &selected, Some(Outcome::Error(err.to_string())));
            return (err.status_code(), Html(page));
        }
    };

    let (status, outcome) = match state.context.predict(&selection) {
        Ok(prediction) => (StatusCode::OK, Outcome::Prediction(prediction.formatted())),
        Err(err) => {
            let err = ServerError::from(err);
            (err.status_code(), Outcome::Error(err.to_string()))
        }
    };

    (status, Html(render(&state, &selected, Some(outcome))))
}
