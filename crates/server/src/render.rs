//! Server-side HTML for the selection form and Vega-Lite specs for the chart views.
//!
//! The page is a single self-contained document. Charts are drawn in the
//! browser by `vega-embed` from the specs served under `/api/v1/charts/{kind}`.

use serde_json::{json, Value};
use vawg::{ChartData, ChartKind, Selection, SelectionOptions};

/// Result shown under the form after a submit.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Prediction(String),
    Error(String),
}

/// Values to preselect, kept as the text the browser sent so a rejected
/// submit re-renders with the user's choices intact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preselect {
    pub country: Option<String>,
    pub gender: Option<String>,
    pub demographics_question: Option<String>,
    pub demographics_response: Option<String>,
    pub question: Option<String>,
    pub survey_year: Option<String>,
}

impl Preselect {
    /// Only the Demographics Question, as after a filter reload.
    pub fn question(demographics_question: &str) -> Self {
        Self {
            demographics_question: Some(demographics_question.to_string()),
            ..Self::default()
        }
    }
}

impl From<&Selection> for Preselect {
    fn from(selection: &Selection) -> Self {
        Self {
            country: Some(selection.country.clone()),
            gender: Some(selection.gender.clone()),
            demographics_question: Some(selection.demographics_question.clone()),
            demographics_response: Some(selection.demographics_response.clone()),
            question: Some(selection.question.clone()),
            survey_year: Some(selection.survey_year.to_string()),
        }
    }
}

/// Everything the form page needs.
#[derive(Debug)]
pub struct FormPage<'a> {
    pub options: &'a SelectionOptions,
    /// Demographics Response choices for the selected question.
    pub responses: &'a [String],
    pub selected: &'a Preselect,
    pub outcome: Option<Outcome>,
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn select<T: AsRef<str>>(name: &str, label: &str, values: &[T], selected: Option<&str>) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<label for=\"{name}\">{}</label>\n<select id=\"{name}\" name=\"{name}\">\n",
        escape_html(label)
    ));
    for value in values {
        let value = value.as_ref();
        let marker = if selected == Some(value) { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{v}\"{marker}>{v}</option>\n",
            v = escape_html(value)
        ));
    }
    html.push_str("</select>\n");
    html
}

impl FormPage<'_> {
    pub fn render(&self) -> String {
        let options = self.options;
        let selected = self.selected;
        let years: Vec<String> = options.survey_years.iter().map(i32::to_string).collect();

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str("<title>VAWG Insight Predictor</title>\n");
        html.push_str("<script src=\"https://cdn.jsdelivr.net/npm/vega@5\"></script>\n");
        html.push_str("<script src=\"https://cdn.jsdelivr.net/npm/vega-lite@5\"></script>\n");
        html.push_str("<script src=\"https://cdn.jsdelivr.net/npm/vega-embed@6\"></script>\n");
        html.push_str(
            "<style>body{font-family:sans-serif;max-width:56rem;margin:2rem auto}\
             label{display:block;margin-top:.75rem;font-weight:bold}\
             select{min-width:24rem}.result{margin-top:1rem;font-size:1.25rem}\
             .error{color:#b00020}</style>\n",
        );
        html.push_str("</head>\n<body>\n");
        html.push_str("<h1>VAWG Insight Predictor</h1>\n");
        html.push_str(
            "<p>Predict the percentage of respondents who consider violence against \
             women and girls justified for a given survey selection.</p>\n",
        );

        html.push_str("<form method=\"post\" action=\"/predict\">\n");
        html.push_str(&select(
            "country",
            "Country",
            &options.countries,
            selected.country.as_deref(),
        ));
        html.push_str(&select(
            "gender",
            "Gender",
            &options.genders,
            selected.gender.as_deref(),
        ));
        html.push_str(&select(
            "demographics_question",
            "Demographics Question",
            &options.demographics_questions,
            selected.demographics_question.as_deref(),
        ));
        html.push_str(&select(
            "demographics_response",
            "Demographics Response",
            self.responses,
            selected.demographics_response.as_deref(),
        ));
        html.push_str(&select(
            "survey_year",
            "Survey Year",
            &years,
            selected.survey_year.as_deref(),
        ));
        html.push_str(&select(
            "question",
            "Question",
            &options.questions,
            selected.question.as_deref(),
        ));
        html.push_str("<p><button type=\"submit\">Predict</button></p>\n</form>\n");

        match &self.outcome {
            Some(Outcome::Prediction(formatted)) => html.push_str(&format!(
                "<p class=\"result\">Predicted justification: {}</p>\n",
                escape_html(formatted)
            )),
            Some(Outcome::Error(message)) => html.push_str(&format!(
                "<p class=\"result error\">Error in prediction: {}</p>\n",
                escape_html(message)
            )),
            None => {}
        }

        html.push_str("<h2>Data Visualization</h2>\n");
        html.push_str("<label for=\"chart\">Select a chart to display</label>\n");
        html.push_str("<select id=\"chart\">\n");
        for kind in ChartKind::ALL {
            html.push_str(&format!(
                "<option value=\"{}\">{}</option>\n",
                kind.slug(),
                escape_html(kind.label())
            ));
        }
        html.push_str("</select>\n<div id=\"view\"></div>\n");

        html.push_str("<script>\n");
        html.push_str(
            "document.getElementById('demographics_question').addEventListener('change', e => {\n\
             \x20 window.location = '/?demographics_question=' + encodeURIComponent(e.target.value);\n\
             });\n",
        );
        html.push_str(
            "const chart = document.getElementById('chart');\n\
             function draw() {\n\
             \x20 fetch('/api/v1/charts/' + chart.value)\n\
             \x20   .then(r => r.json())\n\
             \x20   .then(spec => vegaEmbed('#view', spec, {actions: false}));\n\
             }\n\
             chart.addEventListener('change', draw);\n\
             draw();\n",
        );
        html.push_str("</script>\n</body>\n</html>\n");
        html
    }
}

/// Vega-Lite spec for one chart view.
pub fn chart_spec(kind: ChartKind, data: &ChartData) -> Value {
    match data {
        ChartData::Histogram(bins) => json!({
            "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
            "title": kind.label(),
            "width": 600,
            "data": { "values": bins },
            "mark": "bar",
            "encoding": {
                "x": {
                    "field": "start",
                    "bin": { "binned": true },
                    "type": "quantitative",
                    "title": "Value"
                },
                "x2": { "field": "end" },
                "y": { "field": "count", "type": "quantitative", "title": "Count" }
            }
        }),
        ChartData::Means { column, rows } => json!({
            "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
            "title": kind.label(),
            "width": 600,
            "data": { "values": rows },
            "mark": "bar",
            "encoding": {
                "x": {
                    "field": "group",
                    "type": "nominal",
                    "sort": "-y",
                    "title": column.header(),
                    "axis": { "labelAngle": -45 }
                },
                "y": { "field": "mean", "type": "quantitative", "title": "Average Value" },
                "tooltip": [
                    { "field": "group", "type": "nominal", "title": column.header() },
                    { "field": "mean", "type": "quantitative", "format": ".2f" },
                    { "field": "count", "type": "quantitative" }
                ]
            }
        }),
    }
}
