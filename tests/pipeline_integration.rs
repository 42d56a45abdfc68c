use std::path::PathBuf;

use vawg::{AppConfig, AppContext, ChartData, ChartKind, Column, Selection};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn sample_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.dataset.path = fixture("sample_survey.csv");
    cfg.model.path = fixture("sample_model.json");
    cfg
}

fn kenya_selection() -> Selection {
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
fn kenya_selection_yields_a_single_prediction() {
    let ctx = AppContext::load(sample_config()).expect("sample fixtures load");

    let prediction = ctx.predict(&kenya_selection()).expect("prediction succeeds");
    assert!(prediction.value.is_finite());
    assert!(
        (35.0..39.0).contains(&prediction.value),
        "unexpected prediction {}",
        prediction.value
    );
    assert!(prediction.formatted().ends_with('%'));
}

#[test]
fn sample_dataset_drops_null_values() {
    let ctx = AppContext::load(sample_config()).unwrap();
    let stats = ctx.dataset().stats();
    assert_eq!(stats.rows_read, 39);
    assert_eq!(stats.rows_dropped, 2);
    assert_eq!(ctx.dataset().len(), 37);
}

#[test]
fn options_are_sorted_and_filtered() {
    let ctx = AppContext::load(sample_config()).unwrap();
    let options = ctx.options();

    assert_eq!(
        options.countries,
        vec!["Egypt", "Ghana", "Haiti", "Kenya", "Nepal", "Peru"]
    );
    assert_eq!(options.genders, vec!["Female", "Male"]);
    assert_eq!(options.survey_years, vec![2012, 2014, 2016]);
    assert!(options.questions.contains(&"Wife is unfaithful".to_string()));

    assert_eq!(
        ctx.dataset().responses_for("Age"),
        vec!["15-19", "20-24", "25-34"]
    );
    assert!(ctx.dataset().responses_for("Religion").is_empty());
}

#[test]
fn feature_row_matches_model_schema() {
    let ctx = AppContext::load(sample_config()).unwrap();
    let row = ctx.assembler().assemble(&kenya_selection()).unwrap();

    assert_eq!(row.len(), 773);
    assert_eq!(ctx.predictor().schema().len(), 773);
    assert_eq!(&row.names()[..5], &vec![
        "Country".to_string(),
        "Gender".to_string(),
        "Demographics Question".to_string(),
        "Demographics Response".to_string(),
        "Survey Year".to_string(),
    ][..]);
    assert_eq!(row.names()[5], "embed_0");
    assert_eq!(row.names()[772], "embed_767");
}

#[test]
fn chart_views_cover_the_dataset() {
    let ctx = AppContext::load(sample_config()).unwrap();

    match ctx.chart(ChartKind::ValueDistribution) {
        ChartData::Histogram(bins) => {
            assert!(!bins.is_empty() && bins.len() <= 20);
            assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 37);
        }
        other => panic!("expected histogram, got {other:?}"),
    }

    match ctx.chart(ChartKind::TopCountries) {
        ChartData::Means { column, rows } => {
            assert_eq!(column, Column::Country);
            assert_eq!(rows.len(), 6);
            assert_eq!(rows[0].group, "Ghana");
            assert_eq!(rows[5].group, "Kenya");
        }
        other => panic!("expected means, got {other:?}"),
    }

    match ctx.chart(ChartKind::MeanByGender) {
        ChartData::Means { rows, .. } => {
            let groups: Vec<&str> = rows.iter().map(|r| r.group.as_str()).collect();
            assert_eq!(groups, vec!["Male", "Female"]);
        }
        other => panic!("expected means, got {other:?}"),
    }
}

#[test]
fn yaml_config_drives_the_context() {
    let yaml = format!(
        "version: \"1.0\"\ndataset:\n  path: \"{}\"\nmodel:\n  path: \"{}\"\ncharts:\n  top_n: 3\n",
        fixture("sample_survey.csv").display(),
        fixture("sample_model.json").display(),
    );
    let cfg = AppConfig::from_yaml(&yaml).unwrap();
    let ctx = AppContext::load(cfg).unwrap();

    match ctx.chart(ChartKind::TopCountries) {
        ChartData::Means { rows, .. } => assert_eq!(rows.len(), 3),
        other => panic!("expected means, got {other:?}"),
    }
}

#[test]
fn prediction_and_options_serialize_for_clients() {
    let ctx = AppContext::load(sample_config()).unwrap();

    let prediction = ctx.predict(&kenya_selection()).unwrap();
    let json = serde_json::to_value(prediction).unwrap();
    assert_eq!(json["value"].as_f64(), Some(prediction.value));

    let json = serde_json::to_value(ctx.options()).unwrap();
    assert_eq!(json["countries"].as_array().map(Vec::len), Some(6));
    assert_eq!(json["survey_years"], serde_json::json!([2012, 2014, 2016]));
    assert!(json["demographics_questions"]
        .as_array()
        .unwrap()
        .iter()
        .any(|q| q == "Age"));
}
