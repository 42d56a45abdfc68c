use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use vawg::{
    build_embedder, AppConfig, AppContext, Dataset, EmbeddingConfig, TreeEnsemble,
};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn server_config() -> ServerConfig {
    ServerConfig {
        dataset_path: Some(data_dir().join("sample_survey.csv")),
        model_path: Some(data_dir().join("sample_model.json")),
        ..ServerConfig::default()
    }
}

fn app() -> Router {
    let state = ServerState::new(server_config()).expect("fixtures load");
    build_router(Arc::new(state))
}

/// A router whose embedder produces 700 dimensions, so every prediction
/// fails the model's schema check.
fn short_embedding_app() -> Router {
    let config = server_config();
    let app_config: AppConfig = config.app_config().unwrap();
    let dataset = Arc::new(Dataset::load(&app_config.dataset.path).unwrap());
    let model = Arc::new(TreeEnsemble::load(&app_config.model.path).unwrap());
    let embedder = build_embedder(&EmbeddingConfig {
        dim: 700,
        ..EmbeddingConfig::default()
    })
    .unwrap();
    let ctx = AppContext::new(app_config, dataset, embedder, model);
    build_router(Arc::new(ServerState::with_context(config, Arc::new(ctx))))
}

fn kenya() -> Value {
    json!({
        "country": "Kenya",
        "gender": "Female",
        "demographics_question": "Age",
        "demographics_response": "15-19",
        "question": "Wife is unfaithful",
        "survey_year": 2014
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: Router, uri: &str, payload: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn health_and_readiness() {
    let (status, body) = get_json(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get_json(app(), "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["dataset"]["records"], 37);
    assert_eq!(body["components"]["model"]["columns"], 773);
    assert_eq!(body["components"]["embedding"]["model"], "simulated-xxh3-wyrand-v1");
}

#[tokio::test]
async fn predict_returns_formatted_value() {
    let (status, body) = post_json(app(), "/api/v1/predict", &kenya()).await;
    assert_eq!(status, StatusCode::OK);

    let value = body["prediction"].as_f64().unwrap();
    assert!(value.is_finite());
    assert_eq!(body["formatted"], format!("{value:.2}%"));
    assert!(!body["request_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn predict_reports_caller_request_id() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-request-id", "survey-7")
        .body(Body::from(kenya().to_string()))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "survey-7");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["request_id"], "survey-7");
}

#[tokio::test]
async fn unknown_country_is_bad_request() {
    let mut payload = kenya();
    payload["country"] = json!("Atlantis");

    let (status, body) = post_json(app(), "/api/v1/predict", &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_SELECTION");
}

#[tokio::test]
async fn schema_mismatch_is_unprocessable() {
    let app = short_embedding_app();

    let (status, body) = post_json(app.clone(), "/api/v1/predict", &kenya()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "PREDICTION_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("expected 773 columns, got 705"));

    // The server keeps answering after a failed prediction.
    let (status, _) = get_json(app, "/api/v1/options").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn options_and_filtered_responses() {
    let (status, body) = get_json(app(), "/api/v1/options").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["genders"], json!(["Female", "Male"]));
    assert_eq!(body["survey_years"], json!([2012, 2014, 2016]));

    let (status, body) = get_json(app(), "/api/v1/responses?question=Age").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responses"], json!(["15-19", "20-24", "25-34"]));

    let (_, body) = get_json(app(), "/api/v1/responses?question=Religion").await;
    assert_eq!(body["responses"], json!([]));
}

#[tokio::test]
async fn chart_specs() {
    for kind in ["distribution", "gender", "demographics-question", "top-countries"] {
        let (status, body) = get_json(app(), &format!("/api/v1/charts/{kind}")).await;
        assert_eq!(status, StatusCode::OK, "chart {kind}");
        assert_eq!(body["mark"], "bar");
        assert!(body["data"]["values"].as_array().is_some_and(|v| !v.is_empty()));
    }

    let (status, body) = get_json(app(), "/api/v1/charts/pie").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, body) = get_json(app(), "/api/v1/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn form_page_filters_responses() {
    let request = Request::builder()
        .uri("/?demographics_question=Residence")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("<option value=\"Urban\">Urban</option>"));
    assert!(!html.contains("<option value=\"15-19\">"));
    assert!(html.contains("<option value=\"Residence\" selected>Residence</option>"));
    assert!(!html.contains("<option value=\"Age\" selected>"));
    assert!(html.contains("/api/v1/charts/"));
}

#[tokio::test]
async fn filtered_form_submits_a_consistent_pair() {
    // What the browser posts after picking Residence and reloading.
    let form = "country=Kenya&gender=Female&demographics_question=Residence\
                &demographics_response=Urban&question=Wife+is+unfaithful&survey_year=2014";
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Predicted justification: "));
    assert!(html.contains("<option value=\"Residence\" selected>Residence</option>"));
    assert!(html.contains("<option value=\"Urban\" selected>Urban</option>"));
}

#[tokio::test]
async fn form_submit_renders_prediction() {
    let form = "country=Kenya&gender=Female&demographics_question=Age\
                &demographics_response=15-19&question=Wife+is+unfaithful&survey_year=2014";
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Predicted justification: "));
    assert!(html.contains("<option value=\"Kenya\" selected>Kenya</option>"));
}

#[tokio::test]
async fn form_submit_renders_error() {
    let form = "country=Kenya&gender=Female&demographics_question=Age\
                &demographics_response=15-19&question=Wife+is+unfaithful&survey_year=soon";
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Error in prediction: Bad request: invalid survey year"));
    assert!(html.contains("<option value=\"Kenya\" selected>Kenya</option>"));
    assert!(html.contains("<option value=\"Female\" selected>Female</option>"));
    assert!(html.contains("<option value=\"15-19\" selected>15-19</option>"));
    assert!(html.contains("<option value=\"Wife is unfaithful\" selected>"));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[test]
fn missing_dataset_fails_state_construction() {
    let config = ServerConfig {
        dataset_path: Some(data_dir().join("missing.csv")),
        ..server_config()
    };
    let err = ServerState::new(config).err().expect("startup must fail");
    assert_eq!(err.error_code(), "STARTUP_ERROR");
}
