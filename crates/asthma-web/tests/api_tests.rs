//! 仪表盘 API 集成测试

use asthma_assessment::AssessmentEngine;
use asthma_model::{ModelArtifact, Predictor};
use asthma_storage::RecordStore;
use asthma_web::{build_router, Session};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

const MODEL_JSON: &str = r#"{
    "kind": "logistic_regression",
    "feature_names": [
        "Age", "BMI", "PhysicalActivity", "DietQuality", "SleepQuality",
        "PollutionExposure", "PollenExposure", "DustExposure", "LungFunctionFEV1",
        "LungFunctionFVC", "FEV1_FVC_Ratio", "SymptomScore", "Smoking", "PetAllergy",
        "FamilyHistoryAsthma", "HistoryOfAllergies", "Gender"
    ],
    "coefficients": [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 4, 2, 0, 0, 0],
    "intercept": -3
}"#;

struct TestApp {
    _dir: TempDir,
    record_file: PathBuf,
    export_file: PathBuf,
    router: Router,
}

fn setup_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let record_file = dir.path().join("records.csv");
    let export_file = dir.path().join("export.xlsx");

    let classifier = ModelArtifact::from_json(MODEL_JSON)
        .unwrap()
        .into_classifier()
        .unwrap();
    let engine = AssessmentEngine::new(Predictor::new(classifier).unwrap());
    let store = RecordStore::open(&record_file, engine.feature_names().to_vec()).unwrap();
    let session = Session::new(engine, store, &export_file).shared();

    TestApp {
        _dir: dir,
        record_file,
        export_file,
        router: build_router(session),
    }
}

fn patient(smoking: u8, pet_allergy: u8) -> Value {
    json!({
        "patient_name": "Jane Roe",
        "doctor_note": "  night cough ",
        "age": 45, "bmi": 27.5, "physical_activity": 3, "diet_quality": 4,
        "sleep_quality": 6, "pollution_exposure": 7, "pollen_exposure": 8,
        "dust_exposure": 2, "fev1": 2.5, "fvc": 3.0, "symptom_score": 4,
        "smoking": smoking, "pet_allergy": pet_allergy,
        "family_history_asthma": 1, "history_of_allergies": 0
    })
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app();
    let (status, body) = send(&app, empty_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["records"], 0);
}

#[tokio::test]
async fn test_dashboard_page() {
    let app = setup_app();
    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Asthma Risk Prediction Dashboard"));
    assert!(html.contains("name=\"history_of_allergies\""));
}

#[tokio::test]
async fn test_model_features_endpoint() {
    let app = setup_app();
    let (status, body) = send(&app, empty_request("GET", "/api/v1/model")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features"].as_array().unwrap().len(), 17);
    assert_eq!(body["features"][16], "Gender");
}

#[tokio::test]
async fn test_assessment_is_recorded() {
    let app = setup_app();
    let (status, body) = send(&app, json_request("POST", "/api/v1/assessments", &patient(1, 1))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["label"], 1);
    let record = &body["record"];
    assert_eq!(record["patient_name"], "Jane Roe");
    assert_eq!(record["prediction"], "Asthma Detected");
    assert_eq!(record["risk_percent"], 95.26);
    assert_eq!(record["risk_level"], "High Risk");
    assert_eq!(record["age_group"], "Adult");
    assert_eq!(record["top_risks"], "PollenExposure, PollutionExposure, SymptomScore");
    assert_eq!(record["action"], "Refer to pulmonologist urgently.");
    assert_eq!(record["doctor_note"], "night cough");

    let contents = std::fs::read_to_string(&app.record_file).unwrap();
    let mut lines = contents.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("PatientName,Age,BMI,"));
    assert!(header.contains("FEV1_FVC_Ratio"));
    assert!(header.ends_with("Gender,Prediction,RiskPercent,RiskLevel,AgeGroup,TopRisks,Action,DoctorNote"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("Jane Roe,45,27.5,"));
    assert!(row.contains(",0.833,"));
}

#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let app = setup_app();
    let mut body = patient(0, 0);
    body["bmi"] = json!(60.0);

    let (status, response) = send(&app, json_request("POST", "/api/v1/assessments", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], true);
    assert!(!app.record_file.exists());
}

#[tokio::test]
async fn test_unparseable_body_is_validation_error() {
    let app = setup_app();

    let mut negative_age = patient(0, 0);
    negative_age["age"] = json!(-1);
    let mut large_flag = patient(0, 0);
    large_flag["smoking"] = json!(300);
    let mut missing_field = patient(0, 0);
    missing_field
        .as_object_mut()
        .unwrap()
        .remove("physical_activity");

    for body in [negative_age, large_flag, missing_field] {
        let (status, response) =
            send(&app, json_request("POST", "/api/v1/assessments", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], true);
        assert_eq!(response["status"], 400);
        assert!(response["message"].as_str().unwrap().contains("Failed to deserialize"));
    }
    assert!(!app.record_file.exists());
}

#[tokio::test]
async fn test_unknown_risk_level_filter_is_rejected() {
    let app = setup_app();
    let (status, response) =
        send(&app, empty_request("GET", "/api/v1/records?risk_level=Severe")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], true);
}

#[tokio::test]
async fn test_history_filtering() {
    let app = setup_app();
    send(&app, json_request("POST", "/api/v1/assessments", &patient(1, 1))).await;

    let mut low = patient(0, 0);
    low["patient_name"] = json!("Bob Smith");
    send(&app, json_request("POST", "/api/v1/assessments", &low)).await;

    let (status, all) = send(&app, empty_request("GET", "/api/v1/records")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["total"], 2);
    assert_eq!(all["records"][1]["risk_level"], "Low Risk");
    assert_eq!(all["records"][1]["prediction"], "No Asthma");

    let (_, high) = send(&app, empty_request("GET", "/api/v1/records?risk_level=High%20Risk")).await;
    assert_eq!(high["total"], 1);
    assert_eq!(high["records"][0]["patient_name"], "Jane Roe");

    let (_, by_name) = send(&app, empty_request("GET", "/api/v1/records?patient_name=bob")).await;
    assert_eq!(by_name["total"], 1);
}

#[tokio::test]
async fn test_export_and_download() {
    let app = setup_app();

    // 空库也能导出（只有表头）
    let (status, body) = send(&app, empty_request("POST", "/api/v1/records/export")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], 0);
    assert!(app.export_file.exists());

    send(&app, json_request("POST", "/api/v1/assessments", &patient(1, 0))).await;
    let (_, body) = send(&app, empty_request("POST", "/api/v1/records/export")).await;
    assert_eq!(body["rows"], 1);

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/records/export"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn test_clear_records() {
    let app = setup_app();
    send(&app, json_request("POST", "/api/v1/assessments", &patient(0, 1))).await;
    assert!(app.record_file.exists());

    let (status, body) = send(&app, empty_request("DELETE", "/api/v1/records")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared"], 1);
    assert!(!app.record_file.exists());

    let (_, all) = send(&app, empty_request("GET", "/api/v1/records")).await;
    assert_eq!(all["total"], 0);
}
