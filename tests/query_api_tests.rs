//! Integration tests for the query endpoints

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::util::ServiceExt;

use edutrack::api::http::create_router;
use edutrack::api::websocket::{AppState, Broadcaster, RandomTelemetry};
use edutrack::{BroadcastConfig, Dataset, Record, WeightedRiskScorer};

fn app_with(dataset: Dataset) -> Router {
    let broadcaster = Arc::new(Broadcaster::new(
        BroadcastConfig::default(),
        Arc::new(RandomTelemetry),
    ));
    let state = Arc::new(AppState::new(
        Arc::new(dataset),
        Arc::new(WeightedRiskScorer::default()),
        broadcaster,
    ));
    create_router(state)
}

fn app() -> Router {
    app_with(Dataset::demo())
}

async fn call(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    call(app, Method::GET, uri).await
}

#[tokio::test]
async fn test_home_banner() {
    let (status, body) = get(&app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "EduTrack AI Pro API");
    assert_eq!(body["status"], "running");
}

#[tokio::test]
async fn test_health_reports_live_updates() {
    let (status, body) = get(&app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["live_updates"]["state"], "running");
    assert_eq!(body["live_updates"]["subscribers"], 0);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_list_students() {
    let (status, body) = get(&app(), "/api/students").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    assert_eq!(body["students"].as_array().unwrap().len(), 5);
    assert_eq!(body["students"][0]["class"], "Form 4");
    assert_eq!(body["summary"]["top_performer"], "Jane Smith");
    assert_eq!(body["summary"]["needs_attention"], "Sarah Williams");
}

#[tokio::test]
async fn test_class_analytics_mean_of_group() {
    let (status, body) = get(&app(), "/api/analytics/class/Form%203").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["class"], "Form 3");
    assert_eq!(body["student_count"], 2);
    assert_eq!(body["average_score"], 71.5);
    assert_eq!(body["average_attendance"], 75.0);
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_class_analytics_single_member_group() {
    let (status, body) = get(&app(), "/api/analytics/class/Form%202").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student_count"], 1);
    assert_eq!(body["average_score"], 88.0);
    assert_eq!(body["average_attendance"], 90.0);
}

#[tokio::test]
async fn test_class_analytics_unknown_class() {
    let (status, body) = get(&app(), "/api/analytics/class/Form%201").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "Class not found");
}

#[tokio::test]
async fn test_analyze_student() {
    let (status, body) = get(&app(), "/api/ai/analyze/4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student_info"]["name"], "Sarah Williams");

    let risk = &body["dropout_risk_analysis"];
    let score = risk["risk_score"].as_f64().unwrap();
    assert!((0.1..=0.9).contains(&score));
    assert_eq!(risk["risk_level"], "Medium");
    assert_eq!(risk["confidence"], 0.85);

    let performance = &body["performance_analysis"];
    assert_eq!(performance["current_average"], 65);
    assert_eq!(performance["trend"], "declining");
    assert_eq!(performance["predicted_next_term"], 62.5);
}

#[tokio::test]
async fn test_analyze_missing_student() {
    let (status, body) = get(&app(), "/api/ai/analyze/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Student not found");
}

#[tokio::test]
async fn test_analyze_out_of_range_ids_are_not_found() {
    let app = app();
    for uri in ["/api/ai/analyze/-1", "/api/ai/analyze/99999999999"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Student not found");
    }
}

#[tokio::test]
async fn test_analyze_non_integer_id_is_bad_request() {
    let (status, body) = get(&app(), "/api/ai/analyze/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["message"], "Invalid student id: abc");
}

#[tokio::test]
async fn test_predict_batch() {
    let (status, body) = call(&app(), Method::POST, "/api/ai/predict-batch").await;
    assert_eq!(status, StatusCode::OK);

    let predictions = body["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 5);
    assert_eq!(predictions[2]["student_name"], "Mike Johnson");

    let summary = &body["summary"];
    let total = summary["high_risk"].as_u64().unwrap()
        + summary["medium_risk"].as_u64().unwrap()
        + summary["low_risk"].as_u64().unwrap();
    assert_eq!(total, 5);
    assert_eq!(summary["medium_risk"], 2);
}

#[tokio::test]
async fn test_dashboard_counts_predictions() {
    let app = app();

    let (_, before) = get(&app, "/api/dashboard/stats").await;
    assert_eq!(before["total_students"], 5);
    assert_eq!(before["average_score"], 81.6);
    assert_eq!(before["average_attendance"], 85.4);
    assert_eq!(before["at_risk_students"], 1);
    assert_eq!(before["ai_predictions_made"], 0);

    call(&app, Method::POST, "/api/ai/predict-batch").await;
    get(&app, "/api/ai/analyze/1").await;

    let (_, after) = get(&app, "/api/dashboard/stats").await;
    assert_eq!(after["ai_predictions_made"], 6);
}

#[tokio::test]
async fn test_custom_dataset() {
    let app = app_with(Dataset::new(vec![
        Record::new(10, "Ada", "Form 1", 60, 50),
        Record::new(11, "Grace", "Form 1", 90, 100),
    ]));

    let (status, body) = get(&app, "/api/analytics/class/Form%201").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average_score"], 75.0);
    assert_eq!(body["average_attendance"], 75.0);

    let (status, _) = get(&app, "/api/analytics/class/Form%204").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
