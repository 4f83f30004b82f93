use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    Router,
};
use estate_scout::config::ServerConfig;
use estate_scout::predictor::{ModelArtifacts, PredictorService};
use estate_scout::server::{handlers::AppState, router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

mod common;
use common::mocks::{FixedModel, FixedTransform};

const ALLOWED_ORIGIN: &str = "http://localhost:3000";

fn ready_service() -> PredictorService {
    let model = FixedModel {
        expected: vec![1.0, 0.0],
        log_price: 100_001f64.ln(),
    };
    PredictorService::new(ModelArtifacts::new(FixedTransform::new(vec![1.0, 0.0]), model))
}

fn create_test_app(predictor: PredictorService, server: ServerConfig) -> Router {
    let state = AppState::new(predictor, &server);
    router(state, &server.cors_origins).unwrap()
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_loaded_model() {
    let app = create_test_app(ready_service(), ServerConfig::default());
    let request = Request::get("/api/health").body(Body::empty()).unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "healthy",
            "model_loaded": true,
            "service": "Myanmar Real Estate Price Predictor"
        })
    );
}

#[tokio::test]
async fn health_reports_missing_model_on_every_call() {
    let app = create_test_app(PredictorService::unavailable(), ServerConfig::default());

    for _ in 0..2 {
        let request = Request::get("/api/health").body(Body::empty()).unwrap();
        let (status, body) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["model_loaded"], false);
    }
}

#[tokio::test]
async fn predict_with_defaults() {
    let app = create_test_app(ready_service(), ServerConfig::default());

    let (status, body) = send(app, post_json("/api/predict", "{}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "prediction": 100000.0,
            "currency": "USD",
            "input_details": {
                "property_type": "Condo",
                "township": "Kamayut",
                "bedrooms": 3,
                "property_size": "2,000.0 sqft"
            }
        })
    );
}

#[tokio::test]
async fn invalid_input_is_a_client_error() {
    let app = create_test_app(ready_service(), ServerConfig::default());
    let body = json!({"bedrooms": "abc"}).to_string();

    let (status, body) = send(app, post_json("/api/predict", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Prediction failed. Please check your input."}));
}

#[tokio::test]
async fn legacy_mode_reports_invalid_input_as_500() {
    let server = ServerConfig {
        legacy_error_status: true,
        ..Default::default()
    };
    let app = create_test_app(ready_service(), server);
    let body = json!({"bedrooms": "abc"}).to_string();

    let (status, body) = send(app, post_json("/api/predict", body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_json_gets_an_error_body() {
    let app = create_test_app(ready_service(), ServerConfig::default());

    let (status, body) = send(app, post_json("/api/predict", "invalid json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn predict_without_model_is_a_server_error() {
    let app = create_test_app(PredictorService::unavailable(), ServerConfig::default());

    let (status, body) = send(app, post_json("/api/predict", "{}")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Model not loaded"}));
}

#[tokio::test]
async fn cors_allows_only_configured_origins() {
    let app = create_test_app(ready_service(), ServerConfig::default());

    let allowed = Request::get("/api/health")
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&HeaderValue::from_static(ALLOWED_ORIGIN))
    );

    let foreign = Request::get("/api/health")
        .header(header::ORIGIN, "https://elsewhere.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(foreign).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[test]
fn invalid_cors_origin_is_rejected() {
    let server = ServerConfig {
        cors_origins: vec!["http://bad\norigin".to_string()],
        ..Default::default()
    };
    let state = AppState::new(PredictorService::unavailable(), &server);
    assert!(router(state, &server.cors_origins).is_err());
}
