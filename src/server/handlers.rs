use super::types::{ErrorResponse, HealthResponse, PredictResponse};
use crate::config::ServerConfig;
use crate::error::PredictionError;
use crate::predictor::{PredictionRequest, PredictorService};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, warn};

#[derive(Clone)]
pub struct AppState {
    pub predictor: PredictorService,
    pub service_name: Arc<str>,
    /// Answer invalid input with 500 instead of 400
    pub legacy_error_status: bool,
}

impl AppState {
    pub fn new(predictor: PredictorService, server: &ServerConfig) -> Self {
        Self {
            predictor,
            service_name: Arc::from(server.service_name.as_str()),
            legacy_error_status: server.legacy_error_status,
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.predictor.is_ready();
    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "unhealthy" },
        model_loaded,
        service: state.service_name.to_string(),
    })
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    let outcome = match payload {
        Ok(Json(request)) => state.predictor.predict(&request),
        Err(rejection) => Err(PredictionError::InvalidInput(rejection.body_text())),
    };

    match outcome {
        Ok(result) => Ok(Json(result.into())),
        Err(e) => {
            let message = match &e {
                PredictionError::ServiceUnavailable => {
                    warn!("Prediction requested while model is not loaded");
                    "Model not loaded"
                }
                PredictionError::InvalidInput(reason) => {
                    warn!("❌ Invalid prediction input: {}", reason);
                    "Prediction failed. Please check your input."
                }
                PredictionError::PredictionFailed(cause) => {
                    error!("❌ Prediction error: {}", cause);
                    "Prediction failed. Please check your input."
                }
            };
            Err((
                status_for(&e, state.legacy_error_status),
                Json(ErrorResponse {
                    error: message.to_string(),
                }),
            ))
        }
    }
}

fn status_for(error: &PredictionError, legacy_error_status: bool) -> StatusCode {
    match error {
        PredictionError::InvalidInput(_) if !legacy_error_status => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
