use crate::predictor::types::format_size;
use crate::predictor::PredictionResult;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub prediction: f64,
    pub currency: &'static str,
    pub input_details: InputDetails,
}

#[derive(Debug, Serialize)]
pub struct InputDetails {
    pub property_type: String,
    pub township: String,
    pub bedrooms: i64,
    pub property_size: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<PredictionResult> for PredictResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            success: true,
            prediction: result.predicted_price,
            currency: result.currency,
            input_details: InputDetails {
                property_size: format_size(result.input.property_size),
                property_type: result.input.property_type,
                township: result.input.township,
                bedrooms: result.input.bedrooms,
            },
        }
    }
}
