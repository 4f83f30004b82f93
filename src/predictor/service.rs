use crate::config::ModelConfig;
use crate::error::{ModelError, PredictionError};
use crate::predictor::artifacts::ModelArtifacts;
use crate::predictor::types::{round_cents, PredictionRequest, PredictionResult, CURRENCY};
use tracing::{error, info};

/// Prediction pipeline over artifacts loaded at startup
///
/// Without artifacts every prediction fails with `ServiceUnavailable`
/// until the process is restarted.
#[derive(Clone)]
pub struct PredictorService {
    artifacts: Option<ModelArtifacts>,
}

impl PredictorService {
    pub fn new(artifacts: ModelArtifacts) -> Self {
        Self {
            artifacts: Some(artifacts),
        }
    }

    pub fn unavailable() -> Self {
        Self { artifacts: None }
    }

    /// Load artifacts, degrading to the unavailable state on failure.
    pub async fn from_config(config: &ModelConfig) -> Self {
        match ModelArtifacts::load(config).await {
            Ok(artifacts) => {
                info!("✅ Model and preprocessor loaded successfully");
                Self::new(artifacts)
            }
            Err(e) => {
                error!("❌ Error loading model: {}", e);
                Self::unavailable()
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.artifacts.is_some()
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictionError> {
        let artifacts = self
            .artifacts
            .as_ref()
            .ok_or(PredictionError::ServiceUnavailable)?;

        let input = request.resolve()?;
        info!(
            "📊 Prediction request: {} in {}, {} bedrooms, {} sqft",
            input.property_type, input.township, input.bedrooms, input.property_size
        );

        let features = artifacts.transform.transform(&input)?;
        let log_price = artifacts.model.predict(&features)?;

        // Trained on ln(1 + price)
        let predicted_price = round_cents(log_price.exp_m1());
        if !predicted_price.is_finite() {
            return Err(ModelError::Invalid(format!(
                "model output {} does not map to a finite price",
                log_price
            ))
            .into());
        }
        info!("💰 Predicted price: ${:.2}", predicted_price);

        Ok(PredictionResult {
            predicted_price,
            currency: CURRENCY,
            input,
        })
    }
}
