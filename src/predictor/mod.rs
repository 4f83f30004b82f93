pub mod artifacts;
pub mod service;
pub mod types;

pub use artifacts::{
    FeatureTransform, HandleUnknown, ModelArtifact, ModelArtifacts, Preprocessor, RegressionModel,
    RegressionTree,
};
pub use service::PredictorService;
pub use types::{PredictionRequest, PredictionResult, PropertyFeatures};
