use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::predictor::types::PropertyFeatures;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Fitted preprocessing step: one structured row in, feature vector out
pub trait FeatureTransform: Send + Sync {
    fn transform(&self, record: &PropertyFeatures) -> Result<Vec<f64>, ModelError>;
}

/// Trained regressor predicting `ln(1 + price)`
pub trait RegressionModel: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError>;
}

/// Transform and model, loaded once and shared read-only by every request
#[derive(Clone)]
pub struct ModelArtifacts {
    pub transform: Arc<dyn FeatureTransform>,
    pub model: Arc<dyn RegressionModel>,
}

impl ModelArtifacts {
    pub fn new(
        transform: impl FeatureTransform + 'static,
        model: impl RegressionModel + 'static,
    ) -> Self {
        Self {
            transform: Arc::new(transform),
            model: Arc::new(model),
        }
    }

    /// Load the JSON artifacts named in `config`.
    pub async fn load(config: &ModelConfig) -> Result<Self, ModelError> {
        let preprocessor: Preprocessor = read_artifact(&config.preprocessor_path).await?;
        preprocessor.validate()?;
        let model: ModelArtifact = read_artifact(&config.model_path).await?;
        model.validate()?;

        if let Some(expected) = model.n_features() {
            let produced = preprocessor.output_width();
            if expected != produced {
                return Err(ModelError::FeatureCount {
                    expected,
                    actual: produced,
                });
            }
        }

        info!(
            "Loaded preprocessor ({} features) and {} model",
            preprocessor.output_width(),
            model.kind()
        );
        Ok(Self::new(preprocessor, model))
    }
}

async fn read_artifact<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ModelError> {
    let path = path.as_ref();
    let load_error = |reason: String| ModelError::Load {
        path: path.display().to_string(),
        reason,
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| load_error(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| load_error(e.to_string()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Reject categories not seen during fitting
    #[default]
    Error,
    /// Encode unseen categories as all zeros
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotColumn {
    pub column: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledColumn {
    pub column: String,
    pub mean: f64,
    pub scale: f64,
}

/// Column transformer: one-hot blocks for categorical columns, then
/// standardized numeric columns, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub categorical: Vec<OneHotColumn>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
    pub numeric: Vec<ScaledColumn>,
}

impl Preprocessor {
    pub fn output_width(&self) -> usize {
        self.categorical
            .iter()
            .map(|c| c.categories.len())
            .sum::<usize>()
            + self.numeric.len()
    }

    fn validate(&self) -> Result<(), ModelError> {
        let probe = PropertyFeatures::default();
        for column in &self.categorical {
            if probe.categorical(&column.column).is_none() {
                return Err(ModelError::Invalid(format!(
                    "'{}' is not a categorical column",
                    column.column
                )));
            }
        }
        for column in &self.numeric {
            if probe.numeric(&column.column).is_none() {
                return Err(ModelError::Invalid(format!(
                    "'{}' is not a numeric column",
                    column.column
                )));
            }
            if column.scale == 0.0 || !column.scale.is_finite() {
                return Err(ModelError::Invalid(format!(
                    "scale for '{}' must be finite and non-zero",
                    column.column
                )));
            }
        }
        Ok(())
    }
}

impl FeatureTransform for Preprocessor {
    fn transform(&self, record: &PropertyFeatures) -> Result<Vec<f64>, ModelError> {
        let mut features = Vec::with_capacity(self.output_width());

        for encoder in &self.categorical {
            let value = record.categorical(&encoder.column).ok_or_else(|| {
                ModelError::Invalid(format!("unknown column '{}'", encoder.column))
            })?;
            let position = encoder.categories.iter().position(|c| c == value);
            if position.is_none() && self.handle_unknown == HandleUnknown::Error {
                return Err(ModelError::UnknownCategory {
                    column: encoder.column.clone(),
                    value: value.to_string(),
                });
            }
            features.extend(
                (0..encoder.categories.len()).map(|idx| f64::from(Some(idx) == position)),
            );
        }

        for scaler in &self.numeric {
            let value = record.numeric(&scaler.column).ok_or_else(|| {
                ModelError::Invalid(format!("unknown column '{}'", scaler.column))
            })?;
            features.push((value - scaler.mean) / scaler.scale);
        }

        Ok(features)
    }
}

/// One regression tree in flattened node-array form
///
/// Node `i` is a leaf when `children_left[i] < 0`; otherwise samples with
/// `x[feature[i]] <= threshold[i]` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    fn validate(&self) -> Result<(), ModelError> {
        let nodes = self.children_left.len();
        if nodes == 0 {
            return Err(ModelError::Invalid("tree has no nodes".to_string()));
        }
        let lengths = [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ];
        if lengths.iter().any(|len| *len != nodes) {
            return Err(ModelError::Invalid("tree arrays differ in length".to_string()));
        }
        let in_range = |child: i64| child < 0 || (child as usize) < nodes;
        if !self.children_left.iter().all(|c| in_range(*c))
            || !self.children_right.iter().all(|c| in_range(*c))
        {
            return Err(ModelError::Invalid("tree child index out of range".to_string()));
        }
        let half_split = self
            .children_left
            .iter()
            .zip(&self.children_right)
            .position(|(left, right)| (*left < 0) != (*right < 0));
        if let Some(node) = half_split {
            return Err(ModelError::Invalid(format!(
                "tree node {} has only one child",
                node
            )));
        }
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        let broken = |node: usize| ModelError::Invalid(format!("tree node {} is malformed", node));
        let mut node = 0usize;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.children_left.len() {
            let left = *self.children_left.get(node).ok_or_else(|| broken(node))?;
            if left < 0 {
                return self.value.get(node).copied().ok_or_else(|| broken(node));
            }
            let split = *self.feature.get(node).ok_or_else(|| broken(node))?;
            let feature = usize::try_from(split)
                .ok()
                .and_then(|idx| features.get(idx))
                .ok_or_else(|| ModelError::Invalid(format!("split on missing feature {}", split)))?;
            let threshold = *self.threshold.get(node).ok_or_else(|| broken(node))?;
            let next = if *feature <= threshold {
                left
            } else {
                *self.children_right.get(node).ok_or_else(|| broken(node))?
            };
            node = usize::try_from(next).map_err(|_| broken(node))?;
        }
        Err(ModelError::Invalid("tree traversal did not reach a leaf".to_string()))
    }
}

/// Serialized regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// Mean of the tree outputs
    RandomForest {
        n_features: usize,
        trees: Vec<RegressionTree>,
    },
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::RandomForest { .. } => "random_forest",
            ModelArtifact::Linear { .. } => "linear",
        }
    }

    pub fn n_features(&self) -> Option<usize> {
        match self {
            ModelArtifact::RandomForest { n_features, .. } => Some(*n_features),
            ModelArtifact::Linear { coefficients, .. } => Some(coefficients.len()),
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        match self {
            ModelArtifact::RandomForest { trees, .. } => {
                if trees.is_empty() {
                    return Err(ModelError::Invalid("forest has no trees".to_string()));
                }
                trees.iter().try_for_each(RegressionTree::validate)
            }
            ModelArtifact::Linear { coefficients, .. } => {
                if coefficients.is_empty() {
                    return Err(ModelError::Invalid("linear model has no coefficients".to_string()));
                }
                Ok(())
            }
        }
    }
}

impl RegressionModel for ModelArtifact {
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        if let Some(expected) = self.n_features() {
            if features.len() != expected {
                return Err(ModelError::FeatureCount {
                    expected,
                    actual: features.len(),
                });
            }
        }

        match self {
            ModelArtifact::RandomForest { trees, .. } => {
                let total = trees
                    .iter()
                    .map(|tree| tree.predict(features))
                    .sum::<Result<f64, ModelError>>()?;
                Ok(total / trees.len() as f64)
            }
            ModelArtifact::Linear {
                coefficients,
                intercept,
            } => Ok(coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
                + intercept),
        }
    }
}
