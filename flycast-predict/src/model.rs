use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// The feature schema is a versioned contract between offline training and
/// this crate. Changing the training feature set requires regenerating the
/// artifact; an artifact with a different schema must be rejected, never
/// coerced.
pub const FEATURE_SCHEMA: [&str; 5] = [
    "origin_encoded",
    "destination_encoded",
    "airline_encoded",
    "hour",
    "weekday",
];

pub const NUM_FEATURES: usize = FEATURE_SCHEMA.len();

/// Artifact bundled with the crate so a fresh checkout predicts without any
/// configuration. Trained offline against the same schema.
const DEFAULT_ARTIFACT: &str = include_str!("../model/default_model.json");

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("model artifact unavailable: {0}")]
    ModelUnavailable(String),
    /// A stale model/schema pairing. Fatal: indicates the artifact was not
    /// regenerated after a training change.
    #[error("model feature schema mismatch: expected {expected:?}, artifact has {found:?}")]
    FeatureSchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Label-encoder tables exported by training: category value -> index.
/// Values absent from a table encode to 0, matching training-side handling
/// of unseen categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEncoders {
    pub airline: HashMap<String, i64>,
    pub origin: HashMap<String, i64>,
    pub destination: HashMap<String, i64>,
}

/// A serialized linear regression over the fixed feature schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayModel {
    pub schema_version: u32,
    pub feature_names: Vec<String>,
    pub encoders: CategoryEncoders,
    pub weights: Vec<f64>,
    pub intercept: f64,
    /// Mean absolute error on the held-out split, carried for display.
    #[serde(default)]
    pub mae: Option<f64>,
}

impl DelayModel {
    /// Load and validate an artifact from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PredictError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PredictError::ModelUnavailable(format!("{}: {e}", path.display())))?;
        let model = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            schema_version = model.schema_version,
            "model artifact loaded"
        );
        Ok(model)
    }

    /// The embedded zero-configuration artifact.
    pub fn embedded_default() -> Result<Self, PredictError> {
        Self::from_json_str(DEFAULT_ARTIFACT)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, PredictError> {
        let model: Self = serde_json::from_str(raw)
            .map_err(|e| PredictError::ModelUnavailable(format!("undecodable artifact: {e}")))?;
        model.validate()
    }

    fn validate(self) -> Result<Self, PredictError> {
        let schema_ok = self.feature_names.len() == NUM_FEATURES
            && self
                .feature_names
                .iter()
                .zip(FEATURE_SCHEMA.iter())
                .all(|(have, want)| have == want);

        if !schema_ok || self.weights.len() != NUM_FEATURES {
            return Err(PredictError::FeatureSchemaMismatch {
                expected: FEATURE_SCHEMA.iter().map(|s| s.to_string()).collect(),
                found: self.feature_names,
            });
        }
        Ok(self)
    }
}
