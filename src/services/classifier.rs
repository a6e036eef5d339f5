//! Logistic pass/fail classifier over precomputed parameters.
//!
//! Parameters come from a training export (`model.json`): per-feature
//! standardization constants plus logistic-regression weights. They are
//! loaded once at startup and shared immutably across requests.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_MODEL_PATH: &str = "model.json";

#[derive(Debug, Clone, Deserialize)]
pub struct ModelParams {
    pub feature_order: Vec<String>,
    pub scaler_mean: Vec<f64>,
    pub scaler_scale: Vec<f64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model file not found at {0}")]
    NotFound(String),
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse model file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid model parameters: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub predicted: u8,
    pub probability: f64,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    params: ModelParams,
}

impl Classifier {
    pub fn from_env() -> Result<Self, ModelError> {
        let path =
            std::env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string());
        Self::from_file(Path::new(&path))
    }

    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)?;
        let params: ModelParams = serde_json::from_str(&raw)?;
        Self::new(params)
    }

    /// Validates the parameter arrays up front so a malformed export fails
    /// loudly instead of leaking NaN into every prediction.
    pub fn new(params: ModelParams) -> Result<Self, ModelError> {
        let n = params.feature_order.len();
        if n == 0 {
            return Err(ModelError::Invalid("feature_order is empty".into()));
        }
        for (name, len) in [
            ("scaler_mean", params.scaler_mean.len()),
            ("scaler_scale", params.scaler_scale.len()),
            ("coefficients", params.coefficients.len()),
        ] {
            if len != n {
                return Err(ModelError::Invalid(format!(
                    "{name} has length {len}, expected {n}"
                )));
            }
        }
        for (name, values) in [
            ("scaler_mean", &params.scaler_mean),
            ("scaler_scale", &params.scaler_scale),
            ("coefficients", &params.coefficients),
        ] {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ModelError::Invalid(format!("{name} contains a non-finite value")));
            }
        }
        if !params.intercept.is_finite() {
            return Err(ModelError::Invalid("intercept is not finite".into()));
        }
        if params.scaler_scale.iter().any(|v| *v == 0.0) {
            return Err(ModelError::Invalid("scaler_scale contains a zero".into()));
        }

        Ok(Self { params })
    }

    /// Missing features default to 0 before standardization.
    pub fn predict(&self, input: &HashMap<String, f64>) -> Prediction {
        let mut z = self.params.intercept;
        for (i, name) in self.params.feature_order.iter().enumerate() {
            let raw = input.get(name).copied().unwrap_or(0.0);
            let scaled = (raw - self.params.scaler_mean[i]) / self.params.scaler_scale[i];
            z += scaled * self.params.coefficients[i];
        }

        let probability = sigmoid(z);
        Prediction {
            predicted: if probability >= 0.5 { 1 } else { 0 },
            probability,
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
