//! Model adapter: Implementation of `Classifier` over an exported
//! logistic-regression artifact.
//!
//! The artifact is a JSON file produced by the training pipeline:
//!
//! ```json
//! {
//!   "model_type": "logistic_regression",
//!   "feature_names_in": ["gender", "age", "..."],
//!   "coefficients": [0.13, 0.9, "..."],
//!   "intercept": -5.2,
//!   "scaler": { "mean": ["..."], "scale": ["..."] }
//! }
//! ```
//!
//! `scaler` is optional; when present each input is standardized as
//! `(x - mean) / scale` before the dot product.
//!
//! # Integrity
//!
//! If the model directory carries `manifest.json` + `model.sig`, the
//! signature is verified and the artifact must be bound by the manifest.
//! With `require_signed` set, unsigned directories are refused.

pub mod manifest;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::domain::{EncodedFeatureRecord, ModelSchema};
use crate::ports::{Classifier, InferenceError};

use self::manifest::SignatureState;

/// Artifact file name inside the model directory.
pub const MODEL_FILE_NAME: &str = "diabetes_model.json";

const SUPPORTED_MODEL_TYPE: &str = "logistic_regression";

/// Errors raised while loading or verifying a model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model artifact not found at {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read model artifact {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model artifact: {0}")]
    Invalid(String),

    #[error("Model signature check failed: {0}")]
    Signature(String),
}

/// Standardization parameters fitted alongside the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Model parameters exported by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedLogisticModel {
    pub model_type: String,
    pub feature_names_in: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

impl ExportedLogisticModel {
    fn validate(&self) -> Result<(), ModelError> {
        if self.model_type != SUPPORTED_MODEL_TYPE {
            return Err(ModelError::Invalid(format!(
                "Unsupported model_type {:?} (expected {SUPPORTED_MODEL_TYPE:?})",
                self.model_type
            )));
        }

        let n = self.feature_names_in.len();
        if n == 0 {
            return Err(ModelError::Invalid("feature_names_in is empty".into()));
        }

        let mut seen = HashSet::with_capacity(n);
        for name in &self.feature_names_in {
            if !seen.insert(name.as_str()) {
                return Err(ModelError::Invalid(format!(
                    "Duplicate feature name {name:?}"
                )));
            }
        }

        if self.coefficients.len() != n {
            return Err(ModelError::Invalid(format!(
                "coefficients has {} entries, feature_names_in has {n}",
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Invalid("Non-finite model parameter".into()));
        }

        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != n || scaler.scale.len() != n {
                return Err(ModelError::Invalid(
                    "Scaler parameter lengths do not match feature_names_in length".into(),
                ));
            }
            if scaler.mean.iter().any(|m| !m.is_finite())
                || scaler.scale.iter().any(|s| !s.is_finite() || *s == 0.0)
            {
                return Err(ModelError::Invalid(
                    "Scaler parameters must be finite with non-zero scale".into(),
                ));
            }
        }

        Ok(())
    }
}

/// How to treat artifact signatures at load time.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Refuse model directories without `manifest.json` + `model.sig`
    pub require_signed: bool,
    /// Key used to verify signed directories
    pub verifying_key: Option<VerifyingKey>,
}

impl LoadOptions {
    /// Resolve options from settings, reading the verifying key if configured.
    ///
    /// # Errors
    /// Returns `ModelError::Signature` if the key file cannot be read.
    pub fn from_settings(settings: &Settings) -> Result<Self, ModelError> {
        let verifying_key = settings
            .model_pubkey_file
            .as_deref()
            .map(manifest::read_verifying_key)
            .transpose()?;
        Ok(Self {
            require_signed: settings.require_signed_model,
            verifying_key,
        })
    }
}

/// A loaded logistic-regression classifier.
///
/// Immutable after load; share it through `Arc`.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    schema: ModelSchema,
    params: ExportedLogisticModel,
}

impl LogisticModel {
    /// Build a classifier from already-parsed parameters.
    ///
    /// # Errors
    /// Returns `ModelError::Invalid` if the parameters are inconsistent.
    pub fn from_exported(params: ExportedLogisticModel) -> Result<Self, ModelError> {
        params.validate()?;
        Ok(Self {
            schema: ModelSchema::new(params.feature_names_in.iter().cloned()),
            params,
        })
    }

    /// Load the artifact from a model directory (or a direct file path).
    ///
    /// # Errors
    /// Returns `ModelError` if the file is missing, malformed, or fails
    /// signature checks.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self, ModelError> {
        let (dir, model_path) = if path.is_file() {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            (dir.to_path_buf(), path.to_path_buf())
        } else {
            (path.to_path_buf(), path.join(MODEL_FILE_NAME))
        };

        if !model_path.exists() {
            return Err(ModelError::NotFound(model_path));
        }

        // Read once: the bytes checked against the manifest are the bytes parsed.
        let bytes = std::fs::read(&model_path).map_err(|source| ModelError::Io {
            path: model_path.clone(),
            source,
        })?;

        Self::check_signature(&dir, &model_path, &bytes, options)?;

        let params: ExportedLogisticModel = serde_json::from_slice(&bytes)
            .map_err(|e| ModelError::Invalid(e.to_string()))?;
        let model = Self::from_exported(params)?;

        tracing::info!(
            "Loaded model from {:?} (n_features={}, scaled={})",
            model_path,
            model.schema.len(),
            model.params.scaler.is_some()
        );

        Ok(model)
    }

    fn check_signature(
        dir: &Path,
        model_path: &Path,
        bytes: &[u8],
        options: &LoadOptions,
    ) -> Result<(), ModelError> {
        match manifest::signature_state(dir) {
            SignatureState::Partial => {
                tracing::error!("Incomplete model signature in {:?}", dir);
                return Err(ModelError::Signature(
                    "Model directory has only one of manifest.json/model.sig".into(),
                ));
            }
            SignatureState::Unsigned => {
                if options.require_signed {
                    tracing::error!("Model signature not found in {:?}", dir);
                    return Err(ModelError::Signature(
                        "Signed model required but manifest.json/model.sig are missing".into(),
                    ));
                }
                if options.verifying_key.is_some() {
                    return Err(ModelError::Signature(
                        "A verifying key is configured but the model directory is unsigned"
                            .into(),
                    ));
                }
                tracing::warn!("Loading UNSIGNED model from {:?}", model_path);
                return Ok(());
            }
            SignatureState::Signed => {}
        }

        let key = options.verifying_key.as_ref().ok_or_else(|| {
            ModelError::Signature(
                "Model directory is signed but no verifying key is configured".into(),
            )
        })?;
        let manifest = manifest::verify_manifest(dir, key)?;

        let file_name = model_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        manifest.check_file(file_name, bytes)
    }

    /// Raw parameters, as exported.
    #[must_use]
    pub fn params(&self) -> &ExportedLogisticModel {
        &self.params
    }

    fn check_row<'r>(&self, record: &'r EncodedFeatureRecord) -> Result<&'r [f64], InferenceError> {
        if record.names() != self.schema.columns() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.schema.columns().to_vec(),
                actual: record.names().to_vec(),
            });
        }
        if let Some((name, value)) = record.iter().find(|(_, v)| !v.is_finite()) {
            return Err(InferenceError::NonFiniteFeature {
                name: name.to_string(),
                value,
            });
        }
        Ok(record.values())
    }

    /// Log-odds of the positive class.
    fn decision_function(&self, values: &[f64]) -> f64 {
        let p = &self.params;
        let dot: f64 = match &p.scaler {
            Some(s) => values
                .iter()
                .zip(&p.coefficients)
                .zip(s.mean.iter().zip(&s.scale))
                .map(|((x, c), (m, sd))| c * (x - m) / sd)
                .sum(),
            None => values.iter().zip(&p.coefficients).map(|(x, c)| c * x).sum(),
        };
        p.intercept + dot
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticModel {
    fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    fn predict(&self, record: &EncodedFeatureRecord) -> Result<u8, InferenceError> {
        let values = self.check_row(record)?;
        Ok(u8::from(self.decision_function(values) > 0.0))
    }

    fn predict_proba(&self, record: &EncodedFeatureRecord) -> Result<f64, InferenceError> {
        let values = self.check_row(record)?;
        let p = sigmoid(self.decision_function(values));
        if !(0.0..=1.0).contains(&p) {
            return Err(InferenceError::InvalidProbability(p));
        }
        Ok(p)
    }
}
