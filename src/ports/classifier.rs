//! Classifier port: Trait for binary risk models.
//!
//! This trait abstracts the loaded model artifact from the application logic,
//! so the inference adapter can run against the real model or a test stub.

use crate::domain::{EncodedFeatureRecord, ModelSchema};

/// Errors raised when a model rejects a feature row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("Feature row does not match model schema: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Feature {name} has non-finite value {value}")]
    NonFiniteFeature { name: String, value: f64 },

    #[error("Model produced an invalid probability: {0}")]
    InvalidProbability(f64),
}

/// Trait for a trained binary classifier.
///
/// Implementations are read-only after construction and may be shared
/// between threads without locking.
pub trait Classifier: Send + Sync {
    /// Ordered input columns the model was trained on.
    fn schema(&self) -> &ModelSchema;

    /// Predict the class label (0 or 1) for a single row.
    ///
    /// # Errors
    /// Returns `InferenceError` if the row's shape or values are rejected.
    fn predict(&self, record: &EncodedFeatureRecord) -> Result<u8, InferenceError>;

    /// Probability of the positive class (index 1) for a single row.
    ///
    /// # Errors
    /// Returns `InferenceError` if the row's shape or values are rejected.
    fn predict_proba(&self, record: &EncodedFeatureRecord) -> Result<f64, InferenceError>;
}
