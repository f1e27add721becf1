//! Prediction service: Orchestrates one encode → infer pass.
//!
//! This service coordinates:
//! - Schema validation against the encoder (once, at construction)
//! - Feature encoding of a form submission
//! - Label and positive-class probability from the loaded classifier

use std::sync::Arc;

use crate::domain::{
    check_schema, encode, Assessment, EncodedFeatureRecord, ModelSchema, Prediction, RawInput,
};
use crate::ports::{Classifier, InferenceError};
use crate::GlycocheckError;

/// Run the classifier on one aligned record.
///
/// Both capabilities see the same single row.
///
/// # Errors
/// Propagates any `InferenceError` raised by the model.
pub fn infer(
    record: &EncodedFeatureRecord,
    model: &dyn Classifier,
) -> Result<Prediction, InferenceError> {
    let label = model.predict(record)?;
    let probability = model.predict_proba(record)?;
    Ok(Prediction { label, probability })
}

/// Service for running diabetes risk predictions.
///
/// Holds a read-only handle to the loaded model; cloning the service shares
/// the same model.
#[derive(Clone)]
pub struct PredictionService {
    model: Arc<dyn Classifier>,
    schema: ModelSchema,
}

impl PredictionService {
    /// Create a service, validating the model schema against the encoder.
    ///
    /// Columns the encoder can never produce are zero-filled on every
    /// request. With `strict_schema` they abort construction instead.
    ///
    /// # Errors
    /// Returns `GlycocheckError::SchemaMismatch` in strict mode when the
    /// model expects unproducible columns.
    pub fn new(model: Arc<dyn Classifier>, strict_schema: bool) -> Result<Self, GlycocheckError> {
        let schema = model.schema().clone();
        let report = check_schema(&schema);

        if !report.unproducible.is_empty() {
            if strict_schema {
                return Err(GlycocheckError::SchemaMismatch(report.unproducible));
            }
            tracing::warn!(
                "Model expects {} column(s) the encoder never produces; they will be zero-filled: {:?}",
                report.unproducible.len(),
                report.unproducible
            );
        }
        if !report.unused.is_empty() {
            tracing::debug!("Encoded features ignored by the model: {:?}", report.unused);
        }

        tracing::info!("Prediction service ready ({} model columns)", schema.len());
        Ok(Self { model, schema })
    }

    #[must_use]
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// Encode a submission and run the classifier on it.
    ///
    /// # Errors
    /// Returns `GlycocheckError::Inference` if the model rejects the row.
    pub fn predict(&self, raw: &RawInput) -> Result<Assessment, GlycocheckError> {
        tracing::debug!("Encoding submission against {} columns", self.schema.len());
        let record = encode(raw, &self.schema);

        let prediction = infer(&record, self.model.as_ref())?;

        tracing::info!(
            "Prediction complete: label={}, probability={:.2}",
            prediction.label,
            prediction.probability
        );

        Ok(Assessment::new(prediction))
    }
}
