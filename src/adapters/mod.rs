//! Adapters layer: Concrete implementations of ports.
//!
//! - `model`: logistic-regression artifact loader implementing `Classifier`
//! - `sanitize`: redaction of clinical values and secrets in log output

pub mod model;
pub mod sanitize;

pub use model::{LoadOptions, LogisticModel, ModelError};
