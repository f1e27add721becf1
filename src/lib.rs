//! # glycocheck
//!
//! Terminal front-end for a pre-trained diabetes risk classifier.
//!
//! This crate provides:
//! - A deterministic feature encoder (categorical codes, interaction terms,
//!   age/BMI bins, schema alignment)
//! - An inference adapter over a loaded logistic-regression artifact
//! - Terminal UI for entering one patient at a time
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (RawInput, feature encoder, Prediction)
//! - `ports`: Trait definitions for external operations (Classifier)
//! - `adapters`: Concrete implementations (model artifact, log sanitizer)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{encode, EncodedFeatureRecord, ModelSchema, Prediction, RawInput};

/// Result type for glycocheck operations
pub type Result<T> = std::result::Result<T, GlycocheckError>;

/// Main error type for glycocheck
#[derive(Debug, thiserror::Error)]
pub enum GlycocheckError {
    #[error("Encoding failed: {0}")]
    Encoding(#[from] domain::EncodingError),

    #[error("Model expects columns the encoder cannot produce: {0:?}")]
    SchemaMismatch(Vec<String>),

    #[error("Inference failed: {0}")]
    Inference(#[from] ports::InferenceError),

    #[error("Model not loaded: {0}")]
    Model(#[from] adapters::ModelError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
