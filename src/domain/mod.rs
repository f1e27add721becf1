//! Domain layer: Core business types and logic.
//!
//! Pure Rust types with no I/O. The feature encoder lives here because it is
//! a deterministic function of the form inputs and the model schema.

pub mod features;
mod patient;
mod prediction;

pub use features::{
    assemble, check_schema, encode, AgeGroup, BmiFlags, EncodedFeatureRecord, ModelSchema,
    SchemaReport, PRODUCED_FEATURES,
};
pub use patient::{EncodingError, Gender, RawInput, SmokingHistory, YesNo};
pub use patient::{AGE_RANGE, BMI_RANGE, GLUCOSE_RANGE, HBA1C_RANGE};
pub use prediction::{Assessment, Outcome, Prediction};
