//! Feature encoder: raw form inputs to a schema-aligned feature row.
//!
//! Encoding is a pure function of the input and the model schema:
//! 1. categorical labels become fixed integer codes
//! 2. interaction terms are plain products
//! 3. age is binned into (0,30], (30,50], (50,70], (70,100]
//! 4. BMI category flags are evaluated independently
//! 5. the assembled row is zero-filled and projected onto the schema

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::patient::RawInput;

/// Columns the encoder knows how to produce, in assembly order.
pub const PRODUCED_FEATURES: [&str; 16] = [
    "gender",
    "age",
    "hypertension",
    "heart_disease",
    "smoking_history",
    "bmi",
    "HbA1c_level",
    "blood_glucose_level",
    "age_bmi_interaction",
    "glucose_hba1c_interaction",
    "age_group_Adult",
    "age_group_Senior",
    "age_group_Elder",
    "bmi_category_Obese",
    "bmi_category_Overweight",
    "bmi_category_Underweight",
];

/// Age bucket produced by binning with right-inclusive edges `(0,30,50,70,100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    Young,
    Adult,
    Senior,
    Elder,
}

impl AgeGroup {
    /// Bin an age.
    ///
    /// Returns `None` outside `(0, 100]`; such ages get no indicator at all.
    #[must_use]
    pub fn from_age(age: f64) -> Option<Self> {
        match age {
            a if a > 0.0 && a <= 30.0 => Some(Self::Young),
            a if a > 30.0 && a <= 50.0 => Some(Self::Adult),
            a if a > 50.0 && a <= 70.0 => Some(Self::Senior),
            a if a > 70.0 && a <= 100.0 => Some(Self::Elder),
            _ => None,
        }
    }
}

/// BMI category flags.
///
/// Evaluated as three independent predicates on the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BmiFlags {
    pub obese: bool,
    pub overweight: bool,
    pub underweight: bool,
}

impl BmiFlags {
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        Self {
            obese: bmi >= 30.0,
            overweight: (25.0..30.0).contains(&bmi),
            underweight: bmi < 18.5,
        }
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Ordered list of feature columns a trained model expects.
///
/// Loaded once from the model artifact and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    columns: Arc<[String]>,
}

impl ModelSchema {
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// An ordered, named feature row.
///
/// After [`encode`] the names equal the schema's columns, in schema order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedFeatureRecord {
    names: Vec<String>,
    values: Vec<f64>,
}

impl EncodedFeatureRecord {
    fn with_capacity(n: usize) -> Self {
        Self {
            names: Vec::with_capacity(n),
            values: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, name: &str, value: f64) {
        self.names.push(name.to_string());
        self.values.push(value);
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named column, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Project this row onto `schema`.
    ///
    /// Columns the schema expects but the row lacks are filled with 0;
    /// columns the schema does not name are dropped. Idempotent.
    #[must_use]
    pub fn align(&self, schema: &ModelSchema) -> Self {
        let index: HashMap<&str, f64> = self.iter().collect();
        let mut out = Self::with_capacity(schema.len());
        for column in schema.columns() {
            let value = index.get(column.as_str()).copied().unwrap_or(0.0);
            out.push(column, value);
        }
        out
    }
}

/// Build the full, unaligned feature row from a raw input.
///
/// Column order follows [`PRODUCED_FEATURES`].
#[must_use]
pub fn assemble(raw: &RawInput) -> EncodedFeatureRecord {
    let age = f64::from(raw.age);
    let glucose = f64::from(raw.glucose);
    let age_group = AgeGroup::from_age(age);
    let bmi = BmiFlags::from_bmi(raw.bmi);

    let values = [
        f64::from(raw.gender.code()),
        age,
        f64::from(raw.hypertension.code()),
        f64::from(raw.heart_disease.code()),
        f64::from(raw.smoking_history.code()),
        raw.bmi,
        raw.hba1c,
        glucose,
        age * raw.bmi,
        glucose * raw.hba1c,
        flag(age_group == Some(AgeGroup::Adult)),
        flag(age_group == Some(AgeGroup::Senior)),
        flag(age_group == Some(AgeGroup::Elder)),
        flag(bmi.obese),
        flag(bmi.overweight),
        flag(bmi.underweight),
    ];

    let mut record = EncodedFeatureRecord::with_capacity(PRODUCED_FEATURES.len());
    for (name, value) in PRODUCED_FEATURES.iter().zip(values) {
        record.push(name, value);
    }
    record
}

/// Encode a raw input into a row shaped exactly like `schema`.
#[must_use]
pub fn encode(raw: &RawInput, schema: &ModelSchema) -> EncodedFeatureRecord {
    assemble(raw).align(schema)
}

/// Result of comparing a model schema against the encoder's output columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    /// Expected by the model, never produced (always zero-filled)
    pub unproducible: Vec<String>,
    /// Produced by the encoder, ignored by the model
    pub unused: Vec<String>,
}

impl SchemaReport {
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.unproducible.is_empty() && self.unused.is_empty()
    }
}

/// Compare `schema` with the encoder's producible columns.
#[must_use]
pub fn check_schema(schema: &ModelSchema) -> SchemaReport {
    let produced: HashSet<&str> = PRODUCED_FEATURES.iter().copied().collect();
    let expected: HashSet<&str> = schema.columns().iter().map(String::as_str).collect();

    SchemaReport {
        unproducible: schema
            .columns()
            .iter()
            .filter(|c| !produced.contains(c.as_str()))
            .cloned()
            .collect(),
        unused: PRODUCED_FEATURES
            .iter()
            .filter(|c| !expected.contains(*c))
            .map(|c| (*c).to_string())
            .collect(),
    }
}
