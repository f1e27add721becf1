//! Raw form inputs for diabetes risk prediction.
//!
//! The eight fields collected by the entry form, with the categorical ones
//! modelled as closed enums so every label has exactly one numeric code.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors produced while turning form labels into typed inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("Unrecognized {field} category: {value:?}")]
    UnrecognizedCategory { field: &'static str, value: String },
}

/// Biological sex as recorded in the training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Numeric code used by the trained model.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Male => 0,
            Self::Female => 1,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Self-reported smoking history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmokingHistory {
    Never,
    Former,
    Current,
    NotCurrent,
    NoInfo,
}

impl SmokingHistory {
    pub const ALL: [SmokingHistory; 5] = [
        SmokingHistory::Never,
        SmokingHistory::Former,
        SmokingHistory::Current,
        SmokingHistory::NotCurrent,
        SmokingHistory::NoInfo,
    ];

    /// Numeric code used by the trained model.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Never => 0,
            Self::Former => 1,
            Self::Current => 2,
            Self::NotCurrent => 3,
            Self::NoInfo => 4,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Never => "Never",
            Self::Former => "Former",
            Self::Current => "Current",
            Self::NotCurrent => "Not Current",
            Self::NoInfo => "No Info",
        }
    }
}

/// Binary condition flag (hypertension, heart disease).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YesNo {
    No,
    Yes,
}

impl YesNo {
    pub const ALL: [YesNo; 2] = [YesNo::No, YesNo::Yes];

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::No => 0,
            Self::Yes => 1,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::No => "No",
            Self::Yes => "Yes",
        }
    }
}

macro_rules! impl_category_text {
    ($ty:ident, $field:literal) => {
        impl FromStr for $ty {
            type Err = EncodingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|c| c.label() == s)
                    .ok_or_else(|| EncodingError::UnrecognizedCategory {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

impl_category_text!(Gender, "gender");
impl_category_text!(SmokingHistory, "smoking_history");
impl_category_text!(YesNo, "yes/no");

/// One submission of the entry form.
///
/// Owned by the single request that produced it; never shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub gender: Gender,
    /// Age in whole years (form domain 1-120)
    pub age: u32,
    /// Body mass index (form domain 10.0-60.0)
    pub bmi: f64,
    pub smoking_history: SmokingHistory,
    pub hypertension: YesNo,
    pub heart_disease: YesNo,
    /// Glycated haemoglobin in % (form domain 3.0-15.0)
    pub hba1c: f64,
    /// Blood glucose in mg/dL (form domain 50-500)
    pub glucose: u32,
}

/// Inclusive form domains.
pub const AGE_RANGE: (u32, u32) = (1, 120);
pub const BMI_RANGE: (f64, f64) = (10.0, 60.0);
pub const HBA1C_RANGE: (f64, f64) = (3.0, 15.0);
pub const GLUCOSE_RANGE: (u32, u32) = (50, 500);

impl RawInput {
    /// Build an input from the label strings a form would submit.
    ///
    /// # Errors
    /// Returns `EncodingError::UnrecognizedCategory` if any categorical label
    /// is outside its enumeration.
    #[allow(clippy::too_many_arguments)]
    pub fn from_labels(
        gender: &str,
        age: u32,
        bmi: f64,
        smoking_history: &str,
        hypertension: &str,
        heart_disease: &str,
        hba1c: f64,
        glucose: u32,
    ) -> Result<Self, EncodingError> {
        Ok(Self {
            gender: gender.parse()?,
            age,
            bmi,
            smoking_history: smoking_history.parse()?,
            hypertension: hypertension.parse()?,
            heart_disease: heart_disease.parse()?,
            hba1c,
            glucose,
        })
    }

    /// Check the numeric fields against the form domains.
    ///
    /// The encoder accepts any value; this is the widget-level guard.
    ///
    /// # Errors
    /// Returns every violated domain as a message.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(AGE_RANGE.0..=AGE_RANGE.1).contains(&self.age) {
            errors.push(format!(
                "Age {} out of range [{}, {}]",
                self.age, AGE_RANGE.0, AGE_RANGE.1
            ));
        }
        if !(BMI_RANGE.0..=BMI_RANGE.1).contains(&self.bmi) {
            errors.push(format!(
                "BMI {} out of range [{}, {}]",
                self.bmi, BMI_RANGE.0, BMI_RANGE.1
            ));
        }
        if !(HBA1C_RANGE.0..=HBA1C_RANGE.1).contains(&self.hba1c) {
            errors.push(format!(
                "HbA1c {} out of range [{}, {}]",
                self.hba1c, HBA1C_RANGE.0, HBA1C_RANGE.1
            ));
        }
        if !(GLUCOSE_RANGE.0..=GLUCOSE_RANGE.1).contains(&self.glucose) {
            errors.push(format!(
                "Blood glucose {} out of range [{}, {}]",
                self.glucose, GLUCOSE_RANGE.0, GLUCOSE_RANGE.1
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawInput {
        RawInput {
            gender: Gender::Male,
            age: 45,
            bmi: 27.5,
            smoking_history: SmokingHistory::Never,
            hypertension: YesNo::No,
            heart_disease: YesNo::No,
            hba1c: 5.8,
            glucose: 110,
        }
    }

    #[test]
    fn test_category_codes() {
        assert_eq!(Gender::Male.code(), 0);
        assert_eq!(Gender::Female.code(), 1);

        assert_eq!(SmokingHistory::Never.code(), 0);
        assert_eq!(SmokingHistory::Former.code(), 1);
        assert_eq!(SmokingHistory::Current.code(), 2);
        assert_eq!(SmokingHistory::NotCurrent.code(), 3);
        assert_eq!(SmokingHistory::NoInfo.code(), 4);

        assert_eq!(YesNo::No.code(), 0);
        assert_eq!(YesNo::Yes.code(), 1);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(
            "Not Current".parse::<SmokingHistory>().unwrap(),
            SmokingHistory::NotCurrent
        );
        assert_eq!(
            "No Info".parse::<SmokingHistory>().unwrap(),
            SmokingHistory::NoInfo
        );
        assert_eq!("Yes".parse::<YesNo>().unwrap(), YesNo::Yes);
    }

    #[test]
    fn test_unrecognized_category() {
        let err = "Sometimes".parse::<SmokingHistory>().unwrap_err();
        assert_eq!(
            err,
            EncodingError::UnrecognizedCategory {
                field: "smoking_history",
                value: "Sometimes".to_string(),
            }
        );

        // Labels are case-sensitive, matching the form's fixed options.
        assert!("male".parse::<Gender>().is_err());

        let err = RawInput::from_labels("Male", 45, 27.5, "Never", "Maybe", "No", 5.8, 110)
            .unwrap_err();
        assert!(matches!(err, EncodingError::UnrecognizedCategory { .. }));
    }

    #[test]
    fn test_from_labels() {
        let raw = RawInput::from_labels("Male", 45, 27.5, "Never", "No", "No", 5.8, 110)
            .expect("Should parse");
        assert_eq!(raw, sample());
    }

    #[test]
    fn test_validation() {
        assert!(sample().validate().is_ok());

        let invalid = RawInput {
            age: 0,
            bmi: 70.0,
            glucose: 20,
            ..sample()
        };
        let errors = invalid.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_display_matches_label() {
        assert_eq!(SmokingHistory::NotCurrent.to_string(), "Not Current");
        assert_eq!(YesNo::No.to_string(), "No");
    }
}
