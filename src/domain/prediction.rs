//! Prediction result types.
//!
//! Represents the output of the diabetes classifier for one submission.

use serde::{Deserialize, Serialize};

/// Presentation outcome derived from the predicted label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Label 1
    Likely,
    /// Label 0
    Unlikely,
}

impl Outcome {
    #[must_use]
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Self::Likely
        } else {
            Self::Unlikely
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Likely => write!(f, "Likely"),
            Self::Unlikely => write!(f, "Unlikely"),
        }
    }
}

/// Raw classifier output for a single row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class (0 = no diabetes, 1 = diabetes)
    pub label: u8,

    /// Probability mass on the positive class (0.0 to 1.0)
    pub probability: f64,
}

impl Prediction {
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        Outcome::from_label(self.label)
    }

    /// User-facing sentence, probability to two decimals.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "{} to have diabetes (Probability: {:.2})",
            self.outcome(),
            self.probability
        )
    }
}

/// A prediction stamped with the time it was produced.
///
/// Lives only as long as the result screen shows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub prediction: Prediction,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    #[must_use]
    pub fn new(prediction: Prediction) -> Self {
        Self {
            prediction,
            created_at: chrono::Utc::now(),
        }
    }
}
