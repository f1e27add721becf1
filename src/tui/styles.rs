//! Teal/slate palette for the prediction screens.
//!
//! Outcome colors are fixed per state: emerald for unlikely, rose for likely,
//! amber for the gauge's borderline band.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::Outcome;

/// Gauge probabilities at or above this are drawn as borderline.
const BORDERLINE_FROM: f64 = 0.3;

/// Medical theme color palette.
pub struct MedicalTheme;

impl MedicalTheme {
    /// Teal accent for focus and key hints
    pub const ACCENT: Color = Color::Rgb(45, 212, 191); // #2DD4BF

    /// Focused border
    pub const ACCENT_DARK: Color = Color::Rgb(13, 148, 136); // #0D9488

    /// Idle border
    pub const BORDER: Color = Color::Rgb(148, 163, 184); // #94A3B8

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    /// Label 0
    pub const UNLIKELY: Color = Color::Rgb(16, 185, 129); // #10B981

    /// Gauge band between the two outcomes
    pub const BORDERLINE: Color = Color::Rgb(251, 191, 36); // #FBBF24

    /// Label 1, also used for errors
    pub const LIKELY: Color = Color::Rgb(244, 63, 94); // #F43F5E

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    /// Error messages and failure panels
    #[must_use]
    pub fn error() -> Style {
        Style::default().fg(Self::LIKELY)
    }

    /// Focused field label
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Text cursor in numeric fields
    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::ACCENT_DARK)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Headline style for a prediction outcome
    #[must_use]
    pub fn outcome(outcome: Outcome) -> Style {
        let color = match outcome {
            Outcome::Unlikely => Self::UNLIKELY,
            Outcome::Likely => Self::LIKELY,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Gauge color for a positive-class probability.
    ///
    /// Above 0.5 the gauge takes the likely color, matching the label.
    #[must_use]
    pub fn probability_gauge(probability: f64) -> Style {
        let color = if probability > 0.5 {
            Self::LIKELY
        } else if probability >= BORDERLINE_FROM {
            Self::BORDERLINE
        } else {
            Self::UNLIKELY
        };
        Style::default().fg(color)
    }
}
