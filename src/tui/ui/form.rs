//! Prediction input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    Gender, RawInput, SmokingHistory, YesNo, AGE_RANGE, BMI_RANGE, GLUCOSE_RANGE, HBA1C_RANGE,
};
use crate::tui::styles::MedicalTheme;

/// What a form field accepts.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Fixed set of labels, cycled with ←/→
    Choice {
        options: Vec<&'static str>,
        selected: usize,
    },
    /// Typed number within `[min, max]`
    Number {
        value: String,
        min: f64,
        max: f64,
        integer: bool,
    },
}

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
    pub kind: FieldKind,
}

impl FormField {
    fn choice(label: &'static str, options: Vec<&'static str>) -> Self {
        Self {
            label,
            hint: "←/→ to change",
            kind: FieldKind::Choice {
                options,
                selected: 0,
            },
        }
    }

    fn number(label: &'static str, hint: &'static str, min: f64, max: f64, integer: bool) -> Self {
        Self {
            label,
            hint,
            kind: FieldKind::Number {
                value: format_min(min, integer),
                min,
                max,
                integer,
            },
        }
    }

    /// Text currently shown for this field.
    #[must_use]
    pub fn display(&self) -> &str {
        match &self.kind {
            FieldKind::Choice { options, selected } => options[*selected],
            FieldKind::Number { value, .. } => value.as_str(),
        }
    }

    fn reset(&mut self) {
        match &mut self.kind {
            FieldKind::Choice { selected, .. } => *selected = 0,
            FieldKind::Number {
                value,
                min,
                integer,
                ..
            } => {
                value.zeroize();
                *value = format_min(*min, *integer);
            }
        }
    }

    fn set(&mut self, text: &str) {
        match &mut self.kind {
            FieldKind::Choice { options, selected } => {
                if let Some(i) = options.iter().position(|o| *o == text) {
                    *selected = i;
                }
            }
            FieldKind::Number { value, .. } => {
                value.zeroize();
                value.push_str(text);
            }
        }
    }

    fn parse_number(&self) -> Result<f64, String> {
        let FieldKind::Number {
            value,
            min,
            max,
            integer,
        } = &self.kind
        else {
            return Err(format!("{}: Not a numeric field", self.label));
        };

        let parsed: f64 = if *integer {
            value
                .parse::<u32>()
                .map(f64::from)
                .map_err(|_| format!("{}: Must be a whole number", self.label))?
        } else {
            value
                .parse()
                .map_err(|_| format!("{}: Invalid number", self.label))?
        };

        if parsed < *min || parsed > *max {
            return Err(format!(
                "{}: Value must be between {} and {}",
                self.label, min, max
            ));
        }
        Ok(parsed)
    }
}

// Numeric fields start at their lower bound.
fn format_min(min: f64, integer: bool) -> String {
    if integer {
        format!("{min:.0}")
    } else {
        format!("{min:.1}")
    }
}

/// Form state
pub struct FormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

const GENDER: usize = 0;
const AGE: usize = 1;
const BMI: usize = 2;
const SMOKING: usize = 3;
const HYPERTENSION: usize = 4;
const HEART_DISEASE: usize = 5;
const HBA1C: usize = 6;
const GLUCOSE: usize = 7;

impl Default for FormState {
    fn default() -> Self {
        let yes_no: Vec<&'static str> = YesNo::ALL.iter().map(|v| v.label()).collect();
        Self {
            fields: vec![
                FormField::choice("Gender", Gender::ALL.iter().map(|g| g.label()).collect()),
                FormField::number(
                    "Age",
                    "years (1-120)",
                    f64::from(AGE_RANGE.0),
                    f64::from(AGE_RANGE.1),
                    true,
                ),
                FormField::number("BMI", "kg/m² (10.0-60.0)", BMI_RANGE.0, BMI_RANGE.1, false),
                FormField::choice(
                    "Smoking History",
                    SmokingHistory::ALL.iter().map(|s| s.label()).collect(),
                ),
                FormField::choice("Hypertension", yes_no.clone()),
                FormField::choice("Heart Disease", yes_no),
                FormField::number("HbA1c Level", "% (3.0-15.0)", HBA1C_RANGE.0, HBA1C_RANGE.1, false),
                FormField::number(
                    "Blood Glucose Level",
                    "mg/dL (50-500)",
                    f64::from(GLUCOSE_RANGE.0),
                    f64::from(GLUCOSE_RANGE.1),
                    true,
                ),
            ],
            selected_field: 0,
            error_message: None,
        }
    }
}

impl FormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Cycle a choice field forward (`step = 1`) or backward (`step = -1`).
    pub fn cycle_choice(&mut self, step: isize) {
        if let FieldKind::Choice { options, selected } =
            &mut self.fields[self.selected_field].kind
        {
            let n = options.len() as isize;
            *selected = (*selected as isize + step).rem_euclid(n) as usize;
            self.error_message = None;
        }
    }

    /// Add a character to the current numeric field
    pub fn input_char(&mut self, c: char) {
        if let FieldKind::Number { value, integer, .. } = &mut self.fields[self.selected_field].kind
        {
            let accepted = c.is_ascii_digit() || (c == '.' && !*integer && !value.contains('.'));
            if accepted {
                value.push(c);
                self.error_message = None;
            }
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        if let FieldKind::Number { value, .. } = &mut self.fields[self.selected_field].kind {
            value.pop();
        }
    }

    /// Restore the current field to its default
    pub fn clear_field(&mut self) {
        self.fields[self.selected_field].reset();
    }

    /// Wipe all field buffers and restore defaults.
    ///
    /// Called right after a submission so inputs do not linger in UI state.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            field.reset();
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    /// Validate and convert to a `RawInput`
    pub fn to_raw_input(&self) -> Result<RawInput, String> {
        let age = self.fields[AGE].parse_number()?;
        let bmi = self.fields[BMI].parse_number()?;
        let hba1c = self.fields[HBA1C].parse_number()?;
        let glucose = self.fields[GLUCOSE].parse_number()?;

        let raw = RawInput::from_labels(
            self.fields[GENDER].display(),
            age as u32,
            bmi,
            self.fields[SMOKING].display(),
            self.fields[HYPERTENSION].display(),
            self.fields[HEART_DISEASE].display(),
            hba1c,
            glucose as u32,
        )
        .map_err(|e| e.to_string())?;

        raw.validate().map_err(|errors| errors.join(", "))?;
        Ok(raw)
    }

    /// Load sample data for a quick check
    pub fn load_sample_data(&mut self) {
        let sample = [
            "Male", "45", "27.5", "Never", "No", "No", "5.8", "110",
        ];
        for (field, value) in self.fields.iter_mut().zip(sample) {
            field.set(value);
        }
        self.error_message = None;
    }
}

/// Render the input form
pub fn render_form(f: &mut Frame, area: Rect, state: &FormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Diabetes Prediction", MedicalTheme::title()),
        Span::styled(" │ Patient Attributes", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &FormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;

    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (MedicalTheme::border_focused(), MedicalTheme::focused())
        } else {
            (MedicalTheme::border(), MedicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut spans = vec![Span::raw(" ")];
        match &field.kind {
            FieldKind::Choice { .. } => {
                spans.push(Span::styled("‹ ", MedicalTheme::text_muted()));
                spans.push(Span::styled(field.display(), MedicalTheme::text()));
                spans.push(Span::styled(" ›", MedicalTheme::text_muted()));
            }
            FieldKind::Number { value, .. } if value.is_empty() => {
                spans.push(Span::styled(field.hint, MedicalTheme::text_muted()));
            }
            FieldKind::Number { value, .. } => {
                spans.push(Span::styled(value.as_str(), MedicalTheme::text()));
            }
        }
        if is_selected {
            spans.push(Span::styled("▌", MedicalTheme::cursor()));
            if matches!(field.kind, FieldKind::Number { .. }) {
                spans.push(Span::styled(format!("  {}", field.hint), MedicalTheme::text_muted()));
            }
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &FormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::error()),
            Span::styled(err.clone(), MedicalTheme::error()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Choose ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Predict ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Sample Data ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_widget_minimums() {
        let state = FormState::default();
        let shown: Vec<&str> = state.fields.iter().map(FormField::display).collect();
        assert_eq!(
            shown,
            vec!["Male", "1", "10.0", "Never", "No", "No", "3.0", "50"]
        );

        let raw = state.to_raw_input().expect("defaults are valid");
        assert_eq!(raw.age, 1);
        assert_eq!(raw.glucose, 50);
    }

    #[test]
    fn test_sample_data_round_trips() {
        let mut state = FormState::default();
        state.load_sample_data();
        let raw = state.to_raw_input().expect("valid sample");
        assert_eq!(raw.gender, Gender::Male);
        assert_eq!(raw.age, 45);
        assert_eq!(raw.bmi, 27.5);
        assert_eq!(raw.glucose, 110);
    }

    #[test]
    fn test_cycle_choice_wraps() {
        let mut state = FormState::default();
        state.selected_field = SMOKING;
        state.cycle_choice(-1);
        assert_eq!(state.fields[SMOKING].display(), "No Info");
        state.cycle_choice(1);
        state.cycle_choice(1);
        assert_eq!(state.fields[SMOKING].display(), "Former");

        // No effect on numeric fields.
        state.selected_field = AGE;
        state.cycle_choice(1);
        assert_eq!(state.fields[AGE].display(), "1");
    }

    #[test]
    fn test_numeric_input_rules() {
        let mut state = FormState::default();
        state.selected_field = AGE;
        state.clear_field();
        state.delete_char();
        state.input_char('4');
        state.input_char('.');
        state.input_char('x');
        state.input_char('5');
        assert_eq!(state.fields[AGE].display(), "45");

        state.selected_field = BMI;
        state.delete_char();
        state.delete_char();
        state.delete_char();
        state.delete_char();
        for c in "27.5.1".chars() {
            state.input_char(c);
        }
        assert_eq!(state.fields[BMI].display(), "27.51");
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut state = FormState::default();
        state.fields[GLUCOSE].set("700");
        let err = state.to_raw_input().unwrap_err();
        assert!(err.contains("Blood Glucose Level"));

        let mut state = FormState::default();
        state.fields[AGE].set("");
        assert!(state.to_raw_input().is_err());
    }

    #[test]
    fn test_clear_sensitive_resets() {
        let mut state = FormState::default();
        state.load_sample_data();
        state.selected_field = 5;
        state.error_message = Some("x".into());
        state.clear_sensitive();

        assert_eq!(state.selected_field, 0);
        assert!(state.error_message.is_none());
        assert_eq!(state.fields[AGE].display(), "1");
        assert_eq!(state.fields[GENDER].display(), "Male");
    }
}
