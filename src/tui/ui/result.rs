//! Prediction result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::{Assessment, Outcome};
use crate::tui::styles::MedicalTheme;

/// Result screen state
#[derive(Debug, Clone, Default)]
pub enum ResultState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Completed with result
    Complete { assessment: Assessment },
    /// Prediction failed
    Error { message: String },
}

/// Render the result view
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    match state {
        ResultState::Idle => render_idle(f, chunks[1]),
        ResultState::Complete { assessment } => render_assessment(f, chunks[1], assessment),
        ResultState::Error { message } => render_error(f, chunks[1], message),
    }
    render_result_footer(f, chunks[2], state);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Diabetes Prediction", MedicalTheme::title()),
        Span::styled(" │ Result", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No prediction yet",
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_assessment(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let block = Block::default()
        .title(Span::styled(" Prediction ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Outcome sentence
            Constraint::Length(4), // Probability
            Constraint::Length(2), // Timestamp
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let outcome = assessment.prediction.outcome();
    let style = MedicalTheme::outcome(outcome);
    let icon = match outcome {
        Outcome::Unlikely => "OK",
        Outcome::Likely => "!",
    };

    let headline = Paragraph::new(Line::from(Span::styled(
        format!("{icon} {}", assessment.prediction.message()),
        style,
    )))
    .alignment(Alignment::Center);
    f.render_widget(headline, chunks[0]);

    let probability = assessment.prediction.probability.clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Probability of diabetes ",
                    MedicalTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(MedicalTheme::probability_gauge(probability))
        .ratio(probability)
        .label(format!("{probability:.2}"));
    f.render_widget(gauge, chunks[1]);

    let stamp = Paragraph::new(Line::from(vec![
        Span::styled("Computed at ", MedicalTheme::text_muted()),
        Span::styled(
            assessment
                .created_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            MedicalTheme::text_secondary().add_modifier(Modifier::ITALIC),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(stamp, chunks[2]);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", MedicalTheme::error())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::error()),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect, state: &ResultState) {
    let content = match state {
        ResultState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Back to Form ", MedicalTheme::key_desc()),
            Span::styled("[Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
        _ => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("New Prediction ", MedicalTheme::key_desc()),
            Span::styled("[Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
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
    use crate::domain::Prediction;
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered_text(state: &ResultState) -> String {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|f| render_result(f, f.area(), state))
            .expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_renders_outcome_sentence() {
        let state = ResultState::Complete {
            assessment: Assessment::new(Prediction {
                label: 1,
                probability: 0.7349,
            }),
        };
        let text = rendered_text(&state);
        assert!(text.contains("Likely to have diabetes (Probability: 0.73)"));
    }

    #[test]
    fn test_renders_error_panel() {
        let state = ResultState::Error {
            message: "Prediction failed".into(),
        };
        assert!(rendered_text(&state).contains("Prediction failed"));
    }
}
