//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Prediction service calls

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::{LoadOptions, LogisticModel};
use crate::application::PredictionService;
use crate::config::Settings;

use super::ui::{
    form::{render_form, FormState},
    render_disclaimer,
    result::{render_result, ResultState},
};

/// Shown instead of internal error details.
const PREDICTION_FAILED: &str = "Prediction failed. Check the model configuration and try again.";

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Encode + infer pipeline over the loaded model
    service: PredictionService,

    /// Form state
    form_state: FormState,

    /// Latest result
    result_state: ResultState,
}

impl App {
    /// Load the model named by `settings` and build the application.
    ///
    /// # Errors
    /// Returns error if the model cannot be loaded or verified, or if the
    /// schema check fails in strict mode.
    pub fn new(settings: &Settings) -> Result<Self> {
        let options = LoadOptions::from_settings(settings)?;
        let model = LogisticModel::load(&settings.model_path, &options).with_context(|| {
            format!(
                "Failed to load model from {:?}. Set GLYCOCHECK_MODEL_PATH to a directory containing diabetes_model.json.",
                settings.model_path
            )
        })?;

        let service = PredictionService::new(Arc::new(model), settings.strict_schema)?;
        Ok(Self::with_service(service))
    }

    /// Create application with an injected service (Composition Root pattern).
    #[must_use]
    pub fn with_service(service: PredictionService) -> Self {
        Self {
            screen: Screen::Form,
            should_quit: false,
            service,
            form_state: FormState::default(),
            result_state: ResultState::default(),
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        match self.screen {
            Screen::Form => render_form(f, chunks[0], &self.form_state),
            Screen::Result => render_result(f, chunks[0], &self.result_state),
        }

        render_disclaimer(f, chunks[1]);
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Left => {
                self.form_state.cycle_choice(-1);
            }
            KeyCode::Right => {
                self.form_state.cycle_choice(1);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_state.load_sample_data();
            }
            KeyCode::Char(c) => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_form();
            }
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.result_state = ResultState::Idle;
                self.screen = Screen::Form;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let raw = match self.form_state.to_raw_input() {
            Ok(raw) => raw,
            Err(e) => {
                self.form_state.error_message = Some(e);
                return;
            }
        };

        // Clear plaintext buffers from the UI immediately.
        self.form_state.clear_sensitive();

        self.result_state = match self.service.predict(&raw) {
            Ok(assessment) => ResultState::Complete { assessment },
            Err(e) => {
                tracing::error!("Prediction failed: {}", e);
                ResultState::Error {
                    message: PREDICTION_FAILED.to_string(),
                }
            }
        };
        self.screen = Screen::Result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EncodedFeatureRecord, ModelSchema, Outcome, PRODUCED_FEATURES};
    use crate::ports::{Classifier, InferenceError};

    struct FixedClassifier {
        schema: ModelSchema,
        fail: bool,
    }

    impl Classifier for FixedClassifier {
        fn schema(&self) -> &ModelSchema {
            &self.schema
        }

        fn predict(&self, record: &EncodedFeatureRecord) -> Result<u8, InferenceError> {
            if self.fail {
                return Err(InferenceError::InvalidProbability(f64::NAN));
            }
            Ok(u8::from(record.get("HbA1c_level").unwrap_or(0.0) >= 6.5))
        }

        fn predict_proba(&self, record: &EncodedFeatureRecord) -> Result<f64, InferenceError> {
            Ok(if self.predict(record)? == 1 { 0.81 } else { 0.12 })
        }
    }

    fn make_app(fail: bool) -> App {
        let model = FixedClassifier {
            schema: ModelSchema::new(PRODUCED_FEATURES),
            fail,
        };
        let service = PredictionService::new(Arc::new(model), true).expect("service");
        App::with_service(service)
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    #[test]
    fn test_submit_sample_shows_result_and_clears_form() {
        let mut app = make_app(false);
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Result);
        match &app.result_state {
            ResultState::Complete { assessment } => {
                assert_eq!(assessment.prediction.outcome(), Outcome::Unlikely);
                assert_eq!(
                    assessment.prediction.message(),
                    "Unlikely to have diabetes (Probability: 0.12)"
                );
            }
            other => panic!("unexpected state: {other:?}"),
        }
        assert_eq!(app.form_state.fields[1].display(), "1");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Form);
    }

    #[test]
    fn test_invalid_form_stays_on_form() {
        let mut app = make_app(false);
        // Age field: wipe and leave empty
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Form);
        assert!(app.form_state.error_message.is_some());
    }

    #[test]
    fn test_model_failure_shows_generic_message() {
        let mut app = make_app(true);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Result);
        match &app.result_state {
            ResultState::Error { message } => assert_eq!(message, PREDICTION_FAILED),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_quit_keys() {
        let mut app = make_app(false);
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);

        let mut app = make_app(false);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn test_high_hba1c_is_likely() {
        let mut app = make_app(false);
        for _ in 0..6 {
            press(&mut app, KeyCode::Down);
        }
        for _ in 0..3 {
            press(&mut app, KeyCode::Backspace);
        }
        for c in "7.2".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        match &app.result_state {
            ResultState::Complete { assessment } => {
                assert_eq!(assessment.prediction.outcome(), Outcome::Likely);
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_draw_both_screens() {
        use ratatui::backend::TestBackend;

        let mut app = make_app(false);
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal.draw(|f| app.draw(f)).expect("draw form");

        press(&mut app, KeyCode::Enter);
        terminal.draw(|f| app.draw(f)).expect("draw result");
    }
}
