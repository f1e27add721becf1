//! TUI module: Terminal User Interface using Ratatui.
//!
//! Two screens: the attribute form and the prediction result.

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::MedicalTheme;
