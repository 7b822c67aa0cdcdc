//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use hostprep::steps::Outcome;
//! use hostprep::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.step_started(0, 9, "Refresh package index");
//! ui.outcome(&Outcome::success("update-packages", "done"));
//!
//! assert_eq!(ui.steps(), &["Refresh package index".to_string()]);
//! assert_eq!(ui.outcomes().len(), 1);
//! ```

use std::time::Duration;

use crate::steps::Outcome;

use super::{OutputMode, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    steps: Vec<String>,
    outcomes: Vec<Outcome>,
    finished: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set whether this mock behaves as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Get all captured messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all captured success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all captured warning messages.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all captured error messages.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all captured headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Descriptions of started steps, in order.
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Outcomes shown live, in order.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Names of finished steps, in order.
    pub fn finished(&self) -> &[String] {
        &self.finished
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn step_started(&mut self, _index: usize, _total: usize, description: &str) {
        self.steps.push(description.to_string());
    }

    fn outcome(&mut self, outcome: &Outcome) {
        self.outcomes.push(outcome.clone());
    }

    fn step_finished(&mut self, name: &str, _duration: Duration) {
        self.finished.push(name.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}
