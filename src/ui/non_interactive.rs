//! Non-interactive UI for CI/headless environments.

use std::time::Duration;

use crate::steps::Outcome;

use super::{format_duration, HostprepTheme, OutputMode, UserInterface};

/// UI implementation for non-interactive mode.
///
/// Writes plain lines without spinners or colors so the output reads well in
/// log files and CI consoles. Warnings and errors go to stderr.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: HostprepTheme,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            theme: HostprepTheme::plain(),
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("{}\n", self.theme.format_header(title));
        }
    }

    fn step_started(&mut self, index: usize, total: usize, description: &str) {
        if self.mode.shows_steps() {
            println!("{}", self.theme.format_step(index, total, description));
        }
    }

    fn outcome(&mut self, outcome: &Outcome) {
        if self.mode.shows_outcome(outcome.kind) {
            println!("  {}", self.theme.format_outcome(outcome));
        }
    }

    fn step_finished(&mut self, name: &str, duration: Duration) {
        if self.mode.shows_durations() {
            println!("  {} took {}", name, format_duration(duration));
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
