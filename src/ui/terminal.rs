//! Interactive terminal UI.

use console::Term;
use std::io::Write;
use std::time::Duration;

use crate::steps::Outcome;

use super::{
    format_duration, HostprepTheme, NonInteractiveUI, OutputMode, ProgressSpinner, UserInterface,
};

/// Interactive terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: HostprepTheme,
    mode: OutputMode,
    spinner: Option<ProgressSpinner>,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode, no_color: bool) -> Self {
        Self {
            term: Term::stdout(),
            theme: HostprepTheme::for_terminal(no_color),
            mode,
            spinner: None,
        }
    }

    fn line(&mut self, text: &str) {
        match &self.spinner {
            Some(spinner) => spinner.println(text),
            None => {
                writeln!(self.term, "{}", text).ok();
            }
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            self.line(msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            let text = self.theme.format_success(msg);
            self.line(&text);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            let text = self.theme.format_warning(msg);
            self.line(&text);
        }
    }

    fn error(&mut self, msg: &str) {
        let text = self.theme.format_error(msg);
        self.line(&text);
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn step_started(&mut self, index: usize, total: usize, description: &str) {
        if !self.mode.shows_steps() {
            return;
        }
        writeln!(self.term, "{}", self.theme.format_step(index, total, description)).ok();
        if self.term.is_term() {
            self.spinner = Some(ProgressSpinner::new("working..."));
        }
    }

    fn outcome(&mut self, outcome: &Outcome) {
        if self.mode.shows_outcome(outcome.kind) {
            let text = format!("  {}", self.theme.format_outcome(outcome));
            self.line(&text);
        }
    }

    fn step_finished(&mut self, name: &str, duration: Duration) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        if self.mode.shows_durations() {
            writeln!(
                self.term,
                "  {}",
                self.theme
                    .duration
                    .apply_to(format!("{} took {}", name, format_duration(duration)))
            )
            .ok();
        }
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Create the appropriate UI for the environment.
pub fn create_ui(interactive: bool, mode: OutputMode, no_color: bool) -> Box<dyn UserInterface> {
    if interactive {
        Box::new(TerminalUI::new(mode, no_color))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_ui_non_interactive() {
        let ui = create_ui(false, OutputMode::Normal, true);
        assert!(!ui.is_interactive());
        assert_eq!(ui.output_mode(), OutputMode::Normal);
    }

    #[test]
    fn terminal_ui_keeps_mode() {
        let ui = TerminalUI::new(OutputMode::Quiet, true);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn step_lifecycle_without_tty_has_no_spinner() {
        let mut ui = TerminalUI::new(OutputMode::Silent, true);
        ui.step_started(0, 1, "Refresh package index");
        ui.outcome(&Outcome::success("update-packages", "done"));
        ui.step_finished("update-packages", Duration::from_millis(3));
        assert!(ui.spinner.is_none());
    }
}
