//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config_path: Option<PathBuf>,
    no_color: bool,
}

impl CommandDispatcher {
    /// Create a dispatcher reading configuration from `config_path`, if given.
    pub fn new(config_path: Option<PathBuf>, no_color: bool) -> Self {
        Self {
            config_path,
            no_color,
        }
    }

    /// Get the explicit config path.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it. No subcommand means `run`.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Run(args)) => {
                let cmd =
                    super::run::RunCommand::new(self.config_path(), args.clone(), self.no_color);
                cmd.execute(ui)
            }
            Some(Commands::Steps) => super::steps::StepsCommand::new().execute(ui),
            Some(Commands::Config(args)) => {
                let cmd = super::config::ConfigCommand::new(self.config_path(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Completions(args)) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            None => {
                let cmd =
                    super::run::RunCommand::new(self.config_path(), cli.run.clone(), self.no_color);
                cmd.execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(3);
        assert!(!result.success);
        assert_eq!(result.exit_code, 3);
    }

    #[test]
    fn dispatcher_keeps_config_path() {
        let dispatcher = CommandDispatcher::new(Some(PathBuf::from("/tmp/h.yml")), true);
        assert_eq!(dispatcher.config_path(), Some(Path::new("/tmp/h.yml")));
    }

    #[test]
    fn dispatches_steps() {
        let cli = Cli::try_parse_from(["hostprep", "steps"]).unwrap();
        let dispatcher = CommandDispatcher::new(None, true);
        let mut ui = MockUI::new();

        let result = dispatcher.dispatch(&cli, &mut ui).unwrap();

        assert!(result.success);
        assert_eq!(ui.messages().len(), 9);
    }
}
