//! Command-line interface for hostprep.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CompletionsArgs, ConfigArgs, ReportFormat, RunArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
