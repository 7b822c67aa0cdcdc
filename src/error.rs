//! Error types for hostprep operations.
//!
//! This module defines [`HostprepError`], the primary error type used
//! throughout the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - `NotElevated` is the only error that aborts a provisioning run
//! - Errors raised inside a step never reach `main`; the runner turns them
//!   into `Failure` outcomes
//! - Use `anyhow::Error` (via `HostprepError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Exit status used when the pre-flight privilege check fails.
pub const PREFLIGHT_EXIT_CODE: i32 = 1;

/// Exit status used when configuration cannot be loaded or validated.
pub const CONFIG_EXIT_CODE: i32 = 2;

/// Core error type for hostprep operations.
#[derive(Debug, Error)]
pub enum HostprepError {
    /// The process lacks the privileges needed to provision the host.
    #[error("Must run as root (effective uid {uid})")]
    NotElevated { uid: u32 },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A required external tool is not on PATH.
    #[error("Required tool '{tool}' not found on PATH")]
    MissingTool { tool: String },

    /// External command exited unsuccessfully.
    #[error("`{command}` failed{}{}", code_suffix(.code), detail_suffix(.detail))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        detail: Option<String>,
    },

    /// External command could not be started.
    #[error("Failed to start '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn code_suffix(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!(" with exit code {}", c),
        None => " (terminated by signal)".to_string(),
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {}", d),
        None => String::new(),
    }
}

impl HostprepError {
    /// Process exit status for errors that end the run before any step.
    pub fn exit_code(&self) -> i32 {
        match self {
            HostprepError::NotElevated { .. } => PREFLIGHT_EXIT_CODE,
            HostprepError::ConfigNotFound { .. }
            | HostprepError::ConfigParseError { .. }
            | HostprepError::ConfigValidationError { .. } => CONFIG_EXIT_CODE,
            _ => 1,
        }
    }
}

/// Result type alias for hostprep operations.
pub type Result<T> = std::result::Result<T, HostprepError>;
