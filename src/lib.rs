//! hostprep - One-time baseline provisioning for freshly deployed hosts.
//!
//! hostprep runs a fixed sequence of provisioning steps (packages, admin
//! user, sudo grant, timezone, time sync, firewall, fail2ban, service
//! checks), records a classified outcome for every action, and exits with
//! the number of failures. One step failing never stops the ones after it.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`preflight`] - Privilege and OS-family checks run before any step
//! - [`report`] - Ordered outcomes, error count, text and JSON rendering
//! - [`runner`] - Sequential step execution
//! - [`shell`] - External command execution
//! - [`steps`] - The provisioning steps
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use hostprep::config::{HostPaths, RunContext};
//! use hostprep::runner::StepRunner;
//! use hostprep::shell::MockRunner;
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let config = RunContext {
//!     paths: HostPaths::rooted_at(temp.path()),
//!     ..Default::default()
//! };
//!
//! let runner = MockRunner::fresh_host();
//! let report = StepRunner::default()
//!     .provision(&config, &runner, 0, |_| {})
//!     .unwrap();
//!
//! assert_eq!(report.steps_executed, 9);
//! assert_eq!(report.exit_status(), 0);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod preflight;
pub mod report;
pub mod runner;
pub mod shell;
pub mod steps;
pub mod ui;

pub use error::{HostprepError, Result};
