//! Configuration loading, parsing, and validation for hostprep.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File discovery, loading and overrides in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use hostprep::config::{load_config, ConfigOverrides};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("config.yml");
//! fs::write(&path, "username: ops\ntimezone: Europe/Berlin").unwrap();
//!
//! let ctx = load_config(Some(&path), &ConfigOverrides::default()).unwrap();
//! assert_eq!(ctx.username, "ops");
//! assert_eq!(ctx.timezone, "Europe/Berlin");
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{
    discover_config_path, load_config, load_config_file, parse_config, ConfigOverrides,
    DEFAULT_CONFIG_PATH,
};
pub use schema::{Fail2banConfig, FirewallConfig, HostPaths, RunContext};
pub use validator::{validate, validate_config, ValidationError};
