//! Configuration file discovery and loading.
//!
//! Resolution order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Config file (`--config`, else `/etc/hostprep/config.yml` when present)
//! 3. Command-line flags and `HOSTPREP_*` environment variables

use crate::config::schema::RunContext;
use crate::config::validator::validate;
use crate::error::{HostprepError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// System-wide config location checked when no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/hostprep/config.yml";

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub username: Option<String>,
    pub timezone: Option<String>,
    pub packages: Vec<String>,
    pub services: Vec<String>,
}

impl ConfigOverrides {
    /// Apply overrides on top of a loaded context.
    ///
    /// List overrides replace the configured list rather than extending it.
    pub fn apply(&self, ctx: &mut RunContext) {
        if let Some(username) = &self.username {
            ctx.username = username.clone();
        }
        if let Some(timezone) = &self.timezone {
            ctx.timezone = timezone.clone();
        }
        if !self.packages.is_empty() {
            ctx.packages = self.packages.clone();
        }
        if !self.services.is_empty() {
            ctx.services = self.services.clone();
        }
    }
}

/// Pick the config file to load, if any.
///
/// An explicit path is returned even if missing so that loading reports it.
pub fn discover_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            default.exists().then_some(default)
        }
    }
}

/// Load a single config file and parse it into a [`RunContext`].
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<RunContext> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            HostprepError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            HostprepError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a [`RunContext`].
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<RunContext> {
    if content.trim().is_empty() {
        return Ok(RunContext::default());
    }

    serde_yaml::from_str(content).map_err(|e| HostprepError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Resolve the run configuration: defaults, file, overrides, validation.
pub fn load_config(explicit: Option<&Path>, overrides: &ConfigOverrides) -> Result<RunContext> {
    let mut ctx = match discover_config_path(explicit) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            load_config_file(&path)?
        }
        None => {
            tracing::debug!("no config file, using defaults");
            RunContext::default()
        }
    };

    overrides.apply(&mut ctx);
    validate(&ctx)?;

    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_config_file_parses_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "username: ops\ntimezone: Europe/Berlin\n").unwrap();

        let ctx = load_config_file(&path).unwrap();
        assert_eq!(ctx.username, "ops");
        assert_eq!(ctx.timezone, "Europe/Berlin");
    }

    #[test]
    fn load_config_file_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = load_config_file(&temp.path().join("nope.yml")).unwrap_err();
        assert!(matches!(err, HostprepError::ConfigNotFound { .. }));
    }

    #[test]
    fn parse_config_reports_path_on_error() {
        let err = parse_config("username: [unclosed", Path::new("/x/config.yml")).unwrap_err();
        match err {
            HostprepError::ConfigParseError { path, .. } => {
                assert_eq!(path, Path::new("/x/config.yml"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_config_empty_document_is_default() {
        let ctx = parse_config("  \n", Path::new("c.yml")).unwrap();
        assert_eq!(ctx, RunContext::default());
    }

    #[test]
    fn discover_returns_explicit_path_even_if_missing() {
        let path = discover_config_path(Some(Path::new("/does/not/exist.yml")));
        assert_eq!(path, Some(PathBuf::from("/does/not/exist.yml")));
    }

    #[test]
    fn overrides_replace_values() {
        let mut ctx = RunContext::default();
        let overrides = ConfigOverrides {
            username: Some("deploy".to_string()),
            timezone: None,
            packages: vec!["curl".to_string()],
            services: vec![],
        };
        overrides.apply(&mut ctx);

        assert_eq!(ctx.username, "deploy");
        assert_eq!(ctx.timezone, "UTC");
        assert_eq!(ctx.packages, vec!["curl"]);
        assert_eq!(ctx.services, RunContext::default().services);
    }

    #[test]
    fn load_config_applies_overrides_after_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "username: fromfile\ntimezone: Asia/Tokyo\n").unwrap();

        let overrides = ConfigOverrides {
            username: Some("fromflag".to_string()),
            ..Default::default()
        };
        let ctx = load_config(Some(&path), &overrides).unwrap();

        assert_eq!(ctx.username, "fromflag");
        assert_eq!(ctx.timezone, "Asia/Tokyo");
    }

    #[test]
    fn load_config_validates_result() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "username: Not Valid\n").unwrap();

        let err = load_config(Some(&path), &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, HostprepError::ConfigValidationError { .. }));
    }
}
