//! Pre-flight gate evaluated before any provisioning step.
//!
//! Two checks run in order:
//!
//! 1. Privileges: the effective user must be root. A non-root run aborts
//!    with [`HostprepError::NotElevated`] before any command is executed,
//!    except during a dry run where it is downgraded to a warning.
//! 2. OS family: Debian and Ubuntu (or anything declaring them in
//!    `ID_LIKE`) pass. Anything else, or an unreadable os-release file, is a
//!    warning and the run continues.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{HostprepError, Result};
use crate::steps::Outcome;

/// Step name preflight outcomes are attributed to.
pub const PREFLIGHT: &str = "preflight";

const SUPPORTED_FAMILIES: &[&str] = &["debian", "ubuntu"];

/// Check that `uid` may provision the host.
///
/// Returns `Ok(None)` for root, a warning outcome for a non-root dry run.
pub fn check_privileges(uid: u32, dry_run: bool) -> Result<Option<Outcome>> {
    if uid == 0 {
        return Ok(None);
    }
    if dry_run {
        return Ok(Some(Outcome::warning(
            PREFLIGHT,
            format!("Not running as root (uid {}); dry run continues", uid),
        )));
    }
    Err(HostprepError::NotElevated { uid })
}

/// Parse `KEY=value` lines of an os-release file, unquoting values.
pub fn parse_os_release(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

fn is_supported(release: &HashMap<String, String>) -> bool {
    let id = release.get("ID").map(String::as_str).unwrap_or_default();
    let like = release.get("ID_LIKE").map(String::as_str).unwrap_or_default();
    std::iter::once(id)
        .chain(like.split_whitespace())
        .any(|family| SUPPORTED_FAMILIES.contains(&family.to_ascii_lowercase().as_str()))
}

/// Classify the host's OS family from the os-release file at `path`.
pub fn check_os_family(path: &Path) -> Outcome {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "os-release unreadable");
            return Outcome::warning(
                PREFLIGHT,
                format!(
                    "Cannot determine OS family ({} unreadable); continuing",
                    path.display()
                ),
            );
        }
    };

    let release = parse_os_release(&content);
    let name = release
        .get("PRETTY_NAME")
        .or_else(|| release.get("NAME"))
        .or_else(|| release.get("ID"))
        .cloned()
        .unwrap_or_else(|| "unknown".to_string());

    if is_supported(&release) {
        Outcome::success(PREFLIGHT, format!("Supported OS: {}", name))
    } else {
        Outcome::warning(
            PREFLIGHT,
            format!("{} is not Debian-based; commands may fail", name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::OutcomeKind;
    use tempfile::TempDir;

    const UBUNTU: &str = r#"PRETTY_NAME="Ubuntu 24.04.1 LTS"
NAME="Ubuntu"
ID=ubuntu
ID_LIKE=debian
"#;

    fn os_release(content: &str) -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("os-release");
        fs::write(&path, content).unwrap();
        (temp, path)
    }

    #[test]
    fn root_passes() {
        assert!(check_privileges(0, false).unwrap().is_none());
    }

    #[test]
    fn non_root_is_not_elevated() {
        let err = check_privileges(1000, false).unwrap_err();
        assert!(matches!(err, HostprepError::NotElevated { uid: 1000 }));
        assert_eq!(err.exit_code(), crate::error::PREFLIGHT_EXIT_CODE);
    }

    #[test]
    fn non_root_dry_run_is_warning() {
        let outcome = check_privileges(1000, true).unwrap().unwrap();
        assert_eq!(outcome.kind, OutcomeKind::Warning);
        assert_eq!(outcome.step, PREFLIGHT);
    }

    #[test]
    fn parses_quoted_values() {
        let release = parse_os_release("# comment\nNAME='Debian'\nID=debian\nBROKEN\n");
        assert_eq!(release["NAME"], "Debian");
        assert_eq!(release["ID"], "debian");
        assert!(!release.contains_key("BROKEN"));
    }

    #[test]
    fn ubuntu_is_supported() {
        let (_temp, path) = os_release(UBUNTU);
        let outcome = check_os_family(&path);
        assert_eq!(outcome.kind, OutcomeKind::Success);
        assert!(outcome.message.contains("Ubuntu 24.04.1 LTS"));
    }

    #[test]
    fn debian_derivative_is_supported() {
        let (_temp, path) =
            os_release("NAME=\"Linux Mint\"\nID=linuxmint\nID_LIKE=\"ubuntu debian\"\n");
        assert_eq!(check_os_family(&path).kind, OutcomeKind::Success);
    }

    #[test]
    fn other_family_is_warning() {
        let (_temp, path) = os_release("PRETTY_NAME=\"Fedora Linux 40\"\nID=fedora\n");
        let outcome = check_os_family(&path);
        assert_eq!(outcome.kind, OutcomeKind::Warning);
        assert!(outcome.message.contains("Fedora Linux 40"));
    }

    #[test]
    fn missing_file_is_warning() {
        let temp = TempDir::new().unwrap();
        let outcome = check_os_family(&temp.path().join("nope"));
        assert_eq!(outcome.kind, OutcomeKind::Warning);
    }
}
