//! Configuration schema definitions for hostprep.
//!
//! [`RunContext`] maps to the YAML configuration file and is resolved once
//! at startup. Every field is optional in the file; missing fields take the
//! defaults defined here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resolved configuration for one provisioning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunContext {
    /// Administrative user to create.
    pub username: String,

    /// Plaintext password for the administrative user.
    ///
    /// When unset the account is created without a usable password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// IANA timezone name, e.g. `Europe/Berlin`.
    pub timezone: String,

    /// Packages installed by the `install-packages` step.
    pub packages: Vec<String>,

    /// Services expected to be active at the end of the run.
    pub services: Vec<String>,

    /// Firewall settings.
    pub firewall: FirewallConfig,

    /// fail2ban jail settings.
    pub fail2ban: Fail2banConfig,

    /// Host file locations.
    pub paths: HostPaths,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            username: "sysadmin".to_string(),
            password: None,
            timezone: "UTC".to_string(),
            packages: [
                "curl", "wget", "git", "vim", "htop", "unzip", "ufw", "fail2ban",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            services: ["ssh", "ufw", "fail2ban"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            firewall: FirewallConfig::default(),
            fail2ban: Fail2banConfig::default(),
            paths: HostPaths::default(),
        }
    }
}

/// Firewall settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallConfig {
    /// Rules passed to `ufw allow`, e.g. `22/tcp`.
    pub allow: Vec<String>,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            allow: ["22/tcp", "80/tcp", "443/tcp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// fail2ban jail settings rendered into the jail file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fail2banConfig {
    /// How long an offending address stays banned.
    pub bantime: String,

    /// Window in which failures are counted.
    pub findtime: String,

    /// Failures within `findtime` that trigger a ban.
    pub maxretry: u32,

    /// Port the sshd jail watches.
    pub ssh_port: u16,
}

impl Default for Fail2banConfig {
    fn default() -> Self {
        Self {
            bantime: "1h".to_string(),
            findtime: "10m".to_string(),
            maxretry: 5,
            ssh_port: 22,
        }
    }
}

/// Host file locations touched by the provisioning steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostPaths {
    /// Directory holding per-user sudoers grants.
    pub sudoers_dir: PathBuf,

    /// fail2ban jail file.
    pub jail_file: PathBuf,

    /// Local time symlink.
    pub localtime: PathBuf,

    /// Plain-text timezone name file.
    pub timezone_file: PathBuf,

    /// Root of the tz database.
    pub zoneinfo_dir: PathBuf,

    /// os-release file read by the pre-flight OS check.
    pub os_release: PathBuf,
}

impl Default for HostPaths {
    fn default() -> Self {
        Self {
            sudoers_dir: PathBuf::from("/etc/sudoers.d"),
            jail_file: PathBuf::from("/etc/fail2ban/jail.local"),
            localtime: PathBuf::from("/etc/localtime"),
            timezone_file: PathBuf::from("/etc/timezone"),
            zoneinfo_dir: PathBuf::from("/usr/share/zoneinfo"),
            os_release: PathBuf::from("/etc/os-release"),
        }
    }
}

impl HostPaths {
    /// Place every host file under `root`, mirroring the default layout.
    pub fn rooted_at(root: &std::path::Path) -> Self {
        let defaults = Self::default();
        let reroot = |p: &PathBuf| root.join(p.strip_prefix("/").unwrap_or(p));
        Self {
            sudoers_dir: reroot(&defaults.sudoers_dir),
            jail_file: reroot(&defaults.jail_file),
            localtime: reroot(&defaults.localtime),
            timezone_file: reroot(&defaults.timezone_file),
            zoneinfo_dir: reroot(&defaults.zoneinfo_dir),
            os_release: reroot(&defaults.os_release),
        }
    }

    /// Sudoers grant file for `username`.
    pub fn sudoers_file(&self, username: &str) -> PathBuf {
        self.sudoers_dir.join(username)
    }
}
