//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct. Run flags are accepted both
//! at the top level (`hostprep --dry-run`) and on `hostprep run`.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// hostprep - One-time baseline provisioning for Debian-family hosts.
#[derive(Debug, Parser)]
#[command(name = "hostprep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Path to config file (overrides /etc/hostprep/config.yml)
    #[arg(short, long, global = true, env = "HOSTPREP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Run arguments in effect: the subcommand's, or the top-level ones.
    pub fn run_args(&self) -> Option<&RunArgs> {
        match &self.command {
            Some(Commands::Run(args)) => Some(args),
            None => Some(&self.run),
            Some(_) => None,
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Provision this host (default if no command specified)
    Run(RunArgs),

    /// List provisioning steps in execution order
    Steps,

    /// Show resolved configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// Machine-readable JSON on stdout
    Json,
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Administrative user to create
    #[arg(long, value_name = "NAME", env = "HOSTPREP_USERNAME")]
    pub username: Option<String>,

    /// IANA timezone to configure (e.g. Europe/Berlin)
    #[arg(long, value_name = "TZ", env = "HOSTPREP_TIMEZONE")]
    pub timezone: Option<String>,

    /// Packages to install, replacing the configured list (comma-separated)
    #[arg(long = "package", value_name = "PKG", value_delimiter = ',', env = "HOSTPREP_PACKAGES")]
    pub packages: Vec<String>,

    /// Services to verify, replacing the configured list (comma-separated)
    #[arg(long = "service", value_name = "SVC", value_delimiter = ',', env = "HOSTPREP_SERVICES")]
    pub services: Vec<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Log mutating commands instead of executing them
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Configuration overrides carried by these flags.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            username: self.username.clone(),
            timezone: self.timezone.clone(),
            packages: self.packages.clone(),
            services: self.services.clone(),
        }
    }
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
