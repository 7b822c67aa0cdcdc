//! Output verbosity.

use std::str::FromStr;

use crate::steps::OutcomeKind;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show everything, including step durations.
    Verbose,
    /// Show step titles and every outcome.
    #[default]
    Normal,
    /// Show warnings, failures and the final summary.
    Quiet,
    /// Show nothing except errors.
    Silent,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            "silent" => Ok(Self::Silent),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Pick a mode from the global verbosity flags.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Check if this mode shows step titles and spinners.
    pub fn shows_steps(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }

    /// Check if this mode shows step durations.
    pub fn shows_durations(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Check if this mode shows status messages.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Silent)
    }

    /// Check if an outcome of `kind` is shown live.
    pub fn shows_outcome(&self, kind: OutcomeKind) -> bool {
        match self {
            Self::Verbose | Self::Normal => true,
            Self::Quiet => kind != OutcomeKind::Success,
            Self::Silent => false,
        }
    }
}
