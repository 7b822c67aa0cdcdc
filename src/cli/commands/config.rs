//! Config command implementation.
//!
//! The `hostprep config` command shows the resolved configuration, with any
//! password masked.

use std::path::{Path, PathBuf};

use crate::cli::args::ConfigArgs;
use crate::config::{discover_config_path, load_config, ConfigOverrides, RunContext};
use crate::error::{HostprepError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

const MASK: &str = "********";

/// The config command implementation.
pub struct ConfigCommand {
    config_path: Option<PathBuf>,
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(config_path: Option<&Path>, args: ConfigArgs) -> Self {
        Self {
            config_path: config_path.map(Path::to_path_buf),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }
}

fn masked(mut config: RunContext) -> RunContext {
    if config.password.is_some() {
        config.password = Some(MASK.to_string());
    }
    config
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = masked(load_config(
            self.config_path.as_deref(),
            &ConfigOverrides::default(),
        )?);

        if self.args.json {
            let json =
                serde_json::to_string_pretty(&config).map_err(|e| HostprepError::Other(e.into()))?;
            ui.message(&json);
        } else {
            match discover_config_path(self.config_path.as_deref()) {
                Some(path) => ui.message(&format!("# {}", path.display())),
                None => ui.message("# built-in defaults"),
            }
            let yaml = serde_yaml::to_string(&config).map_err(|e| HostprepError::Other(e.into()))?;
            ui.message(yaml.trim_end());
        }

        Ok(CommandResult::success())
    }
}
