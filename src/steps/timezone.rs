//! Timezone and network time configuration.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::shell::CommandSpec;

use super::{command_failure, run_recorded, Step, StepContext, StepRecorder};

const TIMEDATECTL: &str = "timedatectl";

/// Set the host timezone, falling back to the tz database files when
/// `timedatectl` is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigureTimezone;

/// Currently configured zone, if it can be determined.
fn current_timezone(ctx: &StepContext<'_>) -> Result<Option<String>> {
    if ctx.runner.exists(TIMEDATECTL) {
        let probe = CommandSpec::new(TIMEDATECTL)
            .args(["show", "-p", "Timezone", "--value"])
            .probe();
        let result = ctx.runner.run(&probe)?;
        let zone = result.stdout.trim();
        if result.success && !zone.is_empty() {
            return Ok(Some(zone.to_string()));
        }
    }

    Ok(fs::read_to_string(&ctx.config.paths.timezone_file)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

#[cfg(unix)]
fn link_localtime(zone: &Path, localtime: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(zone, localtime)
}

#[cfg(not(unix))]
fn link_localtime(zone: &Path, localtime: &Path) -> std::io::Result<()> {
    fs::copy(zone, localtime).map(|_| ())
}

impl ConfigureTimezone {
    fn fallback(
        &self,
        ctx: &StepContext<'_>,
        rec: &mut StepRecorder<'_>,
        target: &str,
        reason: &str,
    ) -> Result<()> {
        let paths = &ctx.config.paths;
        let zone = paths.zoneinfo_dir.join(target);
        if !zone.is_file() {
            rec.failure(format!(
                "Cannot set timezone '{}' ({}): {} not found",
                target,
                reason,
                zone.display()
            ));
            return Ok(());
        }

        if ctx.dry_run() {
            rec.success(format!(
                "Would link {} to {}",
                paths.localtime.display(),
                zone.display()
            ));
            return Ok(());
        }

        if paths.localtime.symlink_metadata().is_ok() {
            fs::remove_file(&paths.localtime)?;
        } else if let Some(parent) = paths.localtime.parent() {
            fs::create_dir_all(parent)?;
        }
        link_localtime(&zone, &paths.localtime)?;

        if let Some(parent) = paths.timezone_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&paths.timezone_file, format!("{}\n", target))?;

        rec.success(format!(
            "Timezone set to {} via {} fallback ({})",
            target,
            paths.localtime.display(),
            reason
        ));
        Ok(())
    }
}

impl Step for ConfigureTimezone {
    fn name(&self) -> &'static str {
        "configure-timezone"
    }

    fn description(&self) -> &'static str {
        "Configure timezone"
    }

    fn run(&self, ctx: &StepContext<'_>, rec: &mut StepRecorder<'_>) -> Result<()> {
        let target = ctx.config.timezone.as_str();

        if current_timezone(ctx)?.as_deref() == Some(target) {
            rec.warning(format!("Timezone already configured as {}", target));
            return Ok(());
        }

        let reason = if ctx.runner.exists(TIMEDATECTL) {
            let spec = CommandSpec::new(TIMEDATECTL).args(["set-timezone", target]);
            let result = ctx.runner.run(&spec)?;
            if result.success {
                rec.performed(
                    format!("Timezone set to {}", target),
                    format!("Would set timezone to {}", target),
                );
                return Ok(());
            }
            command_failure(&spec, &result)
        } else {
            format!("{} not found", TIMEDATECTL)
        };

        tracing::warn!(reason = %reason, "falling back to zoneinfo link");
        self.fallback(ctx, rec, target, &reason)
    }
}

/// Turn on NTP synchronization.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnableTimeSync;

impl Step for EnableTimeSync {
    fn name(&self) -> &'static str {
        "enable-time-sync"
    }

    fn description(&self) -> &'static str {
        "Enable network time synchronization"
    }

    fn run(&self, ctx: &StepContext<'_>, rec: &mut StepRecorder<'_>) -> Result<()> {
        ctx.runner.require(TIMEDATECTL)?;

        let spec = CommandSpec::new(TIMEDATECTL).args(["set-ntp", "true"]);
        if run_recorded(ctx, rec, &spec, "enable network time synchronization")? {
            rec.performed(
                "Network time synchronization enabled",
                "Would enable network time synchronization",
            );
        }
        Ok(())
    }
}
