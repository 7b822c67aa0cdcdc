//! Package index refresh, upgrade, and toolset installation via apt.

use crate::error::Result;
use crate::shell::CommandSpec;

use super::{count_noun, run_recorded, Step, StepContext, StepRecorder};

const APT: &str = "apt-get";

fn apt_get<I, S>(args: I) -> CommandSpec
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CommandSpec::new(APT)
        .args(args)
        .env("DEBIAN_FRONTEND", "noninteractive")
}

/// Refresh the package index and upgrade installed packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdatePackages;

impl Step for UpdatePackages {
    fn name(&self) -> &'static str {
        "update-packages"
    }

    fn description(&self) -> &'static str {
        "Refresh package index and upgrade installed packages"
    }

    fn run(&self, ctx: &StepContext<'_>, rec: &mut StepRecorder<'_>) -> Result<()> {
        ctx.runner.require(APT)?;

        let refreshed = run_recorded(
            ctx,
            rec,
            &apt_get(["update"]),
            "refresh the package index",
        )?;
        let upgraded = run_recorded(
            ctx,
            rec,
            &apt_get(["-y", "upgrade"]),
            "upgrade installed packages",
        )?;

        if refreshed && upgraded {
            rec.performed(
                "Package index refreshed and installed packages upgraded",
                "Would refresh the package index and upgrade installed packages",
            );
        }
        Ok(())
    }
}

/// Install the configured toolset one package at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallPackages;

impl Step for InstallPackages {
    fn name(&self) -> &'static str {
        "install-packages"
    }

    fn description(&self) -> &'static str {
        "Install baseline packages"
    }

    fn run(&self, ctx: &StepContext<'_>, rec: &mut StepRecorder<'_>) -> Result<()> {
        let packages = &ctx.config.packages;
        if packages.is_empty() {
            rec.warning("No packages configured");
            return Ok(());
        }

        ctx.runner.require(APT)?;

        let mut installed = Vec::new();
        let mut failed = Vec::new();
        for package in packages {
            let spec = apt_get(["install", "-y", package.as_str()]);
            let result = ctx.runner.run(&spec)?;
            if result.success {
                installed.push(package.clone());
            } else {
                tracing::warn!(
                    package = %package,
                    detail = ?result.failure_detail(),
                    "package install failed"
                );
                failed.push(package.clone());
            }
        }

        rec.add_installed_packages(installed.len());
        let verb = if ctx.dry_run() { "Would install" } else { "Installed" };
        let success_message = format!("{} {}", verb, count_noun(installed.len(), "package"));
        let failure_message = format!(
            "Failed to install {}",
            count_noun(failed.len(), "package")
        );
        rec.partial(installed, success_message, failed, failure_message);
        Ok(())
    }
}
