//! Run command implementation.
//!
//! The `hostprep run` command (also the default) provisions the host and
//! prints the run report. Its exit code is the number of failures.

use std::path::{Path, PathBuf};

use crate::cli::args::{ReportFormat, RunArgs};
use crate::config::{load_config, RunContext};
use crate::error::Result;
use crate::report::{render_json, render_text, Report};
use crate::runner::{RunProgress, StepRunner};
use crate::shell::{effective_uid, CommandRunner, DryRunRunner, SystemRunner};
use crate::steps::count_noun;
use crate::ui::{HostprepTheme, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    config_path: Option<PathBuf>,
    args: RunArgs,
    no_color: bool,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(config_path: Option<&Path>, args: RunArgs, no_color: bool) -> Self {
        Self {
            config_path: config_path.map(Path::to_path_buf),
            args,
            no_color,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Provision with an explicit runner and uid, reporting through `ui`.
    pub fn provision(
        &self,
        config: &RunContext,
        runner: &dyn CommandRunner,
        uid: u32,
        ui: &mut dyn UserInterface,
    ) -> Result<Report> {
        let title = if runner.is_dry_run() {
            format!("Provisioning host for '{}' (dry run)", config.username)
        } else {
            format!("Provisioning host for '{}'", config.username)
        };
        ui.show_header(&title);

        StepRunner::default().provision(config, runner, uid, |event| match event {
            RunProgress::StepStarting {
                description,
                index,
                total,
                ..
            } => ui.step_started(index, total, description),
            RunProgress::Outcome { outcome } => ui.outcome(outcome),
            RunProgress::StepFinished { name, duration, .. } => ui.step_finished(name, duration),
        })
    }

    fn present(&self, report: &Report, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match self.args.format {
            ReportFormat::Text => {
                let theme = HostprepTheme::for_terminal(self.no_color);
                ui.message("");
                ui.message(render_text(report, &theme).trim_end());
                ui.message("");
                announce_verdict(report, ui);
            }
            ReportFormat::Json => println!("{}", render_json(report)?),
        }

        if report.is_success() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(i32::from(report.exit_status())))
        }
    }
}

fn announce_verdict(report: &Report, ui: &mut dyn UserInterface) {
    let (errors, warnings) = (report.error_count(), report.warning_count());
    if errors > 0 {
        ui.error(&format!(
            "Provisioning finished with {}",
            count_noun(errors, "failure")
        ));
    } else if warnings > 0 {
        ui.warning(&format!(
            "Provisioning complete with {}",
            count_noun(warnings, "warning")
        ));
    } else {
        ui.success("Provisioning complete");
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(self.config_path.as_deref(), &self.args.overrides())?;
        tracing::debug!(
            username = %config.username,
            timezone = %config.timezone,
            "configuration resolved"
        );

        let runner: Box<dyn CommandRunner> = if self.args.dry_run {
            Box::new(DryRunRunner)
        } else {
            Box::new(SystemRunner)
        };

        let report = self.provision(&config, runner.as_ref(), effective_uid(), ui)?;
        self.present(&report, ui)
    }
}
