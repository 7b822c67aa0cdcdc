//! Provisioning steps.
//!
//! This module provides the step model the runner executes:
//!
//! - [`Step`] - One named unit of provisioning work
//! - [`StepContext`] - Read-only configuration plus the command runner
//! - [`StepRecorder`] - Appends a step's outcomes to the report
//! - [`Outcome`] / [`OutcomeKind`] - Classified results
//! - [`catalog`] - The fixed, ordered provisioning sequence
//!
//! Every step classifies its own results with the same rule: full intent
//! is `Success`; a partially processed list yields a `Failure` for the
//! failed items and a `Success` for the rest; benign conditions such as
//! "already exists" are `Warning`; a missing required tool is a `Failure`
//! and the dependent sub-actions are skipped.

pub mod fail2ban;
pub mod firewall;
pub mod outcome;
pub mod packages;
pub mod services;
pub mod timezone;
pub mod user;
pub mod write_once;

pub use fail2ban::ConfigureFail2ban;
pub use firewall::ConfigureFirewall;
pub use outcome::{Outcome, OutcomeKind};
pub use packages::{InstallPackages, UpdatePackages};
pub use services::VerifyServices;
pub use timezone::{ConfigureTimezone, EnableTimeSync};
pub use user::{CreateUser, GrantSudo};
pub use write_once::{write_once, WriteOutcome};

use crate::config::RunContext;
use crate::error::Result;
use crate::report::Report;
use crate::shell::{CommandResult, CommandRunner, CommandSpec};

/// Everything a step may read while it runs.
pub struct StepContext<'a> {
    /// Resolved configuration.
    pub config: &'a RunContext,

    /// Command-execution interface to the host.
    pub runner: &'a dyn CommandRunner,
}

impl<'a> StepContext<'a> {
    /// Create a context.
    pub fn new(config: &'a RunContext, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Whether host mutations are only being logged.
    pub fn dry_run(&self) -> bool {
        self.runner.is_dry_run()
    }
}

/// One named unit of provisioning work.
pub trait Step {
    /// Stable kebab-case identifier.
    fn name(&self) -> &'static str;

    /// Human-readable label.
    fn description(&self) -> &'static str;

    /// Perform the step, recording at least one outcome.
    ///
    /// Returning `Err` is how a step says "I could not go on"; the runner
    /// records it as a `Failure` and moves to the next step.
    fn run(&self, ctx: &StepContext<'_>, rec: &mut StepRecorder<'_>) -> Result<()>;
}

/// The fixed provisioning sequence, in execution order.
pub fn catalog() -> Vec<Box<dyn Step>> {
    vec![
        Box::new(UpdatePackages),
        Box::new(InstallPackages),
        Box::new(CreateUser),
        Box::new(GrantSudo),
        Box::new(ConfigureTimezone),
        Box::new(EnableTimeSync),
        Box::new(ConfigureFirewall),
        Box::new(ConfigureFail2ban),
        Box::new(VerifyServices),
    ]
}

/// Appends one step's outcomes to the report and forwards them live.
pub struct StepRecorder<'a> {
    step: &'a str,
    report: &'a mut Report,
    on_outcome: &'a mut dyn FnMut(&Outcome),
    recorded: usize,
}

impl<'a> StepRecorder<'a> {
    /// Create a recorder attributing outcomes to `step`.
    pub fn new(
        step: &'a str,
        report: &'a mut Report,
        on_outcome: &'a mut dyn FnMut(&Outcome),
    ) -> Self {
        Self {
            step,
            report,
            on_outcome,
            recorded: 0,
        }
    }

    /// Name outcomes are attributed to.
    pub fn step(&self) -> &str {
        self.step
    }

    /// Number of outcomes recorded so far.
    pub fn recorded(&self) -> usize {
        self.recorded
    }

    /// Record a fully built outcome.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome.kind {
            OutcomeKind::Success => {
                tracing::info!(step = %outcome.step, "{}", outcome.message)
            }
            OutcomeKind::Warning => {
                tracing::warn!(step = %outcome.step, "{}", outcome.message)
            }
            OutcomeKind::Failure => {
                tracing::error!(step = %outcome.step, "{}", outcome.message)
            }
        }
        (self.on_outcome)(&outcome);
        self.report.record(outcome);
        self.recorded += 1;
    }

    /// Record a success.
    pub fn success(&mut self, message: impl Into<String>) {
        let outcome = Outcome::success(self.step, message);
        self.record(outcome);
    }

    /// Record a success worded for what happened, or for what a dry run would do.
    pub fn performed(&mut self, done: impl Into<String>, planned: impl Into<String>) {
        if self.report.dry_run {
            self.success(planned);
        } else {
            self.success(done);
        }
    }

    /// Record a warning.
    pub fn warning(&mut self, message: impl Into<String>) {
        let outcome = Outcome::warning(self.step, message);
        self.record(outcome);
    }

    /// Record a failure.
    pub fn failure(&mut self, message: impl Into<String>) {
        let outcome = Outcome::failure(self.step, message);
        self.record(outcome);
    }

    /// Record the result of processing a list of items.
    ///
    /// Emits a `Failure` listing `failed` and a `Success` listing
    /// `succeeded`, skipping whichever is empty.
    pub fn partial(
        &mut self,
        succeeded: Vec<String>,
        success_message: String,
        failed: Vec<String>,
        failure_message: String,
    ) {
        if !failed.is_empty() {
            let outcome = Outcome::failure(self.step, failure_message).with_items(failed);
            self.record(outcome);
        }
        if !succeeded.is_empty() {
            let outcome = Outcome::success(self.step, success_message).with_items(succeeded);
            self.record(outcome);
        }
    }

    /// Add to the installed-package tally.
    pub fn add_installed_packages(&mut self, count: usize) {
        self.report.add_installed_packages(count);
    }
}

/// "1 package", "3 packages".
pub(crate) fn count_noun(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Describe a failed command for an outcome message.
pub(crate) fn command_failure(spec: &CommandSpec, result: &CommandResult) -> String {
    let status = match result.exit_code {
        Some(code) => format!("`{}` exited with code {}", spec.display(), code),
        None => format!("`{}` was terminated by a signal", spec.display()),
    };
    match result.failure_detail() {
        Some(detail) => format!("{}: {}", status, detail),
        None => status,
    }
}

/// Run `spec`, recording a `Failure` for `what` if it exits non-zero.
///
/// Records nothing on success so the caller can summarize.
pub(crate) fn run_recorded(
    ctx: &StepContext<'_>,
    rec: &mut StepRecorder<'_>,
    spec: &CommandSpec,
    what: &str,
) -> Result<bool> {
    let result = ctx.runner.run(spec)?;
    if !result.success {
        rec.failure(format!("Failed to {}: {}", what, command_failure(spec, &result)));
    }
    Ok(result.success)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn catalog_order_is_fixed() {
        let names: Vec<_> = catalog().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "update-packages",
                "install-packages",
                "create-user",
                "grant-sudo",
                "configure-timezone",
                "enable-time-sync",
                "configure-firewall",
                "configure-fail2ban",
                "verify-services",
            ]
        );
    }

    #[test]
    fn catalog_descriptions_are_present() {
        assert!(catalog().iter().all(|s| !s.description().is_empty()));
    }

    #[test]
    fn recorder_attributes_and_forwards() {
        let mut report = Report::new(&RunContext::default(), false);
        let mut seen = Vec::new();
        {
            let mut sink = |o: &Outcome| seen.push(o.message.clone());
            let mut rec = StepRecorder::new("demo", &mut report, &mut sink);
            rec.success("one");
            rec.warning("two");
            assert_eq!(rec.recorded(), 2);
            assert_eq!(rec.step(), "demo");
        }
        assert_eq!(seen, vec!["one", "two"]);
        assert!(report.outcomes().iter().all(|o| o.step == "demo"));
    }

    #[test]
    fn partial_emits_failure_then_success() {
        let mut report = Report::new(&RunContext::default(), false);
        let mut sink = |_: &Outcome| {};
        {
            let mut rec = StepRecorder::new("install-packages", &mut report, &mut sink);
            rec.partial(
                vec!["curl".into()],
                "Installed 1 package".into(),
                vec!["nope".into()],
                "Failed to install 1 package".into(),
            );
        }
        let outcomes = report.outcomes();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].kind, OutcomeKind::Failure);
        assert_eq!(outcomes[0].items, vec!["nope"]);
        assert_eq!(outcomes[1].kind, OutcomeKind::Success);
        assert_eq!(outcomes[1].items, vec!["curl"]);
    }

    #[test]
    fn partial_skips_empty_sides() {
        let mut report = Report::new(&RunContext::default(), false);
        let mut sink = |_: &Outcome| {};
        {
            let mut rec = StepRecorder::new("s", &mut report, &mut sink);
            rec.partial(vec!["a".into()], "ok".into(), vec![], "bad".into());
        }
        assert_eq!(report.outcomes().len(), 1);
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn count_noun_pluralizes() {
        assert_eq!(count_noun(1, "package"), "1 package");
        assert_eq!(count_noun(0, "rule"), "0 rules");
        assert_eq!(count_noun(3, "service"), "3 services");
    }

    #[test]
    fn command_failure_includes_code_and_detail() {
        let spec = CommandSpec::new("apt-get").args(["install", "-y", "nope"]);
        let result = CommandResult::failure(
            Some(100),
            String::new(),
            "E: Unable to locate package nope".to_string(),
            Duration::ZERO,
        );
        assert_eq!(
            command_failure(&spec, &result),
            "`apt-get install -y nope` exited with code 100: E: Unable to locate package nope"
        );
    }

    #[test]
    fn command_failure_handles_signal() {
        let spec = CommandSpec::new("ufw").arg("enable");
        let result = CommandResult::failure(None, String::new(), String::new(), Duration::ZERO);
        assert_eq!(
            command_failure(&spec, &result),
            "`ufw enable` was terminated by a signal"
        );
    }
}
