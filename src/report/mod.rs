//! Run report: the ordered outcomes of one provisioning run.
//!
//! A [`Report`] is built incrementally by the step runner and rendered once
//! at the end, either as text for a terminal or as JSON for automation. The
//! error count is derived from the recorded outcomes rather than tracked
//! separately, so it always equals the number of `Failure` entries.
//!
//! # Example
//!
//! ```
//! use hostprep::config::RunContext;
//! use hostprep::report::Report;
//! use hostprep::steps::Outcome;
//!
//! let mut report = Report::new(&RunContext::default(), false);
//! report.record(Outcome::success("install-packages", "Installed 1 package"));
//! report.record(Outcome::warning("create-user", "User already exists"));
//! report.record(Outcome::failure("configure-firewall", "ufw not found"));
//!
//! assert_eq!(report.error_count(), 1);
//! assert_eq!(report.exit_status(), 1);
//! ```

pub mod render;

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::RunContext;
use crate::steps::{Outcome, OutcomeKind};

pub use render::{render_json, render_text};

/// Ordered outcomes plus run metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,

    /// Elapsed time, fixed by [`Report::finish`].
    pub elapsed_ms: u64,

    /// Configured administrative user.
    pub username: String,

    /// Configured timezone.
    pub timezone: String,

    /// Whether commands were only logged.
    pub dry_run: bool,

    /// Number of steps the runner invoked.
    pub steps_executed: usize,

    /// Packages installed successfully.
    pub packages_installed: usize,

    outcomes: Vec<Outcome>,

    #[serde(skip)]
    start: Instant,
}

impl Report {
    /// Start an empty report for a run configured by `ctx`.
    pub fn new(ctx: &RunContext, dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            elapsed_ms: 0,
            username: ctx.username.clone(),
            timezone: ctx.timezone.clone(),
            dry_run,
            steps_executed: 0,
            packages_installed: 0,
            outcomes: Vec::new(),
            start: Instant::now(),
        }
    }

    /// Append an outcome.
    pub fn record(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    /// All outcomes in execution order.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Outcomes produced by one step.
    pub fn outcomes_for<'a>(&'a self, step: &'a str) -> impl Iterator<Item = &'a Outcome> + 'a {
        self.outcomes.iter().filter(move |o| o.step == step)
    }

    /// Note that the runner invoked another step.
    pub fn step_executed(&mut self) {
        self.steps_executed += 1;
    }

    /// Add to the installed-package tally.
    pub fn add_installed_packages(&mut self, count: usize) {
        self.packages_installed += count;
    }

    fn count(&self, kind: OutcomeKind) -> usize {
        self.outcomes.iter().filter(|o| o.kind == kind).count()
    }

    /// Number of `Failure` outcomes.
    pub fn error_count(&self) -> usize {
        self.count(OutcomeKind::Failure)
    }

    /// Number of `Warning` outcomes.
    pub fn warning_count(&self) -> usize {
        self.count(OutcomeKind::Warning)
    }

    /// Number of `Success` outcomes.
    pub fn success_count(&self) -> usize {
        self.count(OutcomeKind::Success)
    }

    /// Whether no failure was recorded.
    pub fn is_success(&self) -> bool {
        self.error_count() == 0
    }

    /// Process exit status: the error count, clamped to 255.
    pub fn exit_status(&self) -> u8 {
        u8::try_from(self.error_count()).unwrap_or(u8::MAX)
    }

    /// Fix the elapsed time.
    pub fn finish(&mut self) {
        self.elapsed_ms = self.start.elapsed().as_millis() as u64;
    }

    /// Elapsed time as fixed by [`Report::finish`].
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> Report {
        Report::new(&RunContext::default(), false)
    }

    #[test]
    fn new_report_is_empty_and_successful() {
        let r = report();
        assert!(r.outcomes().is_empty());
        assert_eq!(r.error_count(), 0);
        assert_eq!(r.exit_status(), 0);
        assert!(r.is_success());
        assert_eq!(r.username, "sysadmin");
        assert_eq!(r.timezone, "UTC");
    }

    #[test]
    fn record_preserves_order() {
        let mut r = report();
        r.record(Outcome::success("a", "1"));
        r.record(Outcome::failure("b", "2"));
        r.record(Outcome::warning("c", "3"));
        let steps: Vec<_> = r.outcomes().iter().map(|o| o.step.as_str()).collect();
        assert_eq!(steps, vec!["a", "b", "c"]);
    }

    #[test]
    fn error_count_counts_only_failures() {
        let mut r = report();
        r.record(Outcome::success("a", "ok"));
        r.record(Outcome::warning("a", "meh"));
        r.record(Outcome::warning("b", "meh"));
        r.record(Outcome::failure("c", "bad"));
        assert_eq!(r.error_count(), 1);
        assert_eq!(r.warning_count(), 2);
        assert_eq!(r.success_count(), 1);
        assert!(!r.is_success());
    }

    #[test]
    fn exit_status_is_clamped() {
        let mut r = report();
        for i in 0..300 {
            r.record(Outcome::failure("x", format!("failure {i}")));
        }
        assert_eq!(r.error_count(), 300);
        assert_eq!(r.exit_status(), 255);
    }

    #[test]
    fn outcomes_for_filters_by_step() {
        let mut r = report();
        r.record(Outcome::success("a", "1"));
        r.record(Outcome::success("b", "2"));
        r.record(Outcome::failure("a", "3"));
        assert_eq!(r.outcomes_for("a").count(), 2);
    }

    #[test]
    fn counters_accumulate() {
        let mut r = report();
        r.step_executed();
        r.step_executed();
        r.add_installed_packages(3);
        r.add_installed_packages(1);
        assert_eq!(r.steps_executed, 2);
        assert_eq!(r.packages_installed, 4);
    }

    #[test]
    fn finish_fixes_elapsed() {
        let mut r = report();
        std::thread::sleep(Duration::from_millis(5));
        r.finish();
        assert!(r.elapsed() >= Duration::from_millis(5));
    }
}
