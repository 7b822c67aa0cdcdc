//! Sequential step execution with partial-failure tolerance.

use std::time::{Duration, Instant};

use crate::config::RunContext;
use crate::error::Result;
use crate::preflight::{check_os_family, check_privileges, PREFLIGHT};
use crate::report::Report;
use crate::shell::CommandRunner;
use crate::steps::{catalog, Outcome, Step, StepContext, StepRecorder};

/// Progress events emitted while a run executes.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A step is about to start.
    StepStarting {
        name: &'a str,
        description: &'a str,
        index: usize,
        total: usize,
    },
    /// An outcome was recorded.
    Outcome { outcome: &'a Outcome },
    /// A step finished.
    StepFinished {
        name: &'a str,
        duration: Duration,
        failed: bool,
    },
}

/// Runs an ordered list of steps, never letting one step's failure stop
/// the rest.
pub struct StepRunner {
    steps: Vec<Box<dyn Step>>,
}

impl Default for StepRunner {
    fn default() -> Self {
        Self::new(catalog())
    }
}

impl StepRunner {
    /// Create a runner for `steps`, executed in the given order.
    pub fn new(steps: Vec<Box<dyn Step>>) -> Self {
        Self { steps }
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[Box<dyn Step>] {
        &self.steps
    }

    /// Run every step, appending outcomes to `report`.
    pub fn run(&self, ctx: &StepContext<'_>, report: &mut Report) {
        self.run_with_progress(ctx, report, |_| {});
    }

    /// Run every step with a progress callback.
    ///
    /// A step returning `Err` is recorded as a `Failure` carrying the error
    /// message; a step that records nothing gets a default `Success`.
    pub fn run_with_progress(
        &self,
        ctx: &StepContext<'_>,
        report: &mut Report,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) {
        let total = self.steps.len();

        for (index, step) in self.steps.iter().enumerate() {
            let name = step.name();
            on_progress(RunProgress::StepStarting {
                name,
                description: step.description(),
                index,
                total,
            });

            let span = tracing::info_span!("step", name);
            let _guard = span.enter();
            let started = Instant::now();
            let failures_before = report.error_count();

            {
                let mut forward = |outcome: &Outcome| on_progress(RunProgress::Outcome { outcome });
                let mut rec = StepRecorder::new(name, report, &mut forward);
                if let Err(e) = step.run(ctx, &mut rec) {
                    rec.failure(e.to_string());
                }
                if rec.recorded() == 0 {
                    rec.success(format!("{} complete", step.description()));
                }
            }

            report.step_executed();
            let duration = started.elapsed();
            let failed = report.error_count() > failures_before;
            tracing::debug!(duration_ms = duration.as_millis() as u64, failed, "step finished");

            on_progress(RunProgress::StepFinished {
                name,
                duration,
                failed,
            });
        }
    }

    /// Evaluate the pre-flight gate, then run every step.
    ///
    /// A privilege failure aborts before any command is executed and is the
    /// only `Err` this returns. Everything else ends up in the report.
    pub fn provision(
        &self,
        config: &RunContext,
        runner: &dyn CommandRunner,
        uid: u32,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> Result<Report> {
        let dry_run = runner.is_dry_run();
        let privileges = check_privileges(uid, dry_run)?;

        let mut report = Report::new(config, dry_run);
        {
            let mut forward = |outcome: &Outcome| on_progress(RunProgress::Outcome { outcome });
            let mut rec = StepRecorder::new(PREFLIGHT, &mut report, &mut forward);
            if let Some(outcome) = privileges {
                rec.record(outcome);
            }
            rec.record(check_os_family(&config.paths.os_release));
        }

        let ctx = StepContext::new(config, runner);
        self.run_with_progress(&ctx, &mut report, on_progress);
        report.finish();

        tracing::info!(
            failures = report.error_count(),
            warnings = report.warning_count(),
            "provisioning finished"
        );
        Ok(report)
    }
}
