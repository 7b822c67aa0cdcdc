//! Mock command runner for testing.
//!
//! `MockRunner` implements [`CommandRunner`] without touching the host. Every
//! command succeeds unless it matches a configured failure prefix, and every
//! invocation is recorded for later assertion.
//!
//! # Example
//!
//! ```
//! use hostprep::shell::{CommandRunner, CommandSpec, MockRunner};
//!
//! let runner = MockRunner::new()
//!     .fail_on("apt-get install -y nope")
//!     .missing("ufw");
//!
//! assert!(runner.run(&CommandSpec::new("apt-get").args(["update"])).unwrap().success);
//! assert!(!runner
//!     .run(&CommandSpec::new("apt-get").args(["install", "-y", "nope"]))
//!     .unwrap()
//!     .success);
//! assert!(!runner.exists("ufw"));
//! assert_eq!(runner.calls().len(), 2);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::error::Result;

use super::command::{CommandResult, CommandRunner, CommandSpec};

/// Mock runner that records invocations and scripts their results.
#[derive(Debug, Default)]
pub struct MockRunner {
    calls: RefCell<Vec<CommandSpec>>,
    failing: Vec<String>,
    missing: HashSet<String>,
    responses: HashMap<String, String>,
    dry_run: bool,
    fresh: bool,
}

impl MockRunner {
    /// Create a runner where every command succeeds and every tool exists.
    pub fn new() -> Self {
        Self::default()
    }

    /// A freshly deployed host: `id -u` fails until a `useradd` succeeds.
    pub fn fresh_host() -> Self {
        Self {
            fresh: true,
            ..Self::default()
        }
    }

    /// Fail every command whose command line starts with `prefix`.
    pub fn fail_on(mut self, prefix: &str) -> Self {
        self.failing.push(prefix.to_string());
        self
    }

    /// Pretend `program` is not installed.
    pub fn missing(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    /// Return `stdout` for the exact command line `command`.
    pub fn respond(mut self, command: &str, stdout: &str) -> Self {
        self.responses
            .insert(command.to_string(), stdout.to_string());
        self
    }

    /// Report itself as a dry-run runner.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Command lines of every invocation, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(CommandSpec::display).collect()
    }

    /// Full specs of every invocation, in order.
    pub fn specs(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Whether any invocation's command line starts with `prefix`.
    pub fn ran(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    fn fails(&self, line: &str) -> bool {
        self.failing.iter().any(|p| line.starts_with(p.as_str()))
    }

    fn user_added(&self) -> bool {
        self.calls()
            .iter()
            .any(|c| c.starts_with("useradd") && !self.fails(c))
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        self.calls.borrow_mut().push(spec.clone());
        let line = spec.display();
        let no_such_user = self.fresh && line.starts_with("id -u") && !self.user_added();

        if no_such_user || self.fails(&line) {
            return Ok(CommandResult::failure(
                Some(1),
                String::new(),
                format!("mock failure: {}", line),
                Duration::ZERO,
            ));
        }

        let stdout = self.responses.get(&line).cloned().unwrap_or_default();
        Ok(CommandResult::success(stdout, String::new(), Duration::ZERO))
    }

    fn exists(&self, program: &str) -> bool {
        !self.missing.contains(program)
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order() {
        let runner = MockRunner::new();
        runner.run(&CommandSpec::new("a")).unwrap();
        runner.run(&CommandSpec::new("b").arg("x")).unwrap();
        assert_eq!(runner.calls(), vec!["a", "b x"]);
    }

    #[test]
    fn fail_on_matches_prefix() {
        let runner = MockRunner::new().fail_on("ufw allow");
        let ok = runner.run(&CommandSpec::new("ufw").arg("enable")).unwrap();
        let bad = runner
            .run(&CommandSpec::new("ufw").args(["allow", "22/tcp"]))
            .unwrap();
        assert!(ok.success);
        assert!(!bad.success);
        assert!(bad.stderr.contains("ufw allow 22/tcp"));
    }

    #[test]
    fn respond_sets_stdout() {
        let runner = MockRunner::new().respond("timedatectl show", "UTC\n");
        let result = runner.run(&CommandSpec::new("timedatectl").arg("show")).unwrap();
        assert_eq!(result.stdout, "UTC\n");
    }

    #[test]
    fn fresh_host_has_no_user() {
        let runner = MockRunner::fresh_host();
        let result = runner
            .run(&CommandSpec::new("id").args(["-u", "sysadmin"]))
            .unwrap();
        assert!(!result.success);
    }

    #[test]
    fn fresh_host_knows_added_user() {
        let runner = MockRunner::fresh_host();
        let id = CommandSpec::new("id").args(["-u", "ops"]);
        runner.run(&CommandSpec::new("useradd").arg("ops")).unwrap();
        assert!(runner.run(&id).unwrap().success);

        let failing = MockRunner::fresh_host().fail_on("useradd");
        failing.run(&CommandSpec::new("useradd").arg("ops")).unwrap();
        assert!(!failing.run(&id).unwrap().success);
    }

    #[test]
    fn ran_checks_prefix() {
        let runner = MockRunner::new();
        runner.run(&CommandSpec::new("apt-get").arg("update")).unwrap();
        assert!(runner.ran("apt-get"));
        assert!(!runner.ran("ufw"));
    }

    #[test]
    fn missing_and_dry_run_flags() {
        let runner = MockRunner::new().missing("visudo").dry_run();
        assert!(!runner.exists("visudo"));
        assert!(runner.exists("useradd"));
        assert!(runner.is_dry_run());
    }
}
