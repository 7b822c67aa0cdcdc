//! External command execution.
//!
//! Every OS-level side effect hostprep performs goes through the
//! [`CommandRunner`] trait so steps can be exercised against a mock host.

use crate::error::{HostprepError, Result};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use super::platform::find_in_path;

/// Result of executing an external command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// Last non-empty line of stderr, falling back to stdout.
    ///
    /// apt and ufw put the useful part of a failure at the end of their
    /// output, so this is what ends up in a `Failure` outcome.
    pub fn failure_detail(&self) -> Option<String> {
        [&self.stderr, &self.stdout].into_iter().find_map(|stream| {
            stream
                .lines()
                .rev()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map(str::to_string)
        })
    }
}

/// A single external command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name, resolved through PATH.
    pub program: String,

    /// Arguments passed verbatim (no shell involved).
    pub args: Vec<String>,

    /// Extra environment variables (merged with the process env).
    pub env: Vec<(String, String)>,

    /// Data written to the child's stdin.
    pub stdin: Option<String>,

    /// Read-only query that is safe to run during a dry run.
    pub probe: bool,
}

impl CommandSpec {
    /// Create a spec for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Feed `input` to the child's stdin.
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Mark the command as a read-only probe.
    pub fn probe(mut self) -> Self {
        self.probe = true;
        self
    }

    /// Command line for logs and outcome messages. Never includes stdin.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// The command-execution interface steps use to touch the host.
pub trait CommandRunner {
    /// Run a command to completion.
    ///
    /// A non-zero exit is reported through [`CommandResult::success`], not as
    /// an error. `Err` means the command could not be run at all.
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult>;

    /// Whether `program` is available on this host.
    fn exists(&self, program: &str) -> bool;

    /// Whether this runner only pretends to mutate the host.
    fn is_dry_run(&self) -> bool {
        false
    }

    /// Run a command and turn a non-zero exit into [`HostprepError::CommandFailed`].
    fn run_checked(&self, spec: &CommandSpec) -> Result<CommandResult> {
        let result = self.run(spec)?;
        if result.success {
            Ok(result)
        } else {
            Err(HostprepError::CommandFailed {
                command: spec.display(),
                code: result.exit_code,
                detail: result.failure_detail(),
            })
        }
    }

    /// Fail with [`HostprepError::MissingTool`] unless `program` exists.
    fn require(&self, program: &str) -> Result<()> {
        if self.exists(program) {
            Ok(())
        } else {
            Err(HostprepError::MissingTool {
                tool: program.to_string(),
            })
        }
    }
}

/// Execute a command on the local host.
pub fn execute(spec: &CommandSpec) -> Result<CommandResult> {
    let start = Instant::now();
    let command_line = spec.display();
    tracing::debug!(command = %command_line, "executing");

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);

    for (key, value) in &spec.env {
        cmd.env(key, value);
    }

    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.stdin(if spec.stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });

    let spawn_error = |source| HostprepError::CommandSpawn {
        command: command_line.clone(),
        source,
    };

    let mut child = cmd.spawn().map_err(spawn_error)?;

    // The child is always reaped, even when feeding stdin fails.
    let fed = match (&spec.stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => pipe.write_all(input.as_bytes()),
        _ => Ok(()),
    };

    let output = child.wait_with_output().map_err(spawn_error)?;
    // A child that exits without reading its input is judged by its exit status.
    fed.or_else(|e| match e.kind() {
        ErrorKind::BrokenPipe => Ok(()),
        _ => Err(e),
    })
    .map_err(spawn_error)?;
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    tracing::debug!(
        command = %command_line,
        code = ?output.status.code(),
        elapsed_ms = duration.as_millis() as u64,
        "finished"
    );

    if output.status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        Ok(CommandResult::failure(
            output.status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

/// Runs commands for real.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        execute(spec)
    }

    fn exists(&self, program: &str) -> bool {
        find_in_path(program).is_some()
    }
}

/// Runs probes for real and only logs everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        if spec.probe {
            return execute(spec);
        }
        tracing::info!(command = %spec.display(), "dry run: not executed");
        Ok(CommandResult::success(
            String::new(),
            String::new(),
            Duration::ZERO,
        ))
    }

    fn exists(&self, program: &str) -> bool {
        find_in_path(program).is_some()
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_successful_command() {
        let result = execute(&CommandSpec::new("echo").arg("hello")).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn execute_failing_command() {
        let result = execute(&CommandSpec::new("sh").args(["-c", "exit 3"])).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn execute_with_env() {
        let spec = CommandSpec::new("sh")
            .args(["-c", "echo $MY_VAR"])
            .env("MY_VAR", "my_value");

        let result = execute(&spec).unwrap();

        assert!(result.stdout.contains("my_value"));
    }

    #[test]
    fn execute_feeds_stdin() {
        let result = execute(&CommandSpec::new("cat").stdin("admin:secret\n")).unwrap();

        assert!(result.success);
        assert_eq!(result.stdout, "admin:secret\n");
    }

    #[test]
    fn execute_survives_child_ignoring_stdin() {
        let input = "x".repeat(1 << 20);
        let result = execute(&CommandSpec::new("true").stdin(input)).unwrap();

        assert!(result.success);
    }

    #[test]
    fn execute_missing_program_is_spawn_error() {
        let err = execute(&CommandSpec::new("hostprep-definitely-not-a-program")).unwrap_err();
        assert!(matches!(err, HostprepError::CommandSpawn { .. }));
    }

    #[test]
    fn display_joins_program_and_args() {
        let spec = CommandSpec::new("ufw").args(["allow", "22/tcp"]);
        assert_eq!(spec.display(), "ufw allow 22/tcp");
        assert_eq!(CommandSpec::new("id").display(), "id");
    }

    #[test]
    fn display_hides_stdin() {
        let spec = CommandSpec::new("chpasswd").stdin("admin:hunter2");
        assert!(!spec.display().contains("hunter2"));
    }

    #[test]
    fn failure_detail_prefers_last_stderr_line() {
        let result = CommandResult::failure(
            Some(100),
            "Reading package lists...\n".to_string(),
            "W: noise\nE: Unable to locate package nope\n\n".to_string(),
            Duration::ZERO,
        );
        assert_eq!(
            result.failure_detail().as_deref(),
            Some("E: Unable to locate package nope")
        );
    }

    #[test]
    fn failure_detail_falls_back_to_stdout() {
        let result = CommandResult::failure(
            Some(1),
            "ERROR: bad rule\n".to_string(),
            String::new(),
            Duration::ZERO,
        );
        assert_eq!(result.failure_detail().as_deref(), Some("ERROR: bad rule"));
    }

    #[test]
    fn run_checked_maps_non_zero_exit() {
        let err = SystemRunner
            .run_checked(&CommandSpec::new("sh").args(["-c", "echo boom >&2; exit 2"]))
            .unwrap_err();
        match err {
            HostprepError::CommandFailed { code, detail, .. } => {
                assert_eq!(code, Some(2));
                assert_eq!(detail.as_deref(), Some("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn require_reports_missing_tool() {
        assert!(SystemRunner.require("sh").is_ok());
        let err = SystemRunner
            .require("hostprep-definitely-not-a-program")
            .unwrap_err();
        assert!(matches!(err, HostprepError::MissingTool { .. }));
    }

    #[test]
    fn dry_run_skips_mutating_commands() {
        let result = DryRunRunner
            .run(&CommandSpec::new("sh").args(["-c", "exit 7"]))
            .unwrap();
        assert!(result.success);
        assert!(DryRunRunner.is_dry_run());
    }

    #[test]
    fn dry_run_executes_probes() {
        let result = DryRunRunner
            .run(&CommandSpec::new("sh").args(["-c", "exit 7"]).probe())
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(7));
    }
}
