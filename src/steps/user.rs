//! Administrative account creation and its sudo grant.

use std::fs;

use crate::error::Result;
use crate::shell::CommandSpec;

use super::{
    command_failure, run_recorded, write_once, Step, StepContext, StepRecorder, WriteOutcome,
};

/// Group granting administrative rights on Debian-family hosts.
const ADMIN_GROUP: &str = "sudo";

/// Mode of a sudoers drop-in.
const SUDOERS_MODE: u32 = 0o440;

/// Create the administrative user with a home directory and login shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateUser;

impl Step for CreateUser {
    fn name(&self) -> &'static str {
        "create-user"
    }

    fn description(&self) -> &'static str {
        "Create administrative user"
    }

    fn run(&self, ctx: &StepContext<'_>, rec: &mut StepRecorder<'_>) -> Result<()> {
        let username = ctx.config.username.as_str();
        ctx.runner.require("useradd")?;

        let probe = CommandSpec::new("id").args(["-u", username]).probe();
        if ctx.runner.run(&probe)?.success {
            rec.warning(format!("User '{}' already exists", username));
            return Ok(());
        }

        ctx.runner.run_checked(
            &CommandSpec::new("useradd").args(["-m", "-s", "/bin/bash", username]),
        )?;
        rec.performed(
            format!("Created user '{}'", username),
            format!("Would create user '{}'", username),
        );

        match &ctx.config.password {
            Some(password) => {
                let spec =
                    CommandSpec::new("chpasswd").stdin(format!("{}:{}\n", username, password));
                if run_recorded(ctx, rec, &spec, "set the account password")? {
                    rec.performed(
                        format!("Password set for '{}'", username),
                        format!("Would set password for '{}'", username),
                    );
                }
            }
            None => rec.warning(format!(
                "No password configured; '{}' has no usable password",
                username
            )),
        }

        let spec = CommandSpec::new("usermod").args(["-aG", ADMIN_GROUP, username]);
        let what = format!("add '{}' to group {}", username, ADMIN_GROUP);
        if run_recorded(ctx, rec, &spec, &what)? {
            rec.performed(
                format!("Added '{}' to group {}", username, ADMIN_GROUP),
                format!("Would add '{}' to group {}", username, ADMIN_GROUP),
            );
        }
        Ok(())
    }
}

/// Persist a sudoers drop-in for the administrative user, once.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantSudo;

fn sudoers_line(username: &str) -> String {
    format!("{} ALL=(ALL:ALL) ALL\n", username)
}

impl Step for GrantSudo {
    fn name(&self) -> &'static str {
        "grant-sudo"
    }

    fn description(&self) -> &'static str {
        "Grant sudo privileges"
    }

    fn run(&self, ctx: &StepContext<'_>, rec: &mut StepRecorder<'_>) -> Result<()> {
        let username = ctx.config.username.as_str();
        let path = ctx.config.paths.sudoers_file(username);

        // In a dry run the account was never created, so only a real run checks it.
        if !ctx.dry_run() {
            let probe = CommandSpec::new("id").args(["-u", username]).probe();
            if !ctx.runner.run(&probe)?.success {
                rec.failure(format!(
                    "User '{}' does not exist; sudo grant skipped",
                    username
                ));
                return Ok(());
            }
        }

        match write_once(&path, &sudoers_line(username), SUDOERS_MODE, ctx.dry_run())? {
            WriteOutcome::AlreadyExists => {
                rec.warning(format!(
                    "Sudo grant {} already exists; left unchanged",
                    path.display()
                ));
            }
            WriteOutcome::Skipped => {
                rec.success(format!("Would write sudo grant {}", path.display()));
            }
            WriteOutcome::Written => {
                if ctx.runner.exists("visudo") {
                    let check = CommandSpec::new("visudo")
                        .arg("-cf")
                        .arg(path.display().to_string())
                        .probe();
                    let result = ctx.runner.run(&check)?;
                    if !result.success {
                        fs::remove_file(&path)?;
                        rec.failure(format!(
                            "Sudo grant {} failed validation and was removed: {}",
                            path.display(),
                            command_failure(&check, &result)
                        ));
                        return Ok(());
                    }
                } else {
                    tracing::warn!("visudo not found; sudo grant written without validation");
                }
                rec.success(format!(
                    "Granted sudo to '{}' via {}",
                    username,
                    path.display()
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HostPaths, RunContext};
    use crate::error::HostprepError;
    use crate::shell::MockRunner;
    use crate::steps::test_support::{kinds, run_step};
    use crate::steps::OutcomeKind;
    use tempfile::TempDir;

    fn rooted(temp: &TempDir) -> RunContext {
        RunContext {
            paths: HostPaths::rooted_at(temp.path()),
            ..Default::default()
        }
    }

    #[test]
    fn creates_new_user_and_adds_to_sudo() {
        let runner = MockRunner::fresh_host();
        let (result, outcomes) = run_step(&CreateUser, &RunContext::default(), &runner);

        assert!(result.is_ok());
        assert_eq!(
            runner.calls(),
            vec![
                "id -u sysadmin",
                "useradd -m -s /bin/bash sysadmin",
                "usermod -aG sudo sysadmin",
            ]
        );
        // created, no password configured, group membership
        assert_eq!(
            kinds(&outcomes),
            vec![OutcomeKind::Success, OutcomeKind::Warning, OutcomeKind::Success]
        );
    }

    #[test]
    fn existing_user_is_warning_and_untouched() {
        let runner = MockRunner::new();
        let (result, outcomes) = run_step(&CreateUser, &RunContext::default(), &runner);

        assert!(result.is_ok());
        assert_eq!(kinds(&outcomes), vec![OutcomeKind::Warning]);
        assert_eq!(outcomes[0].message, "User 'sysadmin' already exists");
        assert!(!runner.ran("useradd"));
        assert!(!runner.ran("usermod"));
    }

    #[test]
    fn password_is_fed_through_stdin() {
        let config = RunContext {
            password: Some("s3cret".to_string()),
            ..Default::default()
        };
        let runner = MockRunner::fresh_host();
        let (_, outcomes) = run_step(&CreateUser, &config, &runner);

        let chpasswd = runner
            .specs()
            .into_iter()
            .find(|s| s.program == "chpasswd")
            .unwrap();
        assert_eq!(chpasswd.stdin.as_deref(), Some("sysadmin:s3cret\n"));
        assert!(chpasswd.args.is_empty());
        assert!(outcomes.iter().all(|o| o.kind == OutcomeKind::Success));
        assert!(outcomes.iter().all(|o| !o.message.contains("s3cret")));
    }

    #[test]
    fn useradd_failure_is_error() {
        let runner = MockRunner::fresh_host().fail_on("useradd");
        let (result, outcomes) = run_step(&CreateUser, &RunContext::default(), &runner);

        assert!(matches!(result, Err(HostprepError::CommandFailed { .. })));
        assert!(outcomes.is_empty());
        assert!(!runner.ran("usermod"));
    }

    #[test]
    fn group_failure_is_recorded() {
        let runner = MockRunner::fresh_host().fail_on("usermod");
        let (result, outcomes) = run_step(&CreateUser, &RunContext::default(), &runner);

        assert!(result.is_ok());
        assert_eq!(outcomes.last().unwrap().kind, OutcomeKind::Failure);
        assert!(outcomes.last().unwrap().message.contains("group sudo"));
    }

    #[test]
    fn missing_useradd_is_missing_tool() {
        let runner = MockRunner::new().missing("useradd");
        let (result, _) = run_step(&CreateUser, &RunContext::default(), &runner);
        assert!(matches!(result, Err(HostprepError::MissingTool { .. })));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn grant_writes_sudoers_file() {
        let temp = TempDir::new().unwrap();
        let config = rooted(&temp);
        let runner = MockRunner::new();

        let (result, outcomes) = run_step(&GrantSudo, &config, &runner);

        assert!(result.is_ok());
        assert_eq!(kinds(&outcomes), vec![OutcomeKind::Success]);
        let path = config.paths.sudoers_file("sysadmin");
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "sysadmin ALL=(ALL:ALL) ALL\n"
        );
        assert_eq!(
            runner.calls(),
            vec![
                "id -u sysadmin".to_string(),
                format!("visudo -cf {}", path.display())
            ]
        );
    }

    #[test]
    fn grant_requires_existing_user() {
        let temp = TempDir::new().unwrap();
        let config = rooted(&temp);
        let runner = MockRunner::fresh_host().fail_on("useradd");

        let _ = run_step(&CreateUser, &config, &runner);
        let (result, outcomes) = run_step(&GrantSudo, &config, &runner);

        assert!(result.is_ok());
        assert_eq!(kinds(&outcomes), vec![OutcomeKind::Failure]);
        assert!(outcomes[0].message.contains("does not exist"));
        assert!(!config.paths.sudoers_file("sysadmin").exists());
        assert!(!runner.ran("visudo"));
    }

    #[test]
    fn grant_follows_created_user() {
        let temp = TempDir::new().unwrap();
        let config = rooted(&temp);
        let runner = MockRunner::fresh_host();

        let _ = run_step(&CreateUser, &config, &runner);
        let (_, outcomes) = run_step(&GrantSudo, &config, &runner);

        assert_eq!(kinds(&outcomes), vec![OutcomeKind::Success]);
        assert!(config.paths.sudoers_file("sysadmin").exists());
    }

    #[test]
    fn dry_run_user_creation_is_conditional() {
        let runner = MockRunner::fresh_host().dry_run();
        let (_, outcomes) = run_step(&CreateUser, &RunContext::default(), &runner);

        assert_eq!(outcomes[0].message, "Would create user 'sysadmin'");
        assert!(outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::Success)
            .all(|o| o.message.starts_with("Would ")));
    }

    #[test]
    fn grant_is_write_once() {
        let temp = TempDir::new().unwrap();
        let config = rooted(&temp);
        let path = config.paths.sudoers_file("sysadmin");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "hand edited\n").unwrap();

        let runner = MockRunner::new();
        let (_, outcomes) = run_step(&GrantSudo, &config, &runner);

        assert_eq!(kinds(&outcomes), vec![OutcomeKind::Warning]);
        assert!(outcomes[0].message.contains("left unchanged"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hand edited\n");
        assert_eq!(runner.calls(), vec!["id -u sysadmin"]);
    }

    #[test]
    fn invalid_grant_is_removed() {
        let temp = TempDir::new().unwrap();
        let config = rooted(&temp);
        let runner = MockRunner::new().fail_on("visudo");

        let (_, outcomes) = run_step(&GrantSudo, &config, &runner);

        assert_eq!(kinds(&outcomes), vec![OutcomeKind::Failure]);
        assert!(!config.paths.sudoers_file("sysadmin").exists());
    }

    #[test]
    fn grant_without_visudo_skips_validation() {
        let temp = TempDir::new().unwrap();
        let config = rooted(&temp);
        let runner = MockRunner::new().missing("visudo");

        let (_, outcomes) = run_step(&GrantSudo, &config, &runner);

        assert_eq!(kinds(&outcomes), vec![OutcomeKind::Success]);
        assert!(!runner.ran("visudo"));
        assert!(config.paths.sudoers_file("sysadmin").exists());
    }

    #[test]
    fn grant_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let config = rooted(&temp);
        let runner = MockRunner::new().dry_run();

        let (_, outcomes) = run_step(&GrantSudo, &config, &runner);

        assert_eq!(kinds(&outcomes), vec![OutcomeKind::Success]);
        assert!(outcomes[0].message.starts_with("Would write"));
        assert!(!config.paths.sudoers_file("sysadmin").exists());
    }
}
