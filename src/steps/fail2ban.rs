//! Brute-force protection for SSH via a fail2ban jail.

use crate::config::Fail2banConfig;
use crate::error::Result;
use crate::shell::CommandSpec;

use super::{run_recorded, write_once, Step, StepContext, StepRecorder, WriteOutcome};

const SERVICE: &str = "fail2ban";
const JAIL_MODE: u32 = 0o644;

/// Addresses never banned: loopback only.
const IGNORE_IP: &str = "127.0.0.1/8 ::1";

/// Render the jail file for `config`.
pub fn render_jail(config: &Fail2banConfig) -> String {
    format!(
        "[DEFAULT]\n\
         ignoreip = {ignore}\n\
         bantime  = {bantime}\n\
         findtime = {findtime}\n\
         maxretry = {maxretry}\n\
         \n\
         [sshd]\n\
         enabled = true\n\
         port    = {port}\n",
        ignore = IGNORE_IP,
        bantime = config.bantime,
        findtime = config.findtime,
        maxretry = config.maxretry,
        port = config.ssh_port,
    )
}

fn systemctl(action: &str) -> CommandSpec {
    CommandSpec::new("systemctl").args([action, SERVICE])
}

/// Persist the jail configuration once and (re)start fail2ban.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigureFail2ban;

impl Step for ConfigureFail2ban {
    fn name(&self) -> &'static str {
        "configure-fail2ban"
    }

    fn description(&self) -> &'static str {
        "Configure fail2ban"
    }

    fn run(&self, ctx: &StepContext<'_>, rec: &mut StepRecorder<'_>) -> Result<()> {
        ctx.runner.require("fail2ban-client")?;
        ctx.runner.require("systemctl")?;

        let path = &ctx.config.paths.jail_file;
        let jail = render_jail(&ctx.config.fail2ban);
        match write_once(path, &jail, JAIL_MODE, ctx.dry_run())? {
            WriteOutcome::Written => rec.success(format!("Wrote jail {}", path.display())),
            WriteOutcome::AlreadyExists => rec.warning(format!(
                "Jail {} already exists; left unchanged",
                path.display()
            )),
            WriteOutcome::Skipped => rec.success(format!("Would write jail {}", path.display())),
        }

        run_recorded(ctx, rec, &systemctl("enable"), "enable fail2ban at boot")?;
        if !run_recorded(ctx, rec, &systemctl("restart"), "restart fail2ban")? {
            return Ok(());
        }
        if ctx.dry_run() {
            rec.success("Would restart fail2ban and check that it is active");
            return Ok(());
        }

        let check = CommandSpec::new("systemctl").args(["is-active", "--quiet", SERVICE]);
        if ctx.runner.run(&check)?.success {
            rec.success("fail2ban is active");
        } else {
            rec.failure("fail2ban is not active after restart");
        }
        Ok(())
    }
}
