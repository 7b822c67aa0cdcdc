//! Host firewall: deny inbound by default, allow the configured rules.

use crate::error::Result;
use crate::shell::CommandSpec;

use super::{count_noun, run_recorded, Step, StepContext, StepRecorder};

const UFW: &str = "ufw";

fn ufw<I, S>(args: I) -> CommandSpec
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CommandSpec::new(UFW).args(args)
}

/// Reset ufw to a default-deny policy, allow the configured rules, enable it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigureFirewall;

impl Step for ConfigureFirewall {
    fn name(&self) -> &'static str {
        "configure-firewall"
    }

    fn description(&self) -> &'static str {
        "Configure firewall"
    }

    fn run(&self, ctx: &StepContext<'_>, rec: &mut StepRecorder<'_>) -> Result<()> {
        ctx.runner.require(UFW)?;

        let mut policy_ok =
            run_recorded(ctx, rec, &ufw(["--force", "reset"]), "reset firewall rules")?;
        policy_ok &= run_recorded(
            ctx,
            rec,
            &ufw(["default", "deny", "incoming"]),
            "deny incoming traffic by default",
        )?;
        policy_ok &= run_recorded(
            ctx,
            rec,
            &ufw(["default", "allow", "outgoing"]),
            "allow outgoing traffic by default",
        )?;

        let rules = &ctx.config.firewall.allow;
        if rules.is_empty() {
            rec.warning("No firewall rules configured; only outgoing traffic will be allowed");
        } else {
            let mut allowed = Vec::new();
            let mut failed = Vec::new();
            for rule in rules {
                let result = ctx.runner.run(&ufw(["allow", rule.as_str()]))?;
                if result.success {
                    allowed.push(rule.clone());
                } else {
                    failed.push(rule.clone());
                }
            }
            let verb = if ctx.dry_run() { "Would allow" } else { "Allowed" };
            let success_message = format!("{} {}", verb, count_noun(allowed.len(), "rule"));
            let failure_message = format!("Failed to allow {}", count_noun(failed.len(), "rule"));
            rec.partial(allowed, success_message, failed, failure_message);
        }

        if run_recorded(ctx, rec, &ufw(["--force", "enable"]), "enable the firewall")? {
            if policy_ok {
                rec.performed(
                    "Firewall enabled with default-deny inbound policy",
                    "Would enable the firewall with default-deny inbound policy",
                );
            } else {
                rec.performed("Firewall enabled", "Would enable the firewall");
            }
        }
        Ok(())
    }
}
