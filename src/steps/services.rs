//! Final check that the expected services are running.

use crate::error::Result;
use crate::shell::CommandSpec;

use super::{count_noun, Step, StepContext, StepRecorder};

/// Confirm each configured systemd service is active.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyServices;

impl Step for VerifyServices {
    fn name(&self) -> &'static str {
        "verify-services"
    }

    fn description(&self) -> &'static str {
        "Verify services are running"
    }

    fn run(&self, ctx: &StepContext<'_>, rec: &mut StepRecorder<'_>) -> Result<()> {
        let services = &ctx.config.services;
        if services.is_empty() {
            rec.warning("No services configured for verification");
            return Ok(());
        }

        ctx.runner.require("systemctl")?;

        let (mut active, mut inactive) = (Vec::new(), Vec::new());
        for service in services {
            let probe = CommandSpec::new("systemctl")
                .args(["is-active", "--quiet", service.as_str()])
                .probe();
            if ctx.runner.run(&probe)?.success {
                active.push(service.clone());
            } else {
                inactive.push(service.clone());
            }
        }

        let success_message = format!("{} active", count_noun(active.len(), "service"));
        let failure_message = format!("{} not active", count_noun(inactive.len(), "service"));
        rec.partial(active, success_message, inactive, failure_message);
        Ok(())
    }
}
