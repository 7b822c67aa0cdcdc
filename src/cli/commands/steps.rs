//! Steps command implementation.
//!
//! The `hostprep steps` command lists the provisioning sequence without
//! touching the host.

use crate::error::Result;
use crate::steps::catalog;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The steps command implementation.
#[derive(Debug, Default)]
pub struct StepsCommand;

impl StepsCommand {
    /// Create a new steps command.
    pub fn new() -> Self {
        Self
    }
}

impl Command for StepsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        for (index, step) in catalog().iter().enumerate() {
            ui.message(&format!(
                "{:>2}. {:<20} {}",
                index + 1,
                step.name(),
                step.description()
            ));
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    #[test]
    fn lists_catalog_in_order() {
        let mut ui = MockUI::new();
        let result = StepsCommand::new().execute(&mut ui).unwrap();

        assert!(result.success);
        let lines = ui.messages();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with(" 1. update-packages"));
        assert!(lines[8].contains("verify-services"));
    }
}
