//! External command execution and host platform queries.

pub mod command;
pub mod mock;
pub mod platform;

pub use command::{
    execute, CommandResult, CommandRunner, CommandSpec, DryRunRunner, SystemRunner,
};
pub use mock::MockRunner;
pub use platform::{effective_uid, find_in_path, is_ci, is_elevated};
