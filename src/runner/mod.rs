//! Step execution orchestration.

pub mod step_runner;

pub use step_runner::{RunProgress, StepRunner};
