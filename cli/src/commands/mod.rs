//! CLI command implementations

pub mod agents;
pub mod run;

pub use agents::agents_command;
pub use run::{check_command, run_command};
