//! Tool execution utilities

pub mod run;

pub use run::{
    execute_command, truncate_output, validate_command_safety, CommandOptions, CommandResult,
};
