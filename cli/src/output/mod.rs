//! CLI-specific output implementations

pub mod cli_handler;

pub use cli_handler::ConsoleOutput;
