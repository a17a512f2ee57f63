//! Built-in tools

pub mod linux_command;

pub use linux_command::{LinuxCommandTool, LinuxCommandToolFactory};
