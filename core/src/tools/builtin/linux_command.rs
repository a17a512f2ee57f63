//! Generic Linux command execution tool

use crate::error::Result;
use crate::impl_tool_factory;
use crate::tools::utils::{execute_command, validate_command_safety, CommandOptions};
use crate::tools::{Tool, ToolCall, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Runs one shell command per call; no state survives between calls
pub struct LinuxCommandTool {
    options: CommandOptions,
}

#[derive(Debug, Deserialize)]
struct LinuxCommandArgs {
    command: String,
    #[serde(default)]
    timeout_seconds: Option<u64>,
}

impl LinuxCommandTool {
    pub fn new() -> Self {
        Self {
            options: CommandOptions::default(),
        }
    }

    /// Use custom execution options (shell, default timeout, truncation)
    pub fn with_options(options: CommandOptions) -> Self {
        Self { options }
    }
}

impl Default for LinuxCommandTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for LinuxCommandTool {
    fn name(&self) -> &str {
        "generic_linux_command"
    }

    fn description(&self) -> &str {
        "Execute a command on the local Linux system and return its output\n\
         * The command runs in a fresh non-interactive bash shell.\n\
         * Avoid commands that produce very large output; it will be truncated.\n\
         * Long running commands are killed after the timeout."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The bash command to run."
                },
                "timeout_seconds": {
                    "type": "integer",
                    "description": "Optional timeout in seconds (default 120)."
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let args: LinuxCommandArgs = call.parse_arguments()?;
        validate_command_safety(&args.command)?;

        let mut options = self.options.clone();
        if let Some(timeout_seconds) = args.timeout_seconds {
            options.timeout_seconds = timeout_seconds;
        }

        let result = execute_command(&args.command, options).await?;
        tracing::debug!(
            "generic_linux_command exited with {} in {}ms (truncated: {})",
            result.exit_code,
            result.duration_ms,
            result.truncated
        );

        let mut output = String::new();
        if !result.stdout.is_empty() {
            output.push_str(&result.stdout);
        }
        if !result.stderr.is_empty() {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&result.stderr);
        }
        if output.is_empty() {
            output = format!("Command completed with exit code: {}", result.exit_code);
        } else if result.exit_code != 0 && !result.timed_out {
            output.push_str(&format!("\n(exit code: {})", result.exit_code));
        }

        if result.timed_out {
            Ok(ToolResult::failed(call.id, output))
        } else {
            Ok(ToolResult::ok(call.id, output))
        }
    }
}

impl_tool_factory!(
    LinuxCommandToolFactory,
    LinuxCommandTool,
    "generic_linux_command",
    "Execute a command on the local Linux system and return its output"
);
