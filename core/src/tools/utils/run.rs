//! Subprocess execution for command tools

use crate::error::{Result, ToolError};
use std::collections::HashMap;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time::{timeout, Duration, Instant};

/// Command execution options
#[derive(Debug, Clone)]
pub struct CommandOptions {
    pub timeout_seconds: u64,
    pub truncate_after: usize,
    pub working_directory: Option<String>,
    pub environment: HashMap<String, String>,
    pub shell: String,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 120,
            truncate_after: 16000,
            working_directory: None,
            environment: HashMap::new(),
            shell: "/bin/bash".to_string(),
        }
    }
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    pub timed_out: bool,
    pub truncated: bool,
}

/// Run `command` through `options.shell -c`
pub async fn execute_command(command: &str, options: CommandOptions) -> Result<CommandResult> {
    if command.trim().is_empty() {
        return Err(ToolError::InvalidParameters {
            message: "Empty command".to_string(),
        }
        .into());
    }

    let start_time = Instant::now();

    let mut cmd = Command::new(&options.shell);
    cmd.arg("-c").arg(command);

    if let Some(working_dir) = &options.working_directory {
        cmd.current_dir(working_dir);
    }

    for (key, value) in &options.environment {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn()?;

    let timeout_duration = Duration::from_secs(options.timeout_seconds);
    let result = timeout(timeout_duration, collect_output(&mut child)).await;
    let duration_ms = start_time.elapsed().as_millis() as u64;

    match result {
        Ok(Ok((exit_code, stdout, stderr))) => {
            let (stdout_truncated, stdout) = truncate_output(&stdout, options.truncate_after);
            let (stderr_truncated, stderr) = truncate_output(&stderr, options.truncate_after);

            Ok(CommandResult {
                exit_code,
                stdout,
                stderr,
                duration_ms,
                timed_out: false,
                truncated: stdout_truncated || stderr_truncated,
            })
        }
        Ok(Err(e)) => Err(e),
        Err(_) => {
            let _ = child.kill().await;
            tracing::warn!(
                "Command timed out after {}s: {}",
                timeout_duration.as_secs(),
                command
            );

            Ok(CommandResult {
                exit_code: -1,
                stdout: String::new(),
                stderr: format!(
                    "Command timed out after {} seconds",
                    timeout_duration.as_secs()
                ),
                duration_ms,
                timed_out: true,
                truncated: false,
            })
        }
    }
}

/// Read stdout and stderr to completion and wait for exit
async fn collect_output(child: &mut Child) -> Result<(i32, String, String)> {
    let mut stdout = child.stdout.take().ok_or("Failed to capture stdout")?;
    let mut stderr = child.stderr.take().ok_or("Failed to capture stderr")?;

    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();
    let (stdout_result, stderr_result) = tokio::join!(
        stdout.read_to_end(&mut stdout_buf),
        stderr.read_to_end(&mut stderr_buf)
    );
    stdout_result?;
    stderr_result?;

    let status = child.wait().await?;

    Ok((
        status.code().unwrap_or(-1),
        String::from_utf8_lossy(&stdout_buf).into_owned(),
        String::from_utf8_lossy(&stderr_buf).into_owned(),
    ))
}

/// Truncate output if it exceeds the limit
pub fn truncate_output(output: &str, limit: usize) -> (bool, String) {
    if output.len() <= limit {
        return (false, output.to_string());
    }

    let mut cut = limit;
    while !output.is_char_boundary(cut) {
        cut -= 1;
    }

    (
        true,
        format!(
            "{}\n\n<output truncated after {} characters>",
            &output[..cut],
            limit
        ),
    )
}

/// Prefixes that are only destructive when aimed at `/` or the home directory
const TARGETED_PATTERNS: [&str; 3] = ["rm -rf", "chmod 777", "chown root"];

/// Targets that mean "the whole filesystem" or "the whole home directory"
const WIDE_TARGETS: [&str; 6] = ["/", "/*", "~", "~/", "~/*", "$home"];

/// Reject commands matching well-known destructive patterns
pub fn validate_command_safety(command: &str) -> Result<()> {
    let dangerous_patterns = [
        ":(){ :|:& };:", // Fork bomb
        "dd if=/dev/zero",
        "mkfs.",
        "> /dev/sd",
    ];

    let command_lower = command.to_lowercase();
    for pattern in &dangerous_patterns {
        if command_lower.contains(pattern) {
            return Err(dangerous(pattern));
        }
    }

    for pattern in &TARGETED_PATTERNS {
        if let Some(target) = wide_target_of(&command_lower, pattern) {
            return Err(dangerous(&format!("{} {}", pattern, target)));
        }
    }

    Ok(())
}

/// First argument after `pattern` when it names `/` or the home directory
fn wide_target_of<'a>(command: &'a str, pattern: &str) -> Option<&'a str> {
    command.match_indices(pattern).find_map(|(start, _)| {
        let rest = &command[start + pattern.len()..];
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let target = rest.split_whitespace().next()?.trim_end_matches(&[';', '&', '|'][..]);
        WIDE_TARGETS.contains(&target).then_some(target)
    })
}

fn dangerous(pattern: &str) -> crate::error::Error {
    ToolError::InvalidParameters {
        message: format!("Potentially dangerous command detected: {}", pattern),
    }
    .into()
}
