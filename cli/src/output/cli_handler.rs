//! CLI output handler implementation

use crate::config::loader::{AGENT_ENV_VAR, API_BASE_ENV_VARS, MODEL_ENV_VAR};
use crate::config::LoadedConfig;
use async_trait::async_trait;
use colored::Colorize;
use lmprobe_core::output::{ProbeEvent, ProbeOutput};
use lmprobe_core::ProbeError;

const RULE_WIDTH: usize = 50;

/// Console output configuration
#[derive(Debug, Clone, Default)]
pub struct ConsoleOutputConfig {
    /// Show tool invocations made by the agent
    pub show_tools: bool,
}

/// Prints probe events as human readable lines on stdout
pub struct ConsoleOutput {
    config: ConsoleOutputConfig,
}

impl ConsoleOutput {
    pub fn new(config: ConsoleOutputConfig) -> Self {
        Self { config }
    }

    /// Lines printed for `event`
    pub fn render(&self, event: &ProbeEvent) -> Vec<String> {
        match event {
            ProbeEvent::CheckStarted { api_base, endpoint } => {
                tracing::debug!("Model listing endpoint: {}", endpoint);
                vec![format!("Testing connection to model server at: {}", api_base)]
            }

            ProbeEvent::ModelsListed {
                total,
                shown,
                remaining,
            } => {
                let mut lines = vec![format!(
                    "{} Connected to model server - {} models available",
                    "✅".green(),
                    total
                )];
                lines.extend(shown.iter().map(|id| format!("   - {}", id)));
                if *remaining > 0 {
                    lines.push(format!("   ... and {} more", remaining));
                }
                lines
            }

            ProbeEvent::ModelNotListed { model } => vec![format!(
                "{}  Model '{}' is not listed by the server; requests may fail",
                "⚠️".yellow(),
                model
            )],

            ProbeEvent::AgentResolved { name, description } => vec![
                String::new(),
                "=".repeat(RULE_WIDTH),
                format!("🔧 Testing agent '{}' ({})", name, description),
                "=".repeat(RULE_WIDTH),
            ],

            ProbeEvent::PromptStarted {
                index,
                total,
                prompt,
            } => vec![
                String::new(),
                format!("🧪 Test {}/{}: {}", index, total, prompt.bold()),
            ],

            ProbeEvent::ToolStarted { tool_name, summary } if self.config.show_tools => {
                vec![format!("   {} {}", format!("🔧 {}:", tool_name).dimmed(), summary)]
            }

            ProbeEvent::ToolCompleted {
                tool_name,
                success: false,
                output,
            } if self.config.show_tools => vec![format!(
                "   {} {}",
                format!("✗ {} failed:", tool_name).red(),
                first_line(output)
            )],

            ProbeEvent::ToolStarted { .. } | ProbeEvent::ToolCompleted { .. } => Vec::new(),

            ProbeEvent::PromptCompleted { result, .. } => {
                let mut stats = format!(
                    "{} turn(s), {} tool call(s), {:.2}s",
                    result.turns,
                    result.tool_calls,
                    result.duration_ms as f64 / 1000.0
                );
                if let Some(usage) = &result.usage {
                    stats.push_str(&format!(
                        ", {} tokens ({} prompt + {} completion)",
                        usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
                    ));
                }
                vec![
                    format!("Agent Response: {}", result.final_output),
                    format!("   ({})", stats).dimmed().to_string(),
                ]
            }

            ProbeEvent::Failed { error } => render_failure(error),

            ProbeEvent::Completed { prompts_run: 0 } => {
                vec![format!("{} Model server is reachable", "✅".green())]
            }

            ProbeEvent::Completed { .. } => vec![
                String::new(),
                format!("{} Local model integration successful!", "✅".green()),
            ],
        }
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(ConsoleOutputConfig::default())
    }
}

#[async_trait]
impl ProbeOutput for ConsoleOutput {
    async fn emit_event(
        &self,
        event: ProbeEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        for line in self.render(&event) {
            println!("{}", line);
        }
        Ok(())
    }
}

fn render_failure(error: &ProbeError) -> Vec<String> {
    let cross = "❌".red();
    match error {
        ProbeError::Transport { endpoint, message } => vec![
            format!("{} Cannot connect to {}: {}", cross, endpoint, message),
            "Make sure the model server is running with the server enabled".to_string(),
        ],
        ProbeError::Status { status, body } => vec![format!(
            "{} Model server connection failed: HTTP {}: {}",
            cross, status, body
        )],
        ProbeError::MalformedResponse { message } => vec![format!(
            "{} Unexpected model listing from server: {}",
            cross, message
        )],
        ProbeError::NoModels => vec![format!(
            "{} No models found. Make sure the server is running with a model loaded.",
            cross
        )],
        ProbeError::AgentNotFound { name } => vec![format!(
            "{} Agent not found: {} (run `lmprobe agents` to list agents)",
            cross, name
        )],
        ProbeError::Execution {
            prompt_index,
            message,
        } => vec![format!(
            "{} Error running agent on test {}: {}",
            cross, prompt_index, message
        )],
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}

/// Banner shown before a run, including where each key setting came from
pub fn render_header(loaded: &LoadedConfig) -> Vec<String> {
    let config = &loaded.config;
    let mut lines = vec![
        "🤖 lmprobe - local model integration check".bold().to_string(),
        "=".repeat(RULE_WIDTH),
        format!(
            "API Base: {} ({})",
            config.api_base.value, config.api_base.source
        ),
        format!("Model Name: {} ({})", config.model.value, config.model.source),
        format!("Agent: {} ({})", config.agent_name.value, config.agent_name.source),
    ];
    if let Some(path) = &loaded.config_file {
        lines.push(format!("Config file: {}", path.display()));
    }
    lines.push(String::new());
    lines
}

/// Warning shown when no API base was configured anywhere
pub fn render_missing_base_warning() -> Vec<String> {
    vec![
        format!(
            "{}  Warning: No {} configured in .env file",
            "⚠️".yellow(),
            API_BASE_ENV_VARS[0]
        ),
        format!("   Add: {}='http://localhost:1234/v1'", API_BASE_ENV_VARS[0]),
        format!("   And: {}='your-model-name'", MODEL_ENV_VAR),
        format!("   Optionally: {}='one_tool_agent'", AGENT_ENV_VAR),
        String::new(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmprobe_core::llm::Usage;
    use lmprobe_core::RunResult;

    #[test]
    fn test_models_summary_lines() {
        let output = ConsoleOutput::default();
        let lines = output.render(&ProbeEvent::ModelsListed {
            total: 5,
            shown: vec!["a".into(), "b".into(), "c".into()],
            remaining: 2,
        });

        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("5 models available"));
        assert_eq!(lines[1], "   - a");
        assert_eq!(lines[4], "   ... and 2 more");
    }

    #[test]
    fn test_no_more_line_for_three_models() {
        let output = ConsoleOutput::default();
        let lines = output.render(&ProbeEvent::ModelsListed {
            total: 3,
            shown: vec!["a".into(), "b".into(), "c".into()],
            remaining: 0,
        });

        assert_eq!(lines.len(), 4);
        assert!(!lines.iter().any(|l| l.contains("more")));
    }

    #[test]
    fn test_status_failure_shows_code_and_body() {
        let lines = render_failure(&ProbeError::Status {
            status: 500,
            body: "internal error".to_string(),
        });
        assert!(lines[0].contains("HTTP 500: internal error"));
    }

    #[test]
    fn test_agent_response_line() {
        let output = ConsoleOutput::default();
        let lines = output.render(&ProbeEvent::PromptCompleted {
            index: 1,
            result: RunResult::new("Linux").with_turns(2, 1),
        });
        assert_eq!(lines[0], "Agent Response: Linux");
        assert!(lines[1].contains("2 turn(s), 1 tool call(s)"));
        assert!(!lines[1].contains("tokens"));
    }

    #[test]
    fn test_agent_response_line_reports_token_usage() {
        let output = ConsoleOutput::default();
        let lines = output.render(&ProbeEvent::PromptCompleted {
            index: 1,
            result: RunResult::new("Linux").with_usage(Some(Usage {
                prompt_tokens: 20,
                completion_tokens: 10,
                total_tokens: 30,
            })),
        });
        assert!(lines[1].contains("30 tokens (20 prompt + 10 completion)"));
    }

    #[test]
    fn test_tool_lines_are_hidden_unless_enabled() {
        let event = ProbeEvent::ToolStarted {
            tool_name: "generic_linux_command".to_string(),
            summary: "uname -a".to_string(),
        };

        assert!(ConsoleOutput::default().render(&event).is_empty());

        let verbose = ConsoleOutput::new(ConsoleOutputConfig { show_tools: true });
        let lines = verbose.render(&event);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("uname -a"));
    }

    #[test]
    fn test_missing_base_warning_mentions_variables() {
        let lines = render_missing_base_warning();
        assert!(lines[1].contains("LMSTUDIO_API_BASE='http://localhost:1234/v1'"));
        assert!(lines[2].contains("CAI_MODEL='your-model-name'"));
    }
}
