//! AgentCore implementation

use super::base::{AgentHandle, AgentRunner};
use super::config::AgentConfig;
use super::execution::RunResult;
use super::prompt::build_system_prompt;
use crate::config::ResolvedLlmConfig;
use crate::error::{AgentError, Result};
use crate::llm::{LlmClient, LlmMessage, OpenAiCompatClient, Usage};
use crate::output::{emit, NullOutput, ProbeEvent, ProbeOutput};
use crate::tools::{ToolCall, ToolExecutor, ToolRegistry};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Longest tool output forwarded to output handlers
const TOOL_OUTPUT_PREVIEW_CHARS: usize = 500;

/// One prompt's conversation with the model.
///
/// Built per prompt so no history carries over between prompts.
pub struct AgentCore {
    agent: AgentHandle,
    config: AgentConfig,
    llm_client: Arc<dyn LlmClient>,
    tool_executor: ToolExecutor,
    output: Arc<dyn ProbeOutput>,
    conversation_history: Vec<LlmMessage>,
    tool_calls: usize,
    usage: Option<Usage>,
}

impl AgentCore {
    /// Create a conversation for `agent`, failing when one of its tools is not registered
    pub fn new(
        agent: AgentHandle,
        config: AgentConfig,
        llm_client: Arc<dyn LlmClient>,
        tool_registry: &ToolRegistry,
        output: Arc<dyn ProbeOutput>,
    ) -> Result<Self> {
        if let Some(missing) = agent.tools().iter().find(|t| !tool_registry.contains(t)) {
            return Err(AgentError::MissingTool {
                agent: agent.name().to_string(),
                tool: missing.clone(),
            }
            .into());
        }

        let tool_executor = tool_registry.create_executor(agent.tools());

        Ok(Self {
            agent,
            config,
            llm_client,
            tool_executor,
            output,
            conversation_history: Vec::new(),
            tool_calls: 0,
            usage: None,
        })
    }

    /// System prompt sent as the first message
    pub fn system_prompt(&self) -> String {
        build_system_prompt(self.agent.instructions(), &self.tool_executor.names())
    }

    /// Run the prompt to a final text answer
    pub async fn execute_prompt(&mut self, prompt: &str) -> Result<RunResult> {
        if prompt.trim().is_empty() {
            return Err(AgentError::InvalidPrompt {
                message: "prompt is empty".to_string(),
            }
            .into());
        }

        let start_time = Instant::now();
        self.conversation_history = vec![
            LlmMessage::system(self.system_prompt()),
            LlmMessage::user(prompt),
        ];

        for turn in 1..=self.config.max_turns {
            if let Some(final_output) = self.execute_turn(turn).await? {
                let duration_ms = start_time.elapsed().as_millis() as u64;
                tracing::info!(
                    "Agent '{}' answered after {} turn(s) and {} tool call(s)",
                    self.agent.name(),
                    turn,
                    self.tool_calls
                );

                return Ok(RunResult::new(final_output)
                    .with_turns(turn, self.tool_calls)
                    .with_duration(duration_ms)
                    .with_usage(self.usage.clone()));
            }
        }

        Err(AgentError::MaxTurnsExceeded {
            max_turns: self.config.max_turns,
        }
        .into())
    }

    /// One LLM round-trip; returns the final answer when the model stops calling tools
    async fn execute_turn(&mut self, turn: usize) -> Result<Option<String>> {
        let tools = self.tool_executor.definitions();

        tracing::debug!(
            "Turn {}: sending {} message(s) to {}",
            turn,
            self.conversation_history.len(),
            self.llm_client.model_name()
        );

        let response = match self
            .llm_client
            .chat_completion(
                &self.conversation_history,
                &tools,
                &self.config.chat_options(),
            )
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("LLM request failed on turn {}: {}", turn, e);
                return Err(e);
            }
        };

        if let Some(usage) = &response.usage {
            self.usage
                .get_or_insert_with(Usage::default)
                .accumulate(usage);
        }

        let tool_calls: Vec<ToolCall> = response
            .message
            .tool_uses()
            .into_iter()
            .map(|(id, name, input)| ToolCall::new(id, name, input.clone()))
            .collect();
        if tool_calls.is_empty() {
            let final_output = response.message.joined_text();
            self.conversation_history.push(response.message);
            return Ok(Some(final_output));
        }
        self.conversation_history.push(response.message);

        for tool_call in tool_calls {
            self.run_tool(tool_call).await;
        }

        Ok(None)
    }

    /// Execute a tool call and append its result to the history
    async fn run_tool(&mut self, tool_call: ToolCall) {
        self.tool_calls += 1;
        let call_id = tool_call.id.clone();
        let tool_name = tool_call.name.clone();

        emit(
            self.output.as_ref(),
            ProbeEvent::ToolStarted {
                tool_name: tool_name.clone(),
                summary: summarize_call(&tool_call),
            },
        )
        .await;

        // Unknown tools go back to the model as errors
        let (success, content) = match self.tool_executor.execute(tool_call).await {
            Ok(result) => (result.success, result.content),
            Err(e) => (false, format!("Error: {}", e)),
        };
        tracing::debug!("Tool '{}' finished (success: {})", tool_name, success);

        emit(
            self.output.as_ref(),
            ProbeEvent::ToolCompleted {
                tool_name,
                success,
                output: preview(&content),
            },
        )
        .await;

        self.conversation_history
            .push(LlmMessage::tool_result(call_id, content, !success));
    }
}

/// Short human readable form of a tool call
fn summarize_call(call: &ToolCall) -> String {
    match call.arguments.get("command").and_then(|c| c.as_str()) {
        Some(command) => command.to_string(),
        None => preview(&call.arguments.to_string()),
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= TOOL_OUTPUT_PREVIEW_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(TOOL_OUTPUT_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    }
}

/// Runs agents against an OpenAI-compatible chat endpoint
pub struct LocalAgentRunner {
    config: AgentConfig,
    llm_client: Arc<dyn LlmClient>,
    tool_registry: ToolRegistry,
    output: Arc<dyn ProbeOutput>,
}

impl LocalAgentRunner {
    /// Create a runner talking to the server described by `llm_config`
    pub fn new(llm_config: &ResolvedLlmConfig, config: AgentConfig) -> Result<Self> {
        let llm_client = OpenAiCompatClient::new(llm_config)?;
        Ok(Self::with_client(Arc::new(llm_client), config))
    }

    /// Create a runner with a custom LLM client
    pub fn with_client(llm_client: Arc<dyn LlmClient>, config: AgentConfig) -> Self {
        Self {
            config,
            llm_client,
            tool_registry: ToolRegistry::default(),
            output: Arc::new(NullOutput),
        }
    }

    /// Replace the tool registry
    pub fn with_tool_registry(mut self, tool_registry: ToolRegistry) -> Self {
        self.tool_registry = tool_registry;
        self
    }

    /// Send tool events to `output`
    pub fn with_output(mut self, output: Arc<dyn ProbeOutput>) -> Self {
        self.output = output;
        self
    }
}

#[async_trait]
impl AgentRunner for LocalAgentRunner {
    async fn run(&self, agent: &AgentHandle, prompt: &str) -> Result<RunResult> {
        let mut core = AgentCore::new(
            agent.clone(),
            self.config.clone(),
            Arc::clone(&self.llm_client),
            &self.tool_registry,
            Arc::clone(&self.output),
        )?;
        core.execute_prompt(prompt).await
    }
}
