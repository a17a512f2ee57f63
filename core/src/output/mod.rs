//! Output abstraction layer for probe runs
//!
//! Core only emits events; rendering lives in the calling application.

use crate::agent::RunResult;
use crate::error::ProbeError;
use async_trait::async_trait;

/// Events emitted while a probe runs
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeEvent {
    /// About to query the model listing endpoint
    CheckStarted { api_base: String, endpoint: String },

    /// The listing endpoint answered with at least one model
    ModelsListed {
        total: usize,
        shown: Vec<String>,
        remaining: usize,
    },

    /// The configured model id is not among the listed ones
    ModelNotListed { model: String },

    /// An agent was resolved from the registry
    AgentResolved { name: String, description: String },

    /// A prompt is about to be sent to the agent
    PromptStarted {
        index: usize,
        total: usize,
        prompt: String,
    },

    /// The agent is running a tool
    ToolStarted { tool_name: String, summary: String },

    /// A tool finished
    ToolCompleted {
        tool_name: String,
        success: bool,
        output: String,
    },

    /// A prompt finished with a final answer
    PromptCompleted { index: usize, result: RunResult },

    /// A stage failed and the run stopped
    Failed { error: ProbeError },

    /// Every stage succeeded
    Completed { prompts_run: usize },
}

/// Abstract output interface for probe runs
#[async_trait]
pub trait ProbeOutput: Send + Sync {
    /// Emit a probe event
    async fn emit_event(
        &self,
        event: ProbeEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Output handler that discards all events
pub struct NullOutput;

#[async_trait]
impl ProbeOutput for NullOutput {
    async fn emit_event(
        &self,
        _event: ProbeEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Emit an event, logging instead of failing when the sink errors
pub(crate) async fn emit(output: &dyn ProbeOutput, event: ProbeEvent) {
    if let Err(e) = output.emit_event(event).await {
        tracing::debug!("Failed to emit probe event: {}", e);
    }
}
