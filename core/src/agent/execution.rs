//! Agent execution result structures

use crate::llm::Usage;
use serde::{Deserialize, Serialize};

/// Result of running one prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Final text answer of the agent
    pub final_output: String,

    /// Number of LLM round-trips
    pub turns: usize,

    /// Number of tool calls executed
    pub tool_calls: usize,

    /// Total execution time in milliseconds
    pub duration_ms: u64,

    /// Accumulated token usage, when the server reports it
    pub usage: Option<Usage>,
}

impl RunResult {
    /// Result carrying only a final answer
    pub fn new<S: Into<String>>(final_output: S) -> Self {
        Self {
            final_output: final_output.into(),
            turns: 0,
            tool_calls: 0,
            duration_ms: 0,
            usage: None,
        }
    }

    pub fn with_turns(mut self, turns: usize, tool_calls: usize) -> Self {
        self.turns = turns;
        self.tool_calls = tool_calls;
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_usage(mut self, usage: Option<Usage>) -> Self {
        self.usage = usage;
        self
    }
}
