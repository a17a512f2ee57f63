//! Agent runtime configuration

use crate::config::DEFAULT_MAX_TURNS;
use crate::llm::ChatOptions;
use serde::{Deserialize, Serialize};

/// Configuration for the built-in agent runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum number of LLM round-trips per prompt
    pub max_turns: usize,

    /// Maximum tokens per completion
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            max_tokens: None,
            temperature: None,
        }
    }
}

impl AgentConfig {
    /// Set maximum turns
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Per-request chat options
    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}
