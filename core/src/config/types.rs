//! Configuration types for lmprobe core
//!
//! Core only accepts fully resolved configuration.
//! All discovery, loading, and merging happens in CLI layer.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default base URL of a local LM Studio server
pub const DEFAULT_API_BASE: &str = "http://localhost:1234/v1";

/// Placeholder model name accepted by LM Studio for "whatever is loaded"
pub const DEFAULT_MODEL: &str = "local-model";

/// Local servers ignore the key but OpenAI-compatible requests must carry one
pub const DEFAULT_API_KEY: &str = "lm-studio";

/// Agent resolved when none is configured
pub const DEFAULT_AGENT: &str = "one_tool_agent";

/// Connectivity check timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Upper bound on LLM round-trips per prompt
pub const DEFAULT_MAX_TURNS: usize = 10;

/// Prompts sent when none are configured
pub const DEFAULT_PROMPTS: [&str; 2] = [
    "What are the top 3 most common web application vulnerabilities? Be concise.",
    "Check what operating system we're running on using a system command.",
];

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingSource {
    /// Command-line flag
    Flag,
    /// Environment variable
    Env(String),
    /// Configuration file
    File,
    /// Built-in default
    Default,
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingSource::Flag => write!(f, "flag"),
            SettingSource::Env(var) => write!(f, "env {}", var),
            SettingSource::File => write!(f, "config file"),
            SettingSource::Default => write!(f, "default"),
        }
    }
}

/// A configuration value paired with its origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting<T> {
    pub value: T,
    pub source: SettingSource,
}

impl<T> Setting<T> {
    /// Wrap a value coming from the given source
    pub fn new(value: T, source: SettingSource) -> Self {
        Self { value, source }
    }

    /// Wrap a built-in default
    pub fn default_value(value: T) -> Self {
        Self::new(value, SettingSource::Default)
    }

    /// Whether the value fell back to the built-in default
    pub fn is_default(&self) -> bool {
        self.source == SettingSource::Default
    }

    /// Replace the value if `candidate` is present
    pub fn override_with(&mut self, candidate: Option<T>, source: SettingSource) {
        if let Some(value) = candidate {
            self.value = value;
            self.source = source;
        }
    }
}

/// A fully resolved LLM configuration ready for use by the agent runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLlmConfig {
    /// Server root without the `/v1` version suffix
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Model name/identifier
    pub model: String,
}

impl ResolvedLlmConfig {
    /// Create a new resolved LLM config
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            base_url,
            api_key,
            model,
        }
    }

    /// Chat completions endpoint
    pub fn chat_endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

/// Strip trailing slashes and a trailing `/v1` from an API base.
///
/// `http://localhost:1234/v1/` and `http://localhost:1234` both yield
/// `http://localhost:1234`.
pub fn server_root(api_base: &str) -> String {
    let trimmed = api_base.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/v1")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}

/// Everything a probe run needs, with the origin of each value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub api_base: Setting<String>,
    pub model: Setting<String>,
    pub api_key: Setting<String>,
    pub agent_name: Setting<String>,
    pub prompts: Setting<Vec<String>>,
    pub timeout_secs: Setting<u64>,
    pub max_turns: Setting<usize>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            api_base: Setting::default_value(DEFAULT_API_BASE.to_string()),
            model: Setting::default_value(DEFAULT_MODEL.to_string()),
            api_key: Setting::default_value(DEFAULT_API_KEY.to_string()),
            agent_name: Setting::default_value(DEFAULT_AGENT.to_string()),
            prompts: Setting::default_value(
                DEFAULT_PROMPTS.iter().map(|p| p.to_string()).collect(),
            ),
            timeout_secs: Setting::default_value(DEFAULT_TIMEOUT_SECS),
            max_turns: Setting::default_value(DEFAULT_MAX_TURNS),
        }
    }
}

impl ProbeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let api_base = self.api_base.value.trim();
        if api_base.is_empty() {
            return Err(ConfigError::MissingField {
                field: "api_base".to_string(),
            });
        }

        let parsed = url::Url::parse(api_base).map_err(|e| ConfigError::InvalidValue {
            field: "api_base".to_string(),
            value: format!("{} ({})", api_base, e),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidValue {
                field: "api_base".to_string(),
                value: format!("{} (scheme must be http or https)", api_base),
            });
        }

        if self.model.value.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "model".to_string(),
            });
        }

        if self.agent_name.value.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "agent".to_string(),
            });
        }

        if self.prompts.value.is_empty() {
            return Err(ConfigError::MissingField {
                field: "prompts".to_string(),
            });
        }
        if let Some(index) = self.prompts.value.iter().position(|p| p.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("prompts[{}]", index),
                value: "empty prompt".to_string(),
            });
        }

        if self.timeout_secs.value == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }

        if self.max_turns.value == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_turns".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    /// Server root derived from the API base
    pub fn server_root(&self) -> String {
        server_root(&self.api_base.value)
    }

    /// Model listing endpoint
    pub fn models_endpoint(&self) -> String {
        format!("{}/v1/models", self.server_root())
    }

    /// Connectivity check timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.value)
    }

    /// LLM configuration for the built-in agent runtime
    pub fn llm_config(&self) -> ResolvedLlmConfig {
        ResolvedLlmConfig::new(
            self.server_root(),
            self.api_key.value.clone(),
            self.model.value.clone(),
        )
    }
}
