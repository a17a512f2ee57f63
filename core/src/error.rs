//! Error types and handling for lmprobe core

use thiserror::Error;

/// Result type alias for lmprobe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for lmprobe core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Probe flow errors
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Tool execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Agent execution errors
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

/// Failures of the check / resolve / run flow.
///
/// Each variant corresponds to one stage of a probe run and carries enough
/// text to be reported to a human without further context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("cannot reach {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed model listing: {message}")]
    MalformedResponse { message: String },

    #[error("no models loaded on the server")]
    NoModels,

    #[error("agent not found: {name}")]
    AgentNotFound { name: String },

    #[error("prompt {prompt_index} failed: {message}")]
    Execution {
        prompt_index: usize,
        message: String,
    },
}

impl ProbeError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            ProbeError::Transport { .. }
            | ProbeError::Status { .. }
            | ProbeError::MalformedResponse { .. }
            | ProbeError::NoModels => 2,
            ProbeError::AgentNotFound { .. } => 3,
            ProbeError::Execution { .. } => 4,
        }
    }
}

/// LLM client errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },
}

/// Tool execution errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("Invalid tool parameters: {message}")]
    InvalidParameters { message: String },
}

/// Agent execution errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Maximum turns exceeded: {max_turns}")]
    MaxTurnsExceeded { max_turns: usize },

    #[error("Agent '{agent}' requires unavailable tool: {tool}")]
    MissingTool { agent: String, tool: String },

    #[error("Invalid prompt: {message}")]
    InvalidPrompt { message: String },
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
