//! Minimal configuration module for lmprobe core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{
    server_root, ProbeConfig, ResolvedLlmConfig, Setting, SettingSource,
    DEFAULT_AGENT, DEFAULT_API_BASE, DEFAULT_API_KEY, DEFAULT_MAX_TURNS, DEFAULT_MODEL,
    DEFAULT_PROMPTS, DEFAULT_TIMEOUT_SECS,
};
