//! Connectivity check and agent exercise flow

pub mod check;
pub mod flow;
pub mod models;

pub use check::ModelServerClient;
pub use flow::{LocalModelProbe, PromptRun, ProbeReport};
pub use models::{ModelDescriptor, ModelList, ModelSummary, SUMMARY_LIMIT};
