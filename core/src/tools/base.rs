//! Tool trait and the per-agent executor

use crate::error::{Result, ToolError};
use crate::llm::ToolDefinition;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object
    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(&self, call: ToolCall) -> Result<ToolResult>;
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Decode the arguments object into the tool's own argument type
    pub fn parse_arguments<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.arguments.clone()).map_err(|e| {
            ToolError::InvalidParameters {
                message: format!("{}: {}", self.name, e),
            }
            .into()
        })
    }
}

/// What a tool hands back to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub call_id: String,
    pub success: bool,
    pub content: String,
}

impl ToolResult {
    pub fn ok(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            success: true,
            content: content.into(),
        }
    }

    pub fn failed(call_id: impl Into<String>, message: impl AsRef<str>) -> Self {
        Self {
            call_id: call_id.into(),
            success: false,
            content: format!("Error: {}", message.as_ref()),
        }
    }
}

/// The tools one agent may call, keyed by name
#[derive(Default)]
pub struct ToolExecutor {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Definitions advertised to the model, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| {
                ToolDefinition::function(tool.name(), tool.description(), tool.parameters_schema())
            })
            .collect()
    }

    /// Run `call`.
    ///
    /// An unknown tool name is an `Err`. A known tool that fails yields an
    /// unsuccessful [`ToolResult`] so the model can read the failure.
    pub async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let tool = self.tools.get(&call.name).ok_or_else(|| ToolError::NotFound {
            name: call.name.clone(),
        })?;

        let call_id = call.id.clone();
        match tool.execute(call).await {
            Ok(result) => Ok(result),
            Err(e) => Ok(ToolResult::failed(call_id, e.to_string())),
        }
    }
}
