//! OpenAI-compatible chat completions client
//!
//! Speaks the `/v1/chat/completions` dialect shared by LM Studio, Ollama,
//! llama.cpp server and vLLM. Requests are never streamed.

use crate::config::ResolvedLlmConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, ContentBlock, LlmClient, LlmMessage, LlmResponse, MessageContent, MessageRole,
    ToolDefinition, Usage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Chat client for OpenAI-compatible local servers
pub struct OpenAiCompatClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    // OpenAI sends a JSON-encoded string, Ollama sends an object
    #[serde(default)]
    arguments: Value,
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl OpenAiCompatClient {
    /// Create a new client from resolved LLM config
    pub fn new(config: &ResolvedLlmConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(LlmError::InvalidRequest {
                message: "Model name cannot be empty".to_string(),
            }
            .into());
        }

        Ok(Self {
            client: Client::new(),
            endpoint: config.chat_endpoint(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Convert our internal message format to the wire format
    fn convert_messages(&self, messages: &[LlmMessage]) -> Result<Vec<WireMessage>> {
        let mut converted = Vec::with_capacity(messages.len());

        for message in messages {
            match (message.role, &message.content) {
                (MessageRole::Tool, MessageContent::Blocks(blocks)) => {
                    let mut pushed_any = false;
                    for block in blocks {
                        if let ContentBlock::ToolResult {
                            tool_use_id,
                            content,
                            ..
                        } = block
                        {
                            converted.push(WireMessage {
                                role: "tool".to_string(),
                                content: Some(content.clone()),
                                tool_calls: None,
                                tool_call_id: Some(tool_use_id.clone()),
                            });
                            pushed_any = true;
                        }
                    }
                    if !pushed_any {
                        return Err(LlmError::InvalidRequest {
                            message: "Tool message must contain ToolResult".to_string(),
                        }
                        .into());
                    }
                }
                (MessageRole::Tool, MessageContent::Text(_)) => {
                    return Err(LlmError::InvalidRequest {
                        message: "Tool message must contain ToolResult".to_string(),
                    }
                    .into());
                }
                (role, MessageContent::Text(text)) => converted.push(WireMessage {
                    role: role.as_str().to_string(),
                    content: Some(text.clone()),
                    tool_calls: None,
                    tool_call_id: None,
                }),
                (role, MessageContent::Blocks(blocks)) => {
                    let mut text = String::new();
                    let mut tool_calls = Vec::new();

                    for block in blocks {
                        match block {
                            ContentBlock::Text { text: part } => {
                                if !text.is_empty() {
                                    text.push('\n');
                                }
                                text.push_str(part);
                            }
                            ContentBlock::ToolUse { id, name, input } => {
                                tool_calls.push(WireToolCall {
                                    id: Some(id.clone()),
                                    call_type: function_type(),
                                    function: WireFunctionCall {
                                        name: name.clone(),
                                        arguments: Value::String(input.to_string()),
                                    },
                                });
                            }
                            ContentBlock::ToolResult { .. } => {}
                        }
                    }

                    converted.push(WireMessage {
                        role: role.as_str().to_string(),
                        content: if text.is_empty() { None } else { Some(text) },
                        tool_calls: if tool_calls.is_empty() {
                            None
                        } else {
                            Some(tool_calls)
                        },
                        tool_call_id: None,
                    });
                }
            }
        }

        Ok(converted)
    }

    /// Convert a wire response to our internal format
    fn convert_response(response: ChatResponse) -> Result<LlmResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse {
                message: "No choices in response".to_string(),
            })?;

        let text = choice.message.content.filter(|c| !c.is_empty());
        let tool_calls = choice.message.tool_calls.unwrap_or_default();

        let content = if tool_calls.is_empty() {
            MessageContent::Text(text.unwrap_or_default())
        } else {
            let mut blocks = Vec::with_capacity(tool_calls.len() + 1);
            if let Some(text) = text {
                blocks.push(ContentBlock::Text { text });
            }
            for call in tool_calls {
                blocks.push(ContentBlock::ToolUse {
                    id: call
                        .id
                        .filter(|id| !id.is_empty())
                        .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple())),
                    name: call.function.name,
                    input: parse_arguments(call.function.arguments),
                });
            }
            MessageContent::Blocks(blocks)
        };

        Ok(LlmResponse {
            message: LlmMessage {
                role: MessageRole::Assistant,
                content,
            },
            usage: response.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }
}

/// Decode tool arguments, keeping undecodable strings as JSON strings
fn parse_arguments(arguments: Value) -> Value {
    match arguments {
        Value::String(raw) if raw.trim().is_empty() => Value::Object(Default::default()),
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        Value::Null => Value::Object(Default::default()),
        other => other,
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn chat_completion(
        &self,
        messages: &[LlmMessage],
        tools: &[ToolDefinition],
        options: &ChatOptions,
    ) -> Result<LlmResponse> {
        let request = ChatRequest {
            model: &self.model,
            messages: self.convert_messages(messages)?,
            tools,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            stream: false,
        };

        if !tools.is_empty() {
            tracing::debug!("Chat request with {} tools enabled", tools.len());
        }
        tracing::debug!("POST {} ({} messages)", self.endpoint, request.messages.len());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Chat completion failed with HTTP {}", status.as_u16());
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message: error_text,
            }
            .into());
        }

        let body: ChatResponse = response.json().await.map_err(|e| LlmError::InvalidResponse {
            message: format!("Failed to parse response: {}", e),
        })?;

        let result = Self::convert_response(body)?;
        let tool_use_count = result.message.tool_uses().len();
        if tool_use_count > 0 {
            tracing::debug!("Chat response contains {} tool calls", tool_use_count);
        }

        Ok(result)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
