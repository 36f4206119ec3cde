//! Groq chat model over its OpenAI-compatible `chat/completions` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::agent::ChatModel;
use crate::error::{AgentError, AgentResult};
use crate::message::{Message, Role, ToolCall, ToolSpec};

/// Configuration for the Groq client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    pub api_key: String,
    /// Base URL for the API, without the `/chat/completions` suffix
    pub base_url: String,
    pub model: String,
    /// Kept low so answers stay factual
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.4,
            timeout_secs: 120,
        }
    }
}

pub struct GroqClient {
    config: GroqConfig,
    client: Client,
}

impl GroqClient {
    pub fn new(config: GroqConfig) -> AgentResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: Role,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolSpec,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

fn to_wire(message: &Message) -> WireMessage {
    // Assistant turns that only carry tool calls go out with null content
    let content = if message.role == Role::Assistant
        && message.content.is_empty()
        && !message.tool_calls.is_empty()
    {
        None
    } else {
        Some(message.content.clone())
    };

    WireMessage {
        role: message.role,
        content,
        tool_calls: message
            .tool_calls
            .iter()
            .map(|c| WireToolCall {
                id: c.id.clone(),
                kind: function_type(),
                function: WireFunctionCall {
                    name: c.name.clone(),
                    arguments: c.arguments.clone(),
                },
            })
            .collect(),
        tool_call_id: message.tool_call_id.clone(),
    }
}

fn from_wire(response: ChatResponse) -> AgentResult<Message> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(AgentError::EmptyResponse)?;
    let wire = choice.message;
    let tool_calls = wire
        .tool_calls
        .into_iter()
        .map(|c| ToolCall {
            id: c.id,
            name: c.function.name,
            arguments: c.function.arguments,
        })
        .collect();
    Ok(Message::assistant_tool_calls(
        wire.content.unwrap_or_default(),
        tool_calls,
    ))
}

#[async_trait]
impl ChatModel for GroqClient {
    async fn complete(&self, messages: &[Message], tools: &[ToolSpec]) -> AgentResult<Message> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: messages.iter().map(to_wire).collect(),
            temperature: self.config.temperature,
            tools: tools
                .iter()
                .map(|function| WireTool {
                    kind: "function",
                    function,
                })
                .collect(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Groq API error {}: {}", status, body);
            return Err(AgentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json().await?;
        from_wire(body)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let spec = ToolSpec {
            name: "medical_web_search".into(),
            description: "Search".into(),
            parameters: json!({"type": "object"}),
        };
        let transcript = vec![
            Message::system("sys"),
            Message::assistant_tool_calls(
                "",
                vec![ToolCall {
                    id: "call_1".into(),
                    name: "medical_web_search".into(),
                    arguments: r#"{"query":"fever"}"#.into(),
                }],
            ),
            Message::tool("call_1", "Title: Fever"),
        ];
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile",
            messages: transcript.iter().map(to_wire).collect(),
            temperature: 0.4,
            tools: vec![WireTool {
                kind: "function",
                function: &spec,
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], serde_json::Value::Null);
        assert_eq!(value["messages"][1]["tool_calls"][0]["type"], "function");
        assert_eq!(
            value["messages"][1]["tool_calls"][0]["function"]["arguments"],
            r#"{"query":"fever"}"#
        );
        assert_eq!(value["messages"][2]["role"], "tool");
        assert_eq!(value["messages"][2]["tool_call_id"], "call_1");
        assert_eq!(value["tools"][0]["function"]["name"], "medical_web_search");
    }

    #[test]
    fn test_parse_tool_call_reply() {
        let body: ChatResponse = serde_json::from_value(json!({
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "medical_web_search", "arguments": "{\"query\":\"migraine\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        let message = from_wire(body).unwrap();
        assert!(message.wants_tools());
        assert_eq!(message.content, "");
        assert_eq!(message.tool_calls[0].id, "call_abc");
        assert_eq!(message.tool_calls[0].name, "medical_web_search");
    }

    #[test]
    fn test_parse_final_reply_and_empty_choices() {
        let body: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "Rest well."}}]
        }))
        .unwrap();
        let message = from_wire(body).unwrap();
        assert!(!message.wants_tools());
        assert_eq!(message.content, "Rest well.");

        let empty: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(from_wire(empty), Err(AgentError::EmptyResponse)));
    }
}
