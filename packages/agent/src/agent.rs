//! # Agent loop — model ↔ tool
//!
//! [`Agent`] is a two-node graph. The *agent* node sends the transcript and the tool
//! specs to a [`ChatModel`] and appends the reply. If the reply asks for tools, the
//! *tools* node runs each call in order, appends one tool message per call, and
//! control returns to the agent node. A reply without tool calls ends the run.
//!
//! Tool failures never abort the loop: an unknown tool or malformed arguments become a
//! tool message the model can read. The only loop-level failure besides model errors
//! is running out of steps.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AgentError, AgentResult};
use crate::message::{Message, ToolCall, ToolSpec};

/// Model calls allowed per run before giving up.
pub const DEFAULT_MAX_STEPS: usize = 25;

/// A hosted chat model that can request tool calls.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produce one assistant turn for the transcript.
    async fn complete(&self, messages: &[Message], tools: &[ToolSpec]) -> AgentResult<Message>;

    fn model_name(&self) -> &str;
}

/// A tool the model may call.
#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;

    /// Run the tool. Failures are reported in the returned text.
    async fn call(&self, arguments: serde_json::Value) -> String;
}

#[derive(Clone)]
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: Vec<Arc<dyn Tool>>,
    max_steps: usize,
}

impl Agent {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            tools: Vec::new(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn tool_specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    /// Run the loop and return the full transcript.
    pub async fn invoke(&self, mut messages: Vec<Message>) -> AgentResult<Vec<Message>> {
        let specs = self.tool_specs();

        for step in 1..=self.max_steps {
            let reply = self.model.complete(&messages, &specs).await?;
            let wants_tools = reply.wants_tools();
            let calls = reply.tool_calls.clone();
            messages.push(reply);

            if !wants_tools {
                tracing::debug!(step, model = self.model.model_name(), "agent finished");
                return Ok(messages);
            }

            for call in &calls {
                let output = self.run_tool(call).await;
                messages.push(Message::tool(call.id.clone(), output));
            }
        }

        tracing::warn!(max_steps = self.max_steps, "agent hit step limit");
        Err(AgentError::StepLimit(self.max_steps))
    }

    /// Run the loop and return the final answer text.
    pub async fn run(&self, messages: Vec<Message>) -> AgentResult<String> {
        let transcript = self.invoke(messages).await?;
        transcript
            .last()
            .map(|m| m.content.clone())
            .ok_or(AgentError::EmptyResponse)
    }

    async fn run_tool(&self, call: &ToolCall) -> String {
        let Some(tool) = self.tools.iter().find(|t| t.spec().name == call.name) else {
            tracing::warn!(tool = %call.name, "model requested unknown tool");
            return format!("Error: unknown tool '{}'", call.name);
        };

        let arguments: serde_json::Value = if call.arguments.trim().is_empty() {
            serde_json::Value::Object(Default::default())
        } else {
            match serde_json::from_str(&call.arguments) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(tool = %call.name, "invalid tool arguments: {}", e);
                    return format!("Error: invalid arguments for '{}': {}", call.name, e);
                }
            }
        };

        tracing::info!(tool = %call.name, "running tool");
        tool.call(arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    /// Replays canned replies and records every transcript it was shown.
    struct ScriptedModel {
        replies: Mutex<VecDeque<Message>>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Message>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, messages: &[Message], _tools: &[ToolSpec]) -> AgentResult<Message> {
            self.seen.lock().await.push(messages.to_vec());
            self.replies
                .lock()
                .await
                .pop_front()
                .ok_or(AgentError::EmptyResponse)
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    /// Model that asks for a search on every turn.
    struct LoopingModel;

    #[async_trait]
    impl ChatModel for LoopingModel {
        async fn complete(&self, messages: &[Message], _tools: &[ToolSpec]) -> AgentResult<Message> {
            Ok(Message::assistant_tool_calls(
                "",
                vec![ToolCall {
                    id: format!("call_{}", messages.len()),
                    name: "echo".into(),
                    arguments: r#"{"query":"again"}"#.into(),
                }],
            ))
        }

        fn model_name(&self) -> &str {
            "looping"
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "echo".into(),
                description: "Echo the query".into(),
                parameters: serde_json::json!({"type": "object"}),
            }
        }

        async fn call(&self, arguments: serde_json::Value) -> String {
            format!("echo: {}", arguments["query"].as_str().unwrap_or_default())
        }
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    #[tokio::test]
    async fn test_answer_without_tools() {
        let model = Arc::new(ScriptedModel::new(vec![Message::assistant("Drink water.")]));
        let agent = Agent::new(model.clone()).with_tool(Arc::new(EchoTool));

        let reply = agent
            .run(vec![Message::system("be helpful"), Message::user("hi")])
            .await
            .unwrap();
        assert_eq!(reply, "Drink water.");
        assert_eq!(model.seen.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let model = Arc::new(ScriptedModel::new(vec![
            Message::assistant_tool_calls(
                "",
                vec![
                    call("a", "echo", r#"{"query":"headache causes"}"#),
                    call("b", "echo", r#"{"query":"headache remedies"}"#),
                ],
            ),
            Message::assistant("Confidence: 80%"),
        ]));
        let agent = Agent::new(model.clone()).with_tool(Arc::new(EchoTool));

        let transcript = agent.invoke(vec![Message::user("headache")]).await.unwrap();
        let roles: Vec<Role> = transcript.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::Tool, Role::Tool, Role::Assistant]
        );
        assert_eq!(transcript[2].tool_call_id.as_deref(), Some("a"));
        assert_eq!(transcript[2].content, "echo: headache causes");
        assert_eq!(transcript[3].tool_call_id.as_deref(), Some("b"));

        // Second model call saw the tool results
        let seen = model.seen.lock().await;
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].len(), 4);
    }

    #[tokio::test]
    async fn test_tool_errors_are_reported_to_model() {
        let model = Arc::new(ScriptedModel::new(vec![
            Message::assistant_tool_calls(
                "",
                vec![call("x", "weather", "{}"), call("y", "echo", "{not json")],
            ),
            Message::assistant("done"),
        ]));
        let agent = Agent::new(model).with_tool(Arc::new(EchoTool));

        let transcript = agent.invoke(vec![Message::user("q")]).await.unwrap();
        assert!(transcript[2].content.contains("unknown tool 'weather'"));
        assert!(transcript[3].content.contains("invalid arguments for 'echo'"));
        assert_eq!(transcript.last().unwrap().content, "done");
    }

    #[tokio::test]
    async fn test_step_limit() {
        let agent = Agent::new(Arc::new(LoopingModel))
            .with_tool(Arc::new(EchoTool))
            .with_max_steps(3);

        let err = agent.run(vec![Message::user("q")]).await.unwrap_err();
        assert!(matches!(err, AgentError::StepLimit(3)));
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let agent = Agent::new(Arc::new(ScriptedModel::new(vec![])));
        let err = agent.run(vec![Message::user("q")]).await.unwrap_err();
        assert!(matches!(err, AgentError::EmptyResponse));
    }
}
