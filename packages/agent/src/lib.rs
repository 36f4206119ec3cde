//! # Agent crate — hosted model + web search
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`agent`] | The model ↔ tool loop and its [`ChatModel`] / [`Tool`] seams |
//! | [`groq`] | [`GroqClient`], an OpenAI-compatible chat client |
//! | [`tavily`] | [`TavilySearch`], the `medical_web_search` tool |
//! | [`prompts`] | System prompts and chat mode detection |
//! | [`inspect`] | Reading scores and flags out of final answers |

pub mod agent;
pub mod error;
pub mod groq;
pub mod inspect;
pub mod message;
pub mod prompts;
pub mod tavily;

pub use agent::{Agent, ChatModel, Tool, DEFAULT_MAX_STEPS};
pub use error::{AgentError, AgentResult};
pub use groq::{GroqClient, GroqConfig};
pub use message::{Message, Role, ToolCall, ToolSpec};
pub use tavily::{TavilyConfig, TavilySearch};
