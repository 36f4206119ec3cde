use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model returned no choices")]
    EmptyResponse,

    #[error("Agent stopped after {0} model calls without a final answer")]
    StepLimit(usize),
}

pub type AgentResult<T> = Result<T, AgentError>;
