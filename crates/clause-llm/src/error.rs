//! Error type for LLM oracle calls.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm oracle unavailable: {0}")]
    Unavailable(String),

    #[error("llm oracle returned an unusable response: {0}")]
    InvalidResponse(String),
}

pub type LlmResult<T> = Result<T, LlmError>;
