use serde::{Deserialize, Serialize};

use crate::services::llm::{ChatRequest, ChatResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NotificationContent {
    /// The agent finished a call; carries the final reply on success.
    Done(Success, Response),
    PromptRequest(ChatRequest),
    PromptSuccessResult(ChatResponse),
    PromptErrorResult(String),
    /// A failed attempt that will be retried, or was the last one.
    Retry(RetryAttempt),
    Token(Token),
}

pub type Success = bool;
pub type Response = Option<String>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub tag: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryAttempt {
    pub attempt: usize,
    pub max_retries: usize,
    pub error: String,
}
