use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use std::time::Duration;

use crate::api::{ChatMessage, ChatRequest};
use crate::core::message::Message;

/// What the engine hands to a completion backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn to_chat_request(&self, stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: self
                .messages
                .iter()
                .map(|message| ChatMessage {
                    role: message.role.as_str().to_string(),
                    content: message.content.clone(),
                })
                .collect(),
            stream,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug)]
pub enum CompletionError {
    /// The request never produced a usable HTTP response, or the body broke off.
    Transport(String),
    /// The API answered with an error status or an in-stream error payload.
    Status {
        status: Option<u16>,
        message: String,
    },
    /// The response body was not the JSON we expected.
    Decode(String),
    /// A successful response without any choice to read.
    EmptyResponse,
    /// No data arrived within the configured timeout.
    Timeout(Duration),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::Transport(message) => write!(f, "Transport error: {message}"),
            CompletionError::Status {
                status: Some(status),
                message,
            } => write!(f, "HTTP {status}: {message}"),
            CompletionError::Status {
                status: None,
                message,
            } => write!(f, "{message}"),
            CompletionError::Decode(message) => write!(f, "Invalid response: {message}"),
            CompletionError::EmptyResponse => write!(f, "The API returned no choices"),
            CompletionError::Timeout(duration) => {
                write!(f, "No response within {}s", duration.as_secs())
            }
        }
    }
}

impl Error for CompletionError {}

/// Backend that turns a request into assistant text.
///
/// `stream` must call `on_fragment` on the awaiting task, once per text
/// fragment, in arrival order, and return only after the stream has ended.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;

    async fn stream(
        &self,
        request: &CompletionRequest,
        on_fragment: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<(), CompletionError>;
}
