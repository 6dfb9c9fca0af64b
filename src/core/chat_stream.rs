use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use memchr::memchr;
use tracing::{debug, warn};

use crate::api::{ChatCompletionResponse, ChatRequest, ChatResponse};
use crate::core::completion::{CompletionClient, CompletionError, CompletionRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
enum SseEvent {
    Fragment(String),
    Done,
    Error(String),
    Skip,
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

fn handle_data_payload(payload: &str) -> SseEvent {
    if payload == "[DONE]" {
        return SseEvent::Done;
    }

    match serde_json::from_str::<ChatResponse>(payload) {
        Ok(response) => response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
            .map(SseEvent::Fragment)
            .unwrap_or(SseEvent::Skip),
        Err(_) => {
            if payload.trim().is_empty() {
                return SseEvent::Skip;
            }
            SseEvent::Error(format_api_error(payload))
        }
    }
}

fn process_sse_line(line: &str) -> SseEvent {
    extract_data_payload(line)
        .map(handle_data_payload)
        .unwrap_or(SseEvent::Skip)
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.trim().to_string()
    })
}

/// Render an API error body for the terminal: a one-line summary when the
/// body carries one, followed by the body itself.
pub fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "API Error: <empty>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Ok(pretty_json) = serde_json::to_string_pretty(&json_value) {
            if let Some(summary) = extract_error_summary(&json_value) {
                if !summary.is_empty() {
                    return format!("API Error: {}\n{}", summary, pretty_json);
                }
            }
            return format!("API Error:\n{}", pretty_json);
        }
    }

    format!("API Error: {}", trimmed)
}

/// Feed one SSE line to the caller. Returns `Some` once the stream is over.
fn dispatch_line(
    line: &[u8],
    on_fragment: &mut (dyn for<'s> FnMut(&'s str) + Send),
) -> Option<Result<(), CompletionError>> {
    let event = match std::str::from_utf8(line) {
        Ok(text) => process_sse_line(text.trim()),
        Err(e) => {
            warn!("Invalid UTF-8 in stream: {e}");
            SseEvent::Skip
        }
    };

    match event {
        SseEvent::Fragment(text) => {
            on_fragment(&text);
            None
        }
        SseEvent::Done => Some(Ok(())),
        SseEvent::Error(message) => Some(Err(CompletionError::Status {
            status: None,
            message,
        })),
        SseEvent::Skip => None,
    }
}

/// `{base}/chat/completions`, tolerating trailing slashes on the base.
pub fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

/// Completion backend for OpenAI-compatible `chat/completions` endpoints.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().connect_timeout(timeout).build()?;
        Ok(Self::with_http_client(client, base_url, api_key, timeout))
    }

    pub fn with_http_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    fn post(&self, body: &ChatRequest) -> reqwest::RequestBuilder {
        let chat_url = chat_completions_url(&self.base_url);
        self.client
            .post(chat_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
    }

    fn transport_error(&self, err: reqwest::Error) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout(self.timeout)
        } else {
            CompletionError::Transport(err.to_string())
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, CompletionError> {
        let response = match tokio::time::timeout(self.timeout, request.send()).await {
            Ok(result) => result.map_err(|err| self.transport_error(err))?,
            Err(_) => return Err(CompletionError::Timeout(self.timeout)),
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(CompletionError::Status {
                status: Some(status),
                message: format_api_error(&error_text),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = request.to_chat_request(false);
        let response = self.send(self.post(&body).timeout(self.timeout)).await?;
        let text = response
            .text()
            .await
            .map_err(|err| self.transport_error(err))?;

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|err| CompletionError::Decode(err.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or(CompletionError::EmptyResponse)
    }

    async fn stream(
        &self,
        request: &CompletionRequest,
        on_fragment: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<(), CompletionError> {
        let body = request.to_chat_request(true);
        let response = self.send(self.post(&body)).await?;

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        loop {
            let chunk = match tokio::time::timeout(self.timeout, stream.next()).await {
                Err(_) => return Err(CompletionError::Timeout(self.timeout)),
                Ok(None) => break,
                Ok(Some(Err(err))) => return Err(self.transport_error(err)),
                Ok(Some(Ok(bytes))) => bytes,
            };
            buffer.extend_from_slice(&chunk);

            while let Some(newline_pos) = memchr(b'\n', &buffer) {
                let finished = dispatch_line(&buffer[..newline_pos], on_fragment);
                buffer.drain(..=newline_pos);
                if let Some(result) = finished {
                    return result;
                }
            }
        }

        if !buffer.is_empty() {
            if let Some(result) = dispatch_line(&buffer, on_fragment) {
                return result;
            }
        }

        debug!("stream ended without [DONE] marker");
        Ok(())
    }
}
