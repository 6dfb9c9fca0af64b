use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::core::completion::CompletionClient;
use crate::core::session::{Session, SessionError};

/// How a streamed completion ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The stream finished; carries the full assistant text.
    Completed(String),
    /// The backend failed. Fragments already delivered stay delivered; the
    /// context was not changed.
    Failed,
    /// The caller cancelled the stream. Same context guarantees as `Failed`.
    Cancelled,
}

/// Drives completions for a session. Every completion error is logged here
/// and turned into an empty or failed outcome; nothing propagates upward.
pub struct ConversationController<'a> {
    session: &'a mut Session,
    client: &'a dyn CompletionClient,
}

impl<'a> ConversationController<'a> {
    pub fn new(session: &'a mut Session, client: &'a dyn CompletionClient) -> Self {
        Self { session, client }
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    /// Blocking-style completion. Returns the reply, or an empty string when
    /// the request failed.
    pub async fn complete_sync(&mut self) -> String {
        let request = self.session.prepare_request();
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "requesting completion"
        );

        match self.client.complete(&request).await {
            Ok(text) => {
                self.session.append_assistant_message(&text);
                text
            }
            Err(err) => {
                error!("Error creating chat completion: {err}");
                String::new()
            }
        }
    }

    /// Streamed completion. `on_fragment` sees each text fragment as it
    /// arrives; the assistant message is appended only once the stream has
    /// finished cleanly.
    pub async fn complete_streaming(
        &mut self,
        on_fragment: &mut (dyn for<'s> FnMut(&'s str) + Send),
        cancel: &CancellationToken,
    ) -> StreamOutcome {
        let request = self.session.prepare_request();
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "requesting streamed completion"
        );

        let mut full_response = String::new();
        let result = {
            let mut forward = |fragment: &str| {
                full_response.push_str(fragment);
                on_fragment(fragment);
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.client.stream(&request, &mut forward) => Some(result),
            }
        };

        match result {
            Some(Ok(())) if full_response.is_empty() => {
                warn!("stream finished without any content, nothing appended");
                StreamOutcome::Completed(full_response)
            }
            Some(Ok(())) => {
                self.session.append_assistant_message(&full_response);
                StreamOutcome::Completed(full_response)
            }
            Some(Err(err)) => {
                error!("Stream error: {err}");
                StreamOutcome::Failed
            }
            None => {
                warn!(
                    received = full_response.len(),
                    "stream cancelled, discarding partial reply"
                );
                StreamOutcome::Cancelled
            }
        }
    }

    /// Append a user message and stream the narrator's answer.
    pub async fn say(
        &mut self,
        text: &str,
        on_fragment: &mut (dyn for<'s> FnMut(&'s str) + Send),
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, SessionError> {
        self.session.add_user_message(text)?;
        Ok(self.complete_streaming(on_fragment, cancel).await)
    }

    /// Stream an answer to a user message that has none yet. Returns `None`
    /// when the context does not end with a user message.
    pub async fn continue_story(
        &mut self,
        on_fragment: &mut (dyn for<'s> FnMut(&'s str) + Send),
        cancel: &CancellationToken,
    ) -> Option<StreamOutcome> {
        if !self.session.was_last_message_from_user() {
            return None;
        }
        Some(self.complete_streaming(on_fragment, cancel).await)
    }

    /// Regenerate the last assistant reply. Returns `None` when there is no
    /// user message to answer.
    pub async fn retry(
        &mut self,
        on_fragment: &mut (dyn for<'s> FnMut(&'s str) + Send),
        cancel: &CancellationToken,
    ) -> Option<StreamOutcome> {
        if !self.session.prepare_retry() {
            return None;
        }
        Some(self.complete_streaming(on_fragment, cancel).await)
    }
}
