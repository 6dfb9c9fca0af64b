use std::error::Error;
use std::fmt;

use crate::core::completion::CompletionRequest;
use crate::core::context::{build_context, Context};
use crate::core::message::{Message, Role};
use crate::core::scenario::Scenario;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub model: String,
    /// Zero leaves the limit to the API.
    pub max_tokens: u32,
    /// When false, completions are shown but never appended to the context.
    pub store_assistant_replies: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            store_assistant_replies: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    EmptyInput,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyInput => write!(f, "Message text must not be empty"),
        }
    }
}

impl Error for SessionError {}

/// The running conversation: one scenario, one current context.
pub struct Session {
    scenario: Scenario,
    context: Context,
    settings: SessionSettings,
    last_reply: String,
}

impl Session {
    pub fn new(scenario: Scenario, settings: SessionSettings) -> Self {
        let context = Context::initial(&scenario);
        Self {
            scenario,
            context,
            settings,
            last_reply: String::new(),
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn messages(&self) -> &[Message] {
        self.context.messages()
    }

    /// Last complete assistant text, whether or not it was stored.
    pub fn last_reply(&self) -> &str {
        &self.last_reply
    }

    /// Replace the current context with a freshly framed one. The previous
    /// conversation is discarded.
    pub fn new_context(&mut self, is_dungeon: bool, extra_text: &str) {
        self.context = build_context(&self.scenario, is_dungeon, extra_text);
        self.last_reply.clear();
    }

    pub fn add_user_message(&mut self, text: &str) -> Result<&mut Self, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        self.context.push(Message::user(text));
        Ok(self)
    }

    /// Record a finished completion. Appends only when replies are stored.
    pub fn append_assistant_message(&mut self, text: &str) {
        self.last_reply = text.to_string();
        if self.settings.store_assistant_replies {
            self.context.push(Message::assistant(text));
        }
    }

    pub fn remove_last_message(&mut self) -> Option<Message> {
        self.context.remove_last()
    }

    /// Drop the last exchange: a trailing assistant reply together with the
    /// user message before it, or a lone trailing user message. Framing
    /// messages are never touched.
    pub fn undo(&mut self) -> Vec<Message> {
        let mut removed = Vec::new();
        match self.context.last_role() {
            Some(Role::Assistant) => {
                removed.extend(self.context.remove_last());
                self.last_reply.clear();
                removed.extend(self.context.remove_last());
            }
            Some(Role::User) => removed.extend(self.context.remove_last()),
            Some(Role::System) | None => {}
        }
        removed
    }

    /// First half of a retry: drop a trailing assistant reply so the next
    /// completion regenerates it. Returns true when the context now ends with
    /// a user message, i.e. a completion may be requested.
    pub fn prepare_retry(&mut self) -> bool {
        if self.was_last_message_from_assistant() {
            self.context.remove_last();
            self.last_reply.clear();
        }
        self.was_last_message_from_user()
    }

    pub fn was_last_message_from(&self, role: Role) -> bool {
        self.context.last_role() == Some(role)
    }

    pub fn was_last_message_from_user(&self) -> bool {
        self.was_last_message_from(Role::User)
    }

    pub fn was_last_message_from_assistant(&self) -> bool {
        self.was_last_message_from(Role::Assistant)
    }

    pub fn prepare_request(&self) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: self.context.messages().to_vec(),
            max_tokens: (self.settings.max_tokens > 0).then_some(self.settings.max_tokens),
        }
    }
}
