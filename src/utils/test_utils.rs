use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::completion::{CompletionClient, CompletionError, CompletionRequest};
use crate::core::scenario::Scenario;
use crate::ui::prompts::LineSource;
use crate::utils::line_editor::{LineEditorError, LineEditorOptions, ReadLine};

pub fn forest_scenario() -> Scenario {
    Scenario {
        name: "Forest".to_string(),
        description: "A grim walk through the woods.".to_string(),
        narrator_personality: "grim".to_string(),
        world_building: "A dark wood.".to_string(),
        dungeon_room_building: "A damp cave.".to_string(),
    }
}

pub enum Script {
    Reply(String),
    Fragments(Vec<String>),
    Fail(String),
    FailAfter(Vec<String>, String),
    CancelAfter(Vec<String>, CancellationToken),
}

impl Script {
    pub fn reply(text: &str) -> Self {
        Script::Reply(text.to_string())
    }

    pub fn fragments(fragments: &[&str]) -> Self {
        Script::Fragments(to_owned(fragments))
    }

    pub fn fail(message: &str) -> Self {
        Script::Fail(message.to_string())
    }

    pub fn fail_after(fragments: &[&str], message: &str) -> Self {
        Script::FailAfter(to_owned(fragments), message.to_string())
    }

    pub fn cancel_after(fragments: &[&str], token: CancellationToken) -> Self {
        Script::CancelAfter(to_owned(fragments), token)
    }
}

fn to_owned(fragments: &[&str]) -> Vec<String> {
    fragments.iter().map(|f| f.to_string()).collect()
}

/// In-memory completion backend that plays back one script per request and
/// records every request it receives.
pub struct ScriptedClient {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_script(&self, request: &CompletionRequest) -> Option<Script> {
        self.requests.lock().unwrap().push(request.clone());
        self.scripts.lock().unwrap().pop_front()
    }
}

fn transport(message: String) -> CompletionError {
    CompletionError::Transport(message)
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        match self.next_script(request) {
            Some(Script::Reply(text)) => Ok(text),
            Some(Script::Fragments(fragments)) => Ok(fragments.concat()),
            Some(Script::Fail(message)) | Some(Script::FailAfter(_, message)) => {
                Err(transport(message))
            }
            Some(Script::CancelAfter(..)) | None => {
                Err(transport("no scripted response".to_string()))
            }
        }
    }

    async fn stream(
        &self,
        request: &CompletionRequest,
        on_fragment: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<(), CompletionError> {
        match self.next_script(request) {
            Some(Script::Reply(text)) => {
                on_fragment(&text);
                Ok(())
            }
            Some(Script::Fragments(fragments)) => {
                fragments.iter().for_each(|f| on_fragment(f));
                Ok(())
            }
            Some(Script::Fail(message)) => Err(transport(message)),
            Some(Script::FailAfter(fragments, message)) => {
                fragments.iter().for_each(|f| on_fragment(f));
                Err(transport(message))
            }
            Some(Script::CancelAfter(fragments, token)) => {
                fragments.iter().for_each(|f| on_fragment(f));
                token.cancel();
                std::future::pending::<()>().await;
                Ok(())
            }
            None => Err(transport("no scripted response".to_string())),
        }
    }
}

/// Line source that answers prompts from a fixed list, then reports end of
/// input. Records the text each prompt was prefilled with.
pub struct ScriptedInput {
    lines: VecDeque<ReadLine>,
    initial_texts: Vec<String>,
}

impl ScriptedInput {
    pub fn new(lines: &[&str]) -> Self {
        Self::from_reads(
            lines
                .iter()
                .map(|line| ReadLine::Line(line.to_string()))
                .collect(),
        )
    }

    pub fn from_reads(reads: Vec<ReadLine>) -> Self {
        Self {
            lines: reads.into(),
            initial_texts: Vec::new(),
        }
    }

    pub fn initial_texts(&self) -> Vec<&str> {
        self.initial_texts.iter().map(String::as_str).collect()
    }
}

impl LineSource for ScriptedInput {
    fn read_line(
        &mut self,
        _prompt: &str,
        options: &LineEditorOptions<'_>,
    ) -> Result<ReadLine, LineEditorError> {
        self.initial_texts.push(options.initial_text.clone());
        Ok(self.lines.pop_front().unwrap_or(ReadLine::Eof))
    }
}
