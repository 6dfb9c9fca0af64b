use std::future::Future;
use std::io::Write;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::commands::{self, process_input, RoomKind, ShellCommand};
use crate::core::completion::CompletionClient;
use crate::core::conversation::{ConversationController, StreamOutcome};
use crate::core::session::Session;
use crate::ui::prompts::{self, LineSource, PROMPT};
use crate::ui::render;
use crate::utils::clipboard::{copy_to_clipboard, ClipboardQueue};
use crate::utils::line_editor::{Completer, LineEditorError, LineEditorOptions, ReadLine};
use crate::utils::logging::TranscriptLog;

const CANNOT_CONTINUE: &str = "You can't continue yet. Use command 'say' to say something.";

pub type ClipboardWriter = fn(&str) -> Result<(), String>;

#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Ask before sending each `say`.
    pub confirm_say: bool,
    pub clipboard_chunk_size: Option<usize>,
    /// Cancel a running stream on Ctrl+C.
    pub interrupt_on_ctrl_c: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            confirm_say: true,
            clipboard_chunk_size: None,
            interrupt_on_ctrl_c: true,
        }
    }
}

enum Streamed<'t> {
    Say(&'t str),
    Continue,
    Retry,
}

/// The interactive loop: reads a line, runs the command, repeats until
/// `quit`, Ctrl+C on an empty line or end of input.
pub struct Shell<'a, W: Write + Send> {
    session: Session,
    client: &'a dyn CompletionClient,
    options: ShellOptions,
    transcript: TranscriptLog,
    clipboard: ClipboardQueue,
    copy: ClipboardWriter,
    history: Vec<String>,
    out: W,
}

impl<'a, W: Write + Send> Shell<'a, W> {
    pub fn new(
        session: Session,
        client: &'a dyn CompletionClient,
        options: ShellOptions,
        transcript: TranscriptLog,
        out: W,
    ) -> Self {
        Self {
            session,
            client,
            options,
            transcript,
            clipboard: ClipboardQueue::new(),
            copy: copy_to_clipboard,
            history: Vec::new(),
            out,
        }
    }

    pub fn with_clipboard_writer(mut self, copy: ClipboardWriter) -> Self {
        self.copy = copy;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub async fn run<I: LineSource>(&mut self, input: &mut I) -> Result<(), LineEditorError> {
        let banner = render::banner(self.session.scenario());
        self.emit(&banner);
        self.note(self.transcript.log_event(&format!(
            "Scenario: {}",
            self.session.scenario().name
        )));

        loop {
            let completer: Completer<'_> = &commands::completions;
            let options = LineEditorOptions {
                initial_text: String::new(),
                history: &self.history,
                completer: Some(completer),
            };
            let line = match input.read_line(PROMPT, &options)? {
                ReadLine::Line(line) => line,
                ReadLine::Interrupted | ReadLine::Eof => break,
            };
            self.remember(&line);

            let command = process_input(&line);
            debug!(?command, "shell command");
            if !self.dispatch(command, input).await? {
                break;
            }
        }
        Ok(())
    }

    /// Runs one command. `false` ends the shell.
    async fn dispatch<I: LineSource>(
        &mut self,
        command: ShellCommand,
        input: &mut I,
    ) -> Result<bool, LineEditorError> {
        match command {
            ShellCommand::Quit => return Ok(false),
            ShellCommand::Empty => {}
            ShellCommand::New(kind) => self.new_room(kind, input)?,
            ShellCommand::Say(text) => {
                if self.options.confirm_say
                    && !prompts::ask_yes_no(input, &mut self.out, prompts::DO_YOU_WANT_TO_CONTINUE)?
                {
                    return Ok(true);
                }
                self.note(self.transcript.log_user(&text));
                self.stream(Streamed::Say(&text)).await;
            }
            ShellCommand::Continue => {
                if !self.stream(Streamed::Continue).await {
                    self.emit_line(CANNOT_CONTINUE);
                }
            }
            ShellCommand::Retry => {
                if !self.session.prepare_retry() {
                    self.emit_line("nothing to retry");
                    return Ok(true);
                }
                self.note(self.transcript.log_event("Retrying last reply"));
                self.stream(Streamed::Retry).await;
            }
            ShellCommand::Undo => {
                let removed = self.session.undo();
                if removed.is_empty() {
                    self.emit_line("nothing to undo");
                } else {
                    self.note(self.transcript.log_event("Undid last exchange"));
                }
            }
            ShellCommand::ShowContext => {
                let listing =
                    render::format_context(self.session.messages(), render::terminal_width());
                self.emit(&listing);
            }
            ShellCommand::Copy => self.copy_reply(),
            ShellCommand::Help | ShellCommand::Invalid(_) => self.emit(&commands::usage()),
            ShellCommand::Rejected(message) => self.emit_line(&message),
        }
        Ok(true)
    }

    fn new_room<I: LineSource>(
        &mut self,
        kind: RoomKind,
        input: &mut I,
    ) -> Result<(), LineEditorError> {
        let extra = prompts::ask_room_detail(input, &mut self.out)?;
        self.session.new_context(kind.is_dungeon(), &extra);
        self.clipboard.clear();

        let (event, message) = match kind {
            RoomKind::Dungeon => ("New dungeon room", "Created new dungeon room."),
            RoomKind::Room => ("New room", "Created new room."),
        };
        if extra.is_empty() {
            self.note(self.transcript.log_event(event));
        } else {
            self.note(self.transcript.log_event(&format!("{event}: {extra}")));
        }
        self.emit_line(message);
        Ok(())
    }

    /// Streams a reply to the terminal. `false` when there was nothing to
    /// send.
    async fn stream(&mut self, action: Streamed<'_>) -> bool {
        let cancel = CancellationToken::new();
        let out = &mut self.out;
        let mut sink = |fragment: &str| {
            let _ = out.write_all(fragment.as_bytes());
            let _ = out.flush();
        };
        let mut controller = ConversationController::new(&mut self.session, self.client);

        let request = async {
            match action {
                Streamed::Say(text) => controller.say(text, &mut sink, &cancel).await.ok(),
                Streamed::Continue => controller.continue_story(&mut sink, &cancel).await,
                Streamed::Retry => controller.retry(&mut sink, &cancel).await,
            }
        };
        let outcome = if self.options.interrupt_on_ctrl_c {
            cancel_on_ctrl_c(request, &cancel).await
        } else {
            request.await
        };

        let Some(outcome) = outcome else {
            return false;
        };
        self.emit_line("");
        match outcome {
            StreamOutcome::Completed(text) => self.note(self.transcript.log_assistant(&text)),
            StreamOutcome::Failed => {}
            StreamOutcome::Cancelled => self.emit_line("(interrupted)"),
        }
        true
    }

    fn copy_reply(&mut self) {
        let chunk = self
            .clipboard
            .next_chunk(self.session.last_reply(), self.options.clipboard_chunk_size);
        let Some(chunk) = chunk else {
            self.emit_line("nothing to copy");
            return;
        };

        match (self.copy)(&chunk) {
            Ok(()) => match self.clipboard.remaining() {
                0 => self.emit_line("copied to clipboard"),
                left => self.emit_line(&format!(
                    "copied to clipboard ({left} more part{}, use 'copy' again)",
                    if left == 1 { "" } else { "s" }
                )),
            },
            Err(err) => self.emit_line(&format!("Failed to copy: {err}")),
        }
    }

    fn remember(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || self.history.last().map(String::as_str) == Some(line) {
            return;
        }
        self.history.push(line.to_string());
    }

    fn note(&self, result: std::io::Result<()>) {
        if let Err(err) = result {
            warn!("Failed to write transcript: {err}");
        }
    }

    fn emit(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    fn emit_line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

/// Polls `request` to completion, cancelling `cancel` on the first Ctrl+C.
/// The request is expected to notice the token and wind down by itself.
async fn cancel_on_ctrl_c<F: Future>(request: F, cancel: &CancellationToken) -> F::Output {
    tokio::pin!(request);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            biased;
            output = &mut request => return output,
            signal = &mut ctrl_c, if !cancel.is_cancelled() => {
                if let Err(err) = signal {
                    warn!("Failed to listen for Ctrl+C: {err}");
                }
                cancel.cancel();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;
    use crate::core::session::SessionSettings;
    use crate::utils::test_utils::{forest_scenario, Script, ScriptedClient, ScriptedInput};
    use std::fs;
    use tempfile::TempDir;

    fn options() -> ShellOptions {
        ShellOptions {
            confirm_say: false,
            clipboard_chunk_size: None,
            interrupt_on_ctrl_c: false,
        }
    }

    fn session() -> Session {
        Session::new(forest_scenario(), SessionSettings::default())
    }

    fn no_clipboard(_: &str) -> Result<(), String> {
        Ok(())
    }

    fn failing_clipboard(_: &str) -> Result<(), String> {
        Err("no clipboard tool found".to_string())
    }

    fn output(shell: &Shell<'_, Vec<u8>>) -> String {
        String::from_utf8(shell.output().clone()).unwrap()
    }

    #[tokio::test]
    async fn say_streams_reply_and_stores_it() {
        let client = ScriptedClient::new(vec![Script::fragments(&["The wind ", "howls."])]);
        let mut shell = Shell::new(session(), &client, options(), TranscriptLog::disabled(), Vec::new());
        let mut input = ScriptedInput::new(&["say I listen.", "quit"]);

        shell.run(&mut input).await.unwrap();

        let text = output(&shell);
        assert!(text.contains("The wind howls.\n"));
        let last = shell.session().messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "The wind howls.");
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn declined_say_sends_nothing() {
        let client = ScriptedClient::new(vec![Script::reply("unused")]);
        let opts = ShellOptions {
            confirm_say: true,
            ..options()
        };
        let mut shell = Shell::new(session(), &client, opts, TranscriptLog::disabled(), Vec::new());
        let mut input = ScriptedInput::new(&["say hello", "n"]);

        shell.run(&mut input).await.unwrap();

        assert!(client.requests().is_empty());
        assert!(output(&shell).contains("Do you want to continue? (y/n) \n"));
        assert!(!shell.session().was_last_message_from_user());
    }

    #[tokio::test]
    async fn continue_needs_a_pending_user_message() {
        let client = ScriptedClient::new(vec![]);
        let mut shell = Shell::new(session(), &client, options(), TranscriptLog::disabled(), Vec::new());
        let mut input = ScriptedInput::new(&["continue"]);

        shell.run(&mut input).await.unwrap();

        assert!(output(&shell).contains(CANNOT_CONTINUE));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn failed_say_can_be_continued() {
        let client = ScriptedClient::new(vec![Script::fail("boom"), Script::reply("Recovered.")]);
        let mut shell = Shell::new(session(), &client, options(), TranscriptLog::disabled(), Vec::new());
        let mut input = ScriptedInput::new(&["say Hello?", "continue"]);

        shell.run(&mut input).await.unwrap();

        assert_eq!(client.requests().len(), 2);
        assert_eq!(shell.session().last_reply(), "Recovered.");
    }

    #[tokio::test]
    async fn undo_and_retry_report_when_there_is_nothing_to_do() {
        let client = ScriptedClient::new(vec![]);
        let mut shell = Shell::new(session(), &client, options(), TranscriptLog::disabled(), Vec::new());
        let mut input = ScriptedInput::new(&["undo", "retry"]);

        shell.run(&mut input).await.unwrap();

        let text = output(&shell);
        assert!(text.contains("nothing to undo\n"));
        assert!(text.contains("nothing to retry\n"));
    }

    #[tokio::test]
    async fn new_dungeon_room_uses_confirmed_detail() {
        let client = ScriptedClient::new(vec![]);
        let mut shell = Shell::new(session(), &client, options(), TranscriptLog::disabled(), Vec::new());
        let mut input = ScriptedInput::new(&["new dungeon", "y", "A trap.", "y"]);

        shell.run(&mut input).await.unwrap();

        assert!(shell.session().context().is_dungeon());
        let framing = shell.session().context().framing();
        assert!(framing.iter().any(|m| m.content.contains("A trap.")));
        assert!(output(&shell).contains("Created new dungeon room.\n"));
    }

    #[tokio::test]
    async fn show_context_lists_messages() {
        let client = ScriptedClient::new(vec![]);
        let mut shell = Shell::new(session(), &client, options(), TranscriptLog::disabled(), Vec::new());
        let mut input = ScriptedInput::new(&["show context"]);

        shell.run(&mut input).await.unwrap();

        let text = output(&shell);
        assert!(text.contains("Current context building:\n1)\n\trole:\tsystem\n"));
    }

    #[tokio::test]
    async fn unknown_input_prints_usage_and_rejections_print_reason() {
        let client = ScriptedClient::new(vec![]);
        let mut shell = Shell::new(session(), &client, options(), TranscriptLog::disabled(), Vec::new());
        let mut input = ScriptedInput::new(&["dance", "new castle"]);

        shell.run(&mut input).await.unwrap();

        let text = output(&shell);
        assert!(text.contains("commands:\n"));
        assert!(text.contains("invalid target: castle\n"));
    }

    #[tokio::test]
    async fn copy_walks_through_chunks() {
        let client = ScriptedClient::new(vec![Script::reply("abcdef")]);
        let opts = ShellOptions {
            clipboard_chunk_size: Some(4),
            ..options()
        };
        let mut shell = Shell::new(session(), &client, opts, TranscriptLog::disabled(), Vec::new())
            .with_clipboard_writer(no_clipboard);
        let mut input = ScriptedInput::new(&["copy", "say Go on.", "copy", "copy"]);

        shell.run(&mut input).await.unwrap();

        let text = output(&shell);
        assert!(text.contains("nothing to copy\n"));
        assert!(text.contains("copied to clipboard (1 more part, use 'copy' again)\n"));
        assert!(text.ends_with("copied to clipboard\n"));
    }

    #[tokio::test]
    async fn copy_failures_are_reported() {
        let client = ScriptedClient::new(vec![Script::reply("text")]);
        let mut shell = Shell::new(session(), &client, options(), TranscriptLog::disabled(), Vec::new())
            .with_clipboard_writer(failing_clipboard);
        let mut input = ScriptedInput::new(&["say hi", "copy"]);

        shell.run(&mut input).await.unwrap();

        assert!(output(&shell).contains("Failed to copy: no clipboard tool found\n"));
    }

    #[tokio::test]
    async fn interrupt_on_empty_line_quits() {
        let client = ScriptedClient::new(vec![Script::reply("unused")]);
        let mut shell = Shell::new(session(), &client, options(), TranscriptLog::disabled(), Vec::new());
        let mut input = ScriptedInput::from_reads(vec![
            ReadLine::Interrupted,
            ReadLine::Line("say too late".to_string()),
        ]);

        shell.run(&mut input).await.unwrap();

        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn transcript_records_the_exchange() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("talk.log");
        let client = ScriptedClient::new(vec![Script::reply("Leaves rustle.")]);
        let transcript = TranscriptLog::new(Some(path.clone()));
        let mut shell = Shell::new(session(), &client, options(), transcript, Vec::new());
        let mut input = ScriptedInput::new(&["say I wait."]);

        shell.run(&mut input).await.unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "## Scenario: Forest\n\nYou: I wait.\n\nLeaves rustle.\n\n"
        );
    }

    #[tokio::test]
    async fn transcript_records_events_only_when_they_happen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("talk.log");
        let client = ScriptedClient::new(vec![Script::reply("A."), Script::reply("B.")]);
        let transcript = TranscriptLog::new(Some(path.clone()));
        let mut shell = Shell::new(session(), &client, options(), transcript, Vec::new());
        let mut input = ScriptedInput::new(&[
            "say Hi",
            "retry",
            "undo",
            "retry",
            "new dungeon",
            "y",
            "A trap.",
            "y",
        ]);

        shell.run(&mut input).await.unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "## Scenario: Forest\n\n\
             You: Hi\n\n\
             A.\n\n\
             ## Retrying last reply\n\n\
             B.\n\n\
             ## Undid last exchange\n\n\
             ## New dungeon room: A trap.\n\n"
        );
        assert!(output(&shell).contains("nothing to retry\n"));
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn history_skips_blank_and_repeated_lines() {
        let client = ScriptedClient::new(vec![]);
        let mut shell = Shell::new(session(), &client, options(), TranscriptLog::disabled(), Vec::new());
        let mut input = ScriptedInput::new(&["help", "help", "", "undo"]);

        shell.run(&mut input).await.unwrap();

        assert_eq!(shell.history, vec!["help".to_string(), "undo".to_string()]);
    }
}
