//! Single-line terminal editor for the shell prompt and its follow-up
//! questions: Emacs keys, history and tab completion.

use crate::utils::input::sanitize_text_input;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineEditorState {
    pub text: String,
    pub cursor: usize,
    /// Position while browsing history; `None` means editing the draft.
    pub history_index: Option<usize>,
    draft: String,
}

impl LineEditorState {
    pub fn with_text(text: String) -> Self {
        let cursor = text.chars().count();
        Self {
            text,
            cursor,
            ..Default::default()
        }
    }

    fn replace_text(&mut self, text: String) {
        self.cursor = text.chars().count();
        self.text = text;
    }
}

pub type Completer<'a> = &'a dyn Fn(&str) -> Vec<String>;

#[derive(Clone, Default)]
pub struct LineEditorOptions<'a> {
    pub initial_text: String,
    /// Oldest first.
    pub history: &'a [String],
    pub completer: Option<Completer<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEditAction {
    Insert(char),
    Backspace,
    Delete,
    MoveLeft,
    MoveRight,
    MoveStart,
    MoveEnd,
    DeleteToEnd,
    DeleteWord,
    ClearAll,
    HistoryPrev,
    HistoryNext,
    Complete,
    Paste(String),
    Submit,
    /// Ctrl+C: clears a non-empty line, interrupts an empty one.
    Interrupt,
    /// Ctrl+D: deletes forward on a non-empty line, ends input on an empty one.
    EndOfInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEditOutcome {
    Continue { redraw: bool },
    ShowCandidates(Vec<String>),
    Submit(String),
    Interrupted,
    Eof,
}

/// What a finished prompt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    Line(String),
    Interrupted,
    Eof,
}

#[derive(Debug, Clone)]
pub struct LineEditorError {
    message: String,
}

impl LineEditorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for LineEditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LineEditorError {}

fn io_err(err: io::Error) -> LineEditorError {
    LineEditorError::new(err.to_string())
}

pub fn prompt_line_editor(
    prompt: &str,
    options: &LineEditorOptions<'_>,
) -> Result<ReadLine, LineEditorError> {
    enable_raw_mode().map_err(io_err)?;
    let mut stdout = io::stdout();
    execute!(stdout, event::EnableBracketedPaste).map_err(io_err)?;

    let result = (|| -> Result<ReadLine, LineEditorError> {
        let mut state = LineEditorState::with_text(options.initial_text.clone());
        let mut needs_redraw = true;

        loop {
            if needs_redraw {
                redraw_line(prompt, &state).map_err(io_err)?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(io_err)? {
                continue;
            }

            let action = match event::read().map_err(io_err)? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    map_key_event_to_action(&key)
                }
                Event::Paste(text) => Some(LineEditAction::Paste(sanitize_text_input(&text))),
                Event::Resize(..) => {
                    needs_redraw = true;
                    None
                }
                _ => None,
            };
            let Some(action) = action else {
                continue;
            };

            match apply_line_edit_action(&mut state, action, options) {
                LineEditOutcome::Continue { redraw } => needs_redraw = redraw,
                LineEditOutcome::ShowCandidates(candidates) => {
                    print!("\r\n{}\r\n", candidates.join("  "));
                    needs_redraw = true;
                }
                LineEditOutcome::Submit(value) => break Ok(ReadLine::Line(value)),
                LineEditOutcome::Interrupted => {
                    print!("^C");
                    break Ok(ReadLine::Interrupted);
                }
                LineEditOutcome::Eof => break Ok(ReadLine::Eof),
            }
        }
    })();

    let disable_raw_result = disable_raw_mode().map_err(io_err);
    let disable_paste_result = execute!(stdout, event::DisableBracketedPaste).map_err(io_err);
    println!();

    result.and_then(|value| {
        disable_raw_result?;
        disable_paste_result?;
        Ok(value)
    })
}

fn redraw_line(prompt: &str, state: &LineEditorState) -> io::Result<()> {
    let prefix: String = state.text.chars().take(state.cursor).collect();
    // The prompt may carry colour escapes; only its printable part takes columns.
    let prompt_width = UnicodeWidthStr::width(strip_ansi(prompt).as_str());
    let prefix_width = UnicodeWidthStr::width(prefix.as_str());

    print!("\r\x1b[K{}{}", prompt, state.text);

    let cursor_columns = prompt_width + prefix_width;
    if cursor_columns > 0 {
        print!("\r\x1b[{}C", cursor_columns);
    } else {
        print!("\r");
    }

    io::stdout().flush()
}

fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn map_key_event_to_action(key: &event::KeyEvent) -> Option<LineEditAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Some(LineEditAction::Submit),
        KeyCode::Tab => Some(LineEditAction::Complete),
        KeyCode::Backspace => Some(LineEditAction::Backspace),
        KeyCode::Delete => Some(LineEditAction::Delete),
        KeyCode::Left => Some(LineEditAction::MoveLeft),
        KeyCode::Right => Some(LineEditAction::MoveRight),
        KeyCode::Up => Some(LineEditAction::HistoryPrev),
        KeyCode::Down => Some(LineEditAction::HistoryNext),
        KeyCode::Home => Some(LineEditAction::MoveStart),
        KeyCode::End => Some(LineEditAction::MoveEnd),
        KeyCode::Char(c) if ctrl => match c {
            'a' => Some(LineEditAction::MoveStart),
            'e' => Some(LineEditAction::MoveEnd),
            'b' => Some(LineEditAction::MoveLeft),
            'f' => Some(LineEditAction::MoveRight),
            'p' => Some(LineEditAction::HistoryPrev),
            'n' => Some(LineEditAction::HistoryNext),
            'k' => Some(LineEditAction::DeleteToEnd),
            'w' => Some(LineEditAction::DeleteWord),
            'u' => Some(LineEditAction::ClearAll),
            'c' => Some(LineEditAction::Interrupt),
            'd' => Some(LineEditAction::EndOfInput),
            _ => None,
        },
        KeyCode::Char(c) => {
            if c == '\n' || c == '\r' {
                Some(LineEditAction::Submit)
            } else {
                Some(LineEditAction::Insert(c))
            }
        }
        _ => None,
    }
}

pub fn apply_line_edit_action(
    state: &mut LineEditorState,
    action: LineEditAction,
    options: &LineEditorOptions<'_>,
) -> LineEditOutcome {
    let changed = |did: bool| LineEditOutcome::Continue { redraw: did };

    match action {
        LineEditAction::Insert(c) => {
            insert_str_at_cursor(&mut state.text, state.cursor, c.encode_utf8(&mut [0; 4]));
            state.cursor += 1;
            changed(true)
        }
        LineEditAction::Backspace => {
            let removed = remove_char_before_cursor(&mut state.text, state.cursor);
            if removed {
                state.cursor -= 1;
            }
            changed(removed)
        }
        LineEditAction::Delete => changed(remove_char_at_cursor(&mut state.text, state.cursor)),
        LineEditAction::MoveLeft => {
            let moved = state.cursor > 0;
            if moved {
                state.cursor -= 1;
            }
            changed(moved)
        }
        LineEditAction::MoveRight => {
            let moved = state.cursor < state.text.chars().count();
            if moved {
                state.cursor += 1;
            }
            changed(moved)
        }
        LineEditAction::MoveStart => {
            let moved = state.cursor != 0;
            state.cursor = 0;
            changed(moved)
        }
        LineEditAction::MoveEnd => {
            let end = state.text.chars().count();
            let moved = state.cursor != end;
            state.cursor = end;
            changed(moved)
        }
        LineEditAction::DeleteToEnd => {
            let byte_idx = char_to_byte_index(&state.text, state.cursor);
            let cut = byte_idx < state.text.len();
            state.text.truncate(byte_idx);
            changed(cut)
        }
        LineEditAction::DeleteWord => {
            let cut = state.cursor > 0;
            if cut {
                state.cursor = delete_word_before_cursor(&mut state.text, state.cursor);
            }
            changed(cut)
        }
        LineEditAction::ClearAll => {
            let cut = !state.text.is_empty();
            state.text.clear();
            state.cursor = 0;
            changed(cut)
        }
        LineEditAction::HistoryPrev => {
            let history = options.history;
            let next_index = match state.history_index {
                None if !history.is_empty() => {
                    state.draft = state.text.clone();
                    history.len() - 1
                }
                Some(idx) if idx > 0 => idx - 1,
                _ => return changed(false),
            };
            state.history_index = Some(next_index);
            state.replace_text(history[next_index].clone());
            changed(true)
        }
        LineEditAction::HistoryNext => match state.history_index {
            Some(idx) if idx + 1 < options.history.len() => {
                state.history_index = Some(idx + 1);
                state.replace_text(options.history[idx + 1].clone());
                changed(true)
            }
            Some(_) => {
                state.history_index = None;
                let draft = std::mem::take(&mut state.draft);
                state.replace_text(draft);
                changed(true)
            }
            None => changed(false),
        },
        LineEditAction::Complete => complete(state, options),
        LineEditAction::Paste(text) => {
            let before_newline = text.split('\n').next().unwrap_or("");
            if !before_newline.is_empty() {
                insert_str_at_cursor(&mut state.text, state.cursor, before_newline);
                state.cursor += before_newline.chars().count();
            }
            if text.contains('\n') {
                LineEditOutcome::Submit(state.text.clone())
            } else {
                changed(!before_newline.is_empty())
            }
        }
        LineEditAction::Submit => LineEditOutcome::Submit(state.text.clone()),
        LineEditAction::Interrupt => {
            if state.text.is_empty() {
                LineEditOutcome::Interrupted
            } else {
                state.text.clear();
                state.cursor = 0;
                state.history_index = None;
                changed(true)
            }
        }
        LineEditAction::EndOfInput => {
            if state.text.is_empty() {
                LineEditOutcome::Eof
            } else {
                changed(remove_char_at_cursor(&mut state.text, state.cursor))
            }
        }
    }
}

fn complete(state: &mut LineEditorState, options: &LineEditorOptions<'_>) -> LineEditOutcome {
    let Some(completer) = options.completer else {
        return LineEditOutcome::Continue { redraw: false };
    };
    if state.cursor != state.text.chars().count() {
        return LineEditOutcome::Continue { redraw: false };
    }

    let candidates = completer(&state.text);
    match candidates.len() {
        0 => LineEditOutcome::Continue { redraw: false },
        1 => {
            state.replace_text(candidates[0].clone());
            LineEditOutcome::Continue { redraw: true }
        }
        _ => match common_prefix(&candidates) {
            Some(prefix) if prefix.chars().count() > state.text.chars().count() => {
                state.replace_text(prefix);
                LineEditOutcome::Continue { redraw: true }
            }
            _ => LineEditOutcome::ShowCandidates(candidates),
        },
    }
}

/// Longest prefix shared by every candidate.
pub fn common_prefix(candidates: &[String]) -> Option<String> {
    let first = candidates.first()?;
    let mut end = first.len();
    for candidate in &candidates[1..] {
        let shared = first
            .char_indices()
            .zip(candidate.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((idx, ch), _)| idx + ch.len_utf8())
            .unwrap_or(0);
        end = end.min(shared);
    }
    Some(first[..end].to_string())
}

fn insert_str_at_cursor(input: &mut String, cursor: usize, text: &str) {
    let byte_idx = char_to_byte_index(input, cursor);
    input.insert_str(byte_idx, text);
}

fn remove_char_before_cursor(input: &mut String, cursor: usize) -> bool {
    if cursor == 0 {
        return false;
    }
    let end = char_to_byte_index(input, cursor);
    let start = char_to_byte_index(input, cursor - 1);
    input.replace_range(start..end, "");
    true
}

fn remove_char_at_cursor(input: &mut String, cursor: usize) -> bool {
    let start = char_to_byte_index(input, cursor);
    if start >= input.len() {
        return false;
    }
    let end = char_to_byte_index(input, cursor + 1);
    input.replace_range(start..end, "");
    true
}

fn delete_word_before_cursor(input: &mut String, cursor: usize) -> usize {
    let mut chars: Vec<char> = input.chars().collect();
    let end = cursor.min(chars.len());
    let mut idx = end;
    while idx > 0 && chars[idx - 1] == ' ' {
        idx -= 1;
    }
    while idx > 0 && chars[idx - 1] != ' ' {
        idx -= 1;
    }
    chars.drain(idx..end);
    *input = chars.into_iter().collect();
    idx
}

fn char_to_byte_index(input: &str, char_index: usize) -> usize {
    input
        .char_indices()
        .nth(char_index)
        .map(|(idx, _)| idx)
        .unwrap_or(input.len())
}
