use std::io::Write;

use crate::core::scenario::{Scenario, ScenarioCatalog};
use crate::utils::line_editor::{
    prompt_line_editor, LineEditorError, LineEditorOptions, ReadLine,
};

pub const PROMPT: &str = "\x1b[31m»\x1b[0m ";
pub const DO_YOU_WANT_TO_CONTINUE: &str = "Do you want to continue?";
pub const DO_YOU_WANT_TO_ADD_MORE: &str = "Do you want to add additional room detail building?";
pub const ENTER_ROOM_DETAIL: &str = "Enter additional room detail building:";

/// Where the shell reads its lines from.
pub trait LineSource {
    fn read_line(
        &mut self,
        prompt: &str,
        options: &LineEditorOptions<'_>,
    ) -> Result<ReadLine, LineEditorError>;
}

/// Raw-mode line editor on the controlling terminal.
pub struct TerminalInput;

impl LineSource for TerminalInput {
    fn read_line(
        &mut self,
        prompt: &str,
        options: &LineEditorOptions<'_>,
    ) -> Result<ReadLine, LineEditorError> {
        prompt_line_editor(prompt, options)
    }
}

pub fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Ask a yes/no question. The line starts out as `n`, so Enter alone means
/// no; an interrupt also counts as no.
pub fn ask_yes_no<I: LineSource, W: Write>(
    input: &mut I,
    out: &mut W,
    question: &str,
) -> Result<bool, LineEditorError> {
    let _ = writeln!(out, "{question} (y/n) ");
    let options = LineEditorOptions {
        initial_text: "n".to_string(),
        ..Default::default()
    };
    match input.read_line(PROMPT, &options)? {
        ReadLine::Line(answer) => Ok(is_yes(&answer)),
        ReadLine::Interrupted | ReadLine::Eof => Ok(false),
    }
}

/// Optional free text appended to a new room's framing. Keeps asking until
/// the user confirms a detail; returns an empty string when none is wanted.
pub fn ask_room_detail<I: LineSource, W: Write>(
    input: &mut I,
    out: &mut W,
) -> Result<String, LineEditorError> {
    if !ask_yes_no(input, out, DO_YOU_WANT_TO_ADD_MORE)? {
        return Ok(String::new());
    }

    loop {
        let _ = writeln!(out, "{ENTER_ROOM_DETAIL}");
        let detail = match input.read_line(PROMPT, &LineEditorOptions::default())? {
            ReadLine::Line(detail) => detail,
            ReadLine::Interrupted => String::new(),
            ReadLine::Eof => return Ok(String::new()),
        };
        if ask_yes_no(input, out, DO_YOU_WANT_TO_CONTINUE)? {
            return Ok(detail.trim().to_string());
        }
    }
}

/// Numbered scenario picker. Accepts a number or a name and asks again on
/// anything else. `None` when the user backs out.
pub fn pick_scenario<I: LineSource, W: Write>(
    catalog: &ScenarioCatalog,
    input: &mut I,
    out: &mut W,
) -> Result<Option<Scenario>, LineEditorError> {
    let _ = writeln!(out, "Available scenarios:");
    for (idx, scenario) in catalog.iter().enumerate() {
        if scenario.description.is_empty() {
            let _ = writeln!(out, "  {}) {}", idx + 1, scenario.name);
        } else {
            let _ = writeln!(
                out,
                "  {}) {} - {}",
                idx + 1,
                scenario.name,
                scenario.description
            );
        }
    }

    loop {
        let _ = writeln!(out, "Pick a scenario [1-{}]:", catalog.len());
        let choice = match input.read_line(PROMPT, &LineEditorOptions::default())? {
            ReadLine::Line(choice) => choice,
            ReadLine::Interrupted | ReadLine::Eof => return Ok(None),
        };
        let choice = choice.trim();
        if choice.is_empty() {
            continue;
        }

        let picked = match choice.parse::<usize>() {
            Ok(number) => catalog.by_number(number),
            Err(_) => catalog.get(choice).ok(),
        };
        match picked {
            Some(scenario) => return Ok(Some(scenario.clone())),
            None => {
                let _ = writeln!(out, "Invalid choice: {choice}");
            }
        }
    }
}
