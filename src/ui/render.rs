use ratatui::crossterm::terminal;

use crate::core::message::Message;
use crate::core::scenario::Scenario;
use crate::core::text_wrapping::{TextWrapper, WrapConfig};

const FALLBACK_TERMINAL_WIDTH: usize = 80;
/// Lines up continuation lines under the first character after `text: `.
const TEXT_INDENT: &str = "\t      ";

pub fn terminal_width() -> usize {
    terminal::size()
        .map(|(cols, _)| usize::from(cols))
        .ok()
        .filter(|cols| *cols > 0)
        .unwrap_or(FALLBACK_TERMINAL_WIDTH)
}

/// The `show context` listing, numbered from one.
pub fn format_context(messages: &[Message], terminal_width: usize) -> String {
    let config = WrapConfig::for_terminal(terminal_width);
    let mut out = String::from("Current context building:\n");
    for (idx, message) in messages.iter().enumerate() {
        let text = TextWrapper::wrap_with_indent(&message.content, &config, TEXT_INDENT);
        out.push_str(&format!(
            "{})\n\trole:\t{}\n\ttext: {}\n",
            idx + 1,
            message.role.as_str(),
            text
        ));
    }
    out
}

pub fn banner(scenario: &Scenario) -> String {
    let mut out = String::from(
        "Alright let's start. Type 'quit' to exit or press Ctrl + C.\n\n\
         Type 'new dungeon' to enter into new dungeon room. (room where fighting happens)\n\
         Type 'new room' to enter into new room. (non-combat rooms anywhere in the world)\n\n",
    );
    out.push_str(&format!("You're going to play scenario: {}\n", scenario.name));
    if !scenario.description.is_empty() {
        out.push_str(&format!("{}\n", scenario.description));
    }
    out
}
