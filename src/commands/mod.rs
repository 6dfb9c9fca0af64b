mod registry;

pub use registry::{all_commands, find_command, matching_commands, Command, CommandInvocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomKind {
    Dungeon,
    Room,
}

impl RoomKind {
    pub fn is_dungeon(self) -> bool {
        matches!(self, RoomKind::Dungeon)
    }
}

/// One line of shell input, resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    New(RoomKind),
    Say(String),
    Continue,
    ShowContext,
    Undo,
    Retry,
    Copy,
    Help,
    Quit,
    Empty,
    /// A known command with an argument it cannot use; carries the reply.
    Rejected(String),
    /// Nothing matched; the shell prints usage.
    Invalid(String),
}

pub fn process_input(input: &str) -> ShellCommand {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return ShellCommand::Empty;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let command_name = parts.next().unwrap_or_default();
    let args = parts.next().unwrap_or("").trim();

    match find_command(command_name) {
        Some(command) => (command.handler)(CommandInvocation {
            input: trimmed,
            args,
        }),
        None => ShellCommand::Invalid(trimmed.to_string()),
    }
}

pub(super) fn handle_new(invocation: CommandInvocation<'_>) -> ShellCommand {
    match invocation.args.to_ascii_lowercase().as_str() {
        "dungeon" => ShellCommand::New(RoomKind::Dungeon),
        "room" => ShellCommand::New(RoomKind::Room),
        "" => ShellCommand::Invalid(invocation.input.to_string()),
        _ => ShellCommand::Rejected(format!("invalid target: {}", invocation.args)),
    }
}

pub(super) fn handle_say(invocation: CommandInvocation<'_>) -> ShellCommand {
    if invocation.args.is_empty() {
        ShellCommand::Rejected("say what?".to_string())
    } else {
        ShellCommand::Say(invocation.args.to_string())
    }
}

pub(super) fn handle_show(invocation: CommandInvocation<'_>) -> ShellCommand {
    if invocation.args.eq_ignore_ascii_case("context") {
        ShellCommand::ShowContext
    } else {
        ShellCommand::Rejected("show what?".to_string())
    }
}

fn bare(invocation: CommandInvocation<'_>, command: ShellCommand) -> ShellCommand {
    if invocation.args.is_empty() {
        command
    } else {
        ShellCommand::Invalid(invocation.input.to_string())
    }
}

pub(super) fn handle_continue(invocation: CommandInvocation<'_>) -> ShellCommand {
    bare(invocation, ShellCommand::Continue)
}

pub(super) fn handle_undo(invocation: CommandInvocation<'_>) -> ShellCommand {
    bare(invocation, ShellCommand::Undo)
}

pub(super) fn handle_retry(invocation: CommandInvocation<'_>) -> ShellCommand {
    bare(invocation, ShellCommand::Retry)
}

pub(super) fn handle_copy(invocation: CommandInvocation<'_>) -> ShellCommand {
    bare(invocation, ShellCommand::Copy)
}

pub(super) fn handle_help(_invocation: CommandInvocation<'_>) -> ShellCommand {
    ShellCommand::Help
}

pub(super) fn handle_quit(_invocation: CommandInvocation<'_>) -> ShellCommand {
    ShellCommand::Quit
}

/// The command tree printed by `help` and on unrecognised input.
pub fn usage() -> String {
    let mut out = String::from("commands:\n");
    for command in all_commands() {
        out.push_str(&format!("    {:<12}{}\n", command.name, command.help));
        for target in command.targets {
            out.push_str(&format!("        {target}\n"));
        }
    }
    out
}

/// Completed lines for the text typed so far, in registry order.
pub fn completions(line: &str) -> Vec<String> {
    let lower = line.to_ascii_lowercase();
    match lower.split_once(' ') {
        None => matching_commands(&lower)
            .map(|command| {
                if command.takes_args() {
                    format!("{} ", command.name)
                } else {
                    command.name.to_string()
                }
            })
            .collect(),
        Some((name, rest)) => {
            let Some(command) = find_command(name) else {
                return Vec::new();
            };
            let rest = rest.trim_start();
            command
                .targets
                .iter()
                .filter(|target| target.starts_with(rest))
                .map(|target| format!("{} {}", command.name, target))
                .collect()
        }
    }
}
