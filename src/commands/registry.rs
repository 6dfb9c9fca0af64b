use super::ShellCommand;

pub type CommandHandler = fn(CommandInvocation<'_>) -> ShellCommand;

pub struct Command {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Second words offered by tab completion and listed by `help`.
    pub targets: &'static [&'static str],
    pub help: &'static str,
    pub handler: CommandHandler,
}

impl Command {
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(name))
    }

    /// Whether the command expects something after its name.
    pub fn takes_args(&self) -> bool {
        !self.targets.is_empty() || self.name == "say"
    }
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands().iter().find(|command| command.matches(name))
}

pub fn matching_commands(prefix: &str) -> impl Iterator<Item = &'static Command> + '_ {
    let prefix = prefix.to_ascii_lowercase();
    all_commands()
        .iter()
        .filter(move |command| command.name.starts_with(&prefix))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "new",
        aliases: &[],
        targets: &["dungeon", "room"],
        help: "Start a new dungeon room (fighting) or room (anything else).",
        handler: super::handle_new,
    },
    Command {
        name: "say",
        aliases: &[],
        targets: &[],
        help: "Say something to the narrator.",
        handler: super::handle_say,
    },
    Command {
        name: "continue",
        aliases: &[],
        targets: &[],
        help: "Ask the narrator to answer your last message.",
        handler: super::handle_continue,
    },
    Command {
        name: "show",
        aliases: &[],
        targets: &["context"],
        help: "Print every message in the current context.",
        handler: super::handle_show,
    },
    Command {
        name: "undo",
        aliases: &[],
        targets: &[],
        help: "Remove the last exchange.",
        handler: super::handle_undo,
    },
    Command {
        name: "retry",
        aliases: &["redo"],
        targets: &[],
        help: "Regenerate the narrator's last reply.",
        handler: super::handle_retry,
    },
    Command {
        name: "copy",
        aliases: &[],
        targets: &[],
        help: "Copy the last reply to the clipboard.",
        handler: super::handle_copy,
    },
    Command {
        name: "help",
        aliases: &[],
        targets: &[],
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "quit",
        aliases: &["exit"],
        targets: &[],
        help: "Leave the session.",
        handler: super::handle_quit,
    },
];
