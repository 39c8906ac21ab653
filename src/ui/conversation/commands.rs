use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Show the session id and message count
    Session,
    /// Exit the application
    Bye,
    /// Show help
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Session => "show the current session id and message count",
            SlashCommand::Bye => "exit the application",
            SlashCommand::Help => "show available commands",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let rest = input.trim().strip_prefix('/')?;

    let mut parts = rest.split_whitespace();
    let head = parts.next()?.to_lowercase();
    let tail: Vec<&str> = parts.collect();

    let command = SlashCommand::from_str(&head).ok().or_else(|| match head.as_str() {
        "q" | "quit" | "exit" => Some(SlashCommand::Bye),
        "h" | "?" => Some(SlashCommand::Help),
        "s" => Some(SlashCommand::Session),
        _ => None,
    })?;

    let argument = if tail.is_empty() {
        None
    } else {
        Some(tail.join(" "))
    };

    Some(ParsedCommand { command, argument })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Commands: ");
    let entries: Vec<String> = SlashCommand::iter()
        .map(|c| format!("/{} - {}", c.command(), c.description()))
        .collect();
    help.push_str(&entries.join(" · "));
    help.push_str(" · aliases: /q /quit /exit for /bye");
    help
}

/// Help for a single command named with or without its slash, aliases included
pub fn get_command_help(topic: &str) -> String {
    let topic = topic.trim().trim_start_matches('/');
    match parse_slash_command(&format!("/{topic}")) {
        Some(parsed) => format!(
            "/{} - {}",
            parsed.command.command(),
            parsed.command.description()
        ),
        None => format!("Unknown command /{topic}. {}", get_help_text()),
    }
}
