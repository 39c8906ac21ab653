//! Conversation UI components for chat interface

pub mod commands;
pub mod composer;
pub mod history;
pub mod thinking;

pub use commands::{ParsedCommand, SlashCommand, get_command_help, get_help_text};
pub use composer::{ComposerResult, ConversationComposer};
pub use history::ConversationHistory;
pub use thinking::ThinkingIndicator;
