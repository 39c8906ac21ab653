use crate::ui::conversation::commands::{ParsedCommand, parse_slash_command};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    Submitted(String),
    Command(ParsedCommand),
    None,
}

/// Text and cursor of the input box. The cursor counts chars, not bytes.
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    pub cursor_position: usize,
}

impl TextAreaState {
    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor_position);
        self.content.insert(at, c);
        self.cursor_position += 1;
    }

    fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_index(self.cursor_position);
            self.content.remove(at);
        }
    }

    fn delete(&mut self) {
        if self.cursor_position < self.char_len() {
            let at = self.byte_index(self.cursor_position);
            self.content.remove(at);
        }
    }

    fn take(&mut self) -> String {
        self.cursor_position = 0;
        std::mem::take(&mut self.content)
    }
}

/// Single input box used for chat messages and, masked, for the API key
#[derive(Clone)]
pub struct ConversationComposer {
    state: TextAreaState,
    title: String,
    placeholder: String,
    has_focus: bool,
    mask: Option<char>,
    commands_enabled: bool,
}

impl ConversationComposer {
    pub fn new(title: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            state: TextAreaState::default(),
            title: title.into(),
            placeholder: placeholder.into(),
            has_focus: true,
            mask: None,
            commands_enabled: true,
        }
    }

    /// Render every character as `mask` and never parse slash commands
    pub fn masked(mut self, mask: char) -> Self {
        self.mask = Some(mask);
        self.commands_enabled = false;
        self
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        let state = &mut self.state;
        match key.code {
            KeyCode::Enter => {
                if key.modifiers.contains(KeyModifiers::SHIFT) && self.mask.is_none() {
                    state.insert_char('\n');
                } else {
                    // A rejected key stays in the box so it can be fixed or resent
                    let content = if self.mask.is_some() {
                        state.content.clone()
                    } else {
                        state.take()
                    };
                    if self.commands_enabled {
                        if let Some(command) = parse_slash_command(&content) {
                            return ComposerResult::Command(command);
                        }
                    }
                    return ComposerResult::Submitted(content);
                }
            }
            KeyCode::Char(c) => state.insert_char(c),
            KeyCode::Backspace => state.backspace(),
            KeyCode::Delete => state.delete(),
            KeyCode::Left => {
                state.cursor_position = state.cursor_position.saturating_sub(1);
            }
            KeyCode::Right => {
                if state.cursor_position < state.char_len() {
                    state.cursor_position += 1;
                }
            }
            KeyCode::Home => state.cursor_position = 0,
            KeyCode::End => state.cursor_position = state.char_len(),
            _ => {}
        }

        ComposerResult::None
    }

    /// Replace the content, placing the cursor at the end
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.state.content = content.into();
        self.state.cursor_position = self.state.char_len();
    }

    pub fn clear(&mut self) {
        self.state.take();
    }

    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    #[cfg(test)]
    pub fn get_content(&self) -> &str {
        &self.state.content
    }

    /// Text as drawn: masked if configured, with a cursor marker when focused
    fn display_text(&self) -> String {
        let mut shown: Vec<char> = match self.mask {
            Some(mask) => self.state.content.chars().map(|_| mask).collect(),
            None => self.state.content.chars().collect(),
        };
        if self.has_focus {
            let at = self.state.cursor_position.min(shown.len());
            shown.insert(at, '▌');
        }
        shown.into_iter().collect()
    }
}

impl Widget for &ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.as_str())
            .style(if self.has_focus {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Gray)
            });

        let inner_area = block.inner(area);
        block.render(area, buf);
        if inner_area.height == 0 || inner_area.width == 0 {
            return;
        }

        if self.state.content.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
            return;
        }

        let text = self.display_text();
        let lines: Vec<&str> = text.split('\n').collect();
        // Keep the tail visible when the input outgrows the box
        let start = lines.len().saturating_sub(inner_area.height as usize);
        for (i, line_text) in lines[start..].iter().enumerate() {
            let line = Line::from(vec![Span::styled(*line_text, Style::default().fg(Color::White))]);
            buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::conversation::commands::SlashCommand;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(composer: &mut ConversationComposer, text: &str) {
        for c in text.chars() {
            composer.handle_key(press(KeyCode::Char(c)));
        }
    }

    fn rendered(composer: &ConversationComposer) -> String {
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        composer.render(area, &mut buf);
        buf.content.iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn enter_submits_and_clears() {
        let mut composer = ConversationComposer::new("Chat", "Type your message...");
        type_str(&mut composer, "Hello");

        assert_eq!(
            composer.handle_key(press(KeyCode::Enter)),
            ComposerResult::Submitted("Hello".to_string())
        );
        assert_eq!(composer.get_content(), "");
    }

    #[test]
    fn slash_input_becomes_command() {
        let mut composer = ConversationComposer::new("Chat", "");
        type_str(&mut composer, "/help");

        match composer.handle_key(press(KeyCode::Enter)) {
            ComposerResult::Command(parsed) => assert_eq!(parsed.command, SlashCommand::Help),
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn editing_keys_respect_multibyte_chars() {
        let mut composer = ConversationComposer::new("Chat", "");
        type_str(&mut composer, "héllo");
        composer.handle_key(press(KeyCode::Left));
        composer.handle_key(press(KeyCode::Backspace));
        composer.handle_key(press(KeyCode::Home));
        composer.handle_key(press(KeyCode::Delete));
        composer.handle_key(press(KeyCode::End));
        type_str(&mut composer, "!");

        assert_eq!(composer.get_content(), "élo!");
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut composer = ConversationComposer::new("Chat", "");
        type_str(&mut composer, "a");
        composer.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        type_str(&mut composer, "b");
        assert_eq!(composer.get_content(), "a\nb");
    }

    #[test]
    fn masked_input_hides_secret_and_ignores_commands() {
        let mut composer = ConversationComposer::new("Key", "").masked('•');
        type_str(&mut composer, "/gsk");

        let screen = rendered(&composer);
        assert!(!screen.contains("gsk"));
        assert!(screen.contains("••••"));

        assert_eq!(
            composer.handle_key(press(KeyCode::Enter)),
            ComposerResult::Submitted("/gsk".to_string())
        );
    }

    #[test]
    fn masked_input_survives_submit_until_cleared() {
        let mut composer = ConversationComposer::new("Key", "").masked('•');
        composer.set_content("gsk_pre_filled");

        assert_eq!(
            composer.handle_key(press(KeyCode::Enter)),
            ComposerResult::Submitted("gsk_pre_filled".to_string())
        );
        assert_eq!(composer.get_content(), "gsk_pre_filled");

        composer.clear();
        assert_eq!(composer.get_content(), "");
    }

    #[test]
    fn unfocused_composer_hides_cursor() {
        let mut composer = ConversationComposer::new("Chat", "");
        type_str(&mut composer, "hi");
        assert!(rendered(&composer).contains("hi▌"));

        composer.set_focus(false);
        assert!(!rendered(&composer).contains('▌'));
    }

    #[test]
    fn collapsed_area_at_buffer_edge_draws_nothing_inside() {
        let buffer_area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(buffer_area);

        let composer = ConversationComposer::new("Chat", "Type here");
        composer.render(Rect::new(0, 2, 30, 1), &mut buf);

        let screen: String = buf.content.iter().map(|cell| cell.symbol()).collect();
        assert!(!screen.contains("Type here"));
    }

    #[test]
    fn placeholder_shows_when_empty() {
        let composer = ConversationComposer::new("Chat", "Type here");
        assert!(rendered(&composer).contains("Type here"));
    }
}
