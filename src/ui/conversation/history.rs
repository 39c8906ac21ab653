//! Conversation history display component

use crate::events::{Message, Role};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Renders the session log as chat bubbles, newest at the bottom
pub struct ConversationHistory<'a> {
    messages: &'a [Message],
    title: &'a str,
    /// Lines scrolled up from the bottom
    scroll_back: usize,
}

impl<'a> ConversationHistory<'a> {
    pub fn new(messages: &'a [Message], title: &'a str) -> Self {
        Self {
            messages,
            title,
            scroll_back: 0,
        }
    }

    pub fn scroll_back(mut self, lines: usize) -> Self {
        self.scroll_back = lines;
        self
    }

    fn block(&self) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .title(format!("💬 {}", self.title))
    }

    /// Furthest `scroll_back` that still moves the view when drawn into `area`
    pub fn max_scroll_back(&self, area: Rect) -> usize {
        let inner_area = self.block().inner(area);
        self.lines(inner_area.width)
            .len()
            .saturating_sub(inner_area.height as usize)
    }

    /// Every line the history would draw at `width`
    fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut all_lines = Vec::new();
        for message in self.messages {
            all_lines.extend(render_message(message, width));
            all_lines.push(Line::from(""));
        }
        all_lines
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block();
        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.messages.is_empty() {
            let welcome_lines = [
                Line::from(Span::styled(
                    "API key accepted. Say hello! 👋",
                    Style::default().fg(Color::Green),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Enter sends, Shift+Enter adds a new line, /help lists commands.",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            for (i, line) in welcome_lines.iter().enumerate() {
                if i < inner_area.height as usize {
                    buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
                }
            }
            return;
        }

        let all_lines = self.lines(inner_area.width);
        let height = inner_area.height as usize;
        let end = all_lines.len().saturating_sub(self.scroll_back).max(height.min(all_lines.len()));
        let start = end.saturating_sub(height);

        for (i, line) in all_lines[start..end].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

/// Render a single message into lines
fn render_message(message: &Message, width: u16) -> Vec<Line<'static>> {
    let (icon, style) = match message.role() {
        Role::User => ("👤", Style::default().fg(Color::Blue)),
        Role::Assistant => ("🤖", Style::default().fg(Color::Green)),
    };

    let timestamp = message.timestamp().format("%H:%M:%S").to_string();
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{icon} {} ", message.role().display_name()),
            style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{timestamp} {}", "─".repeat(20)), Style::default().fg(Color::DarkGray)),
    ])];

    for content_line in wrap_text(message.content(), width.saturating_sub(2) as usize) {
        lines.push(Line::from(vec![Span::raw("  "), Span::styled(content_line, style)]));
    }

    lines
}

/// Wrap text to fit within the given width, keeping explicit line breaks
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.chars().count();
            if current_width > 0 && current_width + 1 + word_width > width {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
            if current_width > 0 {
                current_line.push(' ');
                current_width += 1;
            }
            current_line.push_str(word);
            current_width += word_width;
        }

        lines.push(current_line);
    }

    lines
}
