use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

const FRAMES: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];

/// One-line busy indicator drawn just before a blocking call
#[derive(Debug, Clone)]
pub struct ThinkingIndicator {
    label: String,
    frame: usize,
}

impl ThinkingIndicator {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            frame: 0,
        }
    }

    pub fn thinking() -> Self {
        Self::new("🤖 Thinking...")
    }

    pub fn validating() -> Self {
        Self::new("🔑 Validating API key...")
    }

    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % FRAMES.len();
    }
}

impl Widget for &ThinkingIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let line = Line::from(vec![
            Span::styled(FRAMES[self.frame], Style::default().fg(Color::Yellow)),
            Span::raw(" "),
            Span::styled(self.label.as_str(), Style::default().fg(Color::Green)),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_label_and_advances_frames() {
        let mut indicator = ThinkingIndicator::thinking();
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);
        (&indicator).render(area, &mut buf);
        let row: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(row.contains("Thinking..."));
        assert!(row.starts_with("⠋"));

        for _ in 0..FRAMES.len() {
            indicator.tick();
        }
        assert_eq!(indicator.frame, 0);
    }

    #[test]
    fn zero_height_area_below_buffer_is_skipped() {
        let indicator = ThinkingIndicator::validating();
        let mut buf = Buffer::empty(Rect::new(0, 0, 30, 2));
        (&indicator).render(Rect::new(0, 2, 30, 0), &mut buf);

        let screen: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert_eq!(screen.trim(), "");
    }
}
