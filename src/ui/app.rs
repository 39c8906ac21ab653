use std::cell::Cell;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tracing::{debug, info};

use crate::config::{Config, UiConfig};
use crate::events::AppEvent;
use crate::gate::CredentialGate;
use crate::llm::ChatBackend;
use crate::relay::{Conversation, MessageRelay};
use crate::session::SessionContext;
use crate::ui::conversation::{
    ComposerResult, ConversationComposer, ConversationHistory, ParsedCommand, SlashCommand,
    ThinkingIndicator, get_command_help, get_help_text,
};

const SCROLL_STEP: usize = 5;
const MIN_GATE_HEIGHT: u16 = 8;
const MIN_CHAT_HEIGHT: u16 = 12;

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Gate,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Inline feedback line under the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    fn style(&self) -> Style {
        match self.kind {
            StatusKind::Info => Style::default().fg(Color::Cyan),
            StatusKind::Success => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Whole-application state: gate, session context and widgets
pub struct App {
    ui: UiConfig,
    ctx: SessionContext,
    gate: CredentialGate,
    conversation: Conversation,
    key_input: ConversationComposer,
    composer: ConversationComposer,
    status: Option<Status>,
    busy: Option<ThinkingIndicator>,
    scroll_back: usize,
    /// Where the history was last drawn, for clamping scroll
    history_area: Cell<Rect>,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config, backend: Arc<dyn ChatBackend>) -> Self {
        let ctx = SessionContext::from_config(config);
        let gate = CredentialGate::new(backend.clone(), config.provider.validation_model.clone());
        let conversation = Conversation::new(MessageRelay::from_config(backend, config));

        let mut app = Self {
            ui: config.ui.clone(),
            ctx,
            gate,
            conversation,
            key_input: ConversationComposer::new("🔑 Enter your Groq API Key", "gsk_...").masked('•'),
            composer: ConversationComposer::new("Message", "Type your message..."),
            status: None,
            busy: None,
            scroll_back: 0,
            history_area: Cell::new(Rect::default()),
            should_quit: false,
        };

        if let Some(key) = config.env_api_key() {
            app.key_input.set_content(key);
            app.status = Some(Status::new(
                StatusKind::Info,
                format!(
                    "Key loaded from {}. Press Enter to validate.",
                    config.provider.api_key_env
                ),
            ));
        }

        app
    }

    pub fn screen(&self) -> Screen {
        if self.gate.is_open() && self.ctx.is_authenticated() {
            Screen::Chat
        } else {
            Screen::Gate
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    #[cfg(test)]
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn tick(&mut self) {
        if let Some(busy) = self.busy.as_mut() {
            busy.tick();
        }
    }

    /// Translate a key press into an application event
    pub fn handle_key(&mut self, key: KeyEvent) -> AppEvent {
        if key.kind != KeyEventKind::Press {
            return AppEvent::None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppEvent::ExitRequest;
        }

        match self.screen() {
            Screen::Gate => {
                if key.code == KeyCode::Esc {
                    return AppEvent::ExitRequest;
                }
                match self.key_input.handle_key(key) {
                    ComposerResult::Submitted(candidate) => AppEvent::ValidateKey { candidate },
                    _ => AppEvent::None,
                }
            }
            Screen::Chat => match key.code {
                KeyCode::PageUp => {
                    self.scroll_back = (self.scroll_back + SCROLL_STEP).min(self.max_scroll_back());
                    AppEvent::None
                }
                KeyCode::PageDown => {
                    self.scroll_back = self.scroll_back.saturating_sub(SCROLL_STEP);
                    AppEvent::None
                }
                _ => match self.composer.handle_key(key) {
                    ComposerResult::Submitted(text) => AppEvent::SendMessage { text },
                    ComposerResult::Command(command) => AppEvent::Command(command),
                    ComposerResult::None => AppEvent::None,
                },
            },
        }
    }

    fn max_scroll_back(&self) -> usize {
        ConversationHistory::new(self.ctx.messages(), "")
            .max_scroll_back(self.history_area.get())
    }

    /// Arm the busy indicator for events that block on the network.
    /// Returns true when the caller should redraw before dispatching.
    pub fn begin(&mut self, event: &AppEvent) -> bool {
        let busy = match event {
            AppEvent::ValidateKey { candidate } if !candidate.trim().is_empty() => {
                self.gate.mark_validating();
                self.key_input.set_focus(false);
                ThinkingIndicator::validating()
            }
            AppEvent::SendMessage { text } if !text.trim().is_empty() => {
                self.composer.set_focus(false);
                ThinkingIndicator::thinking()
            }
            _ => return false,
        };
        self.status = None;
        self.busy = Some(busy);
        true
    }

    /// Run an event to completion, awaiting any network call it needs
    pub async fn dispatch(&mut self, event: AppEvent) {
        match event {
            AppEvent::None => {}
            AppEvent::ExitRequest => self.should_quit = true,
            AppEvent::ValidateKey { candidate } => {
                let result = self.gate.submit(&mut self.ctx, &candidate).await;
                self.busy = None;
                self.key_input.set_focus(true);
                match result {
                    Ok(validation) => {
                        info!(session_id = self.ctx.session_id(), "Chat unlocked");
                        self.key_input.clear();
                        self.status = Some(Status::new(StatusKind::Success, validation.message));
                    }
                    Err(e) => self.status = Some(Status::new(StatusKind::Error, e.to_string())),
                }
            }
            AppEvent::SendMessage { text } => {
                let result = self.conversation.submit(&mut self.ctx, &text).await;
                self.busy = None;
                self.composer.set_focus(true);
                self.scroll_back = 0;
                match result {
                    Ok(_) => self.status = None,
                    Err(e) if e.is_silent() => debug!("Ignoring empty submission"),
                    Err(e) => self.status = Some(Status::new(StatusKind::Error, e.to_string())),
                }
            }
            AppEvent::Command(command) => self.handle_slash_command(command),
        }
    }

    fn handle_slash_command(&mut self, command: ParsedCommand) {
        match command.command {
            SlashCommand::Help => {
                let text = match command.argument.as_deref() {
                    Some(topic) => get_command_help(topic),
                    None => get_help_text(),
                };
                self.status = Some(Status::new(StatusKind::Info, text));
            }
            SlashCommand::Session => {
                self.status = Some(Status::new(
                    StatusKind::Info,
                    format!(
                        "Session {} · {} messages · model {}",
                        self.ctx.session_id(),
                        self.ctx.message_count(),
                        self.conversation.relay().model()
                    ),
                ));
            }
            SlashCommand::Bye => self.should_quit = true,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        match self.screen() {
            Screen::Gate => self.render_gate(frame),
            Screen::Chat => self.render_chat(frame),
        }
    }

    fn header(&self, subtitle: String) -> Paragraph<'_> {
        Paragraph::new(vec![
            Line::from(Span::styled(
                self.ui.title.as_str(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(subtitle, Style::default().fg(Color::DarkGray))),
        ])
        .block(Block::default().borders(Borders::ALL).title(self.ui.page_title.as_str()))
    }

    /// Draw a single notice instead of a layout that cannot fit.
    /// Returns false when the screen was too short.
    fn fits(&self, frame: &mut Frame, min_height: u16) -> bool {
        let area = frame.size();
        if area.height >= min_height {
            return true;
        }
        frame.render_widget(
            Paragraph::new(format!("Terminal too small · need {min_height} rows · Ctrl-C: Quit"))
                .style(Style::default().fg(Color::Yellow))
                .wrap(Wrap { trim: true }),
            area,
        );
        false
    }

    /// Busy indicator wins over the status line
    fn render_feedback(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }
        if let Some(busy) = &self.busy {
            frame.render_widget(busy, area);
        } else if let Some(status) = &self.status {
            let paragraph = Paragraph::new(Line::from(Span::styled(status.text.as_str(), status.style())))
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
        }
    }

    fn render_gate(&self, frame: &mut Frame) {
        if !self.fits(frame, MIN_GATE_HEIGHT) {
            return;
        }
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Header
                Constraint::Length(2), // Instructions
                Constraint::Length(3), // Key input
                Constraint::Length(3), // Status
                Constraint::Min(0),
                Constraint::Length(1), // Hints
            ])
            .split(frame.size());

        frame.render_widget(self.header("Validate your key to start chatting".to_string()), chunks[0]);
        frame.render_widget(
            Paragraph::new("Your key is only kept in memory for this session.")
                .style(Style::default().fg(Color::Gray)),
            chunks[1],
        );
        frame.render_widget(&self.key_input, chunks[2]);
        self.render_feedback(frame, chunks[3]);
        frame.render_widget(
            Paragraph::new("Enter: Validate API Key · Esc: Quit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray)),
            chunks[5],
        );
    }

    fn render_chat(&self, frame: &mut Frame) {
        if !self.fits(frame, MIN_CHAT_HEIGHT) {
            return;
        }
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Header
                Constraint::Min(5),    // History
                Constraint::Length(2), // Busy / status
                Constraint::Length(3), // Composer
                Constraint::Length(1), // Hints
            ])
            .split(frame.size());

        frame.render_widget(
            self.header(format!(
                "session {} · {}",
                self.ctx.session_id(),
                self.conversation.relay().model()
            )),
            chunks[0],
        );
        self.history_area.set(chunks[1]);
        frame.render_widget(
            ConversationHistory::new(self.ctx.messages(), "Conversation").scroll_back(self.scroll_back),
            chunks[1],
        );
        self.render_feedback(frame, chunks[2]);
        frame.render_widget(&self.composer, chunks[3]);
        frame.render_widget(
            Paragraph::new("Enter: Send · Shift+Enter: New line · PgUp/PgDn: Scroll · /help · Ctrl-C: Quit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray)),
            chunks[4],
        );
    }
}
