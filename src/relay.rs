use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{ChatConfig, Config};
use crate::error::ChatError;
use crate::events::Message;
use crate::llm::{ChatBackend, LlmMessage, LlmRequest};
use crate::session::{Credential, SessionContext};

/// Forwards a conversation to the chat model and returns its reply
pub struct MessageRelay {
    backend: Arc<dyn ChatBackend>,
    model: String,
    chat: ChatConfig,
}

impl MessageRelay {
    pub fn new(backend: Arc<dyn ChatBackend>, model: impl Into<String>, chat: ChatConfig) -> Self {
        Self {
            backend,
            model: model.into(),
            chat,
        }
    }

    pub fn from_config(backend: Arc<dyn ChatBackend>, config: &Config) -> Self {
        Self::new(backend, config.provider.chat_model.clone(), config.chat.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the wire conversation: optional system prompt, history, then the new text
    fn build_request(&self, history: &[Message], new_text: &str) -> LlmRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(prompt) = self.chat.system_prompt.as_deref() {
            if !prompt.trim().is_empty() {
                messages.push(LlmMessage::system(prompt));
            }
        }
        messages.extend(history.iter().map(LlmMessage::from));
        messages.push(LlmMessage::user(new_text));

        LlmRequest::new(self.model.clone(), messages)
            .with_temperature(self.chat.temperature)
            .with_max_tokens(self.chat.max_tokens)
    }

    /// Wait for the complete reply. Never touches the session store.
    pub async fn send(
        &self,
        credential: &Credential,
        history: &[Message],
        new_text: &str,
    ) -> Result<String, ChatError> {
        let request = self.build_request(history, new_text);
        debug!(history = history.len(), "Relaying message");
        let reply = self.backend.complete(credential.expose(), request).await?;
        Ok(reply)
    }
}

/// One user turn against the session held in a [`SessionContext`]
pub struct Conversation {
    relay: MessageRelay,
}

impl Conversation {
    pub fn new(relay: MessageRelay) -> Self {
        Self { relay }
    }

    pub fn relay(&self) -> &MessageRelay {
        &self.relay
    }

    /// Record the user message, relay it with prior history, record the reply.
    ///
    /// On relay failure the user message stays logged and no reply is added.
    pub async fn submit(&self, ctx: &mut SessionContext, text: &str) -> Result<Message, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::MissingInput);
        }

        let credential = ctx
            .credential()
            .cloned()
            .ok_or_else(|| ChatError::InvalidCredential("❌ Please enter your Groq API Key.".to_string()))?;

        let history = ctx.messages().to_vec();
        ctx.append(Message::user(text));

        match self.relay.send(&credential, &history, text).await {
            Ok(reply) => {
                let message = Message::assistant(reply);
                ctx.append(message.clone());
                info!(
                    session_id = ctx.session_id(),
                    messages = ctx.messages().len(),
                    "Turn completed"
                );
                Ok(message)
            }
            Err(e) => {
                warn!(session_id = ctx.session_id(), error = %e, "Turn aborted");
                Err(e)
            }
        }
    }
}
