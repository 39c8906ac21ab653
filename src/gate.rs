use std::sync::Arc;

use tracing::{info, warn};

use crate::error::ChatError;
use crate::llm::{ChatBackend, LlmMessage, LlmRequest};
use crate::session::{Credential, SessionContext};

const VALID_MESSAGE: &str = "✅ Groq API Key is valid.";
const EMPTY_MESSAGE: &str = "❌ Please enter your Groq API Key.";
const PROBE_PROMPT: &str = "Test";

/// Outcome of one validation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub message: String,
}

impl Validation {
    fn valid() -> Self {
        Self {
            valid: true,
            message: VALID_MESSAGE.to_string(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Where the gate currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    NoCredential,
    Validating,
    Valid,
    Invalid,
}

/// Holds the chat screen back until a credential survives a round-trip
pub struct CredentialGate {
    backend: Arc<dyn ChatBackend>,
    validation_model: String,
    state: GateState,
}

impl CredentialGate {
    pub fn new(backend: Arc<dyn ChatBackend>, validation_model: impl Into<String>) -> Self {
        Self {
            backend,
            validation_model: validation_model.into(),
            state: GateState::NoCredential,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == GateState::Valid
    }

    /// Flag the gate as busy so the UI can draw before the network call
    pub fn mark_validating(&mut self) {
        self.state = GateState::Validating;
    }

    /// Probe the inference service with `candidate`. Costs one request.
    pub async fn validate(&self, candidate: &str) -> Validation {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Validation::invalid(EMPTY_MESSAGE);
        }

        let request = LlmRequest::new(
            self.validation_model.clone(),
            vec![LlmMessage::user(PROBE_PROMPT)],
        );

        match self.backend.complete(candidate, request).await {
            Ok(_) => Validation::valid(),
            Err(e) => Validation::invalid(format!("❌ Invalid Groq API Key: {e}")),
        }
    }

    /// Validate and, on success, hold the credential in `ctx` for the session
    pub async fn submit(
        &mut self,
        ctx: &mut SessionContext,
        candidate: &str,
    ) -> Result<Validation, ChatError> {
        self.state = GateState::Validating;
        let validation = self.validate(candidate).await;

        if validation.valid {
            info!(session_id = ctx.session_id(), "API key accepted");
            ctx.set_credential(Credential::new(candidate.trim()));
            self.state = GateState::Valid;
            Ok(validation)
        } else {
            warn!("API key rejected");
            self.state = GateState::Invalid;
            Err(ChatError::InvalidCredential(validation.message))
        }
    }
}
