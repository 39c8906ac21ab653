use thiserror::Error;

/// Errors raised by the inference backend
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Groq API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse(reason.into())
    }
}

/// Errors surfaced to the user during a chat turn
#[derive(Debug, Error)]
pub enum ChatError {
    /// Credential rejected or absent; the gate re-prompts.
    #[error("{0}")]
    InvalidCredential(String),

    /// The inference call failed; the turn is aborted.
    #[error("❌ {0}")]
    ExternalService(#[from] LlmError),

    /// Empty submission; ignored without a message.
    #[error("empty input")]
    MissingInput,
}

impl ChatError {
    /// Whether the UI should show this error at all
    pub fn is_silent(&self) -> bool {
        matches!(self, ChatError::MissingInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_mentions_status_and_message() {
        let err = LlmError::api(401, "Invalid API Key");
        assert_eq!(err.to_string(), "Groq API error (401): Invalid API Key");
    }

    #[test]
    fn external_service_error_wraps_backend_error() {
        let err: ChatError = LlmError::invalid_response("missing choices").into();
        assert!(matches!(err, ChatError::ExternalService(_)));
        assert!(err.to_string().contains("missing choices"));
        assert!(!err.is_silent());
    }

    #[test]
    fn missing_input_is_silent() {
        assert!(ChatError::MissingInput.is_silent());
    }
}
