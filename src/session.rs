use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

use crate::config::Config;
use crate::events::Message;

/// API secret held for the life of the process. Never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// In-memory message logs keyed by session id
#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    logs: HashMap<String, Vec<Message>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the log for `session_id`, creating it on first use
    pub fn append(&mut self, session_id: &str, message: Message) {
        self.logs
            .entry(session_id.to_string())
            .or_default()
            .push(message);
    }

    /// All messages for `session_id` in append order; empty if none yet
    pub fn read_all(&self, session_id: &str) -> &[Message] {
        self.logs
            .get(session_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self, session_id: &str) -> usize {
        self.read_all(session_id).len()
    }
}

/// Per-process state handed to every handler
#[derive(Debug)]
pub struct SessionContext {
    session_id: String,
    credential: Option<Credential>,
    store: SessionStore,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            credential: None,
            store: SessionStore::new(),
        }
    }

    /// Use the configured session id, or mint one for this process
    pub fn from_config(config: &Config) -> Self {
        let session_id = config
            .session
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("session-{}", Uuid::new_v4()));
        Self::new(session_id)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// Messages of this context's session
    pub fn messages(&self) -> &[Message] {
        self.store.read_all(&self.session_id)
    }

    pub fn message_count(&self) -> usize {
        self.store.len(&self.session_id)
    }

    pub fn append(&mut self, message: Message) {
        self.store.append(&self.session_id, message);
    }
}
