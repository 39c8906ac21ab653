//! Scripted inference backend shared by the unit tests

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::LlmError;
use crate::llm::{ChatBackend, LlmRequest};

/// Canned outcome for one backend call
pub enum Reply {
    Text(&'static str),
    Fail(u16, &'static str),
}

/// Backend that accepts one key and replays scripted replies
#[derive(Clone)]
pub struct ScriptedBackend {
    valid_key: &'static str,
    replies: Arc<Mutex<VecDeque<Reply>>>,
    recordings: Arc<Mutex<Vec<(String, LlmRequest)>>>,
}

impl ScriptedBackend {
    pub fn new(valid_key: &'static str, replies: Vec<Reply>) -> Self {
        Self {
            valid_key,
            replies: Arc::new(Mutex::new(replies.into())),
            recordings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn requests(&self) -> Vec<(String, LlmRequest)> {
        self.recordings.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.recordings.lock().await.len()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, api_key: &str, request: LlmRequest) -> Result<String, LlmError> {
        self.recordings
            .lock()
            .await
            .push((api_key.to_string(), request));

        if api_key != self.valid_key {
            return Err(LlmError::api(401, "Invalid API Key"));
        }

        match self.replies.lock().await.pop_front() {
            Some(Reply::Text(text)) => Ok(text.to_string()),
            Some(Reply::Fail(status, message)) => Err(LlmError::api(status, message)),
            None => Ok("ok".to_string()),
        }
    }
}
