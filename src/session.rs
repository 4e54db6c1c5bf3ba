//! Conversation session.
//!
//! A `Session` owns the message history of one conversation and runs one
//! turn at a time against a [`CompletionClient`]. The system prompt is not
//! part of the history; it is prepended when each request is built.

use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::Mutex;

use crate::config::{Config, SessionConfig};
use crate::error::{ChatError, ConfigError};
use crate::model::{ChatCompletionRequest, CompletionClient, Message, OpenAiClient};

pub struct Session {
    client: Arc<dyn CompletionClient>,
    config: SessionConfig,
    /// Held for the whole turn, so concurrent submits run one after another.
    history: Mutex<Vec<Message>>,
}

impl Session {
    pub fn new(client: Arc<dyn CompletionClient>, config: SessionConfig) -> Self {
        Self {
            client,
            config,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Builds a session talking to the OpenAI-compatible endpoint in `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let client = OpenAiClient::new(config)?;
        Ok(Self::new(Arc::new(client), config.session_config()))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Runs one turn.
    ///
    /// The user message is appended before the upstream call and stays in
    /// history even when the call fails; the assistant reply is appended
    /// only on success. Blank input is rejected without touching history.
    pub async fn submit(&self, user_text: &str) -> Result<String, ChatError> {
        if user_text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let mut history = self.history.lock().await;
        history.push(Message::user(user_text));

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(self.config.system_prompt.clone()));
        messages.extend(history.iter().cloned());

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
        };
        debug!("User message: {}", user_text);

        match self.client.complete(&request).await {
            Ok(reply) => {
                history.push(Message::assistant(reply.clone()));
                info!("Turn completed, history now holds {} messages", history.len());
                Ok(reply)
            }
            Err(e) => {
                error!("Turn failed: {}", e);
                Err(e.into())
            }
        }
    }

    pub async fn reset(&self) {
        self.history.lock().await.clear();
        info!("Conversation reset");
    }

    /// Snapshot of the history, oldest first.
    pub async fn history(&self) -> Vec<Message> {
        self.history.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.history.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.history.lock().await.is_empty()
    }
}
