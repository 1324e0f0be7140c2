//! Mock provider implementation for testing.

use super::groq::NOT_CONFIGURED_MESSAGE;
use super::{ChatProvider, CompletionParams, ProviderError};
use crate::models::{ChatMessage, Role};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// How the mock answers.
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Reply with `Echo: <last user message>`.
    Echo,
    /// Behave as if no API key was configured.
    Unconfigured,
    /// Fail every completion with an upstream API error.
    Failing(String),
}

/// Mock chat provider for testing. Records every message list it receives.
#[derive(Clone)]
pub struct MockChatProvider {
    mode: MockMode,
    received: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl MockChatProvider {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockMode::Echo)
    }

    /// Message lists passed to `complete`, oldest first.
    pub async fn received(&self) -> Vec<Vec<ChatMessage>> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _params: &CompletionParams,
    ) -> Result<String, ProviderError> {
        if let MockMode::Unconfigured = self.mode {
            return Err(ProviderError::NotConfigured(NOT_CONFIGURED_MESSAGE.to_string()));
        }

        self.received.lock().await.push(messages.to_vec());

        match &self.mode {
            MockMode::Failing(message) => Err(ProviderError::ApiError(message.clone())),
            _ => {
                let last_user = messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.as_str())
                    .unwrap_or_default();
                Ok(format!("Echo: {}", last_user))
            }
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.mode {
            MockMode::Unconfigured => Err(ProviderError::NotConfigured(
                NOT_CONFIGURED_MESSAGE.to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn is_configured(&self) -> bool {
        !matches!(self.mode, MockMode::Unconfigured)
    }
}
