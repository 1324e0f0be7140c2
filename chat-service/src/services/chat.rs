//! One chat turn: build the outgoing list, call upstream, record the reply.

use super::providers::{ChatProvider, CompletionParams, ProviderError};
use super::ConversationStore;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct ChatService {
    store: ConversationStore,
    provider: Arc<dyn ChatProvider>,
    params: CompletionParams,
}

impl ChatService {
    pub fn new(
        store: ConversationStore,
        provider: Arc<dyn ChatProvider>,
        params: CompletionParams,
    ) -> Self {
        Self {
            store,
            provider,
            params,
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn provider(&self) -> &Arc<dyn ChatProvider> {
        &self.provider
    }

    /// Send `user_message` with the current transcript as context.
    ///
    /// The transcript only changes when upstream answers. Turns running
    /// concurrently each see the transcript as it was when they started; a
    /// turn that outlives a reset still returns its reply but is not recorded.
    pub async fn send(&self, user_message: String) -> Result<String, ProviderError> {
        let (generation, messages) = self.store.outgoing(&user_message).await;

        let start = Instant::now();
        let result = self.provider.complete(&messages, &self.params).await;
        histogram!("chat_upstream_duration_seconds").record(start.elapsed().as_secs_f64());

        match result {
            Ok(reply) => {
                counter!("chat_turns_total", "outcome" => "ok").increment(1);
                self.store
                    .record_turn(generation, user_message, reply.clone())
                    .await;
                Ok(reply)
            }
            Err(e) => {
                counter!("chat_turns_total", "outcome" => e.kind()).increment(1);
                tracing::warn!(error = %e, kind = e.kind(), "Chat completion failed");
                Err(e)
            }
        }
    }

    pub async fn reset(&self) {
        self.store.reset().await;
        counter!("chat_history_resets_total").increment(1);
        tracing::info!("Conversation history reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatMessage, Transcript};
    use crate::services::providers::{ChatProvider, MockChatProvider, MockMode};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Holds every completion until released.
    struct GatedProvider {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl ChatProvider for GatedProvider {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _params: &CompletionParams,
        ) -> Result<String, ProviderError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok("late".to_string())
        }

        async fn health_check(&self) -> Result<(), ProviderError> {
            Ok(())
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    fn service(provider: MockChatProvider) -> ChatService {
        ChatService::new(
            ConversationStore::new(Transcript::new("sys")),
            Arc::new(provider),
            CompletionParams::default(),
        )
    }

    #[tokio::test]
    async fn successful_turn_sends_history_plus_message_and_records_pair() {
        let provider = MockChatProvider::echo();
        let chat = service(provider.clone());

        let reply = chat.send("hello".to_string()).await.unwrap();

        assert_eq!(reply, "Echo: hello");
        assert_eq!(
            provider.received().await,
            vec![vec![ChatMessage::system("sys"), ChatMessage::user("hello")]]
        );
        assert_eq!(
            chat.store().history().await,
            vec![
                ChatMessage::system("sys"),
                ChatMessage::user("hello"),
                ChatMessage::assistant("Echo: hello"),
            ]
        );
    }

    #[tokio::test]
    async fn failed_turn_leaves_transcript_untouched() {
        let chat = service(MockChatProvider::new(MockMode::Failing("boom".into())));

        let err = chat.send("hello".to_string()).await.unwrap_err();

        assert!(matches!(err, ProviderError::ApiError(_)));
        assert_eq!(chat.store().len().await, 1);
    }

    #[tokio::test]
    async fn reset_during_turn_keeps_stale_pair_out_of_history() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let chat = ChatService::new(
            ConversationStore::new(Transcript::new("sys")),
            Arc::new(GatedProvider {
                started: started.clone(),
                release: release.clone(),
            }),
            CompletionParams::default(),
        );

        let turn = tokio::spawn({
            let chat = chat.clone();
            async move { chat.send("hello".to_string()).await }
        });
        started.notified().await;
        chat.reset().await;
        release.notify_one();

        assert_eq!(turn.await.unwrap().unwrap(), "late");
        assert_eq!(chat.store().history().await, vec![ChatMessage::system("sys")]);
    }

    #[tokio::test]
    async fn unconfigured_provider_reports_not_configured() {
        let chat = service(MockChatProvider::new(MockMode::Unconfigured));

        let err = chat.send("hello".to_string()).await.unwrap_err();

        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
