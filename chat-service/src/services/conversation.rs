//! Process-wide conversation store shared by every request.

use crate::models::{ChatMessage, Transcript};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cloneable handle to the single global transcript.
///
/// Guards are only held for the duration of a read or a mutation, never across
/// an upstream call.
#[derive(Clone, Default)]
pub struct ConversationStore {
    inner: Arc<RwLock<Transcript>>,
}

impl ConversationStore {
    pub fn new(transcript: Transcript) -> Self {
        Self {
            inner: Arc::new(RwLock::new(transcript)),
        }
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.inner.read().await.snapshot()
    }

    /// Outgoing message list for `user_message`, tagged with the transcript
    /// generation it was built from.
    pub async fn outgoing(&self, user_message: &str) -> (u64, Vec<ChatMessage>) {
        let transcript = self.inner.read().await;
        (transcript.generation(), transcript.outgoing(user_message))
    }

    /// Append a turn started at `generation`. Returns false, leaving the
    /// transcript alone, when a reset happened since.
    pub async fn record_turn(&self, generation: u64, user_message: String, reply: String) -> bool {
        let mut transcript = self.inner.write().await;
        if transcript.generation() != generation {
            tracing::info!(
                started = generation,
                current = transcript.generation(),
                "Dropping turn that started before a reset"
            );
            return false;
        }

        transcript.push_turn(user_message, reply);
        tracing::debug!(
            len = transcript.len(),
            max = transcript.max_items(),
            "Recorded conversation turn"
        );
        true
    }

    pub async fn reset(&self) {
        self.inner.write().await.reset();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[tokio::test]
    async fn clones_share_one_transcript() {
        let store = ConversationStore::new(Transcript::new("sys"));
        let other = store.clone();

        let (generation, _) = other.outgoing("hi").await;
        assert!(other.record_turn(generation, "hi".into(), "hello".into()).await);

        let history = store.history().await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].role, Role::Assistant);
    }

    #[tokio::test]
    async fn reset_clears_turns() {
        let store = ConversationStore::default();
        let (generation, _) = store.outgoing("a").await;
        store.record_turn(generation, "a".into(), "b".into()).await;

        store.reset().await;

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn turn_started_before_reset_is_dropped() {
        let store = ConversationStore::default();
        let (generation, outgoing) = store.outgoing("stale").await;
        assert_eq!(outgoing.len(), 2);

        store.reset().await;

        assert!(!store.record_turn(generation, "stale".into(), "late".into()).await);
        assert_eq!(store.len().await, 1);

        let (generation, _) = store.outgoing("fresh").await;
        assert!(store.record_turn(generation, "fresh".into(), "ok".into()).await);
        assert_eq!(store.len().await, 3);
    }
}
