//! Bounded conversation transcript.
//!
//! The first record is always the system prompt. Every completed turn appends
//! a user record and an assistant record; once the transcript grows past its
//! capacity the oldest non-system records are dropped.
//!
//! Each reset bumps a generation counter so callers holding a snapshot taken
//! before the reset can tell that their turn no longer belongs here.

use super::message::{ChatMessage, Role};

/// System prompt every transcript starts from unless configured otherwise.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful and concise chatbot.";

/// 1 system + 10 user + 10 assistant records.
pub const MAX_HISTORY_ITEMS: usize = 21;

#[derive(Debug, Clone)]
pub struct Transcript {
    system_prompt: ChatMessage,
    messages: Vec<ChatMessage>,
    max_items: usize,
    generation: u64,
}

impl Transcript {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self::with_capacity(system_prompt, MAX_HISTORY_ITEMS)
    }

    /// `max_items` counts the system record. Values below 3 are raised to 3 and
    /// even values are rounded up, so truncation always drops whole
    /// user/assistant pairs.
    pub fn with_capacity(system_prompt: impl Into<String>, max_items: usize) -> Self {
        let system_prompt = ChatMessage::system(system_prompt);
        let max_items = max_items.max(3) | 1;
        Self {
            messages: vec![system_prompt.clone()],
            system_prompt,
            max_items,
            generation: 0,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.clone()
    }

    /// The message list to send upstream for `user_message`, without recording it.
    pub fn outgoing(&self, user_message: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.extend_from_slice(&self.messages);
        messages.push(ChatMessage::user(user_message));
        messages
    }

    pub fn push_turn(&mut self, user_message: impl Into<String>, reply: impl Into<String>) {
        self.messages.push(ChatMessage::user(user_message));
        self.messages.push(ChatMessage::assistant(reply));

        if self.messages.len() > self.max_items {
            let excess = self.messages.len() - self.max_items;
            self.messages.drain(1..=excess);
        }
    }

    pub fn reset(&mut self) {
        self.messages.clear();
        self.messages.push(self.system_prompt.clone());
        self.generation = self.generation.wrapping_add(1);
    }

    /// Number of resets so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: the system record cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of non-system records.
    pub fn turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role != Role::System)
            .count()
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_single_system_record() {
        let transcript = Transcript::default();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0], ChatMessage::system(DEFAULT_SYSTEM_PROMPT));
        assert_eq!(transcript.turns(), 0);
        assert!(!transcript.is_empty());
    }

    #[test]
    fn outgoing_appends_pending_user_message_without_recording() {
        let mut transcript = Transcript::default();
        transcript.push_turn("hi", "hello");

        let outgoing = transcript.outgoing("how are you?");

        assert_eq!(outgoing.len(), 4);
        assert_eq!(outgoing[3], ChatMessage::user("how are you?"));
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn push_turn_appends_user_then_assistant() {
        let mut transcript = Transcript::default();
        transcript.push_turn("ping", "pong");

        assert_eq!(
            transcript.messages(),
            &[
                ChatMessage::system(DEFAULT_SYSTEM_PROMPT),
                ChatMessage::user("ping"),
                ChatMessage::assistant("pong"),
            ]
        );
    }

    #[test]
    fn ten_turns_fill_capacity_exactly() {
        let mut transcript = Transcript::default();
        for i in 0..10 {
            transcript.push_turn(format!("q{i}"), format!("a{i}"));
        }

        assert_eq!(transcript.len(), MAX_HISTORY_ITEMS);
        assert_eq!(transcript.messages()[1], ChatMessage::user("q0"));
    }

    #[test]
    fn eleventh_turn_drops_oldest_pair_and_keeps_system() {
        let mut transcript = Transcript::default();
        for i in 0..11 {
            transcript.push_turn(format!("q{i}"), format!("a{i}"));
        }

        let messages = transcript.messages();
        assert_eq!(messages.len(), MAX_HISTORY_ITEMS);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1], ChatMessage::user("q1"));
        assert_eq!(messages[2], ChatMessage::assistant("a1"));
        assert_eq!(messages[20], ChatMessage::assistant("a10"));
    }

    #[test]
    fn many_turns_never_exceed_capacity() {
        let mut transcript = Transcript::with_capacity("sys", 5);
        for i in 0..50 {
            transcript.push_turn(format!("q{i}"), format!("a{i}"));
            assert!(transcript.len() <= 5);
            assert_eq!(transcript.messages()[0], ChatMessage::system("sys"));
        }
        assert_eq!(transcript.messages()[1], ChatMessage::user("q48"));
        assert_eq!(transcript.messages()[4], ChatMessage::assistant("a49"));
    }

    #[test]
    fn reset_restores_system_record_only() {
        let mut transcript = Transcript::with_capacity("custom prompt", 21);
        transcript.push_turn("a", "b");
        transcript.push_turn("c", "d");

        transcript.reset();

        assert_eq!(transcript.messages(), &[ChatMessage::system("custom prompt")]);
    }

    #[test]
    fn tiny_capacity_is_raised_to_one_turn() {
        let mut transcript = Transcript::with_capacity("sys", 1);
        transcript.push_turn("q", "a");

        assert_eq!(transcript.max_items(), 3);
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn even_capacity_rounds_up_to_keep_pairs_whole() {
        let mut transcript = Transcript::with_capacity("sys", 4);
        assert_eq!(transcript.max_items(), 5);

        for i in 0..3 {
            transcript.push_turn(format!("q{i}"), format!("a{i}"));
        }

        let messages = transcript.messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1], ChatMessage::user("q1"));
        assert_eq!(messages[2], ChatMessage::assistant("a1"));
        assert_eq!(Transcript::with_capacity("sys", 21).max_items(), 21);
    }

    #[test]
    fn reset_advances_generation() {
        let mut transcript = Transcript::default();
        assert_eq!(transcript.generation(), 0);

        transcript.push_turn("a", "b");
        assert_eq!(transcript.generation(), 0);

        transcript.reset();
        transcript.reset();
        assert_eq!(transcript.generation(), 2);
    }
}
