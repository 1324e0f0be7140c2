//! Domain models for the chat service.

pub mod message;
pub mod transcript;

pub use message::{ChatMessage, Role};
pub use transcript::{DEFAULT_SYSTEM_PROMPT, MAX_HISTORY_ITEMS, Transcript};
