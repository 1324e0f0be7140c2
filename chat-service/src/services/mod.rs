pub mod chat;
pub mod conversation;
pub mod metrics;
pub mod providers;

pub use chat::ChatService;
pub use conversation::ConversationStore;
pub use metrics::{get_metrics, init_metrics};
