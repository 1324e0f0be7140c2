pub mod chat;

pub use chat::{
    ChatHistoryResponse, ChatResetResponse, SendMessageRequest, SendMessageResponse,
    MISSING_MESSAGE_ERROR, RESET_STATUS,
};
