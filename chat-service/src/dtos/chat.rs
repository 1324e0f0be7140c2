use crate::models::ChatMessage;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MISSING_MESSAGE_ERROR: &str = "Missing 'message' in request body";
pub const RESET_STATUS: &str = "Conversation history reset.";

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Absent and empty are rejected alike.
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing 'message' in request body"))]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResetResponse {
    pub status: String,
}
