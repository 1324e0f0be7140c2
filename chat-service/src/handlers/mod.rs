//! HTTP handlers for the chat service.

pub mod chat;
pub mod health;
pub mod hello;

pub use chat::{get_history, reset_history, send_message};
pub use health::{health_check, metrics_endpoint, not_found, readiness_check};
pub use hello::say_hello;
