//! chat-service: HTTP chat backend in front of a hosted chat-completion API.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
