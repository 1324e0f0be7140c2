//! Chat-completion provider abstraction.
//!
//! Handlers only talk to [`ChatProvider`], so the hosted API client can be
//! swapped for the mock in tests.

pub mod groq;
pub mod mock;

use crate::models::ChatMessage;
use async_trait::async_trait;
use thiserror::Error;

pub use groq::{GroqConfig, GroqProvider};
pub use mock::{MockChatProvider, MockMode};

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0}")]
    NotConfigured(String),

    #[error("{0}")]
    ApiError(String),

    #[error("rate limited by upstream API")]
    RateLimited,

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("upstream API returned an empty response content")]
    EmptyResponse,
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::NetworkError(_) => "network_error",
            ProviderError::EmptyResponse => "empty_response",
        }
    }
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            model: groq::DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run one completion over `messages` and return the assistant's text.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, ProviderError>;

    /// Verify the upstream accepts our credentials.
    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Whether credentials are present at all.
    fn is_configured(&self) -> bool;
}

impl From<ProviderError> for service_core::error::AppError {
    fn from(err: ProviderError) -> Self {
        use service_core::error::AppError;
        match err {
            ProviderError::NotConfigured(msg) => AppError::ServiceUnavailable(msg),
            other => AppError::BadGateway(format!("LLM API error: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use service_core::error::AppError;

    #[test]
    fn not_configured_maps_to_service_unavailable() {
        let err = AppError::from(ProviderError::NotConfigured("no key".into()));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn upstream_failures_map_to_bad_gateway_with_prefix() {
        for provider_err in [
            ProviderError::ApiError("Error code: 401 - Invalid API Key".into()),
            ProviderError::RateLimited,
            ProviderError::NetworkError("connection refused".into()),
            ProviderError::EmptyResponse,
        ] {
            let err = AppError::from(provider_err);
            assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
            match err {
                AppError::BadGateway(msg) => assert!(msg.starts_with("LLM API error: ")),
                other => panic!("unexpected mapping: {other:?}"),
            }
        }
    }
}
