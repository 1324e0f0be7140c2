//! Application startup and lifecycle management.

use crate::config::ChatConfig;
use crate::handlers;
use crate::models::Transcript;
use crate::services::providers::{ChatProvider, GroqProvider};
use crate::services::{ChatService, ConversationStore};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ChatConfig>,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(config: ChatConfig, provider: Arc<dyn ChatProvider>) -> Self {
        let transcript = Transcript::with_capacity(
            config.conversation.system_prompt.clone(),
            config.conversation.max_history_items,
        );
        let chat = ChatService::new(
            ConversationStore::new(transcript),
            provider,
            config.completion_params(),
        );

        Self {
            config: Arc::new(config),
            chat,
        }
    }
}

/// Build the full router: greeting, chat routes, operational endpoints and the
/// middleware stack.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.allowed_origins);
    let body_limit = DefaultBodyLimit::max(state.config.http.max_body_bytes);

    Router::new()
        .route("/", get(handlers::say_hello))
        .route("/chat", post(handlers::send_message))
        .route("/chat/", post(handlers::send_message))
        .route("/chat/history", get(handlers::get_history))
        .route("/chat/reset", post(handlers::reset_history))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .fallback(handlers::not_found)
        .layer(body_limit)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) if value != "*" => Some(value),
            Ok(_) => {
                tracing::error!("Wildcard CORS origin is not supported; ignoring it");
                None
            }
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Ignoring it.", o, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

type ServerFuture = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    server: ServerFuture,
    state: AppState,
}

impl Application {
    /// Build the application against the hosted Groq API.
    pub async fn build(config: ChatConfig) -> Result<Self, AppError> {
        let provider = GroqProvider::new(config.groq()).map_err(|e| {
            tracing::error!("Failed to initialize Groq provider: {}", e);
            AppError::InternalError(anyhow::anyhow!("Failed to initialize Groq provider: {}", e))
        })?;

        if config.llm.api_key.is_none() {
            tracing::error!("GROQ_API_KEY is not set; chat requests will be answered with 503");
        } else {
            tracing::info!(model = %config.llm.model, "Initialized Groq provider");
        }

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application with an explicit provider (used by tests).
    pub async fn build_with_provider(
        config: ChatConfig,
        provider: Arc<dyn ChatProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(config, provider);

        // Port 0 binds a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, router(state.clone()))
            .with_graceful_shutdown(shutdown_signal())
            .into_future();

        Ok(Self {
            port,
            server: Box::pin(server),
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
