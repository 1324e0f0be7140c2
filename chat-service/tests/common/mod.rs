#![allow(dead_code)]

use chat_service::config::ChatConfig;
use chat_service::services::providers::{ChatProvider, MockChatProvider};
use chat_service::startup::{AppState, Application};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub state: AppState,
    pub client: reqwest::Client,
}

/// Config with every service setting at its default and a random port.
pub fn test_config(vars: &[(&str, &str)]) -> ChatConfig {
    let vars: Vec<(String, String)> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ChatConfig::from_lookup(CoreConfig { port: 0 }, |key| {
        vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    })
    .expect("Failed to build test configuration")
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(MockChatProvider::echo()), &[]).await
    }

    pub async fn spawn_with(provider: Arc<dyn ChatProvider>, vars: &[(&str, &str)]) -> Self {
        let app = Application::build_with_provider(test_config(vars), provider)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let state = app.state().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            state,
            client,
        }
    }

    pub async fn post_chat(&self, message: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/chat/", self.address))
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn history(&self) -> serde_json::Value {
        self.client
            .get(format!("{}/chat/history", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
            .json()
            .await
            .expect("Failed to parse JSON")
    }
}
