use crate::models::{DEFAULT_SYSTEM_PROMPT, MAX_HISTORY_ITEMS};
use crate::services::providers::groq::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::services::providers::{CompletionParams, GroqConfig};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";
const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub llm: LlmConfig,
    pub conversation: ConversationConfig,
    pub security: SecurityConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Absent key disables chat; the service still starts.
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct ConversationConfig {
    pub system_prompt: String,
    /// Transcript cap including the system record.
    pub max_history_items: usize,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Largest accepted request body; bigger bodies get a 413.
    pub max_body_bytes: usize,
}

impl ChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build the service config from `lookup` instead of the process environment.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("ENVIRONMENT").as_deref() {
            Some("prod") => Environment::Prod,
            _ => Environment::Dev,
        };
        let is_prod = environment == Environment::Prod;
        let get = |key: &str, default: Option<&str>| get_env(&lookup, key, default, is_prod);

        let max_history_items = parse(
            "CHAT_MAX_HISTORY_ITEMS",
            &get("CHAT_MAX_HISTORY_ITEMS", Some(&MAX_HISTORY_ITEMS.to_string()))?,
        )?;
        if max_history_items < 3 || max_history_items % 2 == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "CHAT_MAX_HISTORY_ITEMS must be odd and at least 3, got {}",
                max_history_items
            )));
        }

        let allowed_origins = get(
            "CORS_ALLOWED_ORIGINS",
            (!is_prod).then_some(DEFAULT_ALLOWED_ORIGINS),
        )?;

        Ok(ChatConfig {
            common,
            environment,
            llm: LlmConfig {
                api_key: lookup("GROQ_API_KEY").filter(|key| !key.trim().is_empty()),
                api_base: get("GROQ_API_BASE_URL", Some(DEFAULT_API_BASE))?,
                model: get("GROQ_MODEL", Some(DEFAULT_MODEL))?,
                temperature: parse(
                    "LLM_TEMPERATURE",
                    &get("LLM_TEMPERATURE", Some(&DEFAULT_TEMPERATURE.to_string()))?,
                )?,
                max_tokens: parse(
                    "LLM_MAX_TOKENS",
                    &get("LLM_MAX_TOKENS", Some(&DEFAULT_MAX_TOKENS.to_string()))?,
                )?,
                timeout_seconds: parse(
                    "LLM_TIMEOUT_SECONDS",
                    &get("LLM_TIMEOUT_SECONDS", Some(&DEFAULT_TIMEOUT_SECONDS.to_string()))?,
                )?,
            },
            conversation: ConversationConfig {
                system_prompt: get("CHAT_SYSTEM_PROMPT", Some(DEFAULT_SYSTEM_PROMPT))?,
                max_history_items,
            },
            security: SecurityConfig {
                allowed_origins: allowed_origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
            http: HttpConfig {
                max_body_bytes: parse(
                    "CHAT_MAX_BODY_BYTES",
                    &get("CHAT_MAX_BODY_BYTES", Some(&DEFAULT_MAX_BODY_BYTES.to_string()))?,
                )?,
            },
        })
    }

    pub fn groq(&self) -> GroqConfig {
        GroqConfig {
            api_key: self.llm.api_key.clone(),
            api_base: self.llm.api_base.clone(),
            timeout: Duration::from_secs(self.llm.timeout_seconds),
        }
    }

    pub fn completion_params(&self) -> CompletionParams {
        CompletionParams {
            model: self.llm.model.clone(),
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
        }
    }
}

fn get_env<F>(
    lookup: &F,
    key: &str,
    default: Option<&str>,
    is_prod: bool,
) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => match default {
            Some(def) => Ok(def.to_string()),
            None if is_prod => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required in production but not set",
                key
            ))),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                key
            ))),
        },
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}
