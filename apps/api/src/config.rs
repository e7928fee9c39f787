use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but unparseable.
#[derive(Debug, Clone)]
pub struct Config {
    /// Oracle credential. Absence is reported by `LlmClient::from_config`.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_question_max_tokens: u32,
    pub llm_learning_max_tokens: u32,
    pub llm_max_retries: u32,
    pub llm_base_delay_ms: u64,
    pub llm_http_timeout_secs: u64,
    pub request_deadline_secs: u64,
    /// Default generation mode when a request does not pick one.
    pub quality_optimization: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1".to_string())?,
            llm_model: env_or("LLM_MODEL", "gpt-3.5-turbo-1106".to_string())?,
            llm_temperature: env_or("LLM_TEMPERATURE", 0.7)?,
            llm_question_max_tokens: env_or("LLM_QUESTION_MAX_TOKENS", 2000)?,
            llm_learning_max_tokens: env_or("LLM_LEARNING_MAX_TOKENS", 1500)?,
            llm_max_retries: env_or("LLM_MAX_RETRIES", 3)?,
            llm_base_delay_ms: env_or("LLM_BASE_DELAY_MS", 1000)?,
            llm_http_timeout_secs: env_or("LLM_HTTP_TIMEOUT_SECS", 60)?,
            request_deadline_secs: env_or("REQUEST_DEADLINE_SECS", 120)?,
            quality_optimization: env_or("QUALITY_OPTIMIZATION", true)?,
            port: env_or("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            openai_api_key: Some("sk-test".to_string()),
            openai_base_url: "http://127.0.0.1:9".to_string(),
            llm_model: "test-model".to_string(),
            llm_temperature: 0.7,
            llm_question_max_tokens: 2000,
            llm_learning_max_tokens: 1500,
            llm_max_retries: 3,
            llm_base_delay_ms: 1000,
            llm_http_timeout_secs: 5,
            request_deadline_secs: 120,
            quality_optimization: true,
            port: 8000,
            rust_log: "info".to_string(),
        }
    }
}

/// Reads `key`, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'"))
}
