/// LLM Client: the single point of entry for all oracle calls in the coach service.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// All LLM interactions MUST go through `LlmClient::complete`.
///
/// The network hop lives behind `CompletionBackend` so the retry engine is
/// independent of the transport. `OpenAiBackend` is the production backend.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::Config;

pub mod prompts;

use prompts::{HEALTH_CHECK_MARKER, HEALTH_CHECK_PROMPT, JSON_ONLY_INSTRUCTION};

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    /// Rate limit, timeout, connection failure or 5xx. Retried.
    #[error("transient oracle error: {0}")]
    Transient(String),

    /// Anything the oracle rejected outright (bad request, auth). Not retried.
    #[error("oracle API error (status {status:?}): {message}")]
    Fatal {
        status: Option<u16>,
        message: String,
    },

    #[error("oracle API retries exhausted after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<LlmError>,
    },

    #[error("LLM returned empty content")]
    EmptyResponse,

    #[error("malformed LLM output: {0}")]
    MalformedOutput(String),
}

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Transient(_))
    }
}

/// Maps a non-success HTTP status to the retry taxonomy.
fn classify_status(status: StatusCode, message: String) -> LlmError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        LlmError::Transient(format!("status {status}: {message}"))
    } else {
        LlmError::Fatal {
            status: Some(status.as_u16()),
            message,
        }
    }
}

fn classify_transport(err: reqwest::Error) -> LlmError {
    if err.is_timeout() || err.is_connect() {
        LlmError::Transient(err.to_string())
    } else {
        LlmError::Fatal {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Backend seam
// ────────────────────────────────────────────────────────────────────────────

/// A fully resolved completion call, as handed to the backend.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Ask the oracle for its structured JSON response mode.
    pub json_mode: bool,
}

/// One network attempt against the oracle. Implementations classify their
/// failures as `LlmError::Transient` or `LlmError::Fatal`; retrying is the
/// client's job, never the backend's.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn send(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Per-call knobs chosen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never below 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay slept after failed attempt `attempt` (0-based): base * 2^attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BASE_DELAY)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client used by the coaching pipeline.
/// Wraps a `CompletionBackend` with retry/backoff and the JSON-mode contract.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn CompletionBackend>,
    retry: RetryPolicy,
    /// Model used for the health probe.
    health_model: String,
}

impl LlmClient {
    pub fn new(backend: Arc<dyn CompletionBackend>, retry: RetryPolicy, health_model: String) -> Self {
        Self {
            backend,
            retry,
            health_model,
        }
    }

    /// Builds the production client. Fails before any network traffic when no
    /// credential is configured.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let api_key = config
            .openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LlmError::Configuration("OPENAI_API_KEY is not set".to_string()))?;

        let backend = OpenAiBackend::new(
            api_key.to_string(),
            config.openai_base_url.clone(),
            Duration::from_secs(config.llm_http_timeout_secs),
        )?;

        Ok(Self::new(
            Arc::new(backend),
            RetryPolicy::new(
                config.llm_max_retries,
                Duration::from_millis(config.llm_base_delay_ms),
            ),
            config.llm_model.clone(),
        ))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Sends `prompt` to the oracle and returns the trimmed completion text.
    ///
    /// Transient failures are retried with exponential backoff up to the
    /// policy's attempt budget; fatal failures return immediately. With
    /// `options.json` the prompt gains a JSON-only instruction and the backend
    /// is asked for JSON mode. The reply is still untrusted text.
    pub async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String, LlmError> {
        let prompt = if options.json {
            format!("{prompt}\n\n{JSON_ONLY_INSTRUCTION}")
        } else {
            prompt.to_string()
        };

        let request = CompletionRequest {
            prompt,
            model: options.model.clone(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            json_mode: options.json,
        };

        let max_attempts = self.retry.max_attempts;
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..max_attempts {
            match self.backend.send(&request).await {
                Ok(text) => {
                    let text = text.trim();
                    if text.is_empty() {
                        return Err(LlmError::EmptyResponse);
                    }
                    return Ok(text.to_string());
                }
                Err(e) if e.is_retryable() => {
                    if attempt + 1 < max_attempts {
                        let delay = self.retry.delay_for(attempt);
                        warn!(
                            "LLM call attempt {}/{} failed, retrying after {}ms: {}",
                            attempt + 1,
                            max_attempts,
                            delay.as_millis(),
                            e
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        error!("LLM call failed on final attempt {max_attempts}: {e}");
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(LlmError::Exhausted {
            attempts: max_attempts,
            last: Box::new(
                last_error.unwrap_or_else(|| LlmError::Transient("no attempt was made".to_string())),
            ),
        })
    }

    /// Cheap liveness probe against the oracle. Never returns an error.
    pub async fn health_check(&self) -> bool {
        let options = CompletionOptions {
            model: self.health_model.clone(),
            temperature: 0.1,
            max_tokens: Some(10),
            json: false,
        };

        match self.complete(HEALTH_CHECK_PROMPT, &options).await {
            Ok(reply) => reply.contains(HEALTH_CHECK_MARKER),
            Err(e) => {
                error!("LLM health check failed: {e}");
                false
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI-compatible backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completions backend for OpenAI and API-compatible gateways.
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiBackend {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn send(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(classify_status(status, message));
        }

        let chat: ChatResponse = response.json().await.map_err(classify_transport)?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test support
// ────────────────────────────────────────────────────────────────────────────
