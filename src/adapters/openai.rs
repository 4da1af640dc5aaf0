//! Chat-completions client for OpenAI and OpenAI-compatible endpoints.
//!
//! Each [`CompletionClient::complete`] call owns its retry budget:
//! rate limits, timeouts, 408 and 5xx replies are retried with exponential
//! backoff, while rejected credentials and other 4xx replies fail at once.

use crate::core::{CompletionClient, CompletionOptions};
use crate::utils::error::{CompletionError, PlannerError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Exponential backoff between attempts of a single completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 1000,
            max_backoff_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        let delay = self.initial_backoff_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_backoff_ms))
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// A failed attempt that may succeed if tried again.
#[derive(Debug)]
enum TransientFailure {
    RateLimited,
    Timeout,
    Server { status: Option<u16>, message: String },
}

impl TransientFailure {
    fn into_error(self, attempts: u32) -> CompletionError {
        match self {
            TransientFailure::RateLimited => CompletionError::RateLimited { attempts },
            TransientFailure::Timeout => CompletionError::Timeout { attempts },
            TransientFailure::Server { status, message } => CompletionError::Provider {
                status,
                message: format!("{message} (gave up after {attempts} attempts)"),
            },
        }
    }
}

enum AttemptError {
    Fatal(CompletionError),
    Transient(TransientFailure),
}

pub struct OpenAiClient {
    http: Client,
    api_key: String,
    config: OpenAiConfig,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_key", &"<redacted>")
            .field("config", &self.config)
            .finish()
    }
}

impl OpenAiClient {
    /// Fails with [`CompletionError::Auth`] when `api_key` is blank, before
    /// any request is made.
    pub fn new(api_key: impl Into<String>, config: OpenAiConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CompletionError::Auth {
                message: format!("{API_KEY_ENV} is empty"),
            }
            .into());
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PlannerError::ConfigError {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    /// Reads the API key from [`API_KEY_ENV`].
    pub fn from_env(config: OpenAiConfig) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| CompletionError::Auth {
            message: format!("{API_KEY_ENV} is not set"),
        })?;
        Self::new(api_key, config)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn attempt(
        &self,
        url: &str,
        request: &ChatRequest<'_>,
    ) -> std::result::Result<String, AttemptError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_failure)?;
        tracing::debug!("Completion response status: {}", status);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AttemptError::Fatal(CompletionError::Auth {
                message: provider_message(&body),
            }));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AttemptError::Transient(TransientFailure::RateLimited));
        }
        if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
            return Err(AttemptError::Transient(TransientFailure::Server {
                status: Some(status.as_u16()),
                message: format!("HTTP {}: {}", status.as_u16(), provider_message(&body)),
            }));
        }
        if !status.is_success() {
            return Err(AttemptError::Fatal(CompletionError::Provider {
                status: Some(status.as_u16()),
                message: format!("HTTP {}: {}", status.as_u16(), provider_message(&body)),
            }));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            AttemptError::Fatal(CompletionError::Provider {
                status: Some(status.as_u16()),
                message: format!("Malformed completion response: {e}"),
            })
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AttemptError::Fatal(CompletionError::Provider {
                    status: Some(status.as_u16()),
                    message: "Completion response contained no text".to_string(),
                })
            })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> std::result::Result<String, CompletionError> {
        let url = self.endpoint();
        let request = ChatRequest {
            model: &options.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: options.max_tokens,
        };

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            tracing::debug!("📡 Completion request to {} (attempt {})", url, attempt);

            let failure = match self.attempt(&url, &request).await {
                Ok(text) => return Ok(text),
                Err(AttemptError::Fatal(error)) => {
                    tracing::error!("Completion request failed: {}", error);
                    return Err(error);
                }
                Err(AttemptError::Transient(failure)) => failure,
            };

            if attempt > options.max_retries {
                tracing::warn!(
                    "Completion retries exhausted after {} attempts ({:?})",
                    attempt,
                    failure
                );
                return Err(failure.into_error(attempt));
            }

            let backoff = self.config.retry.backoff(attempt);
            tracing::warn!(
                "Completion attempt {} failed ({:?}), retry {}/{} in {:?}",
                attempt,
                failure,
                attempt,
                options.max_retries,
                backoff
            );
            tokio::time::sleep(backoff).await;
        }
    }
}

fn transport_failure(error: reqwest::Error) -> AttemptError {
    if error.is_timeout() {
        AttemptError::Transient(TransientFailure::Timeout)
    } else {
        AttemptError::Transient(TransientFailure::Server {
            status: None,
            message: format!("Request failed: {error}"),
        })
    }
}

fn provider_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(response) => response.error.message,
        Err(_) => body.chars().take(200).collect(),
    }
}
