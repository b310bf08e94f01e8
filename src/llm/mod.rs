// ABOUTME: LLM provider abstraction layer used for plan generation and procurement insights
// ABOUTME: Defines the provider contract plus a JSON-mode client with retry and backoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! # LLM Provider Interface
//!
//! - **`LlmCapabilities`**: Bitflags describing provider features
//! - **`LlmProvider`**: Async trait for chat completion
//! - **`ChatMessage`** / **`ChatRequest`** / **`ChatResponse`**: request and response types
//! - **`LlmClient`**: wraps a provider with the configured token cap, temperature
//!   and retry policy, and parses JSON-mode completions
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wavy_nutrition::config::LlmSettings;
//! use wavy_nutrition::llm::{create_provider, LlmClient};
//!
//! # async fn example(settings: LlmSettings) -> Result<(), wavy_nutrition::errors::AppError> {
//! if let Some(provider) = create_provider(&settings)? {
//!     let client = LlmClient::new(provider, &settings);
//!     let completion = client.complete_json("Suggest a breakfast as JSON").await?;
//!     println!("{}", completion.value);
//! }
//! # Ok(())
//! # }
//! ```

mod openai_compatible;
pub mod prompts;
mod provider;

pub use openai_compatible::{ApiKeyStyle, OpenAiCompatibleConfig, OpenAiCompatibleProvider};
pub use provider::create_provider;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::LlmSettings;
use crate::constants::llm::JSON_SYSTEM_PROMPT;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models;

// ============================================================================
// Capability Flags
// ============================================================================

bitflags::bitflags! {
    /// LLM provider capability flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LlmCapabilities: u8 {
        /// Provider honours `response_format: json_object`
        const JSON_MODE = 0b0000_0001;
        /// Provider supports system messages
        const SYSTEM_MESSAGES = 0b0000_0010;
    }
}

impl LlmCapabilities {
    /// Check if JSON mode is supported
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }

    /// Check if system messages are supported
    #[must_use]
    pub const fn supports_system_messages(&self) -> bool {
        self.contains(Self::SYSTEM_MESSAGES)
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// Convert to string representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Configuration for a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Model identifier (provider-specific)
    pub model: Option<String>,
    /// Temperature for response randomness (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Ask the provider for a JSON object response
    pub json_mode: bool,
}

impl ChatRequest {
    /// Create a new chat request with messages
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
            json_mode: false,
        }
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Request a JSON object response
    #[must_use]
    pub const fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// Response from a chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated message content
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
    /// Finish reason (stop, length, etc.)
    pub finish_reason: Option<String>,
}

/// Token usage statistics as reported by the provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

impl From<TokenUsage> for models::TokenUsage {
    fn from(usage: TokenUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// LLM provider trait for chat completion
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique provider identifier (e.g., "openai", "azure", "ollama")
    fn name(&self) -> &str;

    /// Human-readable display name for the provider
    fn display_name(&self) -> &str;

    /// Provider capabilities
    fn capabilities(&self) -> LlmCapabilities;

    /// Default model to use if not specified in request
    fn default_model(&self) -> &str;

    /// Perform a chat completion
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError>;

    /// Check if the provider is reachable and the credentials are valid
    async fn health_check(&self) -> Result<bool, AppError>;
}

// ============================================================================
// JSON Completion Client
// ============================================================================

/// Retry schedule for LLM calls: `attempts` tries, sleeping `base_delay * 2^n` between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, at least one
    pub attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based)
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2_u32.saturating_pow(retry))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// A parsed JSON-mode completion
#[derive(Debug, Clone)]
pub struct JsonCompletion {
    /// Parsed JSON object
    pub value: serde_json::Value,
    /// Token usage, when the provider reported it
    pub usage: Option<models::TokenUsage>,
}

/// Provider plus request defaults shared by the planning and procurement services
#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn LlmProvider>,
    max_tokens: u32,
    temperature: f32,
    retry: RetryPolicy,
}

impl LlmClient {
    /// Wrap `provider` with the limits from `settings`
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, settings: &LlmSettings) -> Self {
        Self {
            provider,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            retry: RetryPolicy {
                attempts: settings.retry_attempts.max(1),
                ..RetryPolicy::default()
            },
        }
    }

    /// Override the retry policy
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Underlying provider
    #[must_use]
    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Send `prompt` in JSON mode and parse the reply as a JSON object
    ///
    /// # Errors
    ///
    /// Returns the last provider error once retries are exhausted, or a
    /// serialization error if the reply is not valid JSON
    pub async fn complete_json(&self, prompt: &str) -> AppResult<JsonCompletion> {
        self.complete_json_with_limit(prompt, self.max_tokens).await
    }

    /// Like [`Self::complete_json`] with an explicit completion token cap
    ///
    /// # Errors
    ///
    /// Same as [`Self::complete_json`]
    pub async fn complete_json_with_limit(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> AppResult<JsonCompletion> {
        let mut request = ChatRequest::new(vec![
            ChatMessage::system(JSON_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(max_tokens);
        if self.provider.capabilities().supports_json_mode() {
            request = request.with_json_mode();
        }

        let response = self.complete_with_retry(&request).await?;
        let value = parse_json_content(&response.content)?;
        Ok(JsonCompletion {
            value,
            usage: response.usage.map(Into::into),
        })
    }

    async fn complete_with_retry(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let mut retry = 0;
        loop {
            match self.provider.complete(request).await {
                Ok(response) => return Ok(response),
                Err(error) if is_retryable(&error) && retry + 1 < self.retry.attempts => {
                    let delay = self.retry.delay_for(retry);
                    warn!(
                        provider = self.provider.name(),
                        attempt = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        "LLM call failed, retrying: {error}"
                    );
                    sleep(delay).await;
                    retry += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Authentication and validation failures will not succeed on retry
fn is_retryable(error: &AppError) -> bool {
    let flagged_permanent = error
        .details
        .as_ref()
        .and_then(|d| d.get("retryable"))
        .and_then(serde_json::Value::as_bool)
        == Some(false);

    !flagged_permanent
        && matches!(
            error.code,
            ErrorCode::ExternalServiceError
                | ErrorCode::ExternalServiceUnavailable
                | ErrorCode::ExternalRateLimited
        )
}

/// Parse model output as JSON, tolerating markdown code fences around it
///
/// # Errors
///
/// Returns a serialization error when no JSON value can be parsed
pub fn parse_json_content(content: &str) -> AppResult<serde_json::Value> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map_or(trimmed, |rest| rest.trim_end().trim_end_matches("```"))
        .trim();

    serde_json::from_str(unfenced).map_err(|e| {
        debug!("Unparseable LLM content: {}", unfenced.chars().take(200).collect::<String>());
        AppError::serialization(format!("LLM returned invalid JSON: {e}"))
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_parse_json_content_strips_fences() {
        let value = parse_json_content("```json\n{\"summary\": \"ok\"}\n```").unwrap();
        assert_eq!(value["summary"], "ok");

        let bare = parse_json_content("  {\"a\": 1} ").unwrap();
        assert_eq!(bare["a"], 1);
    }

    #[test]
    fn test_parse_json_content_rejects_prose() {
        let err = parse_json_content("Sure! Here is your plan.").unwrap_err();
        assert_eq!(err.code, ErrorCode::SerializationError);
    }

    #[test]
    fn test_retry_delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[test]
    fn test_only_transient_errors_retry() {
        assert!(is_retryable(&AppError::external_service("openai", "boom")));
        assert!(!is_retryable(&AppError::new(
            ErrorCode::ExternalAuthFailed,
            "bad key"
        )));
    }
}
