// ABOUTME: OpenAI-compatible chat completions client for OpenAI, Azure OpenAI, and local servers
// ABOUTME: Maps provider HTTP failures onto AppError codes so callers can decide on retries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! # `OpenAI`-Compatible Provider
//!
//! One implementation covers three deployments that speak the chat
//! completions protocol:
//!
//! - **`OpenAI`**: `https://api.openai.com/v1`, bearer authentication
//! - **Azure `OpenAI`**: per-deployment URL with an `api-version` query and
//!   an `api-key` header
//! - **Local** (Ollama, vLLM, `LocalAI`): any base URL, no authentication

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, TokenUsage};
use crate::constants::llm::AZURE_API_VERSION;
use crate::errors::{AppError, ErrorCode};

/// Default `OpenAI` API base URL
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection timeout
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Request timeout; full weekly plans can take a while to generate
const REQUEST_TIMEOUT_SECS: u64 = 180;

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<OpenAiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for OpenAiMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    #[serde(default)]
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens", default)]
    total: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// How the API key is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `api-key: <key>` (Azure)
    ApiKeyHeader,
}

/// Configuration for the `OpenAI`-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Full URL of the chat completions endpoint
    pub completions_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// How the key is attached
    pub key_style: ApiKeyStyle,
    /// Model sent in the request body; `None` for Azure, where the deployment selects it
    pub default_model: Option<String>,
    /// Provider name for logging
    pub provider_name: String,
    /// Provider display name
    pub display_name: String,
    /// Capabilities of this provider
    pub capabilities: LlmCapabilities,
}

impl OpenAiCompatibleConfig {
    /// `OpenAI` public API
    #[must_use]
    pub fn openai(api_key: &str, model: &str) -> Self {
        Self {
            completions_url: format!("{OPENAI_BASE_URL}/chat/completions"),
            api_key: Some(api_key.to_owned()),
            key_style: ApiKeyStyle::Bearer,
            default_model: Some(model.to_owned()),
            provider_name: "openai".to_owned(),
            display_name: "OpenAI".to_owned(),
            capabilities: LlmCapabilities::JSON_MODE | LlmCapabilities::SYSTEM_MESSAGES,
        }
    }

    /// Azure `OpenAI` deployment
    #[must_use]
    pub fn azure(endpoint: &str, api_key: &str, deployment: &str) -> Self {
        Self {
            completions_url: format!(
                "{}/openai/deployments/{deployment}/chat/completions?api-version={AZURE_API_VERSION}",
                endpoint.trim_end_matches('/')
            ),
            api_key: Some(api_key.to_owned()),
            key_style: ApiKeyStyle::ApiKeyHeader,
            default_model: None,
            provider_name: "azure".to_owned(),
            display_name: format!("Azure OpenAI ({deployment})"),
            capabilities: LlmCapabilities::JSON_MODE | LlmCapabilities::SYSTEM_MESSAGES,
        }
    }

    /// Local `OpenAI`-compatible server such as Ollama or vLLM
    #[must_use]
    pub fn local(base_url: &str, model: &str) -> Self {
        let (provider_name, display_name) = if base_url.contains(":11434") {
            ("ollama", "Ollama (Local)")
        } else if base_url.contains(":8000") {
            ("vllm", "vLLM (Local)")
        } else {
            ("local", "Local LLM")
        };

        Self {
            completions_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: None,
            key_style: ApiKeyStyle::Bearer,
            default_model: Some(model.to_owned()),
            provider_name: provider_name.to_owned(),
            display_name: display_name.to_owned(),
            capabilities: LlmCapabilities::SYSTEM_MESSAGES,
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Chat completions client for any `OpenAI`-compatible endpoint
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        info!(
            provider = %config.provider_name,
            model = config.default_model.as_deref().unwrap_or("deployment default"),
            "Initialized {} provider",
            config.display_name
        );
        Ok(Self { client, config })
    }

    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match (&self.config.api_key, self.config.key_style) {
            (Some(key), ApiKeyStyle::Bearer) => {
                request.header("Authorization", format!("Bearer {key}"))
            }
            (Some(key), ApiKeyStyle::ApiKeyHeader) => request.header("api-key", key),
            (None, _) => request,
        }
    }

    fn parse_error_response(&self, status: reqwest::StatusCode, body: &str) -> AppError {
        let service = self.config.provider_name.as_str();
        let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) else {
            return match status.as_u16() {
                502..=504 => AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("{} is not responding ({status})", self.config.display_name),
                ),
                _ => AppError::external_service(
                    service,
                    format!(
                        "API error ({status}): {}",
                        body.chars().take(200).collect::<String>()
                    ),
                ),
            };
        };

        let detail = error_response.error.message;
        match status.as_u16() {
            401 | 403 => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("{service}: API authentication failed: {detail}"),
            ),
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                format!("{service}: rate limit reached: {detail}"),
            ),
            400 | 404 => AppError::new(
                ErrorCode::ExternalServiceError,
                format!("{service}: request rejected ({status}): {detail}"),
            )
            .with_details(serde_json::json!({ "retryable": false })),
            _ => AppError::external_service(
                service,
                format!(
                    "{} - {detail}",
                    error_response.error.error_type.as_deref().unwrap_or("unknown")
                ),
            ),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.config.provider_name
    }

    fn display_name(&self) -> &str {
        &self.config.display_name
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        self.config.default_model.as_deref().unwrap_or("")
    }

    #[instrument(skip(self, request), fields(provider = %self.config.provider_name))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request
            .model
            .as_deref()
            .or(self.config.default_model.as_deref());

        let body = OpenAiRequest {
            model,
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };
        debug!(
            messages = body.messages.len(),
            json_mode = request.json_mode,
            "Sending chat completion request"
        );

        let service = self.config.provider_name.as_str();
        let response = self
            .add_auth_header(self.client.post(&self.config.completions_url).json(&body))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to {service}: {e}");
                if e.is_connect() || e.is_timeout() {
                    AppError::new(
                        ErrorCode::ExternalServiceUnavailable,
                        format!("Cannot reach {}: {e}", self.config.display_name),
                    )
                } else {
                    AppError::external_service(service, format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::external_service(service, format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(self.parse_error_response(status, &text));
        }

        let parsed: OpenAiResponse = serde_json::from_str(&text).map_err(|e| {
            error!(
                "Failed to parse {service} response: {e} - body: {}",
                text.chars().take(500).collect::<String>()
            );
            AppError::external_service(service, format!("Failed to parse response: {e}"))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(service, "API returned no choices"))?;

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::external_service(service, "API returned empty content"))?;

        debug!(
            content_len = content.len(),
            finish_reason = ?choice.finish_reason,
            "Received chat completion"
        );

        Ok(ChatResponse {
            content,
            model: parsed.model,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt,
                completion_tokens: u.completion,
                total_tokens: if u.total == 0 {
                    u.prompt + u.completion
                } else {
                    u.total
                },
            }),
            finish_reason: choice.finish_reason,
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        let request = ChatRequest::new(vec![ChatMessage::user("ping")]).with_max_tokens(1);
        match self.complete(&request).await {
            Ok(_) => Ok(true),
            Err(e) if e.code == ErrorCode::ExternalAuthFailed => Err(e),
            Err(e) => {
                debug!("{} health check failed: {e}", self.config.display_name);
                Ok(false)
            }
        }
    }
}
