// ABOUTME: LLM provider selection from environment-derived settings
// ABOUTME: Returns None when the selected provider lacks credentials so callers can degrade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::sync::Arc;

use tracing::{info, warn};

use super::{LlmProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider};
use crate::config::{LlmProviderType, LlmSettings};
use crate::errors::AppResult;

/// Build the provider selected by `LLM_PROVIDER`
///
/// Returns `Ok(None)` when the provider's credentials are missing; LLM
/// features are then disabled rather than failing startup.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created
pub fn create_provider(settings: &LlmSettings) -> AppResult<Option<Arc<dyn LlmProvider>>> {
    let config = match settings.provider {
        LlmProviderType::OpenAi => settings
            .openai_api_key
            .as_deref()
            .map(|key| OpenAiCompatibleConfig::openai(key, &settings.openai_model)),
        LlmProviderType::Azure => match (
            settings.azure_endpoint.as_deref(),
            settings.azure_api_key.as_deref(),
            settings.azure_deployment.as_deref(),
        ) {
            (Some(endpoint), Some(key), Some(deployment)) => {
                Some(OpenAiCompatibleConfig::azure(endpoint, key, deployment))
            }
            _ => None,
        },
        LlmProviderType::Local => Some(OpenAiCompatibleConfig::local(
            &settings.local_base_url,
            &settings.local_model,
        )),
    };

    let Some(config) = config else {
        warn!(
            provider = %settings.provider,
            "LLM credentials missing; LLM features disabled"
        );
        return Ok(None);
    };

    let provider = OpenAiCompatibleProvider::new(config)?;
    info!(provider = provider.name(), "LLM provider ready");
    Ok(Some(Arc::new(provider)))
}
