// ABOUTME: Scripted LLM provider for integration tests
// ABOUTME: Replays queued replies in order and records every prompt it receives
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use wavy_nutrition::errors::AppError;
use wavy_nutrition::llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, TokenUsage};

/// Provider that answers from a queue of canned replies
pub struct ScriptedLlmProvider {
    replies: Mutex<VecDeque<Result<String, AppError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlmProvider {
    /// Provider with no replies queued; every call fails
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    #[must_use]
    pub fn reply(self, content: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(content.into()));
        self
    }

    /// Queue a failed call
    #[allow(dead_code)]
    #[must_use]
    pub fn fail(self, error: AppError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    /// User prompts received so far
    #[allow(dead_code)]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlmProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn display_name(&self) -> &str {
        "Scripted test provider"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::JSON_MODE | LlmCapabilities::SYSTEM_MESSAGES
    }

    fn default_model(&self) -> &str {
        "scripted-1"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        if let Some(prompt) = request.messages.last() {
            self.prompts.lock().unwrap().push(prompt.content.clone());
        }

        let next = self.replies.lock().unwrap().pop_front();
        let content = next.unwrap_or_else(|| {
            Err(AppError::service_unavailable("scripted provider has no replies left"))
        })?;

        Ok(ChatResponse {
            content,
            model: "scripted-1".to_owned(),
            usage: Some(TokenUsage {
                prompt_tokens: 120,
                completion_tokens: 80,
                total_tokens: 200,
            }),
            finish_reason: Some("stop".to_owned()),
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}
