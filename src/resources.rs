// ABOUTME: Shared server state handed to every route handler
// ABOUTME: Owns the database, optional LLM client, configuration, and domain services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! # Server Resources
//!
//! Built once at startup and shared behind an `Arc`. Services hold cheap
//! clones of the database handle and LLM client.

use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::config::ServerConfig;
use crate::database::Database;
use crate::llm::{create_provider, LlmClient, LlmProvider};
use crate::planning::PlanGenerationService;
use crate::procurement::ProcurementService;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// `SQLite` persistence
    pub database: Database,
    /// LLM client, `None` when no provider is configured
    pub llm: Option<LlmClient>,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Weekly plan generation and meal suggestions
    pub planning: PlanGenerationService,
    /// Shopping lists and procurement insights
    pub procurement: ProcurementService,
}

impl ServerResources {
    /// Assemble resources from already-constructed parts
    #[must_use]
    pub fn new(database: Database, llm: Option<LlmClient>, config: ServerConfig) -> Self {
        Self {
            planning: PlanGenerationService::new(database.clone(), llm.clone()),
            procurement: ProcurementService::new(database.clone(), llm.clone()),
            database,
            llm,
            config: Arc::new(config),
        }
    }

    /// Open the database and build the LLM client described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened
    pub async fn from_config(config: ServerConfig) -> Result<Self> {
        let database = Database::new(&config.database_url).await?;

        let llm = match create_provider(&config.llm) {
            Ok(Some(provider)) => Some(LlmClient::new(provider, &config.llm)),
            Ok(None) => None,
            Err(e) => {
                warn!("LLM provider could not be created: {e}");
                None
            }
        };

        Ok(Self::new(database, llm, config))
    }

    /// Replace the LLM client with one wrapping `provider`
    #[must_use]
    pub fn with_llm_provider(self, provider: Arc<dyn LlmProvider>) -> Self {
        let llm = LlmClient::new(provider, &self.config.llm);
        let config = Arc::unwrap_or_clone(self.config);
        Self::new(self.database, Some(llm), config)
    }

    /// Name of the configured LLM provider, if any
    #[must_use]
    pub fn llm_provider_name(&self) -> Option<&str> {
        self.llm.as_ref().map(|client| client.provider().name())
    }
}
