// ABOUTME: Health check route handlers for service monitoring
// ABOUTME: Root liveness probe plus a detailed check of the database and LLM provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tracing::warn;

use crate::constants::service::{SERVICE_NAME, SERVICE_VERSION};
use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/", get(Self::handle_root))
            .route("/health", get(Self::handle_health))
            .with_state(resources)
    }

    async fn handle_root() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "service": SERVICE_NAME,
            "version": SERVICE_VERSION,
        }))
    }

    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Json<Value> {
        let database = match resources.database.ping().await {
            Ok(()) => "connected",
            Err(e) => {
                warn!("Health check database probe failed: {e}");
                "unavailable"
            }
        };

        Json(json!({
            "status": if database == "connected" { "healthy" } else { "degraded" },
            "database": database,
            "llmProvider": resources.config.llm.provider.as_str(),
            "llmConfigured": resources.llm.is_some(),
        }))
    }
}
