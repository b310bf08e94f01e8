// ABOUTME: Route handlers for the categorized shopping list
// ABOUTME: Returns the list as JSON or as a text/CSV download
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::plans::attachment;
use super::ExportQuery;
use crate::errors::AppResult;
use crate::export::export_shopping_list;
use crate::models::PlanSelectionPayload;
use crate::resources::ServerResources;

/// Procurement routes handler
pub struct ProcurementRoutes;

impl ProcurementRoutes {
    /// Create all procurement routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/procurement/shopping-list",
                post(Self::handle_shopping_list),
            )
            .route(
                "/api/procurement/shopping-list/export",
                post(Self::handle_export),
            )
            .with_state(resources)
    }

    /// Handle POST /api/procurement/shopping-list
    async fn handle_shopping_list(
        State(resources): State<Arc<ServerResources>>,
        Json(payload): Json<PlanSelectionPayload>,
    ) -> AppResult<Response> {
        let list = resources.procurement.shopping_list(&payload.plan_ids).await?;
        Ok((StatusCode::OK, Json(list)).into_response())
    }

    /// Handle POST /api/procurement/shopping-list/export?format=text|csv
    async fn handle_export(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ExportQuery>,
        Json(payload): Json<PlanSelectionPayload>,
    ) -> AppResult<Response> {
        let format = query.format()?;
        let list = resources.procurement.shopping_list(&payload.plan_ids).await?;
        Ok(attachment(
            export_shopping_list(&list, format),
            format,
            "shopping-list",
        ))
    }
}
