// ABOUTME: Route handlers for weekly meal plans
// ABOUTME: List, generate, fetch, delete, and export plans as text or CSV
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::ExportQuery;
use crate::errors::{AppError, AppResult};
use crate::export::{export_plans, file_stem, ExportFormat};
use crate::models::GeneratePlansPayload;
use crate::resources::ServerResources;

/// Query parameters for listing plans
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPlansQuery {
    /// Only plans of this patient
    pub patient_id: Option<String>,
}

fn plan_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::not_found("Plan"))
}

/// Build a download response, or 204 when there is nothing to export
pub(super) fn attachment(document: Option<String>, format: ExportFormat, stem: &str) -> Response {
    let Some(body) = document else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let disposition = format!(
        "attachment; filename=\"{}.{}\"",
        file_stem(stem),
        format.extension()
    );
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// Weekly plan routes handler
pub struct PlanRoutes;

impl PlanRoutes {
    /// Create all plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/plans", get(Self::handle_list))
            .route("/api/plans/generate", post(Self::handle_generate))
            .route(
                "/api/plans/:id",
                get(Self::handle_get).delete(Self::handle_delete),
            )
            .route("/api/plans/:id/export", get(Self::handle_export))
            .with_state(resources)
    }

    /// Handle GET /api/plans
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ListPlansQuery>,
    ) -> AppResult<Response> {
        let plans = match query.patient_id.as_deref() {
            Some(raw) => match Uuid::parse_str(raw.trim()) {
                Ok(id) => resources.database.plans().list_for_patient(id).await?,
                Err(_) => Vec::new(),
            },
            None => resources.database.plans().list().await?,
        };
        Ok((StatusCode::OK, Json(plans)).into_response())
    }

    /// Handle POST /api/plans/generate
    async fn handle_generate(
        State(resources): State<Arc<ServerResources>>,
        Json(payload): Json<GeneratePlansPayload>,
    ) -> AppResult<Response> {
        let plans = resources.planning.generate(&payload).await?;
        info!(plans = plans.len(), strategy = %payload.strategy, "Generated weekly plans");

        Ok((StatusCode::CREATED, Json(plans)).into_response())
    }

    /// Handle GET /api/plans/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let plan = resources
            .database
            .plans()
            .get(plan_id(&id)?)
            .await?
            .ok_or_else(|| AppError::not_found("Plan"))?;

        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    /// Handle DELETE /api/plans/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        if !resources.database.plans().delete(plan_id(&id)?).await? {
            return Err(AppError::not_found("Plan"));
        }
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/plans/:id/export?format=text|csv
    async fn handle_export(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Query(query): Query<ExportQuery>,
    ) -> AppResult<Response> {
        let format = query.format()?;
        let plan = resources
            .database
            .plans()
            .get(plan_id(&id)?)
            .await?
            .ok_or_else(|| AppError::not_found("Plan"))?;

        let stem = format!("meal-plan-{}-{}", plan.patient_name, plan.week_start);
        Ok(attachment(export_plans(std::slice::from_ref(&plan), format), format, &stem))
    }
}
