// ABOUTME: Route handlers for the patient directory REST API
// ABOUTME: List, create, fetch, and delete patients; deletion also removes their plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::CreatePatientPayload;
use crate::resources::ServerResources;

/// Parse a patient id from the path; malformed ids are simply unknown
fn patient_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::not_found("Patient"))
}

/// Patient directory routes handler
pub struct PatientRoutes;

impl PatientRoutes {
    /// Create all patient routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/patients",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/patients/:id",
                get(Self::handle_get).delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle GET /api/patients
    async fn handle_list(State(resources): State<Arc<ServerResources>>) -> AppResult<Response> {
        let patients = resources.database.patients().list().await?;
        Ok((StatusCode::OK, Json(patients)).into_response())
    }

    /// Handle POST /api/patients
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(payload): Json<CreatePatientPayload>,
    ) -> AppResult<Response> {
        let patient = payload.into_patient()?;
        resources.database.patients().create(&patient).await?;
        info!(patient_id = %patient.id, "Created patient");

        Ok((StatusCode::CREATED, Json(patient)).into_response())
    }

    /// Handle GET /api/patients/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let patient = resources
            .database
            .patients()
            .get(patient_id(&id)?)
            .await?
            .ok_or_else(|| AppError::not_found("Patient"))?;

        Ok((StatusCode::OK, Json(patient)).into_response())
    }

    /// Handle DELETE /api/patients/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let id = patient_id(&id)?;
        if !resources.database.patients().delete(id).await? {
            return Err(AppError::not_found("Patient"));
        }
        info!(patient_id = %id, "Deleted patient and their plans");

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
