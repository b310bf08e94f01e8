// ABOUTME: Route module organization for the planner HTTP API
// ABOUTME: One routes struct per domain, merged into a single router by the server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! HTTP routes grouped by domain. Handlers are thin and delegate to the
//! database managers and the planning and procurement services.

use serde::Deserialize;

use crate::errors::AppResult;
use crate::export::ExportFormat;

/// Health check and service status routes
pub mod health;
/// LLM-assisted procurement and meal suggestion routes
pub mod llm;
/// Patient directory routes
pub mod patients;
/// Weekly plan routes
pub mod plans;
/// Shopping list routes
pub mod procurement;

pub use health::HealthRoutes;
pub use llm::LlmRoutes;
pub use patients::PatientRoutes;
pub use plans::PlanRoutes;
pub use procurement::ProcurementRoutes;

/// `?format=` query accepted by the export endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// `text` (default) or `csv`
    pub format: Option<String>,
}

impl ExportQuery {
    /// Requested format, defaulting to text
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for unknown formats
    pub fn format(&self) -> AppResult<ExportFormat> {
        self.format
            .as_deref()
            .map_or(Ok(ExportFormat::default()), str::parse)
    }
}
