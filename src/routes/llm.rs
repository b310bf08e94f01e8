// ABOUTME: Route handlers for LLM-assisted procurement and meal suggestions
// ABOUTME: Insights, aggregated ingredient lists, and per-patient meal ideas
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::errors::AppResult;
use crate::models::{MealSuggestionsPayload, PlanSelectionPayload, ProcurementInsightsPayload};
use crate::resources::ServerResources;

/// LLM routes handler
pub struct LlmRoutes;

impl LlmRoutes {
    /// Create all LLM routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/llm/procurement-insights",
                post(Self::handle_procurement_insights),
            )
            .route(
                "/api/llm/procurement-ingredients",
                post(Self::handle_procurement_ingredients),
            )
            .route("/api/llm/meal-suggestions", post(Self::handle_meal_suggestions))
            .with_state(resources)
    }

    /// Handle POST /api/llm/procurement-insights
    async fn handle_procurement_insights(
        State(resources): State<Arc<ServerResources>>,
        Json(payload): Json<ProcurementInsightsPayload>,
    ) -> AppResult<Response> {
        let insights = resources
            .procurement
            .insights(&payload.plan_ids, payload.instructions.as_deref())
            .await?;
        Ok((StatusCode::OK, Json(insights)).into_response())
    }

    /// Handle POST /api/llm/procurement-ingredients
    async fn handle_procurement_ingredients(
        State(resources): State<Arc<ServerResources>>,
        Json(payload): Json<PlanSelectionPayload>,
    ) -> AppResult<Response> {
        let ingredients = resources.procurement.ingredients(&payload.plan_ids).await?;
        Ok((StatusCode::OK, Json(ingredients)).into_response())
    }

    /// Handle POST /api/llm/meal-suggestions
    async fn handle_meal_suggestions(
        State(resources): State<Arc<ServerResources>>,
        Json(payload): Json<MealSuggestionsPayload>,
    ) -> AppResult<Response> {
        let suggestions = resources.planning.suggest_meals(&payload).await?;
        Ok((StatusCode::OK, Json(suggestions)).into_response())
    }
}
