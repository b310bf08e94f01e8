// ABOUTME: Procurement service: shopping lists and LLM insights over selected plans
// ABOUTME: Resolves plan ids, joins catalogue recipes, and calls the LLM for narratives
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::aggregation::{aggregate_plans, referenced_recipe_ids};
use super::categorizer::group_by_category;
use crate::database::Database;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::prompts::build_procurement_insights_prompt;
use crate::llm::LlmClient;
use crate::models::{
    parse_id_list, AggregatedIngredient, CategorizedShoppingList, ProcurementInsightsResponse,
    WeeklyPlan,
};

const NO_SUMMARY: &str = "No summary available";

/// Shopping-list and insight generation for a set of plans
#[derive(Clone)]
pub struct ProcurementService {
    database: Database,
    llm: Option<LlmClient>,
}

impl ProcurementService {
    /// Create a service; `llm` is `None` when no provider is configured
    #[must_use]
    pub const fn new(database: Database, llm: Option<LlmClient>) -> Self {
        Self { database, llm }
    }

    /// Load every plan in `plan_ids`
    ///
    /// # Errors
    ///
    /// Returns 400 for an empty list and 404 when any plan is missing
    pub async fn load_plans(&self, plan_ids: &[String]) -> AppResult<Vec<WeeklyPlan>> {
        let ids = parse_id_list(plan_ids, "planIds", "plans")?;
        let plans = self.database.plans().get_many(&ids).await?;
        if plans.len() != ids.len() {
            return Err(AppError::new(
                ErrorCode::ResourceNotFound,
                "One or more plans not found",
            ));
        }
        Ok(plans)
    }

    /// Flat aggregated ingredient list for `plan_ids`
    ///
    /// # Errors
    ///
    /// Same as [`Self::load_plans`], plus database errors
    pub async fn ingredients(&self, plan_ids: &[String]) -> AppResult<Vec<AggregatedIngredient>> {
        let plans = self.load_plans(plan_ids).await?;
        let recipe_ids = referenced_recipe_ids(&plans);
        let recipes = if recipe_ids.is_empty() {
            Default::default()
        } else {
            self.database.recipes().get_recipes(&recipe_ids).await?
        };

        let items = aggregate_plans(&plans, &recipes);
        info!(
            plans = plans.len(),
            ingredients = items.len(),
            "Aggregated procurement ingredients"
        );
        Ok(items)
    }

    /// Categorized shopping list for `plan_ids`
    ///
    /// # Errors
    ///
    /// Same as [`Self::ingredients`]
    pub async fn shopping_list(&self, plan_ids: &[String]) -> AppResult<CategorizedShoppingList> {
        Ok(group_by_category(self.ingredients(plan_ids).await?))
    }

    /// Narrative procurement insights from the LLM
    ///
    /// # Errors
    ///
    /// Returns 404 for unknown plans, 503 without a provider, provider errors
    /// after retries, and 500 when the reply is not usable JSON
    pub async fn insights(
        &self,
        plan_ids: &[String],
        instructions: Option<&str>,
    ) -> AppResult<ProcurementInsightsResponse> {
        let plans = self.load_plans(plan_ids).await?;
        let llm = self
            .llm
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("LLM provider is not configured"))?;

        info!(plans = plans.len(), "Generating procurement insights");
        let prompt = build_procurement_insights_prompt(&plans, instructions);
        let completion = llm.complete_json(&prompt).await.map_err(|e| {
            if e.code == ErrorCode::SerializationError {
                AppError::internal("Failed to parse procurement insights from LLM")
            } else {
                e
            }
        })?;

        let response = insights_from_reply(&completion.value, completion.usage)?;
        info!(
            notes = response.procurement_notes.len(),
            "Generated procurement insights"
        );
        Ok(response)
    }
}

fn insights_from_reply(
    value: &Value,
    usage: Option<crate::models::TokenUsage>,
) -> AppResult<ProcurementInsightsResponse> {
    let object = value
        .as_object()
        .ok_or_else(|| AppError::internal("Failed to parse procurement insights from LLM"))?;

    let summary = object
        .get("summary")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(NO_SUMMARY)
        .to_owned();
    let procurement_notes = object
        .get("procurementNotes")
        .and_then(Value::as_array)
        .map(|notes| {
            notes
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Ok(ProcurementInsightsResponse {
        summary,
        procurement_notes,
        generated_at: Utc::now(),
        token_usage: usage,
    })
}
