// ABOUTME: Domain models for patients, weekly plans, procurement, and recipes
// ABOUTME: All wire types serialize as camelCase JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! # Data Models
//!
//! - `Patient`: a clinic patient with targets, restrictions and conditions
//! - `WeeklyPlan`: seven days of meals for one patient
//! - `AggregatedIngredient`: a derived shopping-list line, never persisted
//! - `Recipe` / `DiseaseRule`: the imported catalogue behind LLM planning

mod patient;
mod plan;
mod procurement;
mod recipe;

pub use patient::{CreatePatientPayload, DietaryRestriction, Gender, Patient};
pub use plan::{
    calories_from_f64, DailyMeals, GeneratePlansPayload, Meal, MealEntry, MealSuggestionsPayload,
    MealSuggestionsResponse, NutritionInfo, Strategy, TokenUsage, WeeklyPlan, WeeklyTotals,
};
pub use procurement::{
    AggregatedIngredient, CategorizedShoppingList, CategoryGroup, IngredientCategory,
    PlanSelectionPayload, ProcurementInsightsPayload, ProcurementInsightsResponse,
};
pub use recipe::{DiseaseRule, Recipe, RecipeIngredient};

use uuid::Uuid;

use crate::errors::{AppError, AppResult, ErrorCode};

/// Round `value` to `decimals` decimal places, half away from zero
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Parse a list of ids from a request body, dropping duplicates but keeping order
///
/// `field` names the payload field for the empty-list message and `plural`
/// the resource for the not-found message; an id that is not a UUID cannot
/// exist, so it is reported as not found.
///
/// # Errors
///
/// Returns an invalid-input error for an empty list and a not-found error
/// for malformed ids
pub fn parse_id_list(raw: &[String], field: &str, plural: &str) -> AppResult<Vec<Uuid>> {
    if raw.is_empty() {
        return Err(AppError::invalid_input(format!("{field} must not be empty")));
    }

    let mut ids: Vec<Uuid> = Vec::with_capacity(raw.len());
    for value in raw {
        let id = Uuid::parse_str(value.trim()).map_err(|_| {
            AppError::new(ErrorCode::ResourceNotFound, format!("One or more {plural} not found"))
        })?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
