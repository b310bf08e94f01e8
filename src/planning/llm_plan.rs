// ABOUTME: Normalization of LLM-generated plans into exactly seven well-formed days
// ABOUTME: Fills missing meals with placeholders and recomputes absent totals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use chrono::{Days, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::constants::plan::DAYS_PER_PLAN;
use crate::errors::{AppError, AppResult};
use crate::models::{calories_from_f64, DailyMeals, Meal, MealEntry, NutritionInfo};

/// Day as the model returns it; every field may be missing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDay {
    #[serde(default)]
    breakfast: Option<MealEntry>,
    #[serde(default)]
    lunch: Option<MealEntry>,
    #[serde(default)]
    dinner: Option<MealEntry>,
    #[serde(default)]
    snacks: Option<Vec<MealEntry>>,
    #[serde(default)]
    total_calories: Option<f64>,
    #[serde(default)]
    total_nutrition: Option<NutritionInfo>,
}

/// Stand-in for a meal the model left out
#[must_use]
pub fn placeholder_meal(slot: &str) -> Meal {
    let mut title = String::with_capacity(slot.len());
    let mut chars = slot.chars();
    if let Some(first) = chars.next() {
        title.extend(first.to_uppercase());
        title.push_str(&chars.as_str().to_lowercase());
    }

    Meal {
        description: "A balanced, nutritious meal".to_owned(),
        ingredients: vec![
            "whole grains".to_owned(),
            "lean protein".to_owned(),
            "vegetables".to_owned(),
        ],
        nutrition: NutritionInfo::new(400, 25.0, 45.0, 12.0, 8.0, 300.0),
        ..Meal::named(format!("Healthy {title}"))
    }
}

/// A full day of placeholder meals
#[must_use]
pub fn placeholder_day(date: NaiveDate) -> DailyMeals {
    DailyMeals::new(
        date,
        placeholder_meal("breakfast"),
        placeholder_meal("lunch"),
        placeholder_meal("dinner"),
        Vec::new(),
    )
}

fn meal_or_placeholder(entry: Option<MealEntry>, slot: &str, date: NaiveDate) -> Meal {
    entry.map_or_else(
        || {
            warn!(%date, slot, "LLM plan is missing a meal, using placeholder");
            placeholder_meal(slot)
        },
        Meal::from,
    )
}

/// Turn the model's JSON into seven days starting at `week_start`
///
/// Day `i` always gets date `week_start + i`, whatever the model wrote.
/// Extra days are dropped and missing days are filled with placeholders.
///
/// # Errors
///
/// Returns a serialization error when `days` is missing or a day or meal
/// has an unusable shape
pub fn normalize_plan_days(value: &Value, week_start: NaiveDate) -> AppResult<Vec<DailyMeals>> {
    let raw_days = value
        .get("days")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::serialization("LLM plan has no 'days' array"))?;

    if raw_days.len() != DAYS_PER_PLAN {
        warn!(
            received = raw_days.len(),
            "LLM plan does not have seven days, normalizing"
        );
    }

    let mut days = Vec::with_capacity(DAYS_PER_PLAN);
    for (offset, raw) in raw_days.iter().take(DAYS_PER_PLAN).enumerate() {
        let date = week_start + Days::new(offset as u64);
        let raw = RawDay::deserialize(raw).map_err(|e| {
            AppError::serialization(format!("LLM plan day {} is malformed: {e}", offset + 1))
        })?;

        let snacks: Vec<Meal> = raw
            .snacks
            .unwrap_or_default()
            .into_iter()
            .map(Meal::from)
            .collect();
        let mut day = DailyMeals::new(
            date,
            meal_or_placeholder(raw.breakfast, "breakfast", date),
            meal_or_placeholder(raw.lunch, "lunch", date),
            meal_or_placeholder(raw.dinner, "dinner", date),
            snacks,
        );

        if let (Some(calories), Some(nutrition)) = (raw.total_calories, raw.total_nutrition) {
            day.total_calories = calories_from_f64(calories.max(0.0)).map_err(|e| {
                AppError::serialization(format!("LLM plan day {} totals: {e}", offset + 1))
            })?;
            day.total_nutrition = nutrition;
        }
        days.push(day);
    }

    while days.len() < DAYS_PER_PLAN {
        let date = week_start + Days::new(days.len() as u64);
        days.push(placeholder_day(date));
    }

    Ok(days)
}
