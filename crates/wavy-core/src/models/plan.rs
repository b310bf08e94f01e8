// ABOUTME: Weekly meal plan models: nutrition, meals, days, and weekly totals
// ABOUTME: Meals tolerate loosely shaped LLM output (plain strings, float calories)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::round_to;
use crate::constants::plan::{
    DAYS_PER_PLAN, DEFAULT_DIFFICULTY, DEFAULT_PREPARATION_MINUTES, MAX_CALORIES,
};
use crate::errors::{AppError, AppResult};

/// Nutrition facts for a meal or a whole day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionInfo {
    /// Kilocalories
    #[serde(default, deserialize_with = "deserialize_calories")]
    pub calories: u32,
    /// Protein in grams
    #[serde(default)]
    pub protein: f64,
    /// Carbohydrates in grams
    #[serde(default)]
    pub carbs: f64,
    /// Fat in grams
    #[serde(default)]
    pub fat: f64,
    /// Fiber in grams
    #[serde(default)]
    pub fiber: f64,
    /// Sodium in milligrams
    #[serde(default)]
    pub sodium: f64,
}

impl NutritionInfo {
    /// Build from the six standard values
    #[must_use]
    pub const fn new(calories: u32, protein: f64, carbs: f64, fat: f64, fiber: f64, sodium: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
            fiber,
            sodium,
        }
    }

    /// Add another nutrition record onto this one
    pub fn accumulate(&mut self, other: &Self) {
        self.calories = self.calories.saturating_add(other.calories);
        self.protein += other.protein;
        self.carbs += other.carbs;
        self.fat += other.fat;
        self.fiber += other.fiber;
        self.sodium += other.sodium;
    }

    /// Round gram and milligram values to one decimal place
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            calories: self.calories,
            protein: round_to(self.protein, 1),
            carbs: round_to(self.carbs, 1),
            fat: round_to(self.fat, 1),
            fiber: round_to(self.fiber, 1),
            sodium: round_to(self.sodium, 1),
        }
    }
}

fn deserialize_calories<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    calories_from_f64(value).map_err(serde::de::Error::custom)
}

/// Convert an externally supplied calorie value, rejecting negative or absurd amounts
///
/// # Errors
///
/// Returns a message describing the rejected value
pub fn calories_from_f64(value: f64) -> Result<u32, String> {
    if value.is_finite() && (0.0..=f64::from(MAX_CALORIES)).contains(&value) {
        Ok(value.round() as u32)
    } else {
        Err(format!(
            "calories must be between 0 and {MAX_CALORIES}, got {value}"
        ))
    }
}

const fn default_preparation_time() -> u32 {
    DEFAULT_PREPARATION_MINUTES
}

fn default_difficulty() -> String {
    DEFAULT_DIFFICULTY.to_owned()
}

const fn default_portion() -> f64 {
    1.0
}

/// A single meal within a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    /// Meal name
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// Ingredient mentions, free text
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Nutrition facts for one portion
    #[serde(default)]
    pub nutrition: NutritionInfo,
    /// Preparation time in minutes
    #[serde(default = "default_preparation_time")]
    pub preparation_time: u32,
    /// Difficulty label
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    /// Nutritional highlights
    #[serde(default)]
    pub highlights: Vec<String>,
    /// Tags such as "high-protein"
    #[serde(default)]
    pub tags: Vec<String>,
    /// Portion multiplier relative to the recipe serving
    #[serde(default = "default_portion")]
    pub portion: f64,
    /// Catalogue recipe this meal was built from
    #[serde(default, alias = "recipe_id", skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
}

impl Meal {
    /// A meal with only a name and default attributes
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            ingredients: Vec::new(),
            nutrition: NutritionInfo::default(),
            preparation_time: DEFAULT_PREPARATION_MINUTES,
            difficulty: default_difficulty(),
            highlights: Vec::new(),
            tags: Vec::new(),
            portion: 1.0,
            recipe_id: None,
        }
    }
}

/// A meal as it may appear in loosely structured input: a bare name or a full object
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MealEntry {
    /// Plain description, e.g. "Oatmeal with berries"
    Name(String),
    /// Structured meal object
    Detailed(Box<Meal>),
}

impl From<MealEntry> for Meal {
    fn from(entry: MealEntry) -> Self {
        match entry {
            MealEntry::Name(name) => Self::named(name),
            MealEntry::Detailed(meal) => *meal,
        }
    }
}

/// Meals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMeals {
    /// Calendar date
    pub date: NaiveDate,
    /// Breakfast
    pub breakfast: Meal,
    /// Lunch
    pub lunch: Meal,
    /// Dinner
    pub dinner: Meal,
    /// Snacks, possibly empty
    #[serde(default)]
    pub snacks: Vec<Meal>,
    /// Sum of calories over every meal of the day
    pub total_calories: u32,
    /// Sum of nutrition over every meal of the day
    pub total_nutrition: NutritionInfo,
}

impl DailyMeals {
    /// Build a day and compute its totals
    #[must_use]
    pub fn new(date: NaiveDate, breakfast: Meal, lunch: Meal, dinner: Meal, snacks: Vec<Meal>) -> Self {
        let mut day = Self {
            date,
            breakfast,
            lunch,
            dinner,
            snacks,
            total_calories: 0,
            total_nutrition: NutritionInfo::default(),
        };
        day.recompute_totals();
        day
    }

    /// Every meal of the day, main meals first
    pub fn meals(&self) -> impl Iterator<Item = &Meal> {
        [&self.breakfast, &self.lunch, &self.dinner]
            .into_iter()
            .chain(self.snacks.iter())
    }

    /// Recalculate daily totals from the meals
    pub fn recompute_totals(&mut self) {
        let mut total = NutritionInfo::default();
        for meal in self.meals() {
            total.accumulate(&meal.nutrition);
        }
        self.total_nutrition = total.rounded();
        self.total_calories = total.calories;
    }
}

/// Plan generation strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Deterministic template-based plans
    #[default]
    RuleBased,
    /// Plans generated by the configured LLM provider
    Llm,
}

impl Strategy {
    /// Database representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RuleBased => "rule_based",
            Self::Llm => "llm",
        }
    }

    /// Parse from the database representation
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for unknown strategies
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "rule_based" => Ok(Self::RuleBased),
            "llm" => Ok(Self::Llm),
            other => Err(AppError::invalid_input(format!(
                "Unknown plan strategy '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LLM token accounting reported alongside generated content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the completion
    pub completion_tokens: u32,
    /// Prompt plus completion
    #[serde(default)]
    pub total_tokens: u32,
}

/// Aggregates over the seven days of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTotals {
    /// Sum of daily calories
    pub total_calories: u32,
    /// Total calories divided by seven
    pub avg_daily_calories: f64,
    /// Sum of daily protein
    pub total_protein: f64,
    /// Sum of daily carbohydrates
    pub total_carbs: f64,
    /// Sum of daily fat
    pub total_fat: f64,
    /// Token usage when the plan came from an LLM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}

impl WeeklyTotals {
    /// Aggregate the daily totals of `days`
    #[must_use]
    pub fn from_days(days: &[DailyMeals], token_usage: Option<TokenUsage>) -> Self {
        let mut total = NutritionInfo::default();
        for day in days {
            total.accumulate(&day.total_nutrition);
        }
        let total_calories = days
            .iter()
            .fold(0_u32, |sum, d| sum.saturating_add(d.total_calories));
        Self {
            total_calories,
            avg_daily_calories: round_to(f64::from(total_calories) / DAYS_PER_PLAN as f64, 1),
            total_protein: round_to(total.protein, 1),
            total_carbs: round_to(total.carbs, 1),
            total_fat: round_to(total.fat, 1),
            token_usage,
        }
    }
}

/// A seven-day meal plan for one patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlan {
    /// Unique identifier
    pub id: Uuid,
    /// Patient this plan belongs to
    pub patient_id: Uuid,
    /// Patient name at generation time
    pub patient_name: String,
    /// First day of the plan
    pub week_start: NaiveDate,
    /// Exactly seven consecutive days
    pub days: Vec<DailyMeals>,
    /// Strategy that produced the plan
    pub strategy: Strategy,
    /// Generation timestamp
    pub generated_at: DateTime<Utc>,
    /// Weekly aggregates
    pub weekly_totals: WeeklyTotals,
}

/// Body of `POST /api/plans/generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlansPayload {
    /// Patients to plan for
    pub patient_ids: Vec<String>,
    /// First day of the week (YYYY-MM-DD); defaults to next Monday
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<String>,
    /// Generation strategy
    #[serde(default)]
    pub strategy: Strategy,
}

/// Body of `POST /api/llm/meal-suggestions`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSuggestionsPayload {
    /// Patient to suggest meals for
    pub patient_id: String,
    /// Restrict suggestions to breakfast, lunch, dinner or snack
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,
    /// Free-text preferences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<String>,
}

/// Response of `POST /api/llm/meal-suggestions`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSuggestionsResponse {
    /// Patient the suggestions are for
    pub patient_id: Uuid,
    /// Suggested meals
    pub suggestions: Vec<Meal>,
    /// Generation timestamp
    pub generated_at: DateTime<Utc>,
    /// LLM token usage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}
