// ABOUTME: Prompt builders for meal planning, procurement insights, and meal suggestions
// ABOUTME: Every prompt asks the model for a single JSON object with a fixed shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! # Prompts
//!
//! Builders that render patient and plan data into the user message sent to
//! the LLM. The system message is always
//! [`JSON_SYSTEM_PROMPT`](crate::constants::llm::JSON_SYSTEM_PROMPT).

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use crate::constants::llm::TOP_INGREDIENTS_IN_PROMPT;
use crate::models::{Patient, Recipe, WeeklyPlan};

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "None".to_owned()
    } else {
        values.join(", ")
    }
}

fn patient_profile(patient: &Patient) -> String {
    let restrictions: Vec<String> = patient
        .dietary_restrictions
        .iter()
        .map(|r| r.kind.clone())
        .collect();
    let macros = if patient.macro_targets.is_empty() {
        "None".to_owned()
    } else {
        serde_json::Value::Object(patient.macro_targets.clone()).to_string()
    };

    format!(
        "Patient Information:\n\
         - Name: {}\n\
         - Age: {}\n\
         - Gender: {}\n\
         - Calorie Target: {} calories/day\n\
         - Macro Targets: {macros}\n\
         - Medical Conditions: {}\n\
         - Allergies: {}\n\
         - Dietary Restrictions: {}\n",
        patient.name,
        patient.age,
        patient.gender.as_str(),
        patient.calorie_target,
        join_or_none(&patient.medical_conditions),
        join_or_none(&patient.allergies),
        join_or_none(&restrictions),
    )
}

/// Catalogue entry as shown to the model
#[derive(Serialize)]
struct CatalogueEntry<'a> {
    recipe_id: &'a str,
    meal_name: &'a str,
    meal_type: Option<&'a str>,
    calories_per_serving: Option<f64>,
    protein_g: Option<f64>,
    carbs_g: Option<f64>,
    fat_g: Option<f64>,
    tags: &'a [String],
}

fn render_catalogue(recipes: &[Recipe]) -> String {
    let entries: Vec<CatalogueEntry<'_>> = recipes
        .iter()
        .map(|r| CatalogueEntry {
            recipe_id: &r.external_id,
            meal_name: &r.meal_name,
            meal_type: r.meal_type.as_deref(),
            calories_per_serving: r.calories_per_serving,
            protein_g: r.protein_g,
            carbs_g: r.carbs_g,
            fat_g: r.fat_g,
            tags: &r.tags,
        })
        .collect();
    serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_owned())
}

const MEAL_PLAN_SCHEMA: &str = r#"{
  "days": [
    {
      "date": "YYYY-MM-DD",
      "breakfast": {
        "name": "Meal name",
        "description": "Brief description",
        "ingredients": ["ingredient1", "ingredient2"],
        "nutrition": {"calories": 0, "protein": 0, "carbs": 0, "fat": 0, "fiber": 0, "sodium": 0},
        "recipe_id": "recipe_identifier",
        "portion": 1,
        "preparationTime": 30,
        "difficulty": "easy"
      },
      "lunch": { ... },
      "dinner": { ... },
      "snacks": [],
      "totalCalories": 0,
      "totalNutrition": {"calories": 0, "protein": 0, "carbs": 0, "fat": 0, "fiber": 0, "sodium": 0}
    }
  ]
}"#;

/// Prompt for a seven-day plan
///
/// `safe_recipes` is the catalogue after the safety filter; when it is empty
/// the model is free to invent dishes.
#[must_use]
pub fn build_meal_plan_prompt(
    patient: &Patient,
    week_start: NaiveDate,
    safe_recipes: &[Recipe],
) -> String {
    let mut prompt = format!(
        "You are an expert convalescent home nutrition planner creating a personalized 7-day meal plan.\n\n\
         {}\n\
         Week Starting: {week_start}\n\n",
        patient_profile(patient)
    );

    if safe_recipes.is_empty() {
        prompt.push_str("No recipe catalogue is available; compose realistic custom dishes.\n\n");
    } else {
        let _ = write!(
            prompt,
            "Prefer the following pre-approved recipes (already filtered for this patient's conditions and allergies):\n{}\n\n",
            render_catalogue(safe_recipes)
        );
    }

    prompt.push_str(
        "Requirements:\n\
         1. Each day must include breakfast, lunch, dinner and optional snacks.\n\
         2. Stay within +/-10% of the calorie target per day and respect the macro targets.\n\
         3. Avoid all listed allergies completely.\n\
         4. Respect all dietary restrictions and consider medical conditions.\n\
         5. Ensure variety across the week; rotate dishes, sides or preparation style.\n\
         6. Include realistic, practical recipes with accurate nutrition values.\n\
         7. Every meal must include a \"recipe_id\" from the catalogue; for a custom dish supply a synthetic id such as \"custom_lunch_01\".\n\n\
         Return ONLY a valid JSON object with this exact structure:\n",
    );
    prompt.push_str(MEAL_PLAN_SCHEMA);
    prompt.push_str("\n\nEnsure all 7 days are included.");
    prompt
}

/// Ingredient statistics gathered from a set of plans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientMentions {
    /// Meals that list at least one ingredient
    pub total_meals: usize,
    /// `(ingredient, mentions)` sorted by descending count, then first appearance
    pub counts: Vec<(String, usize)>,
}

impl IngredientMentions {
    /// Count ingredient strings over every meal of every plan
    #[must_use]
    pub fn from_plans(plans: &[WeeklyPlan]) -> Self {
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut total_meals = 0;

        for meal in plans.iter().flat_map(|p| &p.days).flat_map(|d| d.meals()) {
            if meal.ingredients.is_empty() {
                continue;
            }
            total_meals += 1;
            for ingredient in &meal.ingredients {
                let count = counts.entry(ingredient.clone()).or_insert_with(|| {
                    order.push(ingredient.clone());
                    0
                });
                *count += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = order
            .into_iter()
            .map(|name| {
                let count = counts.get(&name).copied().unwrap_or_default();
                (name, count)
            })
            .collect();
        // stable sort keeps first appearance among ties
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        Self {
            total_meals,
            counts: ranked,
        }
    }
}

/// Prompt for narrative procurement insights over `plans`
#[must_use]
pub fn build_procurement_insights_prompt(plans: &[WeeklyPlan], instructions: Option<&str>) -> String {
    let mentions = IngredientMentions::from_plans(plans);
    let names: Vec<&str> = plans.iter().map(|p| p.patient_name.as_str()).collect();

    let mut prompt = format!(
        "You are a procurement specialist analyzing meal plans for a nutrition facility.\n\n\
         Summary:\n\
         - Number of patients: {}\n\
         - Patient names: {}\n\
         - Total meals planned: {}\n\
         - Unique ingredients: {}\n\n\
         Top {TOP_INGREDIENTS_IN_PROMPT} Most Used Ingredients:\n",
        plans.len(),
        names.join(", "),
        mentions.total_meals,
        mentions.counts.len(),
    );

    for (ingredient, count) in mentions.counts.iter().take(TOP_INGREDIENTS_IN_PROMPT) {
        let _ = writeln!(prompt, "- {ingredient}: {count} times");
    }

    if let Some(extra) = instructions.map(str::trim).filter(|s| !s.is_empty()) {
        let _ = writeln!(prompt, "\nAdditional Instructions: {extra}");
    }

    prompt.push_str(
        r####"
Please provide:
1. A concise Markdown summary under the heading "### Summary" with 2-3 sentences.
2. A list of 6-8 procurement notes as Markdown bullets of the form "- **Topic:** Recommendation".
   Cover bulk purchasing, storage, seasonal availability, cost, quality, suppliers and dietary or medical considerations.
   Use a professional tone, avoid repetition and keep each note under 160 characters.
3. Where relevant, highlight patient-specific considerations in bold before the detail.

Return ONLY a valid JSON object:
{
  "summary": "Markdown summary text",
  "procurementNotes": ["- **Topic:** Recommendation"]
}"####,
    );
    prompt
}

/// Prompt for three meal ideas for one patient
#[must_use]
pub fn build_meal_suggestions_prompt(
    patient: &Patient,
    meal_type: Option<&str>,
    preferences: Option<&str>,
) -> String {
    let target = meal_type
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("any meal");

    let mut prompt = format!(
        "You are a professional nutritionist suggesting meals for a convalescent home resident.\n\n\
         {}\n\
         Suggest 3 meal ideas for: {target}\n",
        patient_profile(patient)
    );
    if let Some(prefs) = preferences.map(str::trim).filter(|s| !s.is_empty()) {
        let _ = writeln!(prompt, "Preferences: {prefs}");
    }

    prompt.push_str(
        r#"
Each suggestion must avoid the patient's allergies and respect restrictions and conditions.

Return ONLY a valid JSON object:
{
  "suggestions": [
    {
      "name": "Meal name",
      "description": "Brief description",
      "ingredients": ["ingredient1", "ingredient2"],
      "nutrition": {"calories": 0, "protein": 0, "carbs": 0, "fat": 0, "fiber": 0, "sodium": 0},
      "tags": ["tag"]
    }
  ]
}"#,
    );
    prompt
}
