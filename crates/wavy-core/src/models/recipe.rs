// ABOUTME: Recipe catalogue and disease rule models used by the safety filter
// ABOUTME: Recipes carry tags, allergens, and parsed per-serving ingredients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use serde::{Deserialize, Serialize};

/// One parsed ingredient of a catalogue recipe, per serving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    /// Ingredient name
    pub name: String,
    /// Quantity per serving
    pub quantity: f64,
    /// Unit abbreviation as written in the source
    pub unit: String,
    /// Source text the entry was parsed from
    pub raw: String,
}

/// A catalogue recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Identifier from the import source
    pub external_id: String,
    /// Display name
    pub meal_name: String,
    /// Breakfast, lunch, dinner or snack
    #[serde(default)]
    pub meal_type: Option<String>,
    /// Calories per serving
    #[serde(default)]
    pub calories_per_serving: Option<f64>,
    /// Protein per serving in grams
    #[serde(default)]
    pub protein_g: Option<f64>,
    /// Fat per serving in grams
    #[serde(default)]
    pub fat_g: Option<f64>,
    /// Carbohydrates per serving in grams
    #[serde(default)]
    pub carbs_g: Option<f64>,
    /// Descriptive tags such as "high_sugar"
    #[serde(default)]
    pub tags: Vec<String>,
    /// Declared allergens
    #[serde(default)]
    pub allergens: Vec<String>,
    /// Parsed ingredients
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
}

/// Tags a recipe must not carry for patients with a condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseRule {
    /// Condition name, e.g. "Diabetes"
    pub name: String,
    /// Recipe tags prohibited for the condition
    pub prohibited_tags: Vec<String>,
}
