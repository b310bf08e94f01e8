// ABOUTME: Procurement models: aggregated ingredients, categories, and LLM insights
// ABOUTME: Shopping-list categories follow a fixed display and matching order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::plan::TokenUsage;

/// One line of a shopping list, summed across plans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedIngredient {
    /// Ingredient name as first seen
    pub name: String,
    /// Summed quantity (mention count when no unit is known)
    pub quantity: f64,
    /// Unit of `quantity`, absent for mention counts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl AggregatedIngredient {
    /// Build an entry
    pub fn new(name: impl Into<String>, quantity: f64, unit: Option<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit,
        }
    }
}

/// Shopping-list category, declared in matching priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    /// Meat, fish, eggs, legumes, tofu
    Proteins,
    /// Bread, rice, pasta, oats
    Grains,
    /// Vegetables and leafy greens
    Vegetables,
    /// Fresh and dried fruit
    Fruits,
    /// Milk products
    Dairy,
    /// Nuts and seeds
    Nuts,
    /// Oils, sauces, spices
    Condiments,
    /// Anything unmatched
    Others,
}

impl IngredientCategory {
    /// All categories in matching priority order
    pub const ALL: [Self; 8] = [
        Self::Proteins,
        Self::Grains,
        Self::Vegetables,
        Self::Fruits,
        Self::Dairy,
        Self::Nuts,
        Self::Condiments,
        Self::Others,
    ];

    /// Wire identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proteins => "proteins",
            Self::Grains => "grains",
            Self::Vegetables => "vegetables",
            Self::Fruits => "fruits",
            Self::Dairy => "dairy",
            Self::Nuts => "nuts",
            Self::Condiments => "condiments",
            Self::Others => "others",
        }
    }

    /// Heading used in exports
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Proteins => "Proteins",
            Self::Grains => "Grains & Bread",
            Self::Vegetables => "Vegetables",
            Self::Fruits => "Fruits",
            Self::Dairy => "Dairy",
            Self::Nuts => "Nuts & Seeds",
            Self::Condiments => "Condiments & Spices",
            Self::Others => "Others",
        }
    }
}

impl fmt::Display for IngredientCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Items of one category, sorted by descending quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    /// Category
    pub category: IngredientCategory,
    /// Items in the category
    pub items: Vec<AggregatedIngredient>,
}

/// A shopping list grouped by category, in category order, without empty groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedShoppingList {
    /// Non-empty groups
    pub categories: Vec<CategoryGroup>,
}

impl CategorizedShoppingList {
    /// Whether the list has no items at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|g| g.items.is_empty())
    }

    /// Total number of items
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|g| g.items.len()).sum()
    }
}

/// Body of the procurement endpoints that take plan ids
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSelectionPayload {
    /// Plans to aggregate
    pub plan_ids: Vec<String>,
}

/// Body of `POST /api/llm/procurement-insights`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcurementInsightsPayload {
    /// Plans to analyse
    pub plan_ids: Vec<String>,
    /// Extra instructions for the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Response of `POST /api/llm/procurement-insights`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcurementInsightsResponse {
    /// Narrative summary
    pub summary: String,
    /// Actionable procurement notes
    pub procurement_notes: Vec<String>,
    /// Generation timestamp
    pub generated_at: DateTime<Utc>,
    /// LLM token usage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}
