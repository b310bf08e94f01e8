// ABOUTME: Procurement: ingredient aggregation, categorization, units, and LLM insights
// ABOUTME: Turns selected weekly plans into shopping lists for the kitchen
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

mod aggregation;
mod categorizer;
mod service;
pub mod units;

pub use aggregation::{aggregate_plans, fold_plural, referenced_recipe_ids, IngredientAggregator};
pub use categorizer::{categorize, group_by_category};
pub use service::ProcurementService;
