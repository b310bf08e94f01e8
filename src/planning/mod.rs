// ABOUTME: Weekly meal planning: templates, rule-based and LLM strategies, safety filter
// ABOUTME: PlanGenerationService is the entry point used by the HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! # Meal Planning
//!
//! Two strategies produce a [`WeeklyPlan`](crate::models::WeeklyPlan):
//!
//! - `rule_based`: [`RuleBasedPlanner`] rotates static templates and scales
//!   them to the patient's calorie target. Always available.
//! - `llm`: the recipe catalogue is narrowed by [`RecipeFilter`], rendered
//!   into a prompt, and the reply is normalized by [`normalize_plan_days`].
//!   Failures fall back to the rule-based planner.

mod llm_plan;
mod recipe_filter;
mod rule_based;
mod service;
pub mod templates;

pub use llm_plan::{normalize_plan_days, placeholder_day, placeholder_meal};
pub use recipe_filter::{prohibited_tags, RecipeFilter};
pub use rule_based::{scale_meal, RuleBasedPlanner};
pub use service::{next_monday, resolve_week_start, PlanGenerationService};
