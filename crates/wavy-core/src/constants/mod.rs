// ABOUTME: Application-wide constants for the nutrition planner
// ABOUTME: Service identity, plan shape, validation bounds, and LLM defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! Constants grouped by domain.

/// Service identity reported by the health endpoints
pub mod service {
    /// Human-readable service name
    pub const SERVICE_NAME: &str = "WAVY.ai Nutrition Planning API";
    /// Short service identifier used in logs
    pub const SERVICE_ID: &str = "wavy-nutrition";
    /// Crate version
    pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Weekly plan shape
pub mod plan {
    /// Number of days in a generated plan
    pub const DAYS_PER_PLAN: usize = 7;
    /// Calorie share of breakfast
    pub const BREAKFAST_SHARE: f64 = 0.25;
    /// Calorie share of lunch
    pub const LUNCH_SHARE: f64 = 0.35;
    /// Calorie share of dinner
    pub const DINNER_SHARE: f64 = 0.35;
    /// Calorie share of the daily snack
    pub const SNACK_SHARE: f64 = 0.05;
    /// Default preparation time for a meal in minutes
    pub const DEFAULT_PREPARATION_MINUTES: u32 = 30;
    /// Default meal difficulty
    pub const DEFAULT_DIFFICULTY: &str = "medium";
    /// Largest calorie value accepted for a single meal or day from external input
    pub const MAX_CALORIES: u32 = 20_000;
}

/// Patient field bounds
pub mod validation {
    /// Maximum patient name length
    pub const MAX_NAME_LENGTH: usize = 200;
    /// Maximum patient age
    pub const MAX_AGE: u32 = 150;
    /// Minimum daily calorie target
    pub const MIN_CALORIE_TARGET: u32 = 500;
    /// Maximum daily calorie target
    pub const MAX_CALORIE_TARGET: u32 = 5000;
    /// Accepted gender values
    pub const GENDERS: &[&str] = &["male", "female", "other"];
}

/// LLM request defaults
pub mod llm {
    /// Default completion token cap
    pub const DEFAULT_MAX_TOKENS: u32 = 2000;
    /// Default sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    /// Default number of attempts for an LLM call
    pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
    /// Default `OpenAI` model
    pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
    /// Azure `OpenAI` REST API version
    pub const AZURE_API_VERSION: &str = "2024-02-15-preview";
    /// System prompt used for every JSON-mode completion
    pub const JSON_SYSTEM_PROMPT: &str =
        "You are a professional nutritionist. Always respond with valid JSON.";
    /// Completion token cap for weekly plan generation
    pub const PLAN_MAX_TOKENS: u32 = 4000;
    /// How many ingredients the procurement prompt lists
    pub const TOP_INGREDIENTS_IN_PROMPT: usize = 20;
}

/// Procurement aggregation
pub mod procurement {
    /// Decimal places kept on aggregated quantities
    pub const QUANTITY_DECIMALS: i32 = 3;
    /// Distance from a whole number under which a quantity displays as an integer
    pub const WHOLE_NUMBER_TOLERANCE: f64 = 0.01;
}
