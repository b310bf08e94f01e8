// ABOUTME: Plan generation orchestration across the rule-based and LLM strategies
// ABOUTME: Resolves patients and week start, generates plans, and replaces stored plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::llm_plan::normalize_plan_days;
use super::recipe_filter::RecipeFilter;
use super::rule_based::RuleBasedPlanner;
use crate::constants::llm::PLAN_MAX_TOKENS;
use crate::database::Database;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::prompts::{build_meal_plan_prompt, build_meal_suggestions_prompt};
use crate::llm::LlmClient;
use crate::models::{
    parse_id_list, DailyMeals, DiseaseRule, GeneratePlansPayload, Meal, MealEntry,
    MealSuggestionsPayload, MealSuggestionsResponse, Patient, Recipe, Strategy, TokenUsage,
    WeeklyPlan, WeeklyTotals,
};

/// The first Monday strictly after `today`
#[must_use]
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let ahead = 7 - u64::from(today.weekday().num_days_from_monday());
    today + Days::new(ahead)
}

/// Resolve the requested week start, defaulting to [`next_monday`]
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its UTC date is used).
///
/// # Errors
///
/// Returns an invalid-input error when `requested` cannot be parsed
pub fn resolve_week_start(requested: Option<&str>, today: NaiveDate) -> AppResult<NaiveDate> {
    let Some(raw) = requested.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(next_monday(today));
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| {
            AppError::invalid_input(format!("weekStart must be a date in YYYY-MM-DD format, got '{raw}'"))
        })
}

#[derive(Deserialize)]
struct SuggestionsReply {
    suggestions: Vec<MealEntry>,
}

/// Catalogue data loaded once per LLM generation request
struct Catalogue {
    recipes: Vec<Recipe>,
    rules: Vec<DiseaseRule>,
}

/// Generates and stores weekly plans
#[derive(Clone)]
pub struct PlanGenerationService {
    database: Database,
    llm: Option<LlmClient>,
    planner: RuleBasedPlanner,
}

impl PlanGenerationService {
    /// Create a service; `llm` is `None` when no provider is configured
    #[must_use]
    pub const fn new(database: Database, llm: Option<LlmClient>) -> Self {
        Self {
            database,
            llm,
            planner: RuleBasedPlanner,
        }
    }

    /// Generate one plan per requested patient and replace their stored plans
    ///
    /// # Errors
    ///
    /// Returns 400 for an empty id list or bad week start, 404 when a patient
    /// is unknown, and a database error if storing fails
    pub async fn generate(&self, payload: &GeneratePlansPayload) -> AppResult<Vec<WeeklyPlan>> {
        let ids = parse_id_list(&payload.patient_ids, "patientIds", "patients")?;
        let week_start = resolve_week_start(payload.week_start.as_deref(), Utc::now().date_naive())?;

        let patients = self.database.patients().get_many(&ids).await?;
        if patients.len() != ids.len() {
            return Err(AppError::new(
                ErrorCode::ResourceNotFound,
                "One or more patients not found",
            ));
        }

        let catalogue = match (payload.strategy, &self.llm) {
            (Strategy::Llm, Some(_)) => Some(self.load_catalogue().await?),
            _ => None,
        };

        info!(
            patients = patients.len(),
            strategy = %payload.strategy,
            %week_start,
            "Generating weekly plans"
        );

        let generated_at = Utc::now();
        let mut plans = Vec::with_capacity(patients.len());
        for patient in &patients {
            let (days, usage) = match payload.strategy {
                Strategy::RuleBased => (self.planner.generate(patient, week_start), None),
                Strategy::Llm => self.generate_llm_days(patient, week_start, catalogue.as_ref()).await,
            };

            plans.push(WeeklyPlan {
                id: Uuid::new_v4(),
                patient_id: patient.id,
                patient_name: patient.name.clone(),
                week_start,
                weekly_totals: WeeklyTotals::from_days(&days, usage),
                days,
                strategy: payload.strategy,
                generated_at,
            });
        }

        self.database.plans().replace_for_patients(&ids, &plans).await?;
        info!(plans = plans.len(), "Weekly plans stored");
        Ok(plans)
    }

    async fn load_catalogue(&self) -> AppResult<Catalogue> {
        let recipes = self.database.recipes();
        Ok(Catalogue {
            recipes: recipes.list_recipes().await?,
            rules: recipes.list_disease_rules().await?,
        })
    }

    /// LLM days for one patient, falling back to the rule-based planner on any failure
    async fn generate_llm_days(
        &self,
        patient: &Patient,
        week_start: NaiveDate,
        catalogue: Option<&Catalogue>,
    ) -> (Vec<DailyMeals>, Option<TokenUsage>) {
        let (Some(llm), Some(catalogue)) = (&self.llm, catalogue) else {
            warn!(patient_id = %patient.id, "No LLM provider configured, using rule-based plan");
            return (self.planner.generate(patient, week_start), None);
        };

        let safe = RecipeFilter::for_patient(patient, &catalogue.rules)
            .safe_recipes(catalogue.recipes.clone());
        let prompt = build_meal_plan_prompt(patient, week_start, &safe);

        let result = async {
            let completion = llm.complete_json_with_limit(&prompt, PLAN_MAX_TOKENS).await?;
            let days = normalize_plan_days(&completion.value, week_start)?;
            Ok::<_, AppError>((days, completion.usage))
        }
        .await;

        match result {
            Ok(generated) => generated,
            Err(e) => {
                warn!(
                    patient_id = %patient.id,
                    provider = llm.provider().name(),
                    "LLM plan generation failed, falling back to rule-based plan: {e}"
                );
                (self.planner.generate(patient, week_start), None)
            }
        }
    }

    /// Ask the LLM for three meal ideas for a patient
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown patient, 503 without a provider, and 500
    /// when the model reply cannot be parsed
    pub async fn suggest_meals(
        &self,
        payload: &MealSuggestionsPayload,
    ) -> AppResult<MealSuggestionsResponse> {
        let patient = match Uuid::parse_str(payload.patient_id.trim()) {
            Ok(id) => self.database.patients().get(id).await?,
            Err(_) => None,
        }
        .ok_or_else(|| AppError::not_found("Patient"))?;

        let llm = self
            .llm
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("LLM provider is not configured"))?;

        let prompt = build_meal_suggestions_prompt(
            &patient,
            payload.meal_type.as_deref(),
            payload.preferences.as_deref(),
        );
        let completion = llm.complete_json(&prompt).await?;
        let parsed: SuggestionsReply = serde_json::from_value(completion.value).map_err(|e| {
            AppError::internal(format!("Failed to parse meal suggestions from LLM: {e}"))
        })?;

        Ok(MealSuggestionsResponse {
            patient_id: patient.id,
            suggestions: parsed.suggestions.into_iter().map(Meal::from).collect(),
            generated_at: Utc::now(),
            token_usage: completion.usage,
        })
    }
}
