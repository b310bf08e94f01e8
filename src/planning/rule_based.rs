// ABOUTME: Deterministic weekly planner built on the static meal templates
// ABOUTME: Rotates templates per day and scales them to the patient's calorie target
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use chrono::{Days, NaiveDate};
use tracing::debug;

use super::templates::{MealSet, MealSetKind};
use crate::constants::plan::{BREAKFAST_SHARE, DAYS_PER_PLAN, DINNER_SHARE, LUNCH_SHARE, SNACK_SHARE};
use crate::models::{round_to, DailyMeals, Meal, NutritionInfo, Patient};

/// Template-based planner; the same patient and week always yield the same plan
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedPlanner;

impl RuleBasedPlanner {
    /// Seven days of meals starting at `week_start`
    #[must_use]
    pub fn generate(&self, patient: &Patient, week_start: NaiveDate) -> Vec<DailyMeals> {
        let kind = MealSetKind::for_patient(patient);
        debug!(patient_id = %patient.id, meal_set = ?kind, "Selected meal set");

        let set = kind.meal_set();
        let target = f64::from(patient.calorie_target);

        (0..DAYS_PER_PLAN)
            .map(|offset| {
                let date = week_start + Days::new(offset as u64);
                build_day(&set, offset, date, target)
            })
            .collect()
    }
}

/// Meals for day `offset` of the week
///
/// The rotation follows the breakfast list: every slot, snacks included,
/// is indexed by `offset % breakfast.len()` wrapped to the slot's length.
fn build_day(set: &MealSet, offset: usize, date: NaiveDate, target: f64) -> DailyMeals {
    let day_index = offset % set.breakfast.len().max(1);
    let pick = |options: &[Meal], share: f64| -> Meal {
        let template = &options[day_index % options.len()];
        scale_meal(template, target * share)
    };

    let snacks = if set.snacks.is_empty() {
        Vec::new()
    } else {
        vec![pick(&set.snacks, SNACK_SHARE)]
    };

    DailyMeals::new(
        date,
        pick(&set.breakfast, BREAKFAST_SHARE),
        pick(&set.lunch, LUNCH_SHARE),
        pick(&set.dinner, DINNER_SHARE),
        snacks,
    )
}

/// Scale `template` so it provides `target_calories`
///
/// Calories are truncated to a whole number; every other nutrient scales by
/// the same ratio and is rounded to one decimal.
#[must_use]
pub fn scale_meal(template: &Meal, target_calories: f64) -> Meal {
    let current = f64::from(template.nutrition.calories);
    let ratio = if current > 0.0 { target_calories / current } else { 1.0 };
    let base = &template.nutrition;

    Meal {
        nutrition: NutritionInfo {
            calories: target_calories.max(0.0).floor() as u32,
            protein: round_to(base.protein * ratio, 1),
            carbs: round_to(base.carbs * ratio, 1),
            fat: round_to(base.fat * ratio, 1),
            fiber: round_to(base.fiber * ratio, 1),
            sodium: round_to(base.sodium * ratio, 1),
        },
        ..template.clone()
    }
}
