// ABOUTME: Recipe safety filter applied before the catalogue is offered to the LLM
// ABOUTME: Drops recipes whose tags, allergens, or ingredients conflict with a patient
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::collections::HashSet;

use crate::models::{DiseaseRule, Patient, Recipe};

fn normalized(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn overlaps(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Tags prohibited for a patient with `conditions`
///
/// A rule applies when its name contains a condition or a condition contains
/// its name, ignoring case.
#[must_use]
pub fn prohibited_tags(conditions: &[String], rules: &[DiseaseRule]) -> HashSet<String> {
    let conditions = normalized(conditions);
    rules
        .iter()
        .filter(|rule| {
            let name = rule.name.trim().to_lowercase();
            !name.is_empty() && conditions.iter().any(|c| overlaps(c, &name))
        })
        .flat_map(|rule| normalized(&rule.prohibited_tags))
        .collect()
}

/// Safety check for a single recipe against prepared patient terms
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    prohibited: HashSet<String>,
    allergies: Vec<String>,
}

impl RecipeFilter {
    /// Prepare the filter for `patient`
    #[must_use]
    pub fn for_patient(patient: &Patient, rules: &[DiseaseRule]) -> Self {
        Self {
            prohibited: prohibited_tags(&patient.medical_conditions, rules),
            allergies: normalized(&patient.allergies),
        }
    }

    /// Whether `recipe` may be served
    #[must_use]
    pub fn is_safe(&self, recipe: &Recipe) -> bool {
        if normalized(&recipe.tags)
            .iter()
            .any(|tag| self.prohibited.contains(tag))
        {
            return false;
        }

        let allergic_to = |term: &str| {
            let term = term.trim().to_lowercase();
            !term.is_empty() && self.allergies.iter().any(|a| overlaps(a, &term))
        };

        !(recipe.allergens.iter().any(|a| allergic_to(a))
            || recipe.ingredients.iter().any(|i| allergic_to(&i.name)))
    }

    /// The subset of `recipes` that is safe, in catalogue order
    #[must_use]
    pub fn safe_recipes(&self, recipes: Vec<Recipe>) -> Vec<Recipe> {
        recipes.into_iter().filter(|r| self.is_safe(r)).collect()
    }
}
