// ABOUTME: Ingredient aggregation across weekly plans into a flat shopping list
// ABOUTME: Uses catalogue recipe quantities when available, mention counts otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::cmp::Ordering;
use std::collections::HashMap;

use super::units::{to_base_unit, to_display_unit};
use crate::models::{AggregatedIngredient, Meal, Recipe, WeeklyPlan};

/// Lowercased name with a trailing plural removed
///
/// `"tomatoes"` becomes `"tomato"`, `"eggs"` becomes `"egg"`, and words
/// ending in `ss` are left alone.
#[must_use]
pub fn fold_plural(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    if let Some(stem) = lower.strip_suffix("es") {
        stem.to_owned()
    } else if lower.ends_with('s') && !lower.ends_with("ss") {
        lower[..lower.len() - 1].to_owned()
    } else {
        lower
    }
}

#[derive(Debug)]
struct Line {
    name: String,
    lower: String,
    folded: String,
    quantity: f64,
    unit: Option<String>,
}

impl Line {
    fn matches(&self, lower: &str, folded: &str, unit: Option<&str>) -> bool {
        self.unit.as_deref() == unit && (self.folded == folded || self.lower == lower)
    }
}

/// Accumulates ingredient quantities, merging spelling variants that share a unit
#[derive(Debug, Default)]
pub struct IngredientAggregator {
    lines: Vec<Line>,
}

impl IngredientAggregator {
    /// Create an empty aggregator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of `name`; the first spelling seen is kept
    pub fn add(&mut self, name: &str, quantity: f64, unit: Option<&str>) {
        let name = name.trim();
        if name.is_empty() || !quantity.is_finite() {
            return;
        }

        let (quantity, unit) = match unit.map(str::trim).filter(|u| !u.is_empty()) {
            Some(unit) => {
                let (q, u) = to_base_unit(quantity, unit);
                (q, Some(u))
            }
            None => (quantity, None),
        };

        let lower = name.to_lowercase();
        let folded = fold_plural(name);
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.matches(&lower, &folded, unit.as_deref()))
        {
            line.quantity += quantity;
            return;
        }

        self.lines.push(Line {
            name: name.to_owned(),
            lower,
            folded,
            quantity,
            unit,
        });
    }

    /// Add the ingredients of one meal
    ///
    /// A meal backed by a catalogued recipe with parsed ingredients contributes
    /// `quantity * portion` of each; otherwise every ingredient string counts
    /// as one mention without a unit.
    pub fn add_meal(&mut self, meal: &Meal, recipes: &HashMap<String, Recipe>) {
        let recipe = meal
            .recipe_id
            .as_ref()
            .and_then(|id| recipes.get(id))
            .filter(|r| !r.ingredients.is_empty());

        match recipe {
            Some(recipe) => {
                for ingredient in &recipe.ingredients {
                    self.add(
                        &ingredient.name,
                        ingredient.quantity * meal.portion,
                        Some(&ingredient.unit),
                    );
                }
            }
            None => {
                for ingredient in &meal.ingredients {
                    self.add(ingredient, 1.0, None);
                }
            }
        }
    }

    /// Finished list sorted by descending quantity, then name
    #[must_use]
    pub fn finish(self) -> Vec<AggregatedIngredient> {
        let mut items: Vec<AggregatedIngredient> = self
            .lines
            .into_iter()
            .map(|line| match line.unit {
                Some(unit) => {
                    let (quantity, unit) = to_display_unit(line.quantity, &unit);
                    AggregatedIngredient::new(line.name, quantity, Some(unit))
                }
                None => AggregatedIngredient::new(line.name, to_display_unit(line.quantity, "").0, None),
            })
            .collect();

        items.sort_by(|a, b| {
            b.quantity
                .partial_cmp(&a.quantity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        items
    }
}

/// Every recipe id referenced by a meal of `plans`, without duplicates
#[must_use]
pub fn referenced_recipe_ids(plans: &[WeeklyPlan]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for meal in plans.iter().flat_map(|p| &p.days).flat_map(|d| d.meals()) {
        if let Some(id) = &meal.recipe_id {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }
    ids
}

/// Aggregate every meal of every day of `plans`
#[must_use]
pub fn aggregate_plans(
    plans: &[WeeklyPlan],
    recipes: &HashMap<String, Recipe>,
) -> Vec<AggregatedIngredient> {
    let mut aggregator = IngredientAggregator::new();
    for meal in plans.iter().flat_map(|p| &p.days).flat_map(|d| d.meals()) {
        aggregator.add_meal(meal, recipes);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::models::RecipeIngredient;

    fn recipe(id: &str, parts: &[(&str, f64, &str)]) -> Recipe {
        Recipe {
            external_id: id.into(),
            meal_name: id.into(),
            meal_type: None,
            calories_per_serving: None,
            protein_g: None,
            fat_g: None,
            carbs_g: None,
            tags: vec![],
            allergens: vec![],
            ingredients: parts
                .iter()
                .map(|(name, quantity, unit)| RecipeIngredient {
                    name: (*name).to_owned(),
                    quantity: *quantity,
                    unit: (*unit).to_owned(),
                    raw: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_fold_plural() {
        assert_eq!(fold_plural("Tomatoes"), "tomato");
        assert_eq!(fold_plural("eggs"), "egg");
        assert_eq!(fold_plural("Swiss"), "swiss");
        assert_eq!(fold_plural("rice"), "rice");
    }

    #[test]
    fn test_merges_variants_keeping_first_spelling() {
        let mut agg = IngredientAggregator::new();
        agg.add("Eggs", 2.0, None);
        agg.add("egg", 1.0, None);
        agg.add("EGGS", 1.0, None);
        let items = agg.finish();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Eggs");
        assert!((items[0].quantity - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_different_units_stay_separate() {
        let mut agg = IngredientAggregator::new();
        agg.add("milk", 200.0, Some("ml"));
        agg.add("milk", 1.0, None);
        assert_eq!(agg.finish().len(), 2);
    }

    #[test]
    fn test_kg_and_g_merge_and_promote() {
        let mut agg = IngredientAggregator::new();
        agg.add("Chicken", 0.6, Some("kg"));
        agg.add("chicken", 450.0, Some("g"));
        let items = agg.finish();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit.as_deref(), Some("kg"));
        assert!((items[0].quantity - 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_recipe_quantities_scale_by_portion() {
        let recipes: HashMap<String, Recipe> =
            [("r1".to_owned(), recipe("r1", &[("Rice", 0.1, "kg"), ("Salt", 2.0, "g")]))].into();
        let meal = Meal {
            recipe_id: Some("r1".into()),
            portion: 1.5,
            ingredients: vec!["ignored".into()],
            ..Meal::named("Rice bowl")
        };
        let plain = Meal {
            recipe_id: Some("missing".into()),
            ingredients: vec!["banana".into()],
            ..Meal::named("Snack")
        };

        let mut agg = IngredientAggregator::new();
        agg.add_meal(&meal, &recipes);
        agg.add_meal(&plain, &recipes);
        let items = agg.finish();

        assert_eq!(items[0].name, "Rice");
        assert!((items[0].quantity - 150.0).abs() < 1e-9);
        assert_eq!(items[0].unit.as_deref(), Some("g"));
        assert_eq!(items[1].name, "Salt");
        assert!((items[1].quantity - 3.0).abs() < 1e-9);
        assert_eq!(items[2].name, "banana");
        assert!(items[2].unit.is_none());
    }

    #[test]
    fn test_sorted_by_quantity_then_name() {
        let mut agg = IngredientAggregator::new();
        agg.add("b", 1.0, None);
        agg.add("a", 1.0, None);
        agg.add("c", 3.0, None);
        let names: Vec<_> = agg.finish().into_iter().map(|i| i.name).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }
}
