// ABOUTME: Plain-text and CSV exporters for weekly plans and shopping lists
// ABOUTME: Empty inputs produce no document so callers can skip the download
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! # Export Formatters
//!
//! Every exporter returns `None` when there is nothing to export. CSV fields
//! are always quoted and embedded quotes are doubled.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{CategorizedShoppingList, Meal, WeeklyPlan};
use crate::procurement::units::{format_amount, format_quantity};

/// Download format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Comma-separated values
    Csv,
}

impl ExportFormat {
    /// MIME type of the rendered document
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Text => "text/plain; charset=utf-8",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }

    /// File extension without the dot
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            other => Err(AppError::invalid_input(format!(
                "Unsupported export format '{other}', expected text or csv"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Csv => "csv",
        })
    }
}

/// Quote a CSV field, doubling embedded quotes
#[must_use]
pub fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Reduce `raw` to a download file name stem of ASCII letters, digits, `-` and `_`
///
/// Whitespace becomes `_` and anything else is dropped, so the result is
/// always safe inside a quoted `Content-Disposition` filename.
#[must_use]
pub fn file_stem(raw: &str) -> String {
    let stem: String = raw
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    if stem.is_empty() {
        "export".to_owned()
    } else {
        stem
    }
}

fn csv_row(fields: &[&str]) -> String {
    let mut row = fields.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",");
    row.push_str("\r\n");
    row
}

fn labelled_meals(day: &crate::models::DailyMeals) -> impl Iterator<Item = (&'static str, &Meal)> {
    [("Breakfast", &day.breakfast), ("Lunch", &day.lunch), ("Dinner", &day.dinner)]
        .into_iter()
        .chain(day.snacks.iter().map(|s| ("Snack", s)))
}

/// Render plans in either format
#[must_use]
pub fn export_plans(plans: &[WeeklyPlan], format: ExportFormat) -> Option<String> {
    match format {
        ExportFormat::Text => plans_to_text(plans),
        ExportFormat::Csv => plans_to_csv(plans),
    }
}

/// Render a shopping list in either format
#[must_use]
pub fn export_shopping_list(list: &CategorizedShoppingList, format: ExportFormat) -> Option<String> {
    match format {
        ExportFormat::Text => shopping_list_to_text(list),
        ExportFormat::Csv => shopping_list_to_csv(list),
    }
}

/// Readable day-by-day listing of `plans`
#[must_use]
pub fn plans_to_text(plans: &[WeeklyPlan]) -> Option<String> {
    if plans.iter().all(|p| p.days.is_empty()) {
        return None;
    }

    let mut out = String::new();
    for plan in plans.iter().filter(|p| !p.days.is_empty()) {
        let _ = writeln!(out, "Weekly Meal Plan: {}", plan.patient_name);
        let _ = writeln!(out, "Week of {} ({})", plan.week_start, plan.strategy);
        out.push_str(&"=".repeat(60));
        out.push('\n');

        for day in &plan.days {
            let _ = writeln!(out, "\n{} ({})", day.date.format("%A"), day.date);
            for (label, meal) in labelled_meals(day) {
                let _ = writeln!(out, "  {label}: {} ({} kcal)", meal.name, meal.nutrition.calories);
                if !meal.ingredients.is_empty() {
                    let _ = writeln!(out, "    Ingredients: {}", meal.ingredients.join(", "));
                }
            }
            let _ = writeln!(
                out,
                "  Total: {} kcal | Protein {}g | Carbs {}g | Fat {}g",
                day.total_calories,
                format_quantity(day.total_nutrition.protein),
                format_quantity(day.total_nutrition.carbs),
                format_quantity(day.total_nutrition.fat),
            );
        }

        let totals = &plan.weekly_totals;
        let _ = writeln!(
            out,
            "\nWeekly total: {} kcal (average {} kcal/day)\n",
            totals.total_calories,
            format_quantity(totals.avg_daily_calories),
        );
    }
    Some(out)
}

/// One CSV row per meal of `plans`
#[must_use]
pub fn plans_to_csv(plans: &[WeeklyPlan]) -> Option<String> {
    if plans.iter().all(|p| p.days.is_empty()) {
        return None;
    }

    let mut out = csv_row(&[
        "Patient",
        "Date",
        "Meal",
        "Name",
        "Calories",
        "Protein (g)",
        "Carbs (g)",
        "Fat (g)",
        "Ingredients",
    ]);
    for plan in plans {
        for day in &plan.days {
            let date = day.date.to_string();
            for (label, meal) in labelled_meals(day) {
                let n = &meal.nutrition;
                out.push_str(&csv_row(&[
                    &plan.patient_name,
                    &date,
                    label,
                    &meal.name,
                    &n.calories.to_string(),
                    &n.protein.to_string(),
                    &n.carbs.to_string(),
                    &n.fat.to_string(),
                    &meal.ingredients.join("; "),
                ]));
            }
        }
    }
    Some(out)
}

/// Shopping list grouped under category headings
#[must_use]
pub fn shopping_list_to_text(list: &CategorizedShoppingList) -> Option<String> {
    if list.is_empty() {
        return None;
    }

    let mut out = format!("Shopping List ({} items)\n", list.item_count());
    for group in list.categories.iter().filter(|g| !g.items.is_empty()) {
        let _ = writeln!(out, "\n{}", group.category.display_name());
        for item in &group.items {
            let _ = writeln!(out, "  - {}: {}", item.name, format_amount(item.quantity, item.unit.as_deref()));
        }
    }
    Some(out)
}

/// One CSV row per shopping-list item
#[must_use]
pub fn shopping_list_to_csv(list: &CategorizedShoppingList) -> Option<String> {
    if list.is_empty() {
        return None;
    }

    let mut out = csv_row(&["Category", "Ingredient", "Quantity", "Unit"]);
    for group in &list.categories {
        for item in &group.items {
            out.push_str(&csv_row(&[
                group.category.display_name(),
                &item.name,
                &format_quantity(item.quantity),
                item.unit.as_deref().unwrap_or(""),
            ]));
        }
    }
    Some(out)
}
