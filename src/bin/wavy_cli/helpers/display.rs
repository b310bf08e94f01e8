// ABOUTME: Output formatting helpers for wavy-cli
// ABOUTME: Tables for patients and plans, shopping lists, insights, and confirmation prompts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use wavy_nutrition::models::{
    AggregatedIngredient, CategorizedShoppingList, Meal, Patient, ProcurementInsightsResponse,
    WeeklyPlan,
};
use wavy_nutrition::procurement::units::format_amount;

fn or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_owned()
    } else {
        items.join(", ")
    }
}

/// One line per patient
pub fn display_patients(patients: &[Patient]) {
    if patients.is_empty() {
        println!("No patients registered.");
        return;
    }

    println!("{:<36}  {:<24} {:>4} {:>6}  Conditions", "ID", "Name", "Age", "kcal");
    println!("{}", "-".repeat(96));
    for p in patients {
        println!(
            "{:<36}  {:<24} {:>4} {:>6}  {}",
            p.id.to_string(),
            p.name,
            p.age,
            p.calorie_target,
            or_dash(&p.medical_conditions)
        );
    }
}

/// Full patient record
pub fn display_patient(patient: &Patient) {
    println!("{} ({})", patient.name, patient.id);
    println!("   Age / gender: {} / {}", patient.age, patient.gender);
    if let Some(weight) = patient.weight {
        println!("   Weight: {weight} kg");
    }
    if let Some(height) = patient.height {
        println!("   Height: {height} cm");
    }
    println!("   Calorie target: {} kcal", patient.calorie_target);
    println!("   Conditions: {}", or_dash(&patient.medical_conditions));
    println!("   Allergies: {}", or_dash(&patient.allergies));
    println!("   Restrictions: {}", or_dash(&patient.restriction_labels()));
    if let Some(notes) = &patient.notes {
        println!("   Notes: {notes}");
    }
}

/// One line per plan
pub fn display_plans(plans: &[WeeklyPlan]) {
    if plans.is_empty() {
        println!("No plans generated yet.");
        return;
    }

    println!("{:<36}  {:<24} {:<10}  {:<10} {:>8}", "ID", "Patient", "Week", "Strategy", "Avg kcal");
    println!("{}", "-".repeat(96));
    for plan in plans {
        println!(
            "{:<36}  {:<24} {:<10}  {:<10} {:>8.1}",
            plan.id.to_string(),
            plan.patient_name,
            plan.week_start.to_string(),
            plan.strategy.as_str(),
            plan.weekly_totals.avg_daily_calories
        );
    }
}

fn meal_line(label: &str, meal: &Meal) {
    println!("     {label:<10} {} ({} kcal)", meal.name, meal.nutrition.calories);
}

/// Day-by-day rendering of one plan
pub fn display_plan(plan: &WeeklyPlan) {
    println!("\n{} - week of {} ({})", plan.patient_name, plan.week_start, plan.strategy);
    println!("{}", "=".repeat(60));
    for day in &plan.days {
        println!("   {} {}", day.date.format("%a"), day.date);
        meal_line("Breakfast", &day.breakfast);
        meal_line("Lunch", &day.lunch);
        meal_line("Dinner", &day.dinner);
        for snack in &day.snacks {
            meal_line("Snack", snack);
        }
        println!("     {:<10} {} kcal", "Total", day.total_calories);
    }
    if let Some(usage) = &plan.weekly_totals.token_usage {
        println!("   Tokens used: {}", usage.total_tokens);
    }
}

/// Flat ingredient list
pub fn display_ingredients(items: &[AggregatedIngredient]) {
    if items.is_empty() {
        println!("No ingredients found in the selected plans.");
        return;
    }
    for item in items {
        println!("   {:<32} {}", item.name, format_amount(item.quantity, item.unit.as_deref()));
    }
}

/// Shopping list grouped by category
pub fn display_shopping_list(list: &CategorizedShoppingList) {
    if list.is_empty() {
        println!("Shopping list is empty.");
        return;
    }
    println!("Shopping list ({} items)", list.item_count());
    for group in &list.categories {
        println!("\n{}", group.category.display_name());
        display_ingredients(&group.items);
    }
}

/// LLM procurement insights
pub fn display_insights(insights: &ProcurementInsightsResponse) {
    println!("Summary\n{}\n", insights.summary);
    println!("Procurement notes");
    for note in &insights.procurement_notes {
        println!("   {note}");
    }
    if let Some(usage) = &insights.token_usage {
        println!(
            "\nTokens: {} prompt + {} completion",
            usage.prompt_tokens, usage.completion_tokens
        );
    }
}

/// Ask a yes/no question on stdin; anything but y/yes is a no
pub fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Write an export to `output`, or stdout when absent
pub fn write_export(document: Option<String>, output: Option<&Path>) -> Result<()> {
    let Some(document) = document else {
        println!("Nothing to export.");
        return Ok(());
    };
    match output {
        Some(path) => {
            std::fs::write(path, document)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{document}"),
    }
    Ok(())
}
