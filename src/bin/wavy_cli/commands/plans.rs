// ABOUTME: Plan generator commands for wavy-cli
// ABOUTME: Generate, list, show, delete, and export weekly meal plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use wavy_nutrition::client::ApiClient;
use wavy_nutrition::export::ExportFormat;
use wavy_nutrition::models::{GeneratePlansPayload, MealSuggestionsPayload, Strategy};

use crate::helpers::display::{display_plan, display_plans, write_export};

#[derive(Subcommand)]
pub enum PlanCommand {
    /// List all plans
    List,

    /// Show one plan day by day
    Show {
        /// Plan ID
        id: String,
    },

    /// Generate 7-day plans, replacing existing plans of these patients
    Generate {
        /// Patient ID (repeatable)
        #[arg(long = "patient", required = true)]
        patients: Vec<String>,

        /// First day of the week, YYYY-MM-DD (defaults to next Monday)
        #[arg(long)]
        week_start: Option<String>,

        /// rule_based or llm
        #[arg(long, default_value = "rule_based")]
        strategy: String,
    },

    /// Delete a plan
    Delete {
        /// Plan ID
        id: String,
    },

    /// Export a plan as text or CSV
    Export {
        /// Plan ID
        id: String,

        /// text or csv
        #[arg(long, default_value = "text")]
        format: String,

        /// Output file (stdout when omitted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Ask the LLM for three meal ideas for a patient
    Suggest {
        /// Patient ID
        #[arg(long)]
        patient: String,

        /// breakfast, lunch, dinner, or snack
        #[arg(long)]
        meal_type: Option<String>,

        /// Free-text preferences
        #[arg(long)]
        preferences: Option<String>,
    },
}

/// Execute a plan command
pub async fn run(client: &ApiClient, command: PlanCommand) -> Result<()> {
    match command {
        PlanCommand::List => display_plans(&client.list_plans().await?),
        PlanCommand::Show { id } => display_plan(&client.get_plan(&id).await?),
        PlanCommand::Generate {
            patients,
            week_start,
            strategy,
        } => {
            let payload = GeneratePlansPayload {
                patient_ids: patients,
                week_start,
                strategy: Strategy::parse(&strategy)?,
            };
            let plans = client.generate_plans(&payload).await?;
            println!("Generated {} plan(s)", plans.len());
            for plan in &plans {
                display_plan(plan);
            }
        }
        PlanCommand::Delete { id } => {
            client.delete_plan(&id).await?;
            println!("Deleted plan {id}");
        }
        PlanCommand::Export { id, format, output } => {
            let format: ExportFormat = format.parse()?;
            let document = client.export_plan(&id, format).await?;
            write_export(document, output.as_deref())?;
        }
        PlanCommand::Suggest {
            patient,
            meal_type,
            preferences,
        } => {
            let payload = MealSuggestionsPayload {
                patient_id: patient,
                meal_type,
                preferences,
            };
            let response = client.meal_suggestions(&payload).await?;
            for meal in &response.suggestions {
                println!("{} ({} kcal)", meal.name, meal.nutrition.calories);
                if !meal.description.is_empty() {
                    println!("   {}", meal.description);
                }
                if !meal.ingredients.is_empty() {
                    println!("   Ingredients: {}", meal.ingredients.join(", "));
                }
            }
        }
    }
    Ok(())
}
