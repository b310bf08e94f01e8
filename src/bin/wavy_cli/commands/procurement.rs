// ABOUTME: Procurement panel commands for wavy-cli
// ABOUTME: Aggregated ingredients, categorized shopping lists, exports, and LLM insights
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use wavy_nutrition::client::ApiClient;
use wavy_nutrition::export::ExportFormat;

use crate::helpers::display::{display_ingredients, display_insights, display_shopping_list, write_export};

#[derive(Subcommand)]
pub enum ProcurementCommand {
    /// Aggregated ingredient list across plans
    Ingredients {
        /// Plan ID (repeatable)
        #[arg(long = "plan", required = true)]
        plans: Vec<String>,
    },

    /// Shopping list grouped by category
    ShoppingList {
        /// Plan ID (repeatable)
        #[arg(long = "plan", required = true)]
        plans: Vec<String>,

        /// Export as text or csv instead of printing the list
        #[arg(long)]
        format: Option<String>,

        /// Output file for the export (stdout when omitted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Narrative procurement insights from the LLM
    Insights {
        /// Plan ID (repeatable)
        #[arg(long = "plan", required = true)]
        plans: Vec<String>,

        /// Extra instructions for the model
        #[arg(long)]
        instructions: Option<String>,
    },
}

/// Execute a procurement command
pub async fn run(client: &ApiClient, command: ProcurementCommand) -> Result<()> {
    match command {
        ProcurementCommand::Ingredients { plans } => {
            display_ingredients(&client.procurement_ingredients(plans).await?);
        }
        ProcurementCommand::ShoppingList {
            plans,
            format,
            output,
        } => match format {
            Some(format) => {
                let format: ExportFormat = format.parse()?;
                let document = client.export_shopping_list(plans, format).await?;
                write_export(document, output.as_deref())?;
            }
            None => display_shopping_list(&client.shopping_list(plans).await?),
        },
        ProcurementCommand::Insights {
            plans,
            instructions,
        } => {
            println!("Requesting insights, this can take a minute...");
            display_insights(&client.procurement_insights(plans, instructions).await?);
        }
    }
    Ok(())
}
