// ABOUTME: Catalogue import binary loading recipes and disease rules from CSV
// ABOUTME: Writes into the same SQLite database the API server uses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! Usage:
//! ```bash
//! # Replace the recipe catalogue
//! wavy-import recipes --csv data/recipes.csv --truncate
//!
//! # Add or update disease rules
//! wavy-import rules --csv data/disease_rules.csv
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use wavy_nutrition::{
    config::DatabaseUrl,
    database::Database,
    import::{import_disease_rules, import_recipes, ImportSummary},
    logging,
};

#[derive(Parser)]
#[command(
    name = "wavy-import",
    about = "Import the recipe catalogue and disease rules from CSV files"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override (defaults to DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Import recipes
    Recipes {
        /// CSV file with recipe_id, meal_name, tags, allergens, ingredient_proportion, ...
        #[arg(long)]
        csv: PathBuf,

        /// Delete existing recipes before importing
        #[arg(long)]
        truncate: bool,
    },

    /// Import disease rules
    Rules {
        /// CSV file with Disease and Prohibited_Tags columns
        #[arg(long)]
        csv: PathBuf,
    },
}

fn print_summary(kind: &str, summary: ImportSummary) {
    println!(
        "{kind}: {} added, {} updated, {} skipped",
        summary.added, summary.updated, summary.skipped
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_from_env()?;

    let url = cli
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DatabaseUrl::default().to_connection_string());
    let database = Database::new(&DatabaseUrl::parse_url(&url)?).await?;
    info!(database = %url, "Connected");

    match cli.command {
        Command::Recipes { csv, truncate } => {
            let text = tokio::fs::read_to_string(&csv)
                .await
                .with_context(|| format!("Failed to read {}", csv.display()))?;
            let summary = import_recipes(&database, &text, truncate).await?;
            print_summary("Recipes", summary);
        }
        Command::Rules { csv } => {
            let text = tokio::fs::read_to_string(&csv)
                .await
                .with_context(|| format!("Failed to read {}", csv.display()))?;
            let summary = import_disease_rules(&database, &text).await?;
            print_summary("Disease rules", summary);
        }
    }

    Ok(())
}
