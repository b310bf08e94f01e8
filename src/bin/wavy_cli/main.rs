// ABOUTME: WAVY CLI - command-line front end for the nutrition planner API
// ABOUTME: Patient directory, plan generator, and procurement panel over the HTTP client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai
//!
//! Usage:
//! ```bash
//! # Register a patient
//! wavy-cli patients create --name "Ada Park" --age 67 --gender female \
//!     --calorie-target 1800 --condition diabetes --allergy peanuts
//!
//! # Generate plans for two patients with the LLM strategy
//! wavy-cli plans generate --patient <id> --patient <id> --strategy llm
//!
//! # Export a plan as CSV
//! wavy-cli plans export <plan-id> --format csv --output plan.csv
//!
//! # Shopping list across plans
//! wavy-cli procurement shopping-list --plan <id> --plan <id>
//! ```

mod commands;
mod helpers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use wavy_nutrition::client::ApiClient;

#[derive(Parser)]
#[command(
    name = "wavy-cli",
    about = "WAVY nutrition planner CLI",
    long_about = "Manage patients, generate weekly meal plans, and build shopping lists through the WAVY API."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// API base URL
    #[arg(long, global = true, env = "WAVY_API_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Patient directory
    Patients {
        #[command(subcommand)]
        action: commands::patients::PatientCommand,
    },

    /// Weekly meal plans
    Plans {
        #[command(subcommand)]
        action: commands::plans::PlanCommand,
    },

    /// Shopping lists and procurement insights
    Procurement {
        #[command(subcommand)]
        action: commands::procurement::ProcurementCommand,
    },

    /// Show server health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let client = ApiClient::new(&cli.base_url)?;
    debug!(base_url = client.base_url(), "Using API");

    match cli.command {
        Command::Patients { action } => commands::patients::run(&client, action).await?,
        Command::Plans { action } => commands::plans::run(&client, action).await?,
        Command::Procurement { action } => commands::procurement::run(&client, action).await?,
        Command::Health => {
            let health = client.health().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
    }

    Ok(())
}
