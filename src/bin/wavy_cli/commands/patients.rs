// ABOUTME: Patient directory commands for wavy-cli
// ABOUTME: List, show, create, and delete patients; deletion asks for confirmation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use anyhow::Result;
use clap::Subcommand;
use wavy_nutrition::client::ApiClient;
use wavy_nutrition::models::{CreatePatientPayload, DietaryRestriction};

use crate::helpers::display::{confirm, display_patient, display_patients};

#[derive(Subcommand)]
pub enum PatientCommand {
    /// List all patients
    List,

    /// Show one patient
    Show {
        /// Patient ID
        id: String,
    },

    /// Register a new patient
    Create {
        /// Full name
        #[arg(long)]
        name: String,

        /// Age in years
        #[arg(long)]
        age: u32,

        /// male, female, or other
        #[arg(long)]
        gender: String,

        /// Daily calorie target (500-5000)
        #[arg(long)]
        calorie_target: u32,

        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,

        /// Height in cm
        #[arg(long)]
        height: Option<f64>,

        /// Medical condition (repeatable)
        #[arg(long = "condition")]
        conditions: Vec<String>,

        /// Food allergy (repeatable)
        #[arg(long = "allergy")]
        allergies: Vec<String>,

        /// Dietary restriction such as vegan or low-sodium (repeatable)
        #[arg(long = "restriction")]
        restrictions: Vec<String>,

        /// Clinician notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a patient and all their plans
    Delete {
        /// Patient ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Execute a patient command
pub async fn run(client: &ApiClient, command: PatientCommand) -> Result<()> {
    match command {
        PatientCommand::List => display_patients(&client.list_patients().await?),
        PatientCommand::Show { id } => display_patient(&client.get_patient(&id).await?),
        PatientCommand::Create {
            name,
            age,
            gender,
            calorie_target,
            weight,
            height,
            conditions,
            allergies,
            restrictions,
            notes,
        } => {
            let payload = CreatePatientPayload {
                name,
                age,
                gender,
                weight,
                height,
                medical_conditions: conditions,
                allergies,
                dietary_restrictions: restrictions.into_iter().map(DietaryRestriction::new).collect(),
                calorie_target,
                macro_targets: serde_json::Map::new(),
                notes,
            };
            let patient = client.create_patient(&payload).await?;
            println!("Created patient {}", patient.id);
            display_patient(&patient);
        }
        PatientCommand::Delete { id, yes } => {
            let patient = client.get_patient(&id).await?;
            let question = format!(
                "Delete {} and all of their meal plans? This cannot be undone.",
                patient.name
            );
            if !yes && !confirm(&question)? {
                println!("Cancelled.");
                return Ok(());
            }
            client.delete_patient(&id).await?;
            println!("Deleted {}", patient.name);
        }
    }
    Ok(())
}
