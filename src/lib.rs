// ABOUTME: Main library entry point for the WAVY patient nutrition planner
// ABOUTME: Patient directory, weekly meal plan generation, and procurement over a REST API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # WAVY Nutrition Planner
//!
//! A service that keeps a directory of hospital patients, generates 7-day
//! meal plans for them, and turns selected plans into kitchen shopping lists.
//!
//! ## Features
//!
//! - **Rule-based plans**: deterministic templates scaled to each patient's calorie target
//! - **LLM plans**: prompts built from the patient profile and a safety-filtered recipe catalogue
//! - **Procurement**: ingredient aggregation, unit normalisation, and categorised shopping lists
//! - **Exports**: plain text and CSV downloads
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wavy_nutrition::config::ServerConfig;
//! use wavy_nutrition::resources::ServerResources;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = Arc::new(ServerResources::from_config(config).await?);
//!     wavy_nutrition::server::run(resources).await
//! }
//! ```

pub use wavy_core::{constants, errors, models};

/// Environment configuration
pub mod config;

/// `tracing-subscriber` setup
pub mod logging;

/// `SQLite` persistence for patients, plans, and the recipe catalogue
pub mod database;

/// LLM provider abstraction, JSON completion client, and prompt builders
pub mod llm;

/// Rule-based and LLM weekly plan generation
pub mod planning;

/// Ingredient aggregation, categorization, and procurement insights
pub mod procurement;

/// Text and CSV exporters
pub mod export;

/// Recipe catalogue and disease rule CSV import
pub mod import;

/// Typed HTTP client for the REST API
pub mod client;

/// HTTP route handlers
pub mod routes;

/// Shared server state
pub mod resources;

/// Router assembly and serving
pub mod server;
