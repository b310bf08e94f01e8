// ABOUTME: SQLite connection management and schema migration for the planner
// ABOUTME: Hands out per-table managers that share one connection pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! # Database Management
//!
//! Patients, weekly plans and the recipe catalogue live in a single `SQLite`
//! database. Structured columns (conditions, allergies, plan days) are stored
//! as JSON text. The schema is created on startup.

mod patients;
mod plans;
mod recipes;

pub use patients::PatientsManager;
pub use plans::PlansManager;
pub use recipes::RecipesManager;

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::config::DatabaseUrl;
use crate::errors::{AppError, AppResult};

/// Database handle shared by all request handlers
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(url: &DatabaseUrl) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .with_context(|| format!("Invalid database URL: {url}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to :memory: is a separate database, so keep exactly one alive
        let pool_options = if url.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(10))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database at {url}"))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(database = %url, "Database ready");
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Patient directory operations
    #[must_use]
    pub fn patients(&self) -> PatientsManager {
        PatientsManager::new(self.pool.clone())
    }

    /// Weekly plan operations
    #[must_use]
    pub fn plans(&self) -> PlansManager {
        PlansManager::new(self.pool.clone())
    }

    /// Recipe catalogue and disease rule operations
    #[must_use]
    pub fn recipes(&self) -> RecipesManager {
        RecipesManager::new(self.pool.clone())
    }

    /// Cheap connectivity probe for health checks
    ///
    /// # Errors
    ///
    /// Returns a database error if the probe query fails
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_patients().await?;
        self.migrate_plans().await?;
        self.migrate_recipes().await?;
        debug!("Database migrations applied");
        Ok(())
    }

    async fn migrate_patients(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS patients (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                age INTEGER NOT NULL,
                gender TEXT NOT NULL CHECK (gender IN ('male', 'female', 'other')),
                weight REAL,
                height REAL,
                medical_conditions TEXT NOT NULL DEFAULT '[]',
                allergies TEXT NOT NULL DEFAULT '[]',
                dietary_restrictions TEXT NOT NULL DEFAULT '[]',
                calorie_target INTEGER NOT NULL,
                macro_targets TEXT NOT NULL DEFAULT '{}',
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create patients table")?;
        Ok(())
    }

    async fn migrate_plans(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS weekly_plans (
                id TEXT PRIMARY KEY,
                patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
                patient_name TEXT NOT NULL,
                week_start TEXT NOT NULL,
                days TEXT NOT NULL,
                strategy TEXT NOT NULL CHECK (strategy IN ('rule_based', 'llm')),
                generated_at TEXT NOT NULL,
                weekly_totals TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create weekly_plans table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_weekly_plans_patient ON weekly_plans(patient_id)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create weekly_plans index")?;
        Ok(())
    }

    async fn migrate_recipes(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                external_id TEXT PRIMARY KEY,
                meal_name TEXT NOT NULL,
                meal_type TEXT,
                calories_per_serving REAL,
                protein_g REAL,
                fat_g REAL,
                carbs_g REAL,
                tags TEXT NOT NULL DEFAULT '[]',
                allergens TEXT NOT NULL DEFAULT '[]'
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create recipes table")?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                recipe_id TEXT NOT NULL REFERENCES recipes(external_id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                quantity REAL NOT NULL,
                unit TEXT NOT NULL,
                raw TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create recipe_ingredients table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_recipe ON recipe_ingredients(recipe_id)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create recipe_ingredients index")?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS disease_rules (
                name TEXT PRIMARY KEY,
                prohibited_tags TEXT NOT NULL DEFAULT '[]'
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create disease_rules table")?;
        Ok(())
    }
}

/// Parse a UUID stored as TEXT
fn parse_uuid(value: &str) -> AppResult<uuid::Uuid> {
    uuid::Uuid::parse_str(value).map_err(|e| AppError::internal(format!("Invalid UUID '{value}': {e}")))
}

/// Parse an RFC 3339 timestamp stored as TEXT
fn parse_timestamp(value: &str) -> AppResult<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| AppError::internal(format!("Invalid timestamp '{value}': {e}")))
}
