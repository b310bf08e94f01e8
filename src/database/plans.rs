// ABOUTME: Database operations for generated weekly plans
// ABOUTME: Plan days and weekly totals are stored as JSON text columns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::{parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{Strategy, WeeklyPlan};

/// Weekly plan storage
#[derive(Clone)]
pub struct PlansManager {
    pool: SqlitePool,
}

impl PlansManager {
    /// Create a new manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Atomically replace every stored plan of `patient_ids` with `plans`
    ///
    /// # Errors
    ///
    /// Returns a database error if any statement fails; nothing is changed in that case
    pub async fn replace_for_patients(
        &self,
        patient_ids: &[Uuid],
        plans: &[WeeklyPlan],
    ) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        for patient_id in patient_ids {
            sqlx::query("DELETE FROM weekly_plans WHERE patient_id = $1")
                .bind(patient_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to clear old plans: {e}")))?;
        }

        for plan in plans {
            insert_plan(&mut tx, plan).await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit plans: {e}")))?;
        Ok(())
    }

    /// Fetch one plan
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<WeeklyPlan>> {
        let row = sqlx::query("SELECT * FROM weekly_plans WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get plan: {e}")))?;

        row.as_ref().map(row_to_plan).transpose()
    }

    /// Fetch several plans, preserving the order of `ids`; missing ids are skipped
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails
    pub async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<WeeklyPlan>> {
        let mut plans = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(plan) = self.get(*id).await? {
                plans.push(plan);
            }
        }
        Ok(plans)
    }

    /// List all plans, newest first
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn list(&self) -> AppResult<Vec<WeeklyPlan>> {
        let rows = sqlx::query("SELECT * FROM weekly_plans ORDER BY generated_at DESC, patient_name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list plans: {e}")))?;

        rows.iter().map(row_to_plan).collect()
    }

    /// List the plans of one patient
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn list_for_patient(&self, patient_id: Uuid) -> AppResult<Vec<WeeklyPlan>> {
        let rows = sqlx::query(
            "SELECT * FROM weekly_plans WHERE patient_id = $1 ORDER BY week_start DESC",
        )
        .bind(patient_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list patient plans: {e}")))?;

        rows.iter().map(row_to_plan).collect()
    }

    /// Delete one plan; returns `false` when it did not exist
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM weekly_plans WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete plan: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

async fn insert_plan(tx: &mut Transaction<'_, Sqlite>, plan: &WeeklyPlan) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO weekly_plans (
            id, patient_id, patient_name, week_start, days, strategy, generated_at, weekly_totals
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ",
    )
    .bind(plan.id.to_string())
    .bind(plan.patient_id.to_string())
    .bind(&plan.patient_name)
    .bind(plan.week_start.to_string())
    .bind(serde_json::to_string(&plan.days)?)
    .bind(plan.strategy.as_str())
    .bind(plan.generated_at.to_rfc3339())
    .bind(serde_json::to_string(&plan.weekly_totals)?)
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::database(format!("Failed to store plan: {e}")))?;

    Ok(())
}

fn row_to_plan(row: &SqliteRow) -> AppResult<WeeklyPlan> {
    let id: String = row.get("id");
    let patient_id: String = row.get("patient_id");
    let week_start: String = row.get("week_start");
    let days_json: String = row.get("days");
    let strategy: String = row.get("strategy");
    let generated_at: String = row.get("generated_at");
    let totals_json: String = row.get("weekly_totals");

    Ok(WeeklyPlan {
        id: parse_uuid(&id)?,
        patient_id: parse_uuid(&patient_id)?,
        patient_name: row.get("patient_name"),
        week_start: NaiveDate::parse_from_str(&week_start, "%Y-%m-%d")
            .map_err(|e| AppError::internal(format!("Invalid week start '{week_start}': {e}")))?,
        days: serde_json::from_str(&days_json)?,
        strategy: Strategy::parse(&strategy)?,
        generated_at: parse_timestamp(&generated_at)?,
        weekly_totals: serde_json::from_str(&totals_json)?,
    })
}
