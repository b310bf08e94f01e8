// ABOUTME: Database operations for the patient directory
// ABOUTME: Create, fetch, list, and delete patients; delete cascades to their plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::{parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{Gender, Patient};

/// Patient directory storage
#[derive(Clone)]
pub struct PatientsManager {
    pool: SqlitePool,
}

impl PatientsManager {
    /// Create a new manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a validated patient record
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails
    pub async fn create(&self, patient: &Patient) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO patients (
                id, name, age, gender, weight, height, medical_conditions, allergies,
                dietary_restrictions, calorie_target, macro_targets, notes, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(patient.id.to_string())
        .bind(&patient.name)
        .bind(i64::from(patient.age))
        .bind(patient.gender.as_str())
        .bind(patient.weight)
        .bind(patient.height)
        .bind(serde_json::to_string(&patient.medical_conditions)?)
        .bind(serde_json::to_string(&patient.allergies)?)
        .bind(serde_json::to_string(&patient.dietary_restrictions)?)
        .bind(i64::from(patient.calorie_target))
        .bind(serde_json::to_string(&patient.macro_targets)?)
        .bind(&patient.notes)
        .bind(patient.created_at.to_rfc3339())
        .bind(patient.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create patient: {e}")))?;

        Ok(())
    }

    /// Fetch one patient
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Patient>> {
        let row = sqlx::query("SELECT * FROM patients WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get patient: {e}")))?;

        row.as_ref().map(row_to_patient).transpose()
    }

    /// Fetch several patients; ids that do not exist are simply absent from the result
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails
    pub async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Patient>> {
        let mut patients = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(patient) = self.get(*id).await? {
                patients.push(patient);
            }
        }
        Ok(patients)
    }

    /// List all patients, oldest first
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn list(&self) -> AppResult<Vec<Patient>> {
        let rows = sqlx::query("SELECT * FROM patients ORDER BY created_at ASC, name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list patients: {e}")))?;

        rows.iter().map(row_to_patient).collect()
    }

    /// Delete a patient and every plan generated for them
    ///
    /// Returns `false` when the patient did not exist.
    ///
    /// # Errors
    ///
    /// Returns a database error if the transaction fails
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("DELETE FROM weekly_plans WHERE patient_id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete patient plans: {e}")))?;

        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete patient: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit patient delete: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_patient(row: &SqliteRow) -> AppResult<Patient> {
    let id: String = row.get("id");
    let gender: String = row.get("gender");
    let age: i64 = row.get("age");
    let calorie_target: i64 = row.get("calorie_target");
    let conditions_json: String = row.get("medical_conditions");
    let allergies_json: String = row.get("allergies");
    let restrictions_json: String = row.get("dietary_restrictions");
    let macros_json: String = row.get("macro_targets");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Patient {
        id: parse_uuid(&id)?,
        name: row.get("name"),
        age: age as u32,
        gender: Gender::parse(&gender)?,
        weight: row.get("weight"),
        height: row.get("height"),
        medical_conditions: serde_json::from_str(&conditions_json)?,
        allergies: serde_json::from_str(&allergies_json)?,
        dietary_restrictions: serde_json::from_str(&restrictions_json)?,
        calorie_target: calorie_target as u32,
        macro_targets: serde_json::from_str(&macros_json)?,
        notes: row.get("notes"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
