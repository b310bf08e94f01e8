// ABOUTME: Database operations for the recipe catalogue and disease rules
// ABOUTME: Supports bulk import (upsert, truncate) and catalogue reads for plan generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::collections::HashMap;

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::errors::{AppError, AppResult};
use crate::models::{DiseaseRule, Recipe, RecipeIngredient};

/// Recipe catalogue storage
#[derive(Clone)]
pub struct RecipesManager {
    pool: SqlitePool,
}

impl RecipesManager {
    /// Create a new manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace a recipe together with its ingredients
    ///
    /// # Errors
    ///
    /// Returns a database error if the transaction fails
    pub async fn upsert_recipe(&self, recipe: &Recipe) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO recipes (
                external_id, meal_name, meal_type, calories_per_serving,
                protein_g, fat_g, carbs_g, tags, allergens
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT(external_id) DO UPDATE SET
                meal_name = excluded.meal_name,
                meal_type = excluded.meal_type,
                calories_per_serving = excluded.calories_per_serving,
                protein_g = excluded.protein_g,
                fat_g = excluded.fat_g,
                carbs_g = excluded.carbs_g,
                tags = excluded.tags,
                allergens = excluded.allergens
            ",
        )
        .bind(&recipe.external_id)
        .bind(&recipe.meal_name)
        .bind(&recipe.meal_type)
        .bind(recipe.calories_per_serving)
        .bind(recipe.protein_g)
        .bind(recipe.fat_g)
        .bind(recipe.carbs_g)
        .bind(serde_json::to_string(&recipe.tags)?)
        .bind(serde_json::to_string(&recipe.allergens)?)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to store recipe: {e}")))?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(&recipe.external_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear recipe ingredients: {e}")))?;

        for (position, ingredient) in recipe.ingredients.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO recipe_ingredients (recipe_id, position, name, quantity, unit, raw)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(&recipe.external_id)
            .bind(position as i64)
            .bind(&ingredient.name)
            .bind(ingredient.quantity)
            .bind(&ingredient.unit)
            .bind(&ingredient.raw)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to store recipe ingredient: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe: {e}")))?;
        Ok(())
    }

    /// Remove every recipe and ingredient
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails
    pub async fn clear_recipes(&self) -> AppResult<u64> {
        sqlx::query("DELETE FROM recipe_ingredients")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear recipe ingredients: {e}")))?;
        let result = sqlx::query("DELETE FROM recipes")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear recipes: {e}")))?;
        Ok(result.rows_affected())
    }

    /// List the whole catalogue with ingredients
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails
    pub async fn list_recipes(&self) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query("SELECT * FROM recipes ORDER BY external_id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list recipes: {e}")))?;

        let mut ingredients = self.ingredients_by_recipe().await?;
        rows.iter()
            .map(|row| {
                let mut recipe = row_to_recipe(row)?;
                recipe.ingredients = ingredients.remove(&recipe.external_id).unwrap_or_default();
                Ok(recipe)
            })
            .collect()
    }

    /// Look up recipes by external id
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails
    pub async fn get_recipes(&self, ids: &[String]) -> AppResult<HashMap<String, Recipe>> {
        let mut found = HashMap::with_capacity(ids.len());
        for id in ids {
            if found.contains_key(id) {
                continue;
            }
            let row = sqlx::query("SELECT * FROM recipes WHERE external_id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to get recipe: {e}")))?;
            let Some(row) = row else { continue };

            let mut recipe = row_to_recipe(&row)?;
            recipe.ingredients = self.ingredients_for(id).await?;
            found.insert(id.clone(), recipe);
        }
        Ok(found)
    }

    /// Number of catalogued recipes
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn count_recipes(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count recipes: {e}")))
    }

    /// Insert or replace a disease rule
    ///
    /// # Errors
    ///
    /// Returns a database error if the upsert fails
    pub async fn upsert_disease_rule(&self, rule: &DiseaseRule) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO disease_rules (name, prohibited_tags) VALUES ($1, $2)
            ON CONFLICT(name) DO UPDATE SET prohibited_tags = excluded.prohibited_tags
            ",
        )
        .bind(&rule.name)
        .bind(serde_json::to_string(&rule.prohibited_tags)?)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to store disease rule: {e}")))?;
        Ok(())
    }

    /// List every disease rule
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn list_disease_rules(&self) -> AppResult<Vec<DiseaseRule>> {
        let rows = sqlx::query("SELECT name, prohibited_tags FROM disease_rules ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list disease rules: {e}")))?;

        rows.iter()
            .map(|row| {
                let tags_json: String = row.get("prohibited_tags");
                Ok(DiseaseRule {
                    name: row.get("name"),
                    prohibited_tags: serde_json::from_str(&tags_json)?,
                })
            })
            .collect()
    }

    async fn ingredients_for(&self, recipe_id: &str) -> AppResult<Vec<RecipeIngredient>> {
        let rows = sqlx::query(
            "SELECT * FROM recipe_ingredients WHERE recipe_id = $1 ORDER BY position",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load recipe ingredients: {e}")))?;

        Ok(rows.iter().map(row_to_ingredient).collect())
    }

    async fn ingredients_by_recipe(&self) -> AppResult<HashMap<String, Vec<RecipeIngredient>>> {
        let rows = sqlx::query("SELECT * FROM recipe_ingredients ORDER BY recipe_id, position")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load recipe ingredients: {e}")))?;

        let mut grouped: HashMap<String, Vec<RecipeIngredient>> = HashMap::new();
        for row in &rows {
            let recipe_id: String = row.get("recipe_id");
            grouped.entry(recipe_id).or_default().push(row_to_ingredient(row));
        }
        Ok(grouped)
    }
}

fn row_to_recipe(row: &SqliteRow) -> AppResult<Recipe> {
    let tags_json: String = row.get("tags");
    let allergens_json: String = row.get("allergens");

    Ok(Recipe {
        external_id: row.get("external_id"),
        meal_name: row.get("meal_name"),
        meal_type: row.get("meal_type"),
        calories_per_serving: row.get("calories_per_serving"),
        protein_g: row.get("protein_g"),
        fat_g: row.get("fat_g"),
        carbs_g: row.get("carbs_g"),
        tags: serde_json::from_str(&tags_json)?,
        allergens: serde_json::from_str(&allergens_json)?,
        ingredients: Vec::new(),
    })
}

fn row_to_ingredient(row: &SqliteRow) -> RecipeIngredient {
    RecipeIngredient {
        name: row.get("name"),
        quantity: row.get("quantity"),
        unit: row.get("unit"),
        raw: row.get("raw"),
    }
}
