// ABOUTME: CSV import of the recipe catalogue and disease rules
// ABOUTME: Includes a small RFC 4180 reader and the "Name: qty unit; ..." ingredient parser
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! # Catalogue Import
//!
//! Recipes come from a CSV with the columns `recipe_id`, `meal_name`,
//! `meal_type`, `calories_per_serving`, `protein_g`, `fat_g`, `carbs_g`,
//! `tags`, `allergens` and `ingredient_proportion`. List columns are
//! semicolon separated. Disease rules come from a CSV with `Disease` and
//! `Prohibited_Tags` columns.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::database::Database;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{DiseaseRule, Recipe, RecipeIngredient};

static INGREDIENT_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*([^:]+):\s*([\d.]+)\s*([a-zA-Z]+)").ok());

/// Parsed CSV document with a header row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Parse `text`; the first non-empty line is the header
    ///
    /// # Errors
    ///
    /// Returns an invalid-format error for an unterminated quoted field
    pub fn parse(text: &str) -> AppResult<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut records = read_records(text)?.into_iter();

        let headers = records
            .next()
            .map(|h| h.into_iter().map(|s| s.trim().to_owned()).collect())
            .unwrap_or_default();
        Ok(Self {
            headers,
            rows: records.collect(),
        })
    }

    /// Column names
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows keyed by header
    pub fn records(&self) -> impl Iterator<Item = CsvRecord<'_>> {
        self.rows.iter().map(|values| CsvRecord {
            headers: &self.headers,
            values,
        })
    }

    /// Number of data rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One data row of a [`CsvTable`]
#[derive(Debug, Clone, Copy)]
pub struct CsvRecord<'a> {
    headers: &'a [String],
    values: &'a [String],
}

impl<'a> CsvRecord<'a> {
    /// Trimmed value of `column`, `None` when absent or blank
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|h| h == column)?;
        self.values
            .get(index)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First non-blank value among `columns`
    #[must_use]
    pub fn get_any(&self, columns: &[&str]) -> Option<&'a str> {
        columns.iter().find_map(|c| self.get(c))
    }
}

fn finish_record(record: &mut Vec<String>, field: &mut String, records: &mut Vec<Vec<String>>) {
    record.push(std::mem::take(field));
    if record.iter().all(|f| f.trim().is_empty()) {
        record.clear();
    } else {
        records.push(std::mem::take(record));
    }
}

fn read_records(text: &str) -> AppResult<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => finish_record(&mut record, &mut field, &mut records),
            other => field.push(other),
        }
    }

    if in_quotes {
        return Err(AppError::new(
            ErrorCode::InvalidFormat,
            "CSV ends inside a quoted field",
        ));
    }
    if !field.is_empty() || !record.is_empty() {
        finish_record(&mut record, &mut field, &mut records);
    }
    Ok(records)
}

/// Split a semicolon list, treating blank and `none` as empty
#[must_use]
pub fn split_semicolon_list(value: Option<&str>) -> Vec<String> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Vec::new();
    };
    if value.eq_ignore_ascii_case("none") {
        return Vec::new();
    }
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse `"Chicken: 0.2 kg; Rice: 0.1 kg"` into ingredients
///
/// Parts that do not look like `name: quantity unit` are skipped.
#[must_use]
pub fn parse_ingredient_string(raw: &str) -> Vec<RecipeIngredient> {
    let Some(pattern) = INGREDIENT_PATTERN.as_ref() else {
        return Vec::new();
    };

    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let caps = pattern.captures(part)?;
            let quantity: f64 = caps.get(2)?.as_str().parse().ok()?;
            Some(RecipeIngredient {
                name: caps.get(1)?.as_str().trim().to_owned(),
                quantity,
                unit: caps.get(3)?.as_str().to_owned(),
                raw: part.to_owned(),
            })
        })
        .collect()
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.parse().ok())
}

/// Build a recipe from a catalogue row; rows without `recipe_id` yield `None`
#[must_use]
pub fn recipe_from_record(record: &CsvRecord<'_>) -> Option<Recipe> {
    let external_id = record.get("recipe_id")?;
    Some(Recipe {
        external_id: external_id.to_owned(),
        meal_name: record.get("meal_name").unwrap_or("Unnamed Recipe").to_owned(),
        meal_type: record.get("meal_type").map(str::to_owned),
        calories_per_serving: parse_number(record.get("calories_per_serving")),
        protein_g: parse_number(record.get("protein_g")),
        fat_g: parse_number(record.get("fat_g")),
        carbs_g: parse_number(record.get("carbs_g")),
        tags: split_semicolon_list(record.get("tags")),
        allergens: split_semicolon_list(record.get("allergens")),
        ingredients: record
            .get("ingredient_proportion")
            .map(parse_ingredient_string)
            .unwrap_or_default(),
    })
}

/// Build a disease rule from a row; tags are lowercased
#[must_use]
pub fn disease_rule_from_record(record: &CsvRecord<'_>) -> Option<DiseaseRule> {
    let name = record.get_any(&["Disease", "disease"])?;
    let prohibited_tags = split_semicolon_list(record.get_any(&["Prohibited_Tags", "prohibited_tags"]))
        .into_iter()
        .map(|t| t.to_lowercase())
        .collect();
    Some(DiseaseRule {
        name: name.to_owned(),
        prohibited_tags,
    })
}

/// Outcome of an import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows that created a new entry
    pub added: usize,
    /// Rows that replaced an existing entry
    pub updated: usize,
    /// Rows without an identifier
    pub skipped: usize,
}

/// Import recipes from CSV text, optionally clearing the catalogue first
///
/// # Errors
///
/// Returns a format error for malformed CSV and database errors from storage
pub async fn import_recipes(database: &Database, csv: &str, truncate: bool) -> AppResult<ImportSummary> {
    let table = CsvTable::parse(csv)?;
    let recipes = database.recipes();

    if truncate {
        let removed = recipes.clear_recipes().await?;
        info!(removed, "Cleared existing recipes");
    }

    let mut summary = ImportSummary::default();
    for record in table.records() {
        let Some(recipe) = recipe_from_record(&record) else {
            summary.skipped += 1;
            continue;
        };

        let exists = !recipes
            .get_recipes(std::slice::from_ref(&recipe.external_id))
            .await?
            .is_empty();
        recipes.upsert_recipe(&recipe).await?;
        debug!(recipe_id = %recipe.external_id, ingredients = recipe.ingredients.len(), "Imported recipe");

        if exists {
            summary.updated += 1;
        } else {
            summary.added += 1;
        }
    }

    info!(
        added = summary.added,
        updated = summary.updated,
        skipped = summary.skipped,
        "Recipe import complete"
    );
    Ok(summary)
}

/// Import disease rules from CSV text
///
/// # Errors
///
/// Returns a format error for malformed CSV and database errors from storage
pub async fn import_disease_rules(database: &Database, csv: &str) -> AppResult<ImportSummary> {
    let table = CsvTable::parse(csv)?;
    let recipes = database.recipes();
    let existing: Vec<String> = recipes
        .list_disease_rules()
        .await?
        .into_iter()
        .map(|r| r.name)
        .collect();

    let mut summary = ImportSummary::default();
    for record in table.records() {
        let Some(rule) = disease_rule_from_record(&record) else {
            summary.skipped += 1;
            continue;
        };
        recipes.upsert_disease_rule(&rule).await?;
        if existing.contains(&rule.name) {
            summary.updated += 1;
        } else {
            summary.added += 1;
        }
    }

    info!(
        added = summary.added,
        updated = summary.updated,
        skipped = summary.skipped,
        "Disease rule import complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_csv_handles_quotes_and_newlines() {
        let table = CsvTable::parse(
            "\u{feff}id,name,notes\r\n1,\"Soup, hot\",\"said \"\"yum\"\"\"\n\n2,Bread,\"two\nlines\"\n",
        )
        .unwrap();
        assert_eq!(table.headers(), ["id", "name", "notes"]);
        assert_eq!(table.len(), 2);

        let rows: Vec<_> = table.records().collect();
        assert_eq!(rows[0].get("name"), Some("Soup, hot"));
        assert_eq!(rows[0].get("notes"), Some("said \"yum\""));
        assert_eq!(rows[1].get("notes"), Some("two\nlines"));
        assert_eq!(rows[1].get("missing"), None);
    }

    #[test]
    fn test_csv_rejects_unterminated_quote() {
        assert!(CsvTable::parse("a,b\n\"open,1\n").is_err());
    }

    #[test]
    fn test_parse_ingredient_string_skips_bad_parts() {
        let parsed = parse_ingredient_string("Chicken breast: 0.2 kg; salt to taste; Rice:0.15kg;");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "Chicken breast");
        assert!((parsed[0].quantity - 0.2).abs() < f64::EPSILON);
        assert_eq!(parsed[0].unit, "kg");
        assert_eq!(parsed[1].raw, "Rice:0.15kg");
    }

    #[test]
    fn test_semicolon_lists() {
        assert!(split_semicolon_list(Some("None")).is_empty());
        assert!(split_semicolon_list(None).is_empty());
        assert_eq!(split_semicolon_list(Some("a; b ;;c")), ["a", "b", "c"]);
    }

    #[test]
    fn test_recipe_and_rule_rows() {
        let table = CsvTable::parse(
            "recipe_id,meal_name,meal_type,calories_per_serving,tags,allergens,ingredient_proportion\n\
             r_001,Congee,breakfast,320.5,soft;low_fat,none,Rice: 0.08 kg; Ginger: 5 g\n\
             ,Nameless,,,,,\n",
        )
        .unwrap();
        let rows: Vec<_> = table.records().collect();
        let recipe = recipe_from_record(&rows[0]).unwrap();
        assert_eq!(recipe.meal_type.as_deref(), Some("breakfast"));
        assert_eq!(recipe.calories_per_serving, Some(320.5));
        assert_eq!(recipe.tags, ["soft", "low_fat"]);
        assert!(recipe.allergens.is_empty());
        assert_eq!(recipe.ingredients.len(), 2);
        assert!(recipe_from_record(&rows[1]).is_none());

        let rules = CsvTable::parse("Disease,Prohibited_Tags\nDiabetes,High_Sugar; Fried\n").unwrap();
        let rule = disease_rule_from_record(&rules.records().next().unwrap()).unwrap();
        assert_eq!(rule.name, "Diabetes");
        assert_eq!(rule.prohibited_tags, ["high_sugar", "fried"]);
    }
}
