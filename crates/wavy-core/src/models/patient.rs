// ABOUTME: Patient record and creation payload with field validation
// ABOUTME: Dietary restrictions accept plain labels or {type, severity} objects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::constants::validation::{
    GENDERS, MAX_AGE, MAX_CALORIE_TARGET, MAX_NAME_LENGTH, MIN_CALORIE_TARGET,
};
use crate::errors::{AppError, AppResult};

/// Patient gender as recorded by the clinic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
    /// Other or undisclosed
    Other,
}

impl Gender {
    /// Database representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }

    /// Parse from a case-insensitive label
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for anything outside male/female/other
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            other => Err(AppError::invalid_input(format!(
                "gender must be one of {}, got '{other}'",
                GENDERS.join(", ")
            ))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dietary restriction such as "vegan" or "low-sodium"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RestrictionRepr")]
pub struct DietaryRestriction {
    /// Restriction label
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional severity such as "strict"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl DietaryRestriction {
    /// Restriction with no severity
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            severity: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RestrictionRepr {
    Label(String),
    Detailed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        severity: Option<String>,
    },
}

impl From<RestrictionRepr> for DietaryRestriction {
    fn from(repr: RestrictionRepr) -> Self {
        match repr {
            RestrictionRepr::Label(kind) => Self {
                kind,
                severity: None,
            },
            RestrictionRepr::Detailed { kind, severity } => Self { kind, severity },
        }
    }
}

fn serialize_restriction_labels<S>(
    restrictions: &[DietaryRestriction],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(restrictions.iter().map(|r| r.kind.as_str()))
}

/// A patient in the clinic directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Gender
    pub gender: Gender,
    /// Weight in kilograms
    #[serde(default)]
    pub weight: Option<f64>,
    /// Height in centimetres
    #[serde(default)]
    pub height: Option<f64>,
    /// Diagnosed conditions such as "diabetes" or "hypertension"
    #[serde(default)]
    pub medical_conditions: Vec<String>,
    /// Food allergies
    #[serde(default)]
    pub allergies: Vec<String>,
    /// Dietary restrictions; serialized as plain labels
    #[serde(default, serialize_with = "serialize_restriction_labels")]
    pub dietary_restrictions: Vec<DietaryRestriction>,
    /// Daily calorie target
    pub calorie_target: u32,
    /// Free-form macro targets, e.g. `{"protein": 150}`
    #[serde(default)]
    pub macro_targets: serde_json::Map<String, serde_json::Value>,
    /// Clinician notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Lowercased restriction labels
    #[must_use]
    pub fn restriction_labels(&self) -> Vec<String> {
        self.dietary_restrictions
            .iter()
            .map(|r| r.kind.to_lowercase())
            .collect()
    }

    /// Whether any restriction equals `label`, ignoring case
    #[must_use]
    pub fn has_restriction(&self, label: &str) -> bool {
        self.dietary_restrictions
            .iter()
            .any(|r| r.kind.eq_ignore_ascii_case(label))
    }

    /// Whether any medical condition equals one of `labels`, ignoring case
    #[must_use]
    pub fn has_condition(&self, labels: &[&str]) -> bool {
        self.medical_conditions
            .iter()
            .any(|c| labels.iter().any(|l| c.eq_ignore_ascii_case(l)))
    }
}

/// Body of `POST /api/patients`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientPayload {
    /// Display name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Gender label (male, female, other)
    pub gender: String,
    /// Weight in kilograms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Height in centimetres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Diagnosed conditions
    #[serde(default)]
    pub medical_conditions: Vec<String>,
    /// Food allergies
    #[serde(default)]
    pub allergies: Vec<String>,
    /// Dietary restrictions
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryRestriction>,
    /// Daily calorie target
    pub calorie_target: u32,
    /// Free-form macro targets
    #[serde(default)]
    pub macro_targets: serde_json::Map<String, serde_json::Value>,
    /// Clinician notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreatePatientPayload {
    /// Validate the payload and build a new patient record
    ///
    /// # Errors
    ///
    /// Returns an invalid-input or out-of-range error naming the offending field
    pub fn into_patient(self) -> AppResult<Patient> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(AppError::invalid_input("name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(AppError::invalid_input(format!(
                "name must be at most {MAX_NAME_LENGTH} characters"
            )));
        }
        if self.age > MAX_AGE {
            return Err(AppError::out_of_range(format!(
                "age must be between 0 and {MAX_AGE}"
            )));
        }
        if !(MIN_CALORIE_TARGET..=MAX_CALORIE_TARGET).contains(&self.calorie_target) {
            return Err(AppError::out_of_range(format!(
                "calorieTarget must be between {MIN_CALORIE_TARGET} and {MAX_CALORIE_TARGET}"
            )));
        }
        for (field, value) in [("weight", self.weight), ("height", self.height)] {
            if value.is_some_and(|v| !v.is_finite() || v <= 0.0) {
                return Err(AppError::out_of_range(format!(
                    "{field} must be a positive number"
                )));
            }
        }
        let gender = Gender::parse(&self.gender)?;

        let now = Utc::now();
        Ok(Patient {
            id: Uuid::new_v4(),
            name,
            age: self.age,
            gender,
            weight: self.weight,
            height: self.height,
            medical_conditions: clean_labels(self.medical_conditions),
            allergies: clean_labels(self.allergies),
            dietary_restrictions: self
                .dietary_restrictions
                .into_iter()
                .filter(|r| !r.kind.trim().is_empty())
                .collect(),
            calorie_target: self.calorie_target,
            macro_targets: self.macro_targets,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            created_at: now,
            updated_at: now,
        })
    }
}

fn clean_labels(labels: Vec<String>) -> Vec<String> {
    labels
        .into_iter()
        .map(|l| l.trim().to_owned())
        .filter(|l| !l.is_empty())
        .collect()
}
