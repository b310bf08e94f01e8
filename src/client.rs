// ABOUTME: Typed HTTP client for the planner REST API
// ABOUTME: Maps JSON responses to models and non-2xx responses to the server's message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! # API Client
//!
//! Thin wrapper over `reqwest`. Every request is sent once; failures carry
//! the server's `message` (or `detail`) field, falling back to a generic
//! "Request failed with status N".
//!
//! ```rust,no_run
//! use wavy_nutrition::client::ApiClient;
//!
//! # async fn example() -> Result<(), wavy_nutrition::client::ClientError> {
//! let client = ApiClient::new("http://localhost:8080")?;
//! for patient in client.list_patients().await? {
//!     println!("{} ({} kcal)", patient.name, patient.calorie_target);
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::export::ExportFormat;
use crate::models::{
    AggregatedIngredient, CategorizedShoppingList, CreatePatientPayload, GeneratePlansPayload,
    MealSuggestionsPayload, MealSuggestionsResponse, Patient, PlanSelectionPayload,
    ProcurementInsightsPayload, ProcurementInsightsResponse, WeeklyPlan,
};

const CLIENT_TIMEOUT: Duration = Duration::from_secs(300);

/// Errors surfaced by [`ApiClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL could not be parsed
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// Rejected URL
        url: String,
        /// Parser message
        reason: String,
    },
    /// The server answered with a non-2xx status
    #[error("{message}")]
    Api {
        /// HTTP status
        status: u16,
        /// Server message or generic fallback
        message: String,
    },
    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// A 2xx body did not match the expected shape
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// HTTP status for API errors
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Message for a failed response body: `message`, then `detail`, then a generic fallback
#[must_use]
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "detail"].iter().find_map(|key| {
                value
                    .get(key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_owned)
            })
        })
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

/// Typed client for the planner API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error when `base_url` is not an absolute http(s) URL
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "scheme must be http or https".to_owned(),
            });
        }

        let http = reqwest::Client::builder().timeout(CLIENT_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, %url, "API request");
        self.http.request(method, url)
    }

    async fn send(builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(status.as_u16(), &body),
        })
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = Self::send(builder).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        Self::json(self.request(Method::POST, path).json(body)).await
    }

    async fn download(builder: RequestBuilder) -> Result<Option<String>, ClientError> {
        let response = Self::send(builder).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(response.text().await?))
    }

    /// `GET /health`
    ///
    /// # Errors
    ///
    /// Returns transport, API, or decode errors
    pub async fn health(&self) -> Result<Value, ClientError> {
        Self::json(self.request(Method::GET, "/health")).await
    }

    /// `GET /api/patients`
    ///
    /// # Errors
    ///
    /// Returns transport, API, or decode errors
    pub async fn list_patients(&self) -> Result<Vec<Patient>, ClientError> {
        Self::json(self.request(Method::GET, "/api/patients")).await
    }

    /// `GET /api/patients/:id`
    ///
    /// # Errors
    ///
    /// Returns an API error with status 404 for unknown patients
    pub async fn get_patient(&self, id: &str) -> Result<Patient, ClientError> {
        Self::json(self.request(Method::GET, &format!("/api/patients/{id}"))).await
    }

    /// `POST /api/patients`
    ///
    /// # Errors
    ///
    /// Returns an API error with status 400 when validation fails
    pub async fn create_patient(&self, payload: &CreatePatientPayload) -> Result<Patient, ClientError> {
        self.post_json("/api/patients", payload).await
    }

    /// `DELETE /api/patients/:id`
    ///
    /// # Errors
    ///
    /// Returns an API error with status 404 for unknown patients
    pub async fn delete_patient(&self, id: &str) -> Result<(), ClientError> {
        Self::send(self.request(Method::DELETE, &format!("/api/patients/{id}"))).await?;
        Ok(())
    }

    /// `GET /api/plans`
    ///
    /// # Errors
    ///
    /// Returns transport, API, or decode errors
    pub async fn list_plans(&self) -> Result<Vec<WeeklyPlan>, ClientError> {
        Self::json(self.request(Method::GET, "/api/plans")).await
    }

    /// `GET /api/plans/:id`
    ///
    /// # Errors
    ///
    /// Returns an API error with status 404 for unknown plans
    pub async fn get_plan(&self, id: &str) -> Result<WeeklyPlan, ClientError> {
        Self::json(self.request(Method::GET, &format!("/api/plans/{id}"))).await
    }

    /// `POST /api/plans/generate`
    ///
    /// # Errors
    ///
    /// Returns 400 for an empty or malformed request and 404 for unknown patients
    pub async fn generate_plans(
        &self,
        payload: &GeneratePlansPayload,
    ) -> Result<Vec<WeeklyPlan>, ClientError> {
        self.post_json("/api/plans/generate", payload).await
    }

    /// `DELETE /api/plans/:id`
    ///
    /// # Errors
    ///
    /// Returns an API error with status 404 for unknown plans
    pub async fn delete_plan(&self, id: &str) -> Result<(), ClientError> {
        Self::send(self.request(Method::DELETE, &format!("/api/plans/{id}"))).await?;
        Ok(())
    }

    /// `GET /api/plans/:id/export`; `None` when there is nothing to export
    ///
    /// # Errors
    ///
    /// Returns an API error with status 404 for unknown plans
    pub async fn export_plan(
        &self,
        id: &str,
        format: ExportFormat,
    ) -> Result<Option<String>, ClientError> {
        let builder = self
            .request(Method::GET, &format!("/api/plans/{id}/export"))
            .query(&[("format", format.to_string())]);
        Self::download(builder).await
    }

    /// `POST /api/llm/procurement-insights`
    ///
    /// # Errors
    ///
    /// Returns 404 for unknown plans and 503 when no LLM is configured
    pub async fn procurement_insights(
        &self,
        plan_ids: Vec<String>,
        instructions: Option<String>,
    ) -> Result<ProcurementInsightsResponse, ClientError> {
        let payload = ProcurementInsightsPayload {
            plan_ids,
            instructions,
        };
        self.post_json("/api/llm/procurement-insights", &payload).await
    }

    /// `POST /api/llm/procurement-ingredients`
    ///
    /// # Errors
    ///
    /// Returns 404 for unknown plans
    pub async fn procurement_ingredients(
        &self,
        plan_ids: Vec<String>,
    ) -> Result<Vec<AggregatedIngredient>, ClientError> {
        self.post_json(
            "/api/llm/procurement-ingredients",
            &PlanSelectionPayload { plan_ids },
        )
        .await
    }

    /// `POST /api/llm/meal-suggestions`
    ///
    /// # Errors
    ///
    /// Returns 404 for unknown patients and 503 when no LLM is configured
    pub async fn meal_suggestions(
        &self,
        payload: &MealSuggestionsPayload,
    ) -> Result<MealSuggestionsResponse, ClientError> {
        self.post_json("/api/llm/meal-suggestions", payload).await
    }

    /// `POST /api/procurement/shopping-list`
    ///
    /// # Errors
    ///
    /// Returns 404 for unknown plans
    pub async fn shopping_list(
        &self,
        plan_ids: Vec<String>,
    ) -> Result<CategorizedShoppingList, ClientError> {
        self.post_json(
            "/api/procurement/shopping-list",
            &PlanSelectionPayload { plan_ids },
        )
        .await
    }

    /// `POST /api/procurement/shopping-list/export`; `None` when the list is empty
    ///
    /// # Errors
    ///
    /// Returns 404 for unknown plans
    pub async fn export_shopping_list(
        &self,
        plan_ids: Vec<String>,
        format: ExportFormat,
    ) -> Result<Option<String>, ClientError> {
        let builder = self
            .request(Method::POST, "/api/procurement/shopping-list/export")
            .query(&[("format", format.to_string())])
            .json(&PlanSelectionPayload { plan_ids });
        Self::download(builder).await
    }
}
