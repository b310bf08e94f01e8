// ABOUTME: Unified error type, error codes, and HTTP error response format
// ABOUTME: Every fallible operation in the planner returns AppResult<T>
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! # Unified Error Handling
//!
//! Centralised error codes and the `AppError` type shared by the database,
//! planning, procurement and HTTP layers. With the `http-response` feature
//! enabled, `AppError` converts directly into an axum response whose JSON
//! body always carries a human-readable `message`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes used throughout the application
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Request payload failed validation
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A required field is missing
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,
    /// A field could not be parsed
    #[serde(rename = "INVALID_FORMAT")]
    InvalidFormat = 3002,
    /// A numeric field is outside its accepted range
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3003,

    // Resource Management (4000-4999)
    /// Patient, plan or recipe does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// Unique constraint would be violated
    #[serde(rename = "RESOURCE_ALREADY_EXISTS")]
    ResourceAlreadyExists = 4001,

    // External Services (5000-5999)
    /// The LLM provider returned an error
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,
    /// No LLM provider is configured or reachable
    #[serde(rename = "EXTERNAL_SERVICE_UNAVAILABLE")]
    ExternalServiceUnavailable = 5001,
    /// The LLM provider rejected our credentials
    #[serde(rename = "EXTERNAL_AUTH_FAILED")]
    ExternalAuthFailed = 5002,
    /// The LLM provider rate limited us
    #[serde(rename = "EXTERNAL_RATE_LIMITED")]
    ExternalRateLimited = 5003,

    // Configuration (6000-6999)
    /// Generic configuration problem
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// A required setting is missing
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// SQLite operation failed
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// JSON (de)serialization failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput
            | Self::MissingRequiredField
            | Self::InvalidFormat
            | Self::ValueOutOfRange => 400,

            Self::ResourceNotFound => 404,

            Self::ResourceAlreadyExists => 409,

            Self::ExternalServiceError | Self::ExternalAuthFailed => 502,

            Self::ExternalServiceUnavailable | Self::ExternalRateLimited => 503,

            Self::InternalError
            | Self::DatabaseError
            | Self::SerializationError
            | Self::ConfigError
            | Self::ConfigMissing => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::InvalidFormat => "The data format is invalid",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceAlreadyExists => "A resource with this identifier already exists",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ExternalServiceUnavailable => "An external service is currently unavailable",
            Self::ExternalAuthFailed => "Authentication with external service failed",
            Self::ExternalRateLimited => "External service rate limit exceeded",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigMissing => "Required configuration is missing",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// True for codes that indicate a server-side fault rather than a bad request
    #[must_use]
    pub const fn is_server_error(self) -> bool {
        self.http_status() >= 500
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional structured details included in the response body
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details to the error
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Resource not found, rendered as "{resource} not found"
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Field value outside the accepted range
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValueOutOfRange, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// External service is not configured or not reachable
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalServiceUnavailable, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable message shown to API consumers
    pub message: String,
    /// Optional structured details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            code: error.code,
            message: error.message,
            details: error.details,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {error}"))
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::not_found("Record"),
            other => Self::database(format!("Database error: {other}")),
        }
    }
}

#[cfg(feature = "http-response")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = http::StatusCode::from_u16(self.http_status())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

        if self.code.is_server_error() {
            tracing::error!(code = ?self.code, "{}", self.message);
        } else {
            tracing::debug!(code = ?self.code, "{}", self.message);
        }

        (status, axum::Json(ErrorResponse::from(self))).into_response()
    }
}
