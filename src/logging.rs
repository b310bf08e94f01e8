// ABOUTME: Logging configuration and structured logging setup for the planner service
// ABOUTME: Builds the tracing-subscriber registry with env filter and json/pretty/compact output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! Structured logging configuration

use std::env;
use std::fmt;
use std::io;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{
    fmt::{self as fmt_layer, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::constants::service::{SERVICE_ID, SERVICE_VERSION};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value, defaulting to pretty output
    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Pretty => f.write_str("pretty"),
            Self::Compact => f.write_str("compact"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Emit span open/close events
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_spans: false,
            service_name: SERVICE_ID.into(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        // Production defaults to JSON so log shippers can parse it
        let format = env::var("LOG_FORMAT").map_or(
            if is_production {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
            |v| LogFormat::from_str_or_default(&v),
        );

        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format,
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| SERVICE_ID.into()),
            environment,
        }
    }

    /// Build the filter: the configured level plus noise reduction for chatty dependencies
    fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::new(&self.level);
        for directive in [
            "hyper=warn",
            "hyper::proto=warn",
            "reqwest=warn",
            "sqlx=warn",
            "tower_http=info",
        ] {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }
        // Keep our application logs at the requested level unless RUST_LOG is a full directive
        if !self.level.contains('=') {
            if let Ok(parsed) = format!("wavy_nutrition={}", self.level).parse() {
                filter = filter.add_directive(parsed);
            }
        }
        filter
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        match self.format {
            LogFormat::Json => {
                let layer = fmt_layer::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(span_events)
                    .json();
                registry
                    .with(layer)
                    .try_init()
                    .context("Failed to install JSON tracing subscriber")?;
            }
            LogFormat::Pretty => {
                let layer = fmt_layer::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(span_events);
                registry
                    .with(layer)
                    .try_init()
                    .context("Failed to install tracing subscriber")?;
            }
            LogFormat::Compact => {
                let layer = fmt_layer::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stdout);
                registry
                    .with(layer)
                    .try_init()
                    .context("Failed to install compact tracing subscriber")?;
            }
        }

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        info!(
            service.name = %self.service_name,
            service.version = SERVICE_VERSION,
            environment = %self.environment,
            log.level = %self.level,
            log.format = %self.format,
            "Logging initialized"
        );

        let summary = json!({
            "service": { "name": self.service_name, "version": SERVICE_VERSION },
            "logging": {
                "level": self.level,
                "format": self.format.to_string(),
                "location": self.include_location,
                "spans": self.include_spans,
            }
        });
        info!("Logging configuration: {summary}");
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str_or_default("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str_or_default("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::from_str_or_default("anything"), LogFormat::Pretty);
    }

    #[test]
    fn test_filter_accepts_full_directive() {
        let config = LoggingConfig {
            level: "wavy_nutrition=debug,tower_http=debug".into(),
            ..LoggingConfig::default()
        };
        let rendered = config.env_filter().to_string();
        assert!(rendered.contains("wavy_nutrition=debug"));
    }
}
