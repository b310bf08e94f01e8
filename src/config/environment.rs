// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses HOST/PORT, DATABASE_URL, ALLOWED_ORIGINS, and LLM provider variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::llm::{
    DEFAULT_MAX_TOKENS, DEFAULT_OPENAI_MODEL, DEFAULT_RETRY_ATTEMPTS, DEFAULT_TEMPERATURE,
};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite:./wavy_nutrition.db";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";
const DEFAULT_LOCAL_LLM_BASE_URL: &str = "http://localhost:11434/v1";
const DEFAULT_LOCAL_LLM_MODEL: &str = "qwen2.5:14b-instruct";

/// Environment type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for anything that is not an `sqlite:` URL
    pub fn parse_url(s: &str) -> Result<Self> {
        let Some(rest) = s.strip_prefix("sqlite:") else {
            bail!("Unsupported database URL '{s}': only sqlite: URLs are supported");
        };
        // Accept both sqlite:path and sqlite://path
        let path = rest.strip_prefix("//").unwrap_or(rest);
        match path {
            ":memory:" | "" => Ok(Self::Memory),
            _ => Ok(Self::SQLite {
                path: PathBuf::from(path),
            }),
        }
    }

    /// Connection string understood by sqlx
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".into(),
        }
    }

    /// Whether this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./wavy_nutrition.db"),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_connection_string())
    }
}

/// Which LLM backend serves plan generation and procurement insights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// `OpenAI` public API
    #[default]
    OpenAi,
    /// Azure `OpenAI` deployment
    Azure,
    /// Local `OpenAI`-compatible server (Ollama, vLLM, `LocalAI`)
    Local,
}

impl LlmProviderType {
    /// Parse from string with fallback to `OpenAI`
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "azure" | "azure_openai" | "azure-openai" => Self::Azure,
            "local" | "ollama" | "vllm" | "localai" => Self::Local,
            _ => Self::OpenAi,
        }
    }

    /// Identifier reported by the health endpoint
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Azure => "azure",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for LlmProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LLM provider credentials and request tuning
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    /// Selected provider
    pub provider: LlmProviderType,
    /// `OpenAI` API key
    pub openai_api_key: Option<String>,
    /// `OpenAI` model name
    pub openai_model: String,
    /// Azure resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub azure_endpoint: Option<String>,
    /// Azure API key
    pub azure_api_key: Option<String>,
    /// Azure deployment name
    pub azure_deployment: Option<String>,
    /// Base URL of a local `OpenAI`-compatible server
    pub local_base_url: String,
    /// Model served by the local server
    pub local_model: String,
    /// Completion token cap
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Attempts per LLM call, at least one
    pub retry_attempts: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProviderType::OpenAi,
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.into(),
            azure_endpoint: None,
            azure_api_key: None,
            azure_deployment: None,
            local_base_url: DEFAULT_LOCAL_LLM_BASE_URL.into(),
            local_model: DEFAULT_LOCAL_LLM_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        }
    }
}

impl LlmSettings {
    /// Load LLM settings from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            provider: LlmProviderType::from_str_or_default(&env_var_or("LLM_PROVIDER", "openai")),
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            openai_model: env_var_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            azure_endpoint: non_empty_env("AZURE_OPENAI_ENDPOINT"),
            azure_api_key: non_empty_env("AZURE_OPENAI_API_KEY"),
            azure_deployment: non_empty_env("AZURE_OPENAI_DEPLOYMENT"),
            local_base_url: env_var_or("LOCAL_LLM_BASE_URL", DEFAULT_LOCAL_LLM_BASE_URL),
            local_model: env_var_or("LOCAL_LLM_MODEL", DEFAULT_LOCAL_LLM_MODEL),
            max_tokens: parse_env_or("MAX_TOKENS", DEFAULT_MAX_TOKENS),
            temperature: parse_env_or("TEMPERATURE", DEFAULT_TEMPERATURE),
            retry_attempts: parse_env_or("LLM_RETRY_ATTEMPTS", DEFAULT_RETRY_ATTEMPTS).max(1),
        }
    }

    /// Whether the selected provider has the credentials it needs
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        match self.provider {
            LlmProviderType::OpenAi => self.openai_api_key.is_some(),
            LlmProviderType::Azure => {
                self.azure_endpoint.is_some()
                    && self.azure_api_key.is_some()
                    && self.azure_deployment.is_some()
            }
            LlmProviderType::Local => true,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Verbose error details and debug logging
    pub debug: bool,
    /// Deployment environment
    pub environment: Environment,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Origins allowed by CORS; `*` allows any
    pub allowed_origins: Vec<String>,
    /// LLM provider settings
    pub llm: LlmSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            debug: true,
            environment: Environment::Development,
            database_url: DatabaseUrl::default(),
            allowed_origins: parse_origins(DEFAULT_ALLOWED_ORIGINS),
            llm: LlmSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is not an `SQLite` URL
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            host: env_var_or("HOST", DEFAULT_HOST),
            port: parse_env_or("PORT", DEFAULT_PORT),
            debug: parse_env_or("DEBUG", true),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            database_url: DatabaseUrl::parse_url(&env_var_or(
                "DATABASE_URL",
                DEFAULT_DATABASE_URL,
            ))?,
            allowed_origins: parse_origins(&env_var_or("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS)),
            llm: LlmSettings::from_env(),
        };

        config.validate();
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Configuration for tests: in-memory database, no LLM credentials
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            environment: Environment::Testing,
            database_url: DatabaseUrl::Memory,
            ..Self::default()
        }
    }

    /// Log warnings for settings that will degrade functionality
    pub fn validate(&self) {
        if !self.llm.is_configured() {
            warn!(
                provider = %self.llm.provider,
                "LLM provider is not fully configured; llm plans fall back to rule-based \
                 generation and procurement insights are unavailable"
            );
        }
        if self.environment.is_production() && self.allowed_origins.iter().any(|o| o == "*") {
            warn!("ALLOWED_ORIGINS is '*' in production");
        }
    }

    /// Socket address string for binding
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "WAVY Nutrition Configuration:\n\
             - Bind: {}\n\
             - Environment: {}\n\
             - Database: {}\n\
             - CORS origins: {}\n\
             - LLM provider: {} ({})",
            self.bind_address(),
            self.environment,
            self.database_url,
            self.allowed_origins.join(", "),
            self.llm.provider,
            if self.llm.is_configured() {
                "configured"
            } else {
                "not configured"
            },
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, warning and falling back to `default` on bad input
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value '{raw}' for {key}, using default {default}");
            default
        }),
        Err(_) => default,
    }
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().trim_end_matches('/').to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("http://a.test/, http://b.test,,"),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn test_database_url_parsing() {
        assert_eq!(DatabaseUrl::parse_url("sqlite::memory:").unwrap(), DatabaseUrl::Memory);
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:///data/app.db").unwrap(),
            DatabaseUrl::SQLite {
                path: PathBuf::from("/data/app.db")
            }
        );
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:./wavy.db")
                .unwrap()
                .to_connection_string(),
            "sqlite:./wavy.db"
        );
        assert!(DatabaseUrl::parse_url("postgres://localhost/db").is_err());
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!(LlmProviderType::from_str_or_default("Azure"), LlmProviderType::Azure);
        assert_eq!(LlmProviderType::from_str_or_default("ollama"), LlmProviderType::Local);
        assert_eq!(LlmProviderType::from_str_or_default("???"), LlmProviderType::OpenAi);
    }

    #[test]
    fn test_llm_configured_requires_credentials() {
        let mut settings = LlmSettings::default();
        assert!(!settings.is_configured());
        settings.openai_api_key = Some("sk-test".into());
        assert!(settings.is_configured());

        settings.provider = LlmProviderType::Azure;
        settings.azure_endpoint = Some("https://x.openai.azure.com".into());
        assert!(!settings.is_configured());
    }
}
