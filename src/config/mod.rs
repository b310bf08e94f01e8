// ABOUTME: Configuration module root for the planner service
// ABOUTME: Environment-only configuration: server, database, CORS, and LLM settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

//! Environment-based configuration. There is no configuration file; every
//! setting comes from an environment variable with a documented default.

/// Environment variable parsing into typed settings
pub mod environment;

pub use environment::{DatabaseUrl, Environment, LlmProviderType, LlmSettings, ServerConfig};
