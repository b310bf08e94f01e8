// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: In-memory database, server resources with or without a scripted LLM, and fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `wavy_nutrition`

use std::sync::{Arc, Once};
use std::time::Duration;

use serde_json::{json, Value};
use wavy_nutrition::{
    config::ServerConfig,
    database::Database,
    llm::{LlmClient, LlmProvider, RetryPolicy},
    models::{CreatePatientPayload, Patient},
    resources::ServerResources,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Fresh in-memory database with the schema applied
pub async fn create_test_database() -> Database {
    init_test_logging();
    let config = ServerConfig::for_testing();
    Database::new(&config.database_url).await.unwrap()
}

/// Server resources without an LLM provider
pub async fn create_test_resources() -> Arc<ServerResources> {
    let database = create_test_database().await;
    Arc::new(ServerResources::new(database, None, ServerConfig::for_testing()))
}

/// Server resources backed by `provider`, with a single attempt and no backoff
pub async fn create_test_resources_with_llm(provider: Arc<dyn LlmProvider>) -> Arc<ServerResources> {
    let database = create_test_database().await;
    let config = ServerConfig::for_testing();
    let client = LlmClient::new(provider, &config.llm).with_retry_policy(RetryPolicy {
        attempts: 1,
        base_delay: Duration::ZERO,
    });
    Arc::new(ServerResources::new(database, Some(client), config))
}

/// JSON body for a valid patient
pub fn patient_json(name: &str, calorie_target: u32) -> Value {
    json!({
        "name": name,
        "age": 54,
        "gender": "female",
        "weight": 68.5,
        "height": 165.0,
        "medicalConditions": [],
        "allergies": [],
        "dietaryRestrictions": [],
        "calorieTarget": calorie_target,
    })
}

/// Insert a patient directly through the database layer
pub async fn create_test_patient(resources: &ServerResources, body: Value) -> Patient {
    let payload: CreatePatientPayload = serde_json::from_value(body).unwrap();
    let patient = payload.into_patient().unwrap();
    resources.database.patients().create(&patient).await.unwrap();
    patient
}
