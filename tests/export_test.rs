// ABOUTME: HTTP tests for shopping-list downloads in text and CSV
// ABOUTME: Checks attachment headers, document content, and the empty-list response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::sync::Arc;

use axum::http::{header, StatusCode};
use helpers::axum_test::AxumTestRequest;
use helpers::mock_llm::ScriptedLlmProvider;
use serde_json::{json, Value};
use wavy_nutrition::resources::ServerResources;
use wavy_nutrition::server::build_router;

async fn generate(resources: &Arc<ServerResources>, strategy: &str) -> String {
    let patient = common::create_test_patient(resources, common::patient_json("Yara", 2000)).await;
    let plans: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
        .json(&json!({"patientIds": [patient.id], "weekStart": "2025-01-06", "strategy": strategy}))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    plans[0]["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_shopping_list_text_export() {
    let resources = common::create_test_resources().await;
    let plan_id = generate(&resources, "rule_based").await;

    let response = AxumTestRequest::post("/api/procurement/shopping-list/export")
        .json(&json!({"planIds": [plan_id]}))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(
        response.header(header::CONTENT_DISPOSITION.as_str()).unwrap(),
        "attachment; filename=\"shopping-list.txt\""
    );
    let body = response.text();
    assert!(body.starts_with("Shopping List ("));
    assert!(body.contains("\nProteins\n"));
    assert!(body.contains("Condiments & Spices"));
    assert!(body.contains("  - olive oil: 8\n"));
}

#[tokio::test]
async fn test_shopping_list_csv_export() {
    let resources = common::create_test_resources().await;
    let plan_id = generate(&resources, "rule_based").await;

    let response = AxumTestRequest::post("/api/procurement/shopping-list/export?format=csv")
        .json(&json!({"planIds": [plan_id]}))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::OK);

    assert!(response
        .header(header::CONTENT_TYPE.as_str())
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION.as_str()).unwrap(),
        "attachment; filename=\"shopping-list.csv\""
    );
    let body = response.text();
    let mut lines = body.lines();
    assert_eq!(
        lines.next().unwrap(),
        "\"Category\",\"Ingredient\",\"Quantity\",\"Unit\""
    );
    assert!(body.contains("\"Condiments & Spices\",\"olive oil\",\"8\",\"\""));
}

#[tokio::test]
async fn test_empty_shopping_list_has_no_document() {
    // Bare meal names carry no ingredients
    let reply = json!({"days": vec![json!({"breakfast": "Porridge", "lunch": "Soup", "dinner": "Stew"}); 7]});
    let provider = Arc::new(ScriptedLlmProvider::new().reply(reply.to_string()));
    let resources = common::create_test_resources_with_llm(provider).await;
    let plan_id = generate(&resources, "llm").await;

    let list: Value = AxumTestRequest::post("/api/procurement/shopping-list")
        .json(&json!({"planIds": [plan_id.clone()]}))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(list["categories"], json!([]));

    let response = AxumTestRequest::post("/api/procurement/shopping-list/export?format=csv")
        .json(&json!({"planIds": [plan_id]}))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert!(response.is_empty());
}

#[tokio::test]
async fn test_unknown_export_format() {
    let resources = common::create_test_resources().await;
    let plan_id = generate(&resources, "rule_based").await;

    let error: Value = AxumTestRequest::post("/api/procurement/shopping-list/export?format=xlsx")
        .json(&json!({"planIds": [plan_id]}))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(error["code"], "INVALID_INPUT");
}
