// ABOUTME: HTTP tests for the patient directory routes
// ABOUTME: Covers create, list, get, delete, validation failures, and plan cascade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};
use uuid::Uuid;
use wavy_nutrition::server::build_router;

#[tokio::test]
async fn test_create_and_get_patient() {
    let resources = common::create_test_resources().await;
    let mut body = common::patient_json("Maria Lopez", 1800);
    body["medicalConditions"] = json!(["Type 2 Diabetes", "  "]);
    body["dietaryRestrictions"] = json!(["vegetarian", {"type": "low_sodium", "severity": "strict"}]);

    let created: Value = AxumTestRequest::post("/api/patients")
        .json(&body)
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(created["name"], "Maria Lopez");
    assert_eq!(created["calorieTarget"], 1800);
    assert_eq!(created["gender"], "female");
    assert_eq!(created["medicalConditions"], json!(["Type 2 Diabetes"]));
    assert_eq!(created["dietaryRestrictions"], json!(["vegetarian", "low_sodium"]));
    assert!(created["createdAt"].is_string());

    let id = created["id"].as_str().unwrap();
    let fetched: Value = AxumTestRequest::get(&format!("/api/patients/{id}"))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["weight"], 68.5);
}

#[tokio::test]
async fn test_list_patients() {
    let resources = common::create_test_resources().await;
    common::create_test_patient(&resources, common::patient_json("Ann", 1600)).await;
    common::create_test_patient(&resources, common::patient_json("Ben", 2200)).await;

    let patients: Vec<Value> = AxumTestRequest::get("/api/patients")
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(patients.len(), 2);
    let mut names: Vec<&str> = patients.iter().map(|p| p["name"].as_str().unwrap()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Ann", "Ben"]);
}

#[tokio::test]
async fn test_create_patient_validation() {
    let resources = common::create_test_resources().await;

    let blank = AxumTestRequest::post("/api/patients")
        .json(&common::patient_json("   ", 1800))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json::<Value>();
    assert_eq!(blank["code"], "INVALID_INPUT");
    assert_eq!(blank["message"], "name must not be empty");

    let low = AxumTestRequest::post("/api/patients")
        .json(&common::patient_json("Low", 300))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json::<Value>();
    assert_eq!(low["message"], "calorieTarget must be between 500 and 5000");

    let mut old = common::patient_json("Old", 1800);
    old["age"] = json!(151);
    AxumTestRequest::post("/api/patients")
        .json(&old)
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // Nothing was stored
    let patients: Vec<Value> = AxumTestRequest::get("/api/patients")
        .send(build_router(resources))
        .await
        .json();
    assert!(patients.is_empty());
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let resources = common::create_test_resources().await;

    for id in [Uuid::new_v4().to_string(), "not-a-uuid".to_owned()] {
        let error: Value = AxumTestRequest::get(&format!("/api/patients/{id}"))
            .send(build_router(resources.clone()))
            .await
            .assert_status(StatusCode::NOT_FOUND)
            .json();
        assert_eq!(error["code"], "RESOURCE_NOT_FOUND");
        assert_eq!(error["message"], "Patient not found");

        AxumTestRequest::delete(&format!("/api/patients/{id}"))
            .send(build_router(resources.clone()))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_delete_patient_removes_their_plans() {
    let resources = common::create_test_resources().await;
    let patient = common::create_test_patient(&resources, common::patient_json("Cara", 2000)).await;
    let other = common::create_test_patient(&resources, common::patient_json("Dev", 2000)).await;

    AxumTestRequest::post("/api/plans/generate")
        .json(&json!({
            "patientIds": [patient.id, other.id],
            "weekStart": "2025-01-06",
            "strategy": "rule_based",
        }))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::CREATED);

    let response = AxumTestRequest::delete(&format!("/api/patients/{}", patient.id))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert!(response.is_empty());

    AxumTestRequest::get(&format!("/api/patients/{}", patient.id))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let plans: Vec<Value> = AxumTestRequest::get("/api/plans")
        .send(build_router(resources))
        .await
        .json();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0]["patientId"], other.id.to_string());
}
