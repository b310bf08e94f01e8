// ABOUTME: HTTP tests for weekly plan generation, retrieval, deletion, and export
// ABOUTME: Exercises the rule-based planner and the LLM strategy with a scripted provider
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
use uuid::Uuid;
use wavy_nutrition::server::build_router;

fn generate_body(patient_ids: &[Uuid], strategy: &str) -> Value {
    json!({
        "patientIds": patient_ids,
        "weekStart": "2025-01-06",
        "strategy": strategy,
    })
}

/// Seven-day model reply with fully specified meals
fn llm_week_reply() -> String {
    let meal = |name: &str, calories: u32| {
        json!({
            "name": name,
            "description": "Prepared fresh",
            "ingredients": ["brown rice", "tofu", "spinach"],
            "nutrition": {"calories": calories, "protein": 20, "carbs": 40, "fat": 10},
            "preparationTime": 20,
            "difficulty": "easy",
        })
    };
    let days: Vec<Value> = (0..7)
        .map(|i| {
            json!({
                "date": "2030-12-31",
                "breakfast": meal(&format!("Breakfast {i}"), 400),
                "lunch": meal(&format!("Lunch {i}"), 600),
                "dinner": meal(&format!("Dinner {i}"), 700),
                "snacks": [meal("Fruit cup", 100)],
            })
        })
        .collect();
    json!({ "days": days }).to_string()
}

#[tokio::test]
async fn test_rule_based_generation() {
    let resources = common::create_test_resources().await;
    let patient = common::create_test_patient(&resources, common::patient_json("Ellen", 2000)).await;

    let plans: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
        .json(&generate_body(&[patient.id], "rule_based"))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(plans.len(), 1);
    let plan = &plans[0];
    assert_eq!(plan["patientId"], patient.id.to_string());
    assert_eq!(plan["patientName"], "Ellen");
    assert_eq!(plan["weekStart"], "2025-01-06");
    assert_eq!(plan["strategy"], "rule_based");

    let days = plan["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["date"], "2025-01-06");
    assert_eq!(days[6]["date"], "2025-01-12");
    assert_eq!(days[0]["breakfast"]["name"], "Greek Yogurt Parfait");
    assert_eq!(days[0]["lunch"]["name"], "Grilled Chicken Salad");
    assert_eq!(days[0]["dinner"]["name"], "Baked Salmon with Vegetables");
    assert_eq!(days[0]["breakfast"]["nutrition"]["calories"], 500);

    // Daily totals include snacks
    let mut week_total = 0;
    for day in days {
        let mut sum = 0;
        for slot in ["breakfast", "lunch", "dinner"] {
            sum += day[slot]["nutrition"]["calories"].as_u64().unwrap();
        }
        for snack in day["snacks"].as_array().unwrap() {
            sum += snack["nutrition"]["calories"].as_u64().unwrap();
        }
        assert_eq!(day["totalCalories"].as_u64().unwrap(), sum);
        week_total += sum;
    }

    let totals = &plan["weeklyTotals"];
    assert_eq!(totals["totalCalories"].as_u64().unwrap(), week_total);
    let avg = totals["avgDailyCalories"].as_f64().unwrap();
    assert!((avg - week_total as f64 / 7.0).abs() < 0.051);
    assert!(totals.get("tokenUsage").is_none());
}

#[tokio::test]
async fn test_generation_is_deterministic() {
    let resources = common::create_test_resources().await;
    let patient = common::create_test_patient(&resources, common::patient_json("Finn", 1900)).await;

    let mut runs = Vec::new();
    for _ in 0..2 {
        let plans: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
            .json(&generate_body(&[patient.id], "rule_based"))
            .send(build_router(resources.clone()))
            .await
            .assert_status(StatusCode::CREATED)
            .json();
        runs.push(plans[0]["days"].clone());
    }
    assert_eq!(runs[0], runs[1]);
}

#[tokio::test]
async fn test_regeneration_replaces_existing_plans() {
    let resources = common::create_test_resources().await;
    let patient = common::create_test_patient(&resources, common::patient_json("Gia", 1700)).await;

    let first: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
        .json(&generate_body(&[patient.id], "rule_based"))
        .send(build_router(resources.clone()))
        .await
        .json();
    let second: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
        .json(&generate_body(&[patient.id, patient.id], "rule_based"))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(second.len(), 1);

    let plans: Vec<Value> = AxumTestRequest::get(&format!("/api/plans?patientId={}", patient.id))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0]["id"], second[0]["id"]);

    let old_id = first[0]["id"].as_str().unwrap();
    AxumTestRequest::get(&format!("/api/plans/{old_id}"))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_request_errors() {
    let resources = common::create_test_resources().await;
    let patient = common::create_test_patient(&resources, common::patient_json("Hal", 2100)).await;

    let empty: Value = AxumTestRequest::post("/api/plans/generate")
        .json(&json!({"patientIds": []}))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(empty["code"], "INVALID_INPUT");

    let unknown: Value = AxumTestRequest::post("/api/plans/generate")
        .json(&generate_body(&[patient.id, Uuid::new_v4()], "rule_based"))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .json();
    assert_eq!(unknown["message"], "One or more patients not found");

    AxumTestRequest::post("/api/plans/generate")
        .json(&json!({"patientIds": [patient.id], "weekStart": "next monday"}))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // A failed request stores nothing
    let plans: Vec<Value> = AxumTestRequest::get("/api/plans")
        .send(build_router(resources))
        .await
        .json();
    assert!(plans.is_empty());
}

#[tokio::test]
async fn test_llm_generation_uses_model_reply() {
    let provider = Arc::new(ScriptedLlmProvider::new().reply(llm_week_reply()));
    let resources = common::create_test_resources_with_llm(provider.clone()).await;
    let mut body = common::patient_json("Iris", 1800);
    body["allergies"] = json!(["peanuts"]);
    let patient = common::create_test_patient(&resources, body).await;

    let plans: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
        .json(&generate_body(&[patient.id], "llm"))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    let plan = &plans[0];
    assert_eq!(plan["strategy"], "llm");
    let days = plan["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    // Dates come from the week start, not from the model
    assert_eq!(days[0]["date"], "2025-01-06");
    assert_eq!(days[3]["date"], "2025-01-09");
    assert_eq!(days[2]["lunch"]["name"], "Lunch 2");
    assert_eq!(days[0]["totalCalories"], 1800);
    assert_eq!(plan["weeklyTotals"]["totalCalories"], 12600);
    assert_eq!(plan["weeklyTotals"]["tokenUsage"]["totalTokens"], 200);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Iris"));
    assert!(prompts[0].contains("peanuts"));
}

#[tokio::test]
async fn test_llm_failure_falls_back_to_rule_based() {
    let provider = Arc::new(ScriptedLlmProvider::new().reply("I'm sorry, I can't help with that."));
    let resources = common::create_test_resources_with_llm(provider).await;
    let patient = common::create_test_patient(&resources, common::patient_json("Jon", 2000)).await;

    let plans: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
        .json(&generate_body(&[patient.id], "llm"))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    let plan = &plans[0];
    assert_eq!(plan["strategy"], "llm");
    assert_eq!(plan["days"][0]["breakfast"]["name"], "Greek Yogurt Parfait");
    assert!(plan["weeklyTotals"].get("tokenUsage").is_none());
}

#[tokio::test]
async fn test_llm_reply_with_absurd_calories_falls_back() {
    let reply = json!({
        "days": [{
            "breakfast": {"name": "Feast", "nutrition": {"calories": 4_294_967_295.0_f64}},
            "lunch": {"name": "Feast", "nutrition": {"calories": 4_294_967_295.0_f64}},
            "dinner": "Soup",
        }]
    });
    let provider = Arc::new(ScriptedLlmProvider::new().reply(reply.to_string()));
    let resources = common::create_test_resources_with_llm(provider).await;
    let patient = common::create_test_patient(&resources, common::patient_json("Gus", 2000)).await;

    let plans: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
        .json(&generate_body(&[patient.id], "llm"))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(plans[0]["strategy"], "llm");
    assert_eq!(plans[0]["days"][0]["breakfast"]["name"], "Greek Yogurt Parfait");
    assert!(plans[0]["weeklyTotals"]["totalCalories"].as_u64().unwrap() < 20_000);
}

#[tokio::test]
async fn test_llm_strategy_without_provider_uses_rule_based() {
    let resources = common::create_test_resources().await;
    let patient = common::create_test_patient(&resources, common::patient_json("Kai", 2000)).await;

    let plans: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
        .json(&generate_body(&[patient.id], "llm"))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(plans[0]["days"].as_array().unwrap().len(), 7);
    assert_eq!(plans[0]["days"][0]["breakfast"]["name"], "Greek Yogurt Parfait");
}

#[tokio::test]
async fn test_get_and_delete_plan() {
    let resources = common::create_test_resources().await;
    let patient = common::create_test_patient(&resources, common::patient_json("Lea", 1600)).await;
    let plans: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
        .json(&generate_body(&[patient.id], "rule_based"))
        .send(build_router(resources.clone()))
        .await
        .json();
    let id = plans[0]["id"].as_str().unwrap();

    let fetched: Value = AxumTestRequest::get(&format!("/api/plans/{id}"))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(fetched["id"], plans[0]["id"]);
    assert_eq!(fetched["days"], plans[0]["days"]);

    AxumTestRequest::delete(&format!("/api/plans/{id}"))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let error: Value = AxumTestRequest::delete(&format!("/api/plans/{id}"))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .json();
    assert_eq!(error["message"], "Plan not found");

    AxumTestRequest::get("/api/plans/garbage")
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_plan_text_and_csv() {
    let resources = common::create_test_resources().await;
    let patient = common::create_test_patient(&resources, common::patient_json("Mona Lisa", 2000)).await;
    let plans: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
        .json(&generate_body(&[patient.id], "rule_based"))
        .send(build_router(resources.clone()))
        .await
        .json();
    let id = plans[0]["id"].as_str().unwrap();

    let text = AxumTestRequest::get(&format!("/api/plans/{id}/export"))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(
        text.header(header::CONTENT_DISPOSITION.as_str()).unwrap(),
        "attachment; filename=\"meal-plan-Mona_Lisa-2025-01-06.txt\""
    );
    assert!(text
        .header(header::CONTENT_TYPE.as_str())
        .unwrap()
        .starts_with("text/plain"));
    let body = text.text();
    assert!(body.contains("Weekly Meal Plan: Mona Lisa"));
    assert!(body.contains("Greek Yogurt Parfait"));

    let csv = AxumTestRequest::get(&format!("/api/plans/{id}/export?format=csv"))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::OK);
    assert!(csv
        .header(header::CONTENT_TYPE.as_str())
        .unwrap()
        .starts_with("text/csv"));
    let body = csv.text();
    let mut lines = body.lines();
    assert!(lines.next().unwrap().starts_with("\"Patient\",\"Date\""));
    // Three meals and one snack per day
    assert_eq!(lines.count(), 28);

    AxumTestRequest::get(&format!("/api/plans/{id}/export?format=pdf"))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::get(&format!("/api/plans/{}/export", Uuid::new_v4()))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_filename_is_header_safe_for_any_patient_name() {
    let resources = common::create_test_resources().await;
    let quoted = common::create_test_patient(&resources, common::patient_json("O\"Brien", 2000)).await;
    let multiline = common::create_test_patient(&resources, common::patient_json("Line\nBreak", 2000)).await;
    let plans: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
        .json(&generate_body(&[quoted.id, multiline.id], "rule_based"))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    for plan in &plans {
        let id = plan["id"].as_str().unwrap();
        let expected = if plan["patientName"] == "O\"Brien" {
            "attachment; filename=\"meal-plan-OBrien-2025-01-06.csv\""
        } else {
            "attachment; filename=\"meal-plan-Line_Break-2025-01-06.csv\""
        };

        let csv = AxumTestRequest::get(&format!("/api/plans/{id}/export?format=csv"))
            .send(build_router(resources.clone()))
            .await
            .assert_status(StatusCode::OK);
        assert_eq!(csv.header(header::CONTENT_DISPOSITION.as_str()).unwrap(), expected);
    }

    let body = AxumTestRequest::get(&format!(
        "/api/plans/{}/export?format=csv",
        plans.iter().find(|p| p["patientName"] == "O\"Brien").unwrap()["id"].as_str().unwrap()
    ))
    .send(build_router(resources))
    .await
    .text();
    assert!(body.contains("\"O\"\"Brien\""));
}

#[tokio::test]
async fn test_meal_suggestions() {
    let reply = json!({
        "suggestions": [
            {"name": "Lentil Soup", "description": "Warm and filling", "ingredients": ["lentils", "carrots"],
             "nutrition": {"calories": 320, "protein": 18, "carbs": 45, "fat": 6}},
            "Vegetable Omelette",
            {"name": "Berry Smoothie", "nutrition": {"calories": 210.4}}
        ]
    });
    let provider = Arc::new(ScriptedLlmProvider::new().reply(reply.to_string()));
    let resources = common::create_test_resources_with_llm(provider.clone()).await;
    let patient = common::create_test_patient(&resources, common::patient_json("Ned", 1900)).await;

    let response: Value = AxumTestRequest::post("/api/llm/meal-suggestions")
        .json(&json!({"patientId": patient.id, "mealType": "lunch", "preferences": "warm food"}))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(response["patientId"], patient.id.to_string());
    let suggestions = response["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 3);
    assert_eq!(suggestions[0]["name"], "Lentil Soup");
    assert_eq!(suggestions[0]["nutrition"]["calories"], 320);
    assert_eq!(suggestions[1]["name"], "Vegetable Omelette");
    assert_eq!(suggestions[2]["nutrition"]["calories"], 210);
    assert_eq!(response["tokenUsage"]["promptTokens"], 120);

    let prompt = &provider.prompts()[0];
    assert!(prompt.contains("lunch"));
    assert!(prompt.contains("warm food"));
}

#[tokio::test]
async fn test_meal_suggestions_errors() {
    let resources = common::create_test_resources().await;
    let patient = common::create_test_patient(&resources, common::patient_json("Ola", 1900)).await;

    let unavailable: Value = AxumTestRequest::post("/api/llm/meal-suggestions")
        .json(&json!({"patientId": patient.id}))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE)
        .json();
    assert_eq!(unavailable["message"], "LLM provider is not configured");

    AxumTestRequest::post("/api/llm/meal-suggestions")
        .json(&json!({"patientId": Uuid::new_v4()}))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
