// ABOUTME: HTTP tests for ingredient aggregation, shopping lists, and procurement insights
// ABOUTME: Uses rule-based plans for mention counts and imported recipes for real quantities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use helpers::axum_test::AxumTestRequest;
use helpers::mock_llm::ScriptedLlmProvider;
use serde_json::{json, Value};
use uuid::Uuid;
use wavy_nutrition::import::import_recipes;
use wavy_nutrition::resources::ServerResources;
use wavy_nutrition::server::build_router;

const RECIPES_CSV: &str = "\
recipe_id,meal_name,meal_type,calories_per_serving,tags,allergens,ingredient_proportion
r1,Chicken Rice,lunch,500,high_protein,none,\"Chicken breast: 0.2 kg; Rice: 150 g\"
r2,Oat Bowl,breakfast,350,vegetarian,dairy,\"Oats: 80 g; Milk: 0.25 l\"
";

/// Generate a rule-based plan for a new patient and return the plan id
async fn rule_based_plan(resources: &Arc<ServerResources>, name: &str) -> String {
    let patient = common::create_test_patient(resources, common::patient_json(name, 2000)).await;
    let plans: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
        .json(&json!({
            "patientIds": [patient.id],
            "weekStart": "2025-01-06",
            "strategy": "rule_based",
        }))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    plans[0]["id"].as_str().unwrap().to_owned()
}

fn find<'a>(items: &'a [Value], name: &str) -> &'a Value {
    items
        .iter()
        .find(|i| i["name"] == name)
        .unwrap_or_else(|| panic!("{name} missing from {items:?}"))
}

#[tokio::test]
async fn test_ingredients_from_template_plan_count_mentions() {
    let resources = common::create_test_resources().await;
    let plan_id = rule_based_plan(&resources, "Pat").await;

    let items: Vec<Value> = AxumTestRequest::post("/api/llm/procurement-ingredients")
        .json(&json!({"planIds": [plan_id]}))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::OK)
        .json();

    // Olive oil is in three lunches and five dinners of the standard week
    assert_eq!(items[0]["name"], "olive oil");
    assert_eq!(items[0]["quantity"], 8.0);
    assert!(items[0].get("unit").is_none());

    let quantities: Vec<f64> = items.iter().map(|i| i["quantity"].as_f64().unwrap()).collect();
    assert!(quantities.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_shopping_list_groups_by_category() {
    let resources = common::create_test_resources().await;
    let plan_id = rule_based_plan(&resources, "Quinn").await;

    let list: Value = AxumTestRequest::post("/api/procurement/shopping-list")
        .json(&json!({"planIds": [plan_id.clone(), plan_id]}))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::OK)
        .json();

    let categories: Vec<&str> = list["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories.first(), Some(&"proteins"));
    assert!(categories.contains(&"condiments"));
    // Fixed order, no empty groups
    let order = [
        "proteins", "grains", "vegetables", "fruits", "dairy", "nuts", "condiments", "others",
    ];
    let positions: Vec<usize> = categories
        .iter()
        .map(|c| order.iter().position(|o| o == c).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let condiments = list["categories"]
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["category"] == "condiments")
        .unwrap();
    let items = condiments["items"].as_array().unwrap();
    // Duplicate plan ids count once
    assert_eq!(find(items, "olive oil")["quantity"], 8.0);
}

#[tokio::test]
async fn test_recipe_backed_meals_use_catalogue_quantities() {
    let reply = {
        let day = json!({
            "breakfast": {"name": "Oat Bowl", "recipe_id": "r2", "ingredients": ["oats", "milk"]},
            "lunch": {"name": "Chicken Rice", "recipeId": "r1", "portion": 1.5},
            "dinner": {"name": "Chicken Rice", "recipeId": "r1"},
        });
        json!({"days": vec![day; 7]}).to_string()
    };
    let provider = Arc::new(ScriptedLlmProvider::new().reply(reply));
    let resources = common::create_test_resources_with_llm(provider).await;
    let summary = import_recipes(&resources.database, RECIPES_CSV, false).await.unwrap();
    assert_eq!(summary.added, 2);

    let patient = common::create_test_patient(&resources, common::patient_json("Rae", 1800)).await;
    let plans: Vec<Value> = AxumTestRequest::post("/api/plans/generate")
        .json(&json!({"patientIds": [patient.id], "weekStart": "2025-01-06", "strategy": "llm"}))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(plans[0]["days"][0]["lunch"]["recipeId"], "r1");

    let items: Vec<Value> = AxumTestRequest::post("/api/llm/procurement-ingredients")
        .json(&json!({"planIds": [plans[0]["id"]]}))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(items.len(), 4);

    let chicken = find(&items, "Chicken breast");
    assert_eq!(chicken["unit"], "kg");
    assert!((chicken["quantity"].as_f64().unwrap() - 3.5).abs() < 1e-9);

    let rice = find(&items, "Rice");
    assert_eq!(rice["unit"], "kg");
    assert!((rice["quantity"].as_f64().unwrap() - 2.625).abs() < 1e-9);

    let oats = find(&items, "Oats");
    assert_eq!(oats["unit"], "g");
    assert!((oats["quantity"].as_f64().unwrap() - 560.0).abs() < 1e-9);

    let milk = find(&items, "Milk");
    assert_eq!(milk["unit"], "l");
    assert!((milk["quantity"].as_f64().unwrap() - 1.75).abs() < 1e-9);
}

#[tokio::test]
async fn test_plan_selection_errors() {
    let resources = common::create_test_resources().await;
    let plan_id = rule_based_plan(&resources, "Sam").await;

    let empty: Value = AxumTestRequest::post("/api/procurement/shopping-list")
        .json(&json!({"planIds": []}))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(empty["message"], "planIds must not be empty");

    for ids in [json!([plan_id, Uuid::new_v4()]), json!(["bogus"])] {
        let missing: Value = AxumTestRequest::post("/api/llm/procurement-ingredients")
            .json(&json!({"planIds": ids}))
            .send(build_router(resources.clone()))
            .await
            .assert_status(StatusCode::NOT_FOUND)
            .json();
        assert_eq!(missing["message"], "One or more plans not found");
    }
}

#[tokio::test]
async fn test_insights_require_llm() {
    let resources = common::create_test_resources().await;
    let plan_id = rule_based_plan(&resources, "Tess").await;

    let error: Value = AxumTestRequest::post("/api/llm/procurement-insights")
        .json(&json!({"planIds": [plan_id]}))
        .send(build_router(resources.clone()))
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE)
        .json();
    assert_eq!(error["message"], "LLM provider is not configured");

    // Plan validation comes first
    AxumTestRequest::post("/api/llm/procurement-insights")
        .json(&json!({"planIds": [Uuid::new_v4()]}))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_insights_from_llm() {
    let reply = json!({
        "summary": "### Summary\nTwo residents share a Mediterranean week.",
        "procurementNotes": [
            "- **Bulk purchasing:** Buy olive oil in 5 l tins.",
            "- **Storage:** Keep berries chilled.",
            42
        ]
    });
    let provider = Arc::new(ScriptedLlmProvider::new().reply(format!("```json\n{reply}\n```")));
    let resources = common::create_test_resources_with_llm(provider.clone()).await;
    let first = rule_based_plan(&resources, "Uma").await;
    let second = rule_based_plan(&resources, "Vic").await;

    let insights: Value = AxumTestRequest::post("/api/llm/procurement-insights")
        .json(&json!({"planIds": [first, second], "instructions": "Prefer local suppliers"}))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert!(insights["summary"].as_str().unwrap().starts_with("### Summary"));
    assert_eq!(insights["procurementNotes"].as_array().unwrap().len(), 2);
    assert!(insights["generatedAt"].is_string());
    assert_eq!(insights["tokenUsage"]["completionTokens"], 80);

    let prompt = &provider.prompts()[0];
    assert!(prompt.contains("Number of patients: 2"));
    assert!(prompt.contains("Uma"));
    assert!(prompt.contains("- olive oil: 16 times"));
    assert!(prompt.contains("Additional Instructions: Prefer local suppliers"));
}

#[tokio::test]
async fn test_insights_with_unparseable_reply() {
    let provider = Arc::new(ScriptedLlmProvider::new().reply("Here are some thoughts on your plans."));
    let resources = common::create_test_resources_with_llm(provider).await;
    let plan_id = rule_based_plan(&resources, "Wes").await;

    let error: Value = AxumTestRequest::post("/api/llm/procurement-insights")
        .json(&json!({"planIds": [plan_id]}))
        .send(build_router(resources))
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .json();
    assert_eq!(error["message"], "Failed to parse procurement insights from LLM");
}
