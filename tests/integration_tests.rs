use anyhow::Result;
use httpmock::prelude::*;
use meal_planner::{
    CompletionError, CompletionOptions, LocalStorage, MealPlan, MealPlanner, OpenAiClient,
    OpenAiConfig, PlannerError, Profile, RetryPolicy, Storage, RESULT_FILE_NAME,
};
use std::time::Duration;
use tempfile::TempDir;

fn menu_json() -> serde_json::Value {
    serde_json::json!({
        "breakfast": [
            {"food": "Oatmeal", "quantity": "80 g"},
            {"food": "Blueberries", "quantity": "100 g"}
        ],
        "morning_snack": [{"food": "Almonds", "quantity": "30 g"}],
        "lunch": [
            {"food": "Grilled chicken breast", "quantity": "150 g"},
            {"food": "Quinoa", "quantity": "120 g"}
        ],
        "afternoon_snack": [{"food": "Apple", "quantity": "1 medium"}],
        "dinner": [
            {"food": "Baked salmon", "quantity": "140 g"},
            {"food": "Steamed broccoli", "quantity": "200 g"}
        ],
        "evening_snack": [{"food": "Soy yogurt", "quantity": "125 g"}]
    })
}

fn grocery_json() -> serde_json::Value {
    serde_json::json!([
        {"food": "Rolled oats", "quantity": "80 g"},
        {"food": "Blueberries", "quantity": "100 g"},
        {"food": "Almonds", "quantity": "30 g"},
        {"food": "Chicken breast", "quantity": "150 g"},
        {"food": "Quinoa", "quantity": "120 g"},
        {"food": "Apple", "quantity": "1"},
        {"food": "Salmon fillet", "quantity": "140 g"},
        {"food": "Broccoli", "quantity": "200 g"},
        {"food": "Soy yogurt", "quantity": "125 g"}
    ])
}

fn chat_reply(content: String) -> serde_json::Value {
    serde_json::json!({
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn fenced(value: &serde_json::Value) -> String {
    format!("```json\n{}\n```", serde_json::to_string_pretty(value).unwrap())
}

fn client_for(server: &MockServer) -> OpenAiClient {
    let config = OpenAiConfig {
        base_url: server.base_url(),
        request_timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
        },
    };
    OpenAiClient::new("test-key", config).unwrap()
}

fn options(max_retries: u32) -> CompletionOptions {
    CompletionOptions {
        max_retries,
        ..CompletionOptions::default()
    }
}

#[tokio::test]
async fn test_end_to_end_meal_plan_with_real_http() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let menu_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_contains("generate a daily menu in English")
            .body_contains("Additional notes: No sugar");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(chat_reply(fenced(&menu_json())));
    });
    let grocery_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_contains("create a grocery list for your client in English")
            .body_contains("Grilled chicken breast");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(chat_reply(format!(
                "Here is your list:\n{}",
                fenced(&grocery_json())
            )));
    });

    let storage = LocalStorage::new(output_path.clone());
    let planner = MealPlanner::new(client_for(&server), storage.clone(), options(0));

    let plan = planner
        .run("English", &Profile::sample(), "No sugar")
        .await?;

    menu_mock.assert();
    grocery_mock.assert();

    assert_eq!(serde_json::to_value(&plan.menu)?, menu_json());
    assert_eq!(serde_json::to_value(&plan.grocery_list)?, grocery_json());

    let full_path = std::path::Path::new(&output_path).join(RESULT_FILE_NAME);
    assert!(full_path.exists());

    let from_disk: MealPlan = serde_json::from_slice(&storage.read_file(RESULT_FILE_NAME).await?)?;
    assert_eq!(from_disk, plan);

    let raw = std::fs::read_to_string(&full_path)?;
    assert!(raw.contains("\n  \"menu\": {"));
    assert!(raw.contains("\"grocery_list\": ["));
    Ok(())
}

#[tokio::test]
async fn test_malformed_menu_never_reaches_grocery_stage() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let menu_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_contains("generate a daily menu");
        let mut menu = menu_json();
        menu["breakfast"][0]
            .as_object_mut()
            .unwrap()
            .remove("quantity");
        then.status(200).json_body(chat_reply(menu.to_string()));
    });
    let grocery_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_contains("create a grocery list");
        then.status(200)
            .json_body(chat_reply(fenced(&grocery_json())));
    });

    let planner = MealPlanner::new(
        client_for(&server),
        LocalStorage::new(output_path.clone()),
        options(0),
    );
    let err = planner
        .run("English", &Profile::sample(), "No sugar")
        .await
        .unwrap_err();

    menu_mock.assert_hits(1);
    grocery_mock.assert_hits(0);
    match err {
        PlannerError::SchemaValidation { path, .. } => assert_eq!(path, "$.breakfast[0].quantity"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!std::path::Path::new(&output_path)
        .join(RESULT_FILE_NAME)
        .exists());
    Ok(())
}

#[tokio::test]
async fn test_grocery_retry_exhaustion_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let menu_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_contains("generate a daily menu");
        then.status(200).json_body(chat_reply(fenced(&menu_json())));
    });
    let grocery_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_contains("create a grocery list");
        then.status(429).json_body(serde_json::json!({
            "error": {"message": "Rate limit reached"}
        }));
    });

    let planner = MealPlanner::new(
        client_for(&server),
        LocalStorage::new(output_path.clone()),
        options(2),
    );
    let err = planner
        .run("English", &Profile::sample(), "No sugar")
        .await
        .unwrap_err();

    menu_mock.assert_hits(1);
    grocery_mock.assert_hits(3);
    assert!(matches!(
        err,
        PlannerError::Completion(CompletionError::RateLimited { attempts: 3 })
    ));
    assert!(!std::path::Path::new(&output_path)
        .join(RESULT_FILE_NAME)
        .exists());
    Ok(())
}
