//! The built-in tools, driven through `tools/list` and `tools/call`.

use crate::common::*;
use serde_json::json;

#[tokio::test]
async fn test_tools_list_describes_all_tools() {
    let ctx = TestContext::new();

    let response = ctx.rpc(1, "tools/list", json!({})).await;
    let tools = response.result.expect("tools/list succeeds")["tools"].clone();
    let tools = tools.as_array().unwrap();

    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["list_databases", "list_collections", "run_aggregation"]);

    for tool in tools {
        assert!(tool["description"].is_string(), "{}", tool["name"]);
        assert_eq!(tool["inputSchema"]["type"], "object", "{}", tool["name"]);
        assert_eq!(tool["annotations"]["readOnlyHint"], true, "{}", tool["name"]);
    }
    assert_eq!(
        tools[2]["inputSchema"]["required"],
        json!(["database", "collection", "pipeline"])
    );
}

#[tokio::test]
async fn test_list_databases() {
    let ctx = TestContext::with_shop();

    let databases = assert_success(&ctx.call("list_databases", json!({})).await, "list_databases");

    let names: Vec<&str> = databases
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["shop", "analytics"]);
    assert_eq!(databases[0]["sizeOnDisk"], 8192);
}

#[tokio::test]
async fn test_list_databases_accepts_missing_arguments() {
    let ctx = TestContext::with_shop();

    let response = ctx
        .rpc(1, "tools/call", json!({ "name": "list_databases" }))
        .await;

    let result = response.result.expect("tool call is a result");
    assert!(result.get("isError").is_none());
}

#[tokio::test]
async fn test_list_collections_returns_names_in_order() {
    let ctx = TestContext::with_shop();

    let response = ctx
        .call("list_collections", json!({ "database": "shop" }))
        .await;

    assert_eq!(
        response.first_text(),
        Some("[\n  \"orders\",\n  \"users\"\n]")
    );
    assert!(!response.is_error());
}

#[tokio::test]
async fn test_list_collections_of_unknown_database_is_empty() {
    let ctx = TestContext::with_shop();

    let response = ctx
        .call("list_collections", json!({ "database": "nowhere" }))
        .await;

    assert_eq!(assert_success(&response, "unknown database"), json!([]));
}

#[tokio::test]
async fn test_run_aggregation_match() {
    let ctx = TestContext::with_shop();

    let response = ctx
        .call(
            "run_aggregation",
            json!({
                "database": "shop",
                "collection": "orders",
                "pipeline": [{ "$match": { "status": "paid" } }]
            }),
        )
        .await;

    let documents = assert_success(&response, "$match");
    assert_eq!(
        documents,
        json!([
            { "_id": 1, "customer": "ada", "status": "paid", "amount": 40 },
            { "_id": 3, "customer": "ada", "status": "paid", "amount": 25 }
        ])
    );
    // Pretty-printed with two-space indentation.
    assert!(response.first_text().unwrap().starts_with("[\n  {\n    \"_id\": 1,"));
}

#[tokio::test]
async fn test_missing_required_argument() {
    let ctx = TestContext::with_shop();

    let response = ctx
        .call(
            "run_aggregation",
            json!({ "database": "shop", "pipeline": [] }),
        )
        .await;

    let text = assert_failure(&response, "missing collection");
    assert!(text.starts_with("Error: Invalid arguments for tool run_aggregation: collection"));
    assert_eq!(ctx.db.connect_calls(), 0);
}

#[tokio::test]
async fn test_empty_database_name_is_rejected() {
    let ctx = TestContext::with_shop();

    let response = ctx
        .call("list_collections", json!({ "database": "" }))
        .await;

    let text = assert_failure(&response, "empty database");
    assert!(text.contains("list_collections: database"), "{}", text);
    assert_eq!(ctx.db.connect_calls(), 0);
}

#[tokio::test]
async fn test_pipeline_must_be_array_of_objects() {
    let ctx = TestContext::with_shop();

    let response = ctx
        .call(
            "run_aggregation",
            json!({ "database": "shop", "collection": "orders", "pipeline": ["$match"] }),
        )
        .await;

    let text = assert_failure(&response, "string stage");
    assert!(text.contains("run_aggregation: pipeline"), "{}", text);
}

#[tokio::test]
async fn test_extra_arguments_are_ignored() {
    let ctx = TestContext::with_shop();

    let response = ctx
        .call(
            "list_collections",
            json!({ "database": "shop", "verbose": true }),
        )
        .await;

    assert_eq!(assert_success(&response, "extra"), json!(["orders", "users"]));
}

#[tokio::test]
async fn test_unknown_tool() {
    let ctx = TestContext::with_shop();

    let response = ctx.call("drop_database", json!({ "database": "shop" })).await;

    assert_eq!(
        assert_failure(&response, "unknown tool"),
        "Error: Unknown tool: drop_database"
    );
    assert_eq!(ctx.db.connect_calls(), 0);
}
