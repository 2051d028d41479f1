//! End-to-end connection queries against the sample schema

use async_graphql::dynamic::Schema;
use async_graphql::{Request, Response};
use orm_relay::demo::{Stores, build_schema};
use orm_relay::{ConnectionConfig, Dialect, encode_cursor, to_global_id};
use pretty_assertions::assert_eq;
use serde_json::{Value as JsonValue, json};

fn schema_with(config: ConnectionConfig) -> (Stores, Schema) {
    let stores = Stores::sample();
    let schema = build_schema(&stores, &config).unwrap();
    (stores, schema)
}

async fn execute(schema: &Schema, query: impl Into<String>) -> Response {
    schema.execute(Request::new(query)).await
}

async fn query_data(schema: &Schema, query: impl Into<String>) -> JsonValue {
    let response = execute(schema, query).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    response.data.into_json().unwrap()
}

fn error_code(response: &Response) -> Option<async_graphql::Value> {
    response
        .errors
        .first()
        .and_then(|err| err.extensions.as_ref())
        .and_then(|ext| ext.get("code"))
        .cloned()
}

#[tokio::test]
async fn test_first_page() {
    let (stores, schema) = schema_with(ConnectionConfig::default());
    let data = query_data(
        &schema,
        r#"{
            users(first: 2) {
                edges { cursor node { name } }
                pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                fullCount
            }
        }"#,
    )
    .await;

    let first = encode_cursor("1", 0).into_string();
    let second = encode_cursor("2", 1).into_string();
    assert_eq!(
        data,
        json!({
            "users": {
                "edges": [
                    { "cursor": first, "node": { "name": "Ada" } },
                    { "cursor": second, "node": { "name": "Grace" } },
                ],
                "pageInfo": {
                    "hasNextPage": true,
                    "hasPreviousPage": false,
                    "startCursor": first,
                    "endCursor": second,
                },
                "fullCount": 5,
            }
        })
    );
    assert_eq!(stores.users.fetch_calls(), 1);
    assert_eq!(stores.users.count_calls(), 1);
}

#[tokio::test]
async fn test_forward_paging_with_after() {
    let (_stores, schema) = schema_with(ConnectionConfig::default());
    let query = format!(
        r#"{{ users(first: 2, after: "{}") {{
            edges {{ node {{ name }} position }}
            pageInfo {{ hasNextPage hasPreviousPage }}
        }} }}"#,
        encode_cursor("2", 1)
    );
    let data = query_data(&schema, query).await;
    assert_eq!(
        data,
        json!({
            "users": {
                "edges": [
                    { "node": { "name": "Linus" }, "position": 2 },
                    { "node": { "name": "Barbara" }, "position": 3 },
                ],
                "pageInfo": { "hasNextPage": true, "hasPreviousPage": true },
            }
        })
    );
}

#[tokio::test]
async fn test_backward_paging_with_before() {
    let (_stores, schema) = schema_with(ConnectionConfig::default());
    let data = query_data(
        &schema,
        r#"{ users(last: 2) {
            edges { node { name } }
            pageInfo { hasNextPage hasPreviousPage startCursor }
        } }"#,
    )
    .await;
    assert_eq!(
        data["users"]["edges"],
        json!([{ "node": { "name": "Barbara" } }, { "node": { "name": "Ken" } }])
    );
    assert_eq!(data["users"]["pageInfo"]["hasNextPage"], json!(false));
    assert_eq!(data["users"]["pageInfo"]["hasPreviousPage"], json!(true));

    let start_cursor = data["users"]["pageInfo"]["startCursor"].as_str().unwrap().to_string();
    let query = format!(
        r#"{{ users(last: 2, before: "{}") {{ edges {{ node {{ name }} }} }} }}"#,
        start_cursor
    );
    let data = query_data(&schema, query).await;
    assert_eq!(
        data["users"]["edges"],
        json!([{ "node": { "name": "Grace" } }, { "node": { "name": "Linus" } }])
    );
}

#[tokio::test]
async fn test_named_order() {
    let (_stores, schema) = schema_with(ConnectionConfig::default());
    let data = query_data(
        &schema,
        r#"{ users(first: 3, orderBy: [NAME]) { edges { node { name } } } }"#,
    )
    .await;
    assert_eq!(
        data["users"]["edges"],
        json!([
            { "node": { "name": "Ada" } },
            { "node": { "name": "Barbara" } },
            { "node": { "name": "Grace" } },
        ])
    );
}

#[tokio::test]
async fn test_descriptor_selection_does_not_fetch() {
    let (stores, schema) = schema_with(ConnectionConfig::default());
    let data = query_data(
        &schema,
        r#"{ users(name: "Ada", first: 1) { appliedFilter } }"#,
    )
    .await;
    assert_eq!(data, json!({ "users": { "appliedFilter": r#"{"name":"Ada"}"# } }));
    assert_eq!(stores.users.fetch_calls(), 0);
    assert_eq!(stores.users.count_calls(), 0);
}

#[tokio::test]
async fn test_nested_association_connections() {
    let (stores, schema) = schema_with(ConnectionConfig::default());
    let data = query_data(
        &schema,
        r#"{
            projects(first: 1) {
                edges { node {
                    name
                    users(first: 10) { edges { node {
                        name
                        tasks(done: false, orderBy: [PRIORITY_DESC]) {
                            fullCount
                            edges { node { title priority } }
                        }
                    } } }
                } }
            }
        }"#,
    )
    .await;

    assert_eq!(
        data["projects"]["edges"][0]["node"],
        json!({
            "name": "Compiler",
            "users": { "edges": [
                { "node": { "name": "Ada", "tasks": {
                    "fullCount": 3,
                    "edges": [
                        { "node": { "title": "Type checker", "priority": 5 } },
                        { "node": { "title": "Code generation", "priority": 4 } },
                        { "node": { "title": "Optimizer", "priority": 1 } },
                    ],
                } } },
                { "node": { "name": "Grace", "tasks": {
                    "fullCount": 1,
                    "edges": [{ "node": { "title": "Debugger", "priority": 1 } }],
                } } },
                { "node": { "name": "Barbara", "tasks": { "fullCount": 0, "edges": [] } } },
            ] },
        })
    );
    assert_eq!(stores.user_tasks.fetch_calls(), 3);
    // Barbara has no open tasks: empty windows are never counted.
    assert_eq!(stores.user_tasks.count_calls(), 2);
}

#[tokio::test]
async fn test_filter_translation_and_global_ids() {
    let (_stores, schema) = schema_with(ConnectionConfig::default());
    let query = format!(
        r#"{{ node(id: "{}") {{
            id
            ... on User {{
                name
                tasks(first: 2, minPriority: 3) {{
                    fullCount
                    edges {{ node {{ title }} }}
                    pageInfo {{ hasNextPage }}
                }}
            }}
        }} }}"#,
        to_global_id("User", "1")
    );
    let data = query_data(&schema, query).await;
    assert_eq!(
        data,
        json!({
            "node": {
                "id": "VXNlcjox",
                "name": "Ada",
                "tasks": {
                    "fullCount": 3,
                    "edges": [
                        { "node": { "title": "Write parser" } },
                        { "node": { "title": "Type checker" } },
                    ],
                    "pageInfo": { "hasNextPage": true },
                },
            }
        })
    );
}

#[tokio::test]
async fn test_node_resolves_each_mapped_type() {
    let (_stores, schema) = schema_with(ConnectionConfig::default());
    let query = format!(
        r#"{{
            task: node(id: "{}") {{ __typename ... on Task {{ title priority }} }}
            project: node(id: "{}") {{ __typename id ... on Project {{ name }} }}
            missing: node(id: "{}") {{ id }}
            unmapped: node(id: "{}") {{ id }}
        }}"#,
        to_global_id("Task", "3"),
        to_global_id("Project", "2"),
        to_global_id("User", "99"),
        to_global_id("Invoice", "1"),
    );
    let data = query_data(&schema, query).await;
    assert_eq!(
        data,
        json!({
            "task": { "__typename": "Task", "title": "Type checker", "priority": 5 },
            "project": {
                "__typename": "Project",
                "id": to_global_id("Project", "2"),
                "name": "Website",
            },
            "missing": null,
            "unmapped": null,
        })
    );
}

#[tokio::test]
async fn test_node_rejects_invalid_global_id() {
    let (_stores, schema) = schema_with(ConnectionConfig::default());
    let response = execute(&schema, r#"{ node(id: "not a global id") { id } }"#).await;
    assert_eq!(response.errors.len(), 1);
}

#[tokio::test]
async fn test_extreme_cursor_indexes_are_handled() {
    let (_stores, schema) = schema_with(ConnectionConfig::default());
    for index in [i64::MAX, i64::MIN] {
        let query = format!(
            r#"{{ users(first: 2, after: "{}") {{ pageInfo {{ hasNextPage }} }} }}"#,
            encode_cursor("x", index)
        );
        let response = execute(&schema, query).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
    }
}

#[tokio::test]
async fn test_windowed_count_skips_count_query() {
    let (stores, schema) = schema_with(ConnectionConfig::default().with_dialect(Dialect::Postgres));
    let data = query_data(&schema, r#"{ users(first: 2) { fullCount } }"#).await;
    assert_eq!(data, json!({ "users": { "fullCount": 5 } }));
    assert_eq!(stores.users.fetch_calls(), 1);
    assert_eq!(stores.users.count_calls(), 0);
}

#[tokio::test]
async fn test_malformed_cursor_is_reported() {
    let (stores, schema) = schema_with(ConnectionConfig::default());
    let response = execute(
        &schema,
        r#"{ users(first: 1, after: "bm9wZQ==") { edges { cursor } } }"#,
    )
    .await;
    assert_eq!(error_code(&response), Some(async_graphql::Value::from("MALFORMED_CURSOR")));
    assert_eq!(stores.users.fetch_calls(), 0);
}

#[tokio::test]
async fn test_first_and_last_are_rejected() {
    let (_stores, schema) = schema_with(ConnectionConfig::default());
    let response = execute(&schema, r#"{ users(first: 1, last: 1) { fullCount } }"#).await;
    assert_eq!(error_code(&response), Some(async_graphql::Value::from("INVALID_ARGUMENTS")));
}

#[tokio::test]
async fn test_schema_exposes_connection_types() {
    let (_stores, schema) = schema_with(ConnectionConfig::default());
    let sdl = schema.sdl();
    assert!(sdl.contains("type UserConnection"));
    assert!(sdl.contains("type UserTasksEdge"));
    assert!(sdl.contains("enum UserTasksConnectionOrder"));
    assert_eq!(sdl.matches("type PageInfo").count(), 1);
    assert!(sdl.contains("interface Node"));
    assert!(sdl.contains("type User implements Node"));
}
