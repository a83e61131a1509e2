use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use thingbook::{AppState, InMemoryThingStore, Thing, ThingService, build_router};
use tower::ServiceExt;

fn app_with(rows: Vec<Thing>) -> axum::Router {
    let store = Arc::new(InMemoryThingStore::with_rows(rows));
    build_router(AppState::new(Arc::new(ThingService::new(store))))
}

fn app() -> axum::Router {
    app_with(vec![])
}

async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    payload: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match payload {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("response expected");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");

    if body.is_empty() {
        return (status, Value::Null);
    }

    let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
    (status, json)
}

#[tokio::test]
async fn save_new_thing_assigns_id() {
    let app = app();

    let (status, saved) = send(
        &app,
        Method::POST,
        "/thing/save",
        Some(json!({ "id": 0, "name": "Widget", "description": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let id = saved["id"].as_i64().expect("saved thing should have an id");
    assert!(id > 0);
    assert_eq!(saved["name"], "Widget");
    assert_eq!(saved["description"], "");

    let (status, fetched) = send(&app, Method::GET, &format!("/thing/getThing/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, saved);
}

#[tokio::test]
async fn save_with_colliding_name_is_rejected_and_writes_nothing() {
    let app = app_with(vec![Thing::new("widget", "").with_id(7)]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/thing/save",
        Some(json!({ "id": 0, "name": "Widget", "description": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_failed");

    let (_, listed) = send(&app, Method::GET, "/thing/getThings", None).await;
    assert_eq!(listed.as_array().expect("list should be an array").len(), 1);
}

#[tokio::test]
async fn update_keeping_own_name_succeeds() {
    let app = app_with(vec![Thing::new("Widget", "").with_id(7)]);

    let (status, saved) = send(
        &app,
        Method::POST,
        "/thing/save",
        Some(json!({ "id": 7, "name": "Widget", "description": "x" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved, json!({ "id": 7, "name": "Widget", "description": "x" }));
}

#[tokio::test]
async fn update_of_unknown_id_returns_null() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/thing/save",
        Some(json!({ "id": 41, "name": "Ghost" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn validate_name_excludes_own_row() {
    let app = app_with(vec![Thing::new("Widget", "").with_id(7)]);

    let (_, own) = send(
        &app,
        Method::POST,
        "/thing/validateName",
        Some(json!({ "id": 7, "name": "WIDGET" })),
    )
    .await;
    assert_eq!(own, json!(true));

    let (_, other) = send(
        &app,
        Method::POST,
        "/thing/validateName",
        Some(json!({ "id": 0, "name": "widget" })),
    )
    .await;
    assert_eq!(other, json!(false));
}

#[tokio::test]
async fn validate_requires_a_name() {
    let app = app();

    let (status, blank) = send(
        &app,
        Method::POST,
        "/thing/validate",
        Some(json!({ "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(blank, json!(false));

    let (_, named) = send(
        &app,
        Method::POST,
        "/thing/validate",
        Some(json!({ "name": "Widget" })),
    )
    .await;
    assert_eq!(named, json!(true));
}

#[tokio::test]
async fn list_is_ordered_by_id() {
    let app = app_with(vec![
        Thing::new("b", "").with_id(2),
        Thing::new("a", "").with_id(1),
    ]);

    let (status, listed) = send(&app, Method::GET, "/thing/getThings", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["id"], 1);
    assert_eq!(listed[1]["id"], 2);
}

#[tokio::test]
async fn get_unknown_thing_is_not_found() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/thing/getThing/99", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn remove_with_body_and_by_path() {
    let app = app_with(vec![
        Thing::new("a", "").with_id(1),
        Thing::new("b", "").with_id(2),
    ]);

    let (status, removed) = send(
        &app,
        Method::DELETE,
        "/thing/remove",
        Some(json!({ "id": 1, "name": "a", "description": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed, json!(1));

    let (status, removed) = send(&app, Method::DELETE, "/thing/remove/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed, json!(1));
}

#[tokio::test]
async fn remove_of_absent_id_is_zero_not_an_error() {
    let app = app();

    let (status, removed) = send(&app, Method::DELETE, "/thing/remove/12345", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed, json!(0));
}

#[tokio::test]
async fn healthcheck_is_available() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn save_after_id_sequence_is_exhausted_is_a_storage_error() {
    let app = app_with(vec![Thing::new("last", "").with_id(i32::MAX)]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/thing/save",
        Some(json!({ "id": 0, "name": "Widget", "description": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "storage_error");

    let (_, listed) = send(&app, Method::GET, "/thing/getThings", None).await;
    assert_eq!(listed.as_array().expect("list should be an array").len(), 1);
}
