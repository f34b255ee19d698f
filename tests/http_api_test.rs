//! HTTP contract tests for the `/api` routes.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`
//! on top of the in-memory store.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use seat_board::broadcast::LiveEvent;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::seeded_state;

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn lists_days_in_id_order() {
    let app = seat_board::app(seeded_state().await);

    let (status, body) = call(&app, "GET", "/api/days", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "id": 1, "name": "Day 1" }, { "id": 2, "name": "Day 2" }]));
}

#[tokio::test]
async fn lists_seats_of_one_day() {
    let app = seat_board::app(seeded_state().await);

    let (status, body) = call(&app, "GET", "/api/seats/2", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "id": 3, "day_id": 2, "taken": false },
            { "id": 4, "day_id": 2, "taken": false }
        ])
    );

    let (_, empty) = call(&app, "GET", "/api/seats/42", None).await;
    assert_eq!(empty, json!([]));
}

#[tokio::test]
async fn booking_toggles_and_broadcasts() {
    let state = seeded_state().await;
    let mut observer = state.seats.broadcaster().subscribe();
    let app = seat_board::app(state.clone());

    // Day 1: seat 1 free, seat 2 taken
    state.seats.toggle_seat(1, 2).await.unwrap();
    observer.recv().await.unwrap();

    let (status, body) = call(&app, "POST", "/api/book/1/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "taken": true }));
    assert_eq!(
        observer.recv().await.unwrap().event,
        LiveEvent::SeatUpdated { id: 1, taken: true, day_id: 1 }
    );

    let (status, body) = call(&app, "POST", "/api/reset/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
    assert_eq!(observer.recv().await.unwrap().event, LiveEvent::SeatsReset { day_id: 1 });

    let (_, seats) = call(&app, "GET", "/api/seats/1", None).await;
    assert_eq!(
        seats,
        json!([
            { "id": 1, "day_id": 1, "taken": false },
            { "id": 2, "day_id": 1, "taken": false }
        ])
    );
}

#[tokio::test]
async fn booking_a_seat_of_another_day_is_404() {
    let app = seat_board::app(seeded_state().await);

    let (status, body) = call(&app, "POST", "/api/book/1/3", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Seat 3 not found for day 1" }));

    let (_, seats) = call(&app, "GET", "/api/seats/2", None).await;
    assert!(seats.as_array().unwrap().iter().all(|s| s["taken"] == false));
}

#[tokio::test]
async fn rename_day_accepts_any_string() {
    let app = seat_board::app(seeded_state().await);

    let (status, body) = call(&app, "POST", "/api/rename-day/2", Some(json!({ "name": "Matinee" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _) = call(&app, "POST", "/api/rename-day/1", Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::OK);

    // unknown id: accepted, nothing changes
    let (status, _) = call(&app, "POST", "/api/rename-day/77", Some(json!({ "name": "Ghost" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, days) = call(&app, "GET", "/api/days", None).await;
    assert_eq!(days, json!([{ "id": 1, "name": "" }, { "id": 2, "name": "Matinee" }]));
}

#[tokio::test]
async fn rename_day_without_name_is_rejected() {
    let app = seat_board::app(seeded_state().await);

    let (status, _) = call(&app, "POST", "/api/rename-day/1", Some(json!({}))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn non_numeric_ids_are_bad_requests() {
    let app = seat_board::app(seeded_state().await);

    let (status, _) = call(&app, "POST", "/api/book/one/two", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoint_answers() {
    let app = seat_board::app(seeded_state().await);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

async fn get_page(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn root_serves_the_browser_client() {
    let app = seat_board::app(seeded_state().await);

    let (status, page) = get_page(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<title>Seat Board</title>"));
    assert!(page.contains("get-seats"));
}

#[tokio::test]
async fn unknown_paths_fall_back_to_the_client() {
    let app = seat_board::app(seeded_state().await);

    let (status, page) = get_page(&app, "/day/3").await;

    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<title>Seat Board</title>"));

    // API routes are not shadowed
    let (status, body) = call(&app, "GET", "/api/days", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());
}
