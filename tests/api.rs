//! End-to-end tests over the HTTP surface, running the router against the
//! in-memory storage adapter.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use harvest_core::{
    config::Config,
    model::User,
    router,
    state::AppState,
    store::MemoryStore,
};

const DONOR_TOKEN: &str = "donor-token";
const RECIPIENT_TOKEN: &str = "recipient-token";

struct TestApp {
    app: Router,
    recipient_id: Uuid,
}

async fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());

    let donor = User {
        id: Uuid::new_v4(),
        name: "Morgan".to_string(),
        token: DONOR_TOKEN.to_string(),
    };
    let recipient = User {
        id: Uuid::new_v4(),
        name: "Sam".to_string(),
        token: RECIPIENT_TOKEN.to_string(),
    };
    let recipient_id = recipient.id;

    store.insert_user(donor).await;
    store.insert_user(recipient).await;

    let config = Config {
        port: 0,
        database_url: None,
    };
    let state = AppState::with_store(config, store);

    TestApp {
        app: router(state),
        recipient_id,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

fn donation_body() -> Value {
    json!({
        "title": "Surplus sandwiches",
        "description": "Left over from a catered event",
        "category": "Prepared",
        "quantity": 5,
        "unit": "boxes",
        "pickup_location": "12 Market St",
        "expiry_time": (Utc::now() + Duration::hours(6)).to_rfc3339(),
    })
}

async fn create_donation(app: &Router) -> Value {
    let (status, body) = send(app, post_json("/donations", Some(DONOR_TOKEN), donation_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    body["data"].clone()
}

#[tokio::test]
async fn health_reports_liveness() {
    let TestApp { app, .. } = test_app().await;

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_route_is_enveloped_404() {
    let TestApp { app, .. } = test_app().await;

    let (status, body) = send(&app, get("/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Route not found");
}

#[tokio::test]
async fn create_donation_requires_token() {
    let TestApp { app, .. } = test_app().await;

    let (status, body) = send(&app, post_json("/donations", None, donation_body())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        post_json("/donations", Some("who-is-this"), donation_body()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_donation_validates_required_fields() {
    let TestApp { app, .. } = test_app().await;

    let (status, body) = send(
        &app,
        post_json("/donations", Some(DONOR_TOKEN), json!({ "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title is required");

    let mut zero_quantity = donation_body();
    zero_quantity["quantity"] = json!(0);
    let (status, body) = send(&app, post_json("/donations", Some(DONOR_TOKEN), zero_quantity)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "quantity must be at least 1");
}

#[tokio::test]
async fn created_donation_shows_up_available() {
    let TestApp { app, .. } = test_app().await;

    let donation = create_donation(&app).await;
    assert_eq!(donation["status"], "available");

    let (status, body) = send(&app, get("/donations")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["id"], donation["id"]);
}

#[tokio::test]
async fn expired_donation_is_hidden() {
    let TestApp { app, .. } = test_app().await;

    let mut body = donation_body();
    body["expiry_time"] = json!((Utc::now() - Duration::hours(1)).to_rfc3339());
    let (status, _) = send(&app, post_json("/donations", Some(DONOR_TOKEN), body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, get("/donations")).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn claim_flow_defaults_quantity_and_hides_listing() {
    let TestApp { app, recipient_id } = test_app().await;

    let donation = create_donation(&app).await;
    let claim_uri = format!("/donations/{}/claim", donation["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        post_json(
            &claim_uri,
            Some(RECIPIENT_TOKEN),
            json!({ "claimer_id": recipient_id }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["requested_quantity"], 5);

    // Claimed listings drop out of the available view.
    let (_, body) = send(&app, get("/donations")).await;
    assert_eq!(body["count"], 0);

    let (_, body) = send(&app, get("/donations/stats")).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["claimed"], 1);
    assert_eq!(body["data"]["available"], 0);
}

#[tokio::test]
async fn claim_on_claimed_donation_is_conflict() {
    let TestApp { app, recipient_id } = test_app().await;

    let donation = create_donation(&app).await;
    let claim_uri = format!("/donations/{}/claim", donation["id"].as_str().unwrap());
    let claim = json!({ "claimer_id": recipient_id });

    let (status, _) = send(&app, post_json(&claim_uri, Some(RECIPIENT_TOKEN), claim.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, post_json(&claim_uri, Some(RECIPIENT_TOKEN), claim)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn claim_validates_claimer() {
    let TestApp { app, .. } = test_app().await;

    let donation = create_donation(&app).await;
    let claim_uri = format!("/donations/{}/claim", donation["id"].as_str().unwrap());

    let (status, body) = send(&app, post_json(&claim_uri, Some(RECIPIENT_TOKEN), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "claimer_id is required");

    let (status, body) = send(
        &app,
        post_json(
            &claim_uri,
            Some(RECIPIENT_TOKEN),
            json!({ "claimer_id": Uuid::new_v4() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Claimer not found");
}

#[tokio::test]
async fn claim_on_unknown_donation_is_not_found() {
    let TestApp { app, recipient_id } = test_app().await;

    let (status, body) = send(
        &app,
        post_json(
            &format!("/donations/{}/claim", Uuid::new_v4()),
            Some(RECIPIENT_TOKEN),
            json!({ "claimer_id": recipient_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Donation not found");

    // A malformed id behaves the same as an unknown one.
    let (status, _) = send(
        &app,
        post_json(
            "/donations/not-a-uuid/claim",
            Some(RECIPIENT_TOKEN),
            json!({ "claimer_id": recipient_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
