mod common;

use axum::http::StatusCode;
use common::TestApp;
use core_academy::domain::OrderFilter;
use serde_json::json;

#[tokio::test]
async fn wipe_is_admin_only() {
    let app = TestApp::new();
    let (_, token) = app.teacher("teacher@example.com").await;

    let (status, _) = app.post("/api/wipe", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.post("/api/wipe", None, json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wipe_replaces_data_with_seed() {
    let app = TestApp::new();
    let (admin, admin_token) = app.admin().await;
    let (_, token) = app.teacher("buyer@example.com").await;
    let stray = app.course("Stray", "12").await;
    app.post(
        "/api/orders",
        Some(&token),
        json!({ "courses": [stray.id], "paymentMethod": "credit_card" }),
    )
    .await;

    let (status, body) = app.post("/api/wipe", Some(&admin_token), json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Database wiped and reseeded successfully");
    assert_eq!(body["failedOrders"], 0);
    let seeded_orders = body["orders"].as_u64().unwrap();
    assert!(seeded_orders > 0);

    assert!(app.state.courses.find_by_id(stray.id).await.unwrap().is_none());
    assert!(app.state.users.find_by_id(admin.id).await.unwrap().is_none());
    assert_eq!(
        app.state.orders.find(&OrderFilter::all()).await.unwrap().len() as u64,
        seeded_orders
    );
    assert_eq!(
        app.state.users.count().await.unwrap() as u64,
        body["users"].as_u64().unwrap()
    );

    // The old admin no longer exists, so its token loses admin rights.
    let (status, _) = app.post("/api/wipe", Some(&admin_token), json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn seeded_admin_can_sign_in() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin().await;
    app.post("/api/wipe", Some(&admin_token), json!({})).await;

    let (status, session) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "admin@coreacademy.com", "password": "password123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["role"], "admin");

    let token = session["token"].as_str().unwrap();
    let (status, revenue) = app
        .get("/api/analytics/revenue-per-month", Some(token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!revenue["revenue"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn health_and_welcome() {
    let app = TestApp::new();

    let (status, health) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["db"], "connected");

    let (status, welcome) = app.get("/api/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(welcome["message"], "Welcome to Core Academy API");

    let (status, doc) = app.get("/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/orders"].is_object());
}
