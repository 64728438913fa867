mod common;

use axum::http::StatusCode;
use common::{amount, decimal, TestApp};
use core_academy::domain::OrderFilter;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn create_order_prices_from_catalog() {
    let app = TestApp::new();
    let (teacher, token) = app.teacher("buyer@example.com").await;
    let a = app.course("Course A", "50").await;
    let b = app.course("Course B", "30").await;

    let (status, body) = app
        .post(
            "/api/orders",
            Some(&token),
            json!({ "courses": [a.id, b.id], "paymentMethod": "credit_card" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(amount(&body["totalPrice"]), decimal("80"));
    assert_eq!(body["status"], "pending");
    assert_eq!(body["paymentStatus"], "pending");
    assert_eq!(body["paymentMethod"], "credit_card");
    assert_eq!(body["user"], teacher.id.to_string());
    assert!(body["completedAt"].is_null());
}

#[tokio::test]
async fn create_order_with_unknown_course_fails() {
    let app = TestApp::new();
    let (_, token) = app.teacher("buyer@example.com").await;
    let a = app.course("Course A", "50").await;

    let (status, _) = app
        .post(
            "/api/orders",
            Some(&token),
            json!({ "courses": [a.id, Uuid::new_v4()], "paymentMethod": "credit_card" }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let stored = app.state.orders.find(&OrderFilter::all()).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn create_order_rejects_empty_courses_and_missing_payment() {
    let app = TestApp::new();
    let (_, token) = app.teacher("buyer@example.com").await;
    let a = app.course("Course A", "50").await;

    let (status, body) = app
        .post(
            "/api/orders",
            Some(&token),
            json!({ "courses": [], "paymentMethod": "credit_card" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, _) = app
        .post("/api/orders", Some(&token), json!({ "courses": [a.id] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let stored = app.state.orders.find(&OrderFilter::all()).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn create_order_requires_token() {
    let app = TestApp::new();
    let a = app.course("Course A", "50").await;

    let (status, _) = app
        .post(
            "/api/orders",
            None,
            json!({ "courses": [a.id], "paymentMethod": "credit_card" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/api/orders",
            Some("not-a-jwt"),
            json!({ "courses": [a.id], "paymentMethod": "credit_card" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn completing_twice_keeps_completed_at() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin().await;
    let (_, token) = app.teacher("buyer@example.com").await;
    let a = app.course("Course A", "50").await;

    let (_, created) = app
        .post(
            "/api/orders",
            Some(&token),
            json!({ "courses": [a.id], "paymentMethod": "credit_card" }),
        )
        .await;
    let uri = format!("/api/orders/{}", created["id"].as_str().unwrap());

    let (status, first) = app
        .put(&uri, Some(&admin_token), json!({ "status": "completed" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(first["completedAt"].is_string());
    assert!(first["cancelledAt"].is_null());

    let (status, second) = app
        .put(&uri, Some(&admin_token), json!({ "status": "completed" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["completedAt"], first["completedAt"]);
}

#[tokio::test]
async fn update_reprices_changed_courses() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin().await;
    let (_, token) = app.teacher("buyer@example.com").await;
    let a = app.course("Course A", "50").await;
    let b = app.course("Course B", "30").await;

    let (_, created) = app
        .post(
            "/api/orders",
            Some(&token),
            json!({ "courses": [a.id], "paymentMethod": "credit_card" }),
        )
        .await;
    let uri = format!("/api/orders/{}", created["id"].as_str().unwrap());

    let (status, updated) = app
        .put(&uri, Some(&admin_token), json!({ "courses": [a.id, b.id, b.id] }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&updated["totalPrice"]), decimal("110"));
    assert_eq!(updated["courses"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn update_rejects_invalid_status_and_unknown_order() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin().await;
    let (_, token) = app.teacher("buyer@example.com").await;
    let a = app.course("Course A", "50").await;

    let (_, created) = app
        .post(
            "/api/orders",
            Some(&token),
            json!({ "courses": [a.id], "paymentMethod": "credit_card" }),
        )
        .await;
    let uri = format!("/api/orders/{}", created["id"].as_str().unwrap());

    let (status, _) = app
        .put(&uri, Some(&admin_token), json!({ "status": "invalid-status" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(
            &format!("/api/orders/{}", Uuid::new_v4()),
            Some(&admin_token),
            json!({ "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found: Order not found");
}

#[tokio::test]
async fn only_admins_update_orders() {
    let app = TestApp::new();
    let (_, token) = app.teacher("buyer@example.com").await;
    let a = app.course("Course A", "50").await;

    let (_, created) = app
        .post(
            "/api/orders",
            Some(&token),
            json!({ "courses": [a.id], "paymentMethod": "credit_card" }),
        )
        .await;
    let uri = format!("/api/orders/{}", created["id"].as_str().unwrap());

    let (status, _) = app
        .put(&uri, Some(&token), json!({ "status": "completed" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn orders_are_visible_to_owner_and_admin_only() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin().await;
    let (_, owner_token) = app.teacher("owner@example.com").await;
    let (_, other_token) = app.teacher("other@example.com").await;
    let a = app.course("Course A", "50").await;

    let (_, created) = app
        .post(
            "/api/orders",
            Some(&owner_token),
            json!({ "courses": [a.id], "paymentMethod": "paypal", "notes": "  for class  " }),
        )
        .await;
    assert_eq!(created["notes"], "for class");
    let uri = format!("/api/orders/{}", created["id"].as_str().unwrap());

    let (status, _) = app.get(&uri, Some(&owner_token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&uri, Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&uri, Some(&other_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, mine) = app.get("/api/orders/my-orders", Some(&owner_token)).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let (_, theirs) = app.get("/api/orders/my-orders", Some(&other_token)).await;
    assert!(theirs.as_array().unwrap().is_empty());

    let (status, _) = app.get("/api/orders", Some(&owner_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, all) = app.get("/api/orders", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cancelling_leaves_completed_at_unset() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin().await;
    let (_, token) = app.teacher("buyer@example.com").await;
    let a = app.course("Course A", "50").await;

    let (_, created) = app
        .post(
            "/api/orders",
            Some(&token),
            json!({ "courses": [a.id], "paymentMethod": "credit_card" }),
        )
        .await;
    let uri = format!("/api/orders/{}", created["id"].as_str().unwrap());

    let (_, cancelled) = app
        .put(
            &uri,
            Some(&admin_token),
            json!({ "status": "cancelled", "paymentStatus": "failed" }),
        )
        .await;

    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["paymentStatus"], "failed");
    assert!(cancelled["cancelledAt"].is_string());
    assert!(cancelled["completedAt"].is_null());
}

#[tokio::test]
async fn listings_embed_course_title_and_price() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin().await;
    let (_, token) = app.teacher("buyer@example.com").await;
    let a = app.course("Algebra", "49.99").await;
    let b = app.course("Biology", "39.99").await;

    app.post(
        "/api/orders",
        Some(&token),
        json!({ "courses": [a.id, b.id, a.id], "paymentMethod": "credit_card" }),
    )
    .await;

    let (status, mine) = app.get("/api/orders/my-orders", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let courses = mine[0]["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 3);
    assert_eq!(courses[0]["id"], a.id.to_string());
    assert_eq!(courses[0]["title"], "Algebra");
    assert_eq!(amount(&courses[0]["price"]), decimal("49.99"));
    assert_eq!(courses[1]["title"], "Biology");
    assert_eq!(courses[2]["title"], "Algebra");

    let (status, all) = app.get("/api/orders", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all[0]["courses"][1]["title"], "Biology");
    assert_eq!(amount(&all[0]["courses"][1]["price"]), decimal("39.99"));
}

#[tokio::test]
async fn listings_keep_deleted_courses_as_bare_ids() {
    let app = TestApp::new();
    let (_, token) = app.teacher("buyer@example.com").await;
    let a = app.course("Algebra", "49.99").await;
    let b = app.course("Biology", "39.99").await;

    app.post(
        "/api/orders",
        Some(&token),
        json!({ "courses": [a.id, b.id], "paymentMethod": "credit_card" }),
    )
    .await;
    app.state.courses.delete(b.id).await.unwrap();

    let (_, mine) = app.get("/api/orders/my-orders", Some(&token)).await;
    let removed = &mine[0]["courses"][1];
    assert_eq!(removed["id"], b.id.to_string());
    assert!(removed.get("title").is_none());
    assert!(removed.get("price").is_none());
    assert_eq!(amount(&mine[0]["totalPrice"]), decimal("89.98"));
}

#[tokio::test]
async fn malformed_input_gets_json_bad_request() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin().await;
    let (_, token) = app.teacher("buyer@example.com").await;

    let (status, body) = app
        .post(
            "/api/orders",
            Some(&token),
            json!({ "courses": ["not-a-uuid"], "paymentMethod": "credit_card" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().starts_with("Bad request:"));

    let (status, body) = app
        .put(
            "/api/orders/not-a-uuid",
            Some(&admin_token),
            json!({ "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, body) = app
        .get("/api/analytics/top-customers?limit=many", Some(&admin_token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}
