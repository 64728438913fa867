mod common;

use axum::http::{Method, StatusCode};
use common::{amount, decimal, TestApp};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn course_crud() {
    let app = TestApp::new();
    let (_, token) = app.teacher("author@example.com").await;

    let (status, created) = app
        .post(
            "/api/courses",
            Some(&token),
            json!({
                "title": "Geometry",
                "description": "Shapes and proofs",
                "subject": "Mathematics",
                "gradeLevel": "High School",
                "price": 49.99,
                "duration": "6 weeks",
                "tags": ["shapes"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(amount(&created["price"]), decimal("49.99"));
    assert_eq!(created["rating"], 0.0);
    let uri = format!("/api/courses/{}", created["id"].as_str().unwrap());

    let (status, fetched) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Geometry");

    let (status, updated) = app
        .put(&uri, Some(&token), json!({ "price": "39.99", "rating": 4.5 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&updated["price"]), decimal("39.99"));
    assert_eq!(updated["title"], "Geometry");

    let (status, list) = app.get("/api/courses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, deleted) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Course deleted successfully");

    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found: Course not found");
}

#[tokio::test]
async fn course_writes_require_token() {
    let app = TestApp::new();

    let (status, _) = app
        .post("/api/courses", None, json!({ "title": "Anything" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn course_validation() {
    let app = TestApp::new();
    let (_, token) = app.teacher("author@example.com").await;

    let (status, _) = app
        .post(
            "/api/courses",
            Some(&token),
            json!({
                "title": "Negative",
                "description": "d",
                "subject": "s",
                "gradeLevel": "g",
                "price": -5,
                "duration": "1 week"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .put(
            &format!("/api/courses/{}", Uuid::new_v4()),
            Some(&token),
            json!({ "price": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn price_change_applies_to_later_order_saves_only() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin().await;
    let (_, token) = app.teacher("buyer@example.com").await;
    let a = app.course("Course A", "50").await;
    let b = app.course("Course B", "30").await;

    let (_, order) = app
        .post(
            "/api/orders",
            Some(&token),
            json!({ "courses": [a.id], "paymentMethod": "credit_card" }),
        )
        .await;
    let order_uri = format!("/api/orders/{}", order["id"].as_str().unwrap());

    app.put(
        &format!("/api/courses/{}", a.id),
        Some(&token),
        json!({ "price": 60 }),
    )
    .await;

    let (_, unchanged) = app.get(&order_uri, Some(&token)).await;
    assert_eq!(amount(&unchanged["totalPrice"]), decimal("50"));

    let (_, repriced) = app
        .put(
            &order_uri,
            Some(&admin_token),
            json!({ "courses": [a.id, b.id] }),
        )
        .await;
    assert_eq!(amount(&repriced["totalPrice"]), decimal("90"));
}
