#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use bigdecimal::BigDecimal;
use core_academy::config::Config;
use core_academy::domain::{Course, Role, User};
use core_academy::{create_app, AppState};
use serde_json::Value;
use std::str::FromStr;
use tower::ServiceExt;

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://unused/test".to_string()),
        "JWT_SECRET" => Some("integration-secret".to_string()),
        _ => None,
    })
    .unwrap()
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::in_memory(test_config());
        let router = create_app(state.clone());
        Self { state, router }
    }

    pub async fn user(&self, email: &str, role: Role) -> (User, String) {
        let user = User::new(
            "Test".into(),
            email.split('@').next().unwrap_or("user").into(),
            email,
            "unused-hash".into(),
            role,
            None,
            vec![],
        );
        let user = self.state.users.insert(&user).await.unwrap();
        let token = self.state.auth.tokens().issue(&user).unwrap();
        (user, token)
    }

    pub async fn admin(&self) -> (User, String) {
        self.user("admin@example.com", Role::Admin).await
    }

    pub async fn teacher(&self, email: &str) -> (User, String) {
        self.user(email, Role::Teacher).await
    }

    pub async fn course(&self, title: &str, price: &str) -> Course {
        let course = Course::new(
            title.into(),
            "Description".into(),
            "Mathematics".into(),
            "High School".into(),
            decimal(price),
            "6 weeks".into(),
            vec![],
            0.0,
        );
        self.state.courses.insert(&course).await.unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }
}

pub fn decimal(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

/// Amounts are serialized as decimal strings.
pub fn amount(value: &Value) -> BigDecimal {
    match value {
        Value::String(s) => decimal(s),
        other => decimal(&other.to_string()),
    }
}
