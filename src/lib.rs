pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod docs;
pub mod domain;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod services;
pub mod utils;
pub mod validation;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::adapters::{
    InMemoryCourseRepository, InMemoryOrderRepository, InMemoryUserRepository,
    PostgresCourseRepository, PostgresOrderRepository, PostgresUserRepository,
};
use crate::config::Config;
use crate::ports::{CourseCatalog, CourseRepository, OrderRepository, UserRepository};
use crate::services::{AnalyticsService, AuthService, OrderLifecycle, SeedService, TokenService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UserRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub lifecycle: OrderLifecycle,
    pub analytics: AnalyticsService,
    pub auth: AuthService,
    pub seeder: SeedService,
}

impl AppState {
    pub fn new(
        config: Config,
        users: Arc<dyn UserRepository>,
        courses: Arc<dyn CourseRepository>,
        catalog: Arc<dyn CourseCatalog>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        let lifecycle = OrderLifecycle::new(orders.clone(), catalog);
        let analytics = AnalyticsService::new(orders.clone(), users.clone());
        let tokens = TokenService::new(&config.jwt_secret, config.jwt_expiration_hours);
        let auth = AuthService::new(users.clone(), tokens);
        let seeder = SeedService::new(
            users.clone(),
            courses.clone(),
            orders.clone(),
            lifecycle.clone(),
        );

        Self {
            config: Arc::new(config),
            users,
            courses,
            orders,
            lifecycle,
            analytics,
            auth,
            seeder,
        }
    }

    pub fn postgres(pool: PgPool, config: Config) -> Self {
        let courses = Arc::new(PostgresCourseRepository::new(pool.clone()));
        Self::new(
            config,
            Arc::new(PostgresUserRepository::new(pool.clone())),
            courses.clone(),
            courses,
            Arc::new(PostgresOrderRepository::new(pool)),
        )
    }

    /// Process-local store; nothing survives a restart.
    pub fn in_memory(config: Config) -> Self {
        let courses = Arc::new(InMemoryCourseRepository::new());
        Self::new(
            config,
            Arc::new(InMemoryUserRepository::new()),
            courses.clone(),
            courses,
            Arc::new(InMemoryOrderRepository::new()),
        )
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    match &config.cors_allowed_origins {
        None => layer.allow_origin(Any),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(origins))
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .route("/api", get(handlers::welcome))
        .route("/api/", get(handlers::welcome))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/me", get(handlers::auth::me))
        .route(
            "/api/courses",
            get(handlers::courses::list_courses).post(handlers::courses::create_course),
        )
        .route(
            "/api/courses/:id",
            get(handlers::courses::get_course)
                .put(handlers::courses::update_course)
                .delete(handlers::courses::delete_course),
        )
        .route(
            "/api/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/api/orders/my-orders", get(handlers::orders::my_orders))
        .route(
            "/api/orders/:id",
            get(handlers::orders::get_order).put(handlers::orders::update_order),
        )
        .route(
            "/api/analytics/revenue-per-month",
            get(handlers::analytics::revenue_per_month),
        )
        .route(
            "/api/analytics/top-customers",
            get(handlers::analytics::top_customers),
        )
        .route("/api/wipe", post(handlers::admin::wipe))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_logger_middleware,
        ))
        .layer(cors_layer(&state.config))
        .with_state(state)
}
