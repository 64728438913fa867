use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(title = "Core Academy API", description = "Course catalog, orders and sales analytics"),
    paths(
        handlers::health,
        handlers::welcome,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::courses::list_courses,
        handlers::courses::get_course,
        handlers::courses::create_course,
        handlers::courses::update_course,
        handlers::courses::delete_course,
        handlers::orders::list_orders,
        handlers::orders::my_orders,
        handlers::orders::get_order,
        handlers::orders::create_order,
        handlers::orders::update_order,
        handlers::analytics::revenue_per_month,
        handlers::analytics::top_customers,
        handlers::admin::wipe,
    ),
    components(schemas(
        handlers::HealthStatus,
        handlers::MessageResponse,
        handlers::auth::RegisterRequest,
        handlers::auth::LoginRequest,
        handlers::auth::UserResponse,
        handlers::auth::AuthResponse,
        handlers::courses::CourseResponse,
        handlers::courses::CreateCourseRequest,
        handlers::courses::UpdateCourseRequest,
        handlers::orders::OrderResponse,
        handlers::orders::OrderListItem,
        handlers::orders::CourseRef,
        handlers::orders::CreateOrderRequest,
        handlers::orders::UpdateOrderRequest,
        handlers::analytics::RevenueResponse,
        handlers::analytics::CustomerResponse,
        handlers::analytics::TopCustomer,
        handlers::analytics::TopCustomersResponse,
        handlers::admin::WipeResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Health"),
        (name = "Auth"),
        (name = "Courses"),
        (name = "Orders"),
        (name = "Analytics"),
        (name = "Admin")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
