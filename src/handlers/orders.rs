use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Course, Order, OrderFilter};
use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{AdminUser, AuthUser};
use crate::services::{NewOrder, OrderPatch};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user: Uuid,
    pub courses: Vec<Uuid>,
    #[schema(example = "pending")]
    pub status: String,
    pub payment_method: String,
    #[schema(example = "pending")]
    pub payment_status: String,
    pub purchased_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[schema(value_type = String, example = "129.97")]
    pub total_price: BigDecimal,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user: order.user_id,
            courses: order.courses,
            status: order.status.to_string(),
            payment_method: order.payment_method,
            payment_status: order.payment_status.to_string(),
            purchased_at: order.purchased_at,
            completed_at: order.completed_at,
            cancelled_at: order.cancelled_at,
            notes: order.notes,
            total_price: order.total_price,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub courses: Vec<Uuid>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub courses: Option<Vec<Uuid>>,
    #[schema(example = "completed")]
    pub status: Option<String>,
    #[schema(example = "completed")]
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// A purchased course as shown in order listings. Title and price are
/// absent when the course has since been deleted.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "49.99")]
    pub price: Option<BigDecimal>,
}

impl CourseRef {
    fn resolve(id: Uuid, catalog: &HashMap<Uuid, Course>) -> Self {
        match catalog.get(&id) {
            Some(course) => Self {
                id,
                title: Some(course.title.clone()),
                price: Some(course.price.clone()),
            },
            None => Self {
                id,
                title: None,
                price: None,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderListItem {
    pub id: Uuid,
    pub user: Uuid,
    pub courses: Vec<CourseRef>,
    #[schema(example = "completed")]
    pub status: String,
    pub payment_method: String,
    #[schema(example = "completed")]
    pub payment_status: String,
    pub purchased_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[schema(value_type = String, example = "129.97")]
    pub total_price: BigDecimal,
}

impl OrderListItem {
    fn new(order: Order, catalog: &HashMap<Uuid, Course>) -> Self {
        Self {
            id: order.id,
            user: order.user_id,
            courses: order
                .courses
                .iter()
                .map(|id| CourseRef::resolve(*id, catalog))
                .collect(),
            status: order.status.to_string(),
            payment_method: order.payment_method,
            payment_status: order.payment_status.to_string(),
            purchased_at: order.purchased_at,
            completed_at: order.completed_at,
            cancelled_at: order.cancelled_at,
            notes: order.notes,
            total_price: order.total_price,
        }
    }
}

/// Embeds course title and price, looking every referenced course up in
/// one batch.
async fn populate(
    state: &AppState,
    orders: Vec<Order>,
) -> Result<Json<Vec<OrderListItem>>, AppError> {
    let ids: Vec<Uuid> = orders
        .iter()
        .flat_map(|o| o.courses.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let catalog: HashMap<Uuid, Course> = state
        .courses
        .find_many(&ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    Ok(Json(
        orders
            .into_iter()
            .map(|order| OrderListItem::new(order, &catalog))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "All orders", body = [OrderListItem]),
        (status = 403, description = "Admin only")
    ),
    security(("bearer" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<OrderListItem>>, AppError> {
    let orders = state.orders.find(&OrderFilter::all()).await?;
    populate(&state, orders).await
}

#[utoipa::path(
    get,
    path = "/api/orders/my-orders",
    responses(
        (status = 200, description = "Caller's orders", body = [OrderListItem]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "Orders"
)]
pub async fn my_orders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<OrderListItem>>, AppError> {
    let orders = state.orders.find(&OrderFilter::for_user(auth.user_id)).await?;
    populate(&state, orders).await
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .orders
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if order.user_id != auth.user_id {
        let is_admin = state
            .auth
            .current_user(auth.user_id)
            .await?
            .is_some_and(|u| u.is_admin());
        if !is_admin {
            return Err(AppError::Forbidden("Access denied".to_string()));
        }
    }

    Ok(Json(order.into()))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    // Callers cannot choose the initial state of their own order.
    let order = state
        .lifecycle
        .create(
            auth.user_id,
            NewOrder {
                courses: payload.courses,
                payment_method: payload.payment_method,
                notes: payload.notes,
                ..NewOrder::default()
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer" = [])),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    tracing::debug!(order_id = %id, admin_id = %admin.id, "Updating order");

    let order = state
        .lifecycle
        .update(
            id,
            OrderPatch {
                courses: payload.courses,
                status: payload.status,
                payment_status: payload.payment_status,
                payment_method: payload.payment_method,
                notes: payload.notes,
            },
        )
        .await?;

    Ok(Json(order.into()))
}
