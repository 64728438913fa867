use axum::{
    extract::State,
    Json,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{CustomerSpend, CustomerSummary};
use crate::error::AppError;
use crate::extract::ApiQuery;
use crate::middleware::AdminUser;
use crate::services::DEFAULT_TOP_CUSTOMERS;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RevenueResponse {
    /// Keyed by `<year>-<zero-based month>`, e.g. `2024-0` for January 2024.
    #[schema(value_type = Object)]
    pub revenue: BTreeMap<String, BigDecimal>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<CustomerSummary> for CustomerResponse {
    fn from(summary: CustomerSummary) -> Self {
        Self {
            id: summary.id,
            first_name: summary.first_name,
            last_name: summary.last_name,
            email: summary.email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    pub user: CustomerResponse,
    #[schema(value_type = String, example = "149.98")]
    pub total_price: BigDecimal,
}

impl From<CustomerSpend> for TopCustomer {
    fn from(spend: CustomerSpend) -> Self {
        Self {
            user: spend.user.into(),
            total_price: spend.total_price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TopCustomersResponse {
    pub customers: Vec<TopCustomer>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TopCustomersQuery {
    /// Maximum number of customers returned. Defaults to 5.
    pub limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/analytics/revenue-per-month",
    responses(
        (status = 200, description = "Completed-order revenue per month", body = RevenueResponse),
        (status = 403, description = "Admin only")
    ),
    security(("bearer" = [])),
    tag = "Analytics"
)]
pub async fn revenue_per_month(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<RevenueResponse>, AppError> {
    let revenue = state.analytics.revenue_per_month().await?;

    Ok(Json(RevenueResponse {
        revenue: revenue
            .into_iter()
            .map(|(month, total)| (month.to_string(), total))
            .collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/analytics/top-customers",
    params(TopCustomersQuery),
    responses(
        (status = 200, description = "Customers ranked by completed-order spend", body = TopCustomersResponse),
        (status = 403, description = "Admin only")
    ),
    security(("bearer" = [])),
    tag = "Analytics"
)]
pub async fn top_customers(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<TopCustomersQuery>,
) -> Result<Json<TopCustomersResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_CUSTOMERS);
    let customers = state.analytics.top_customers(limit).await?;

    Ok(Json(TopCustomersResponse {
        customers: customers.into_iter().map(TopCustomer::from).collect(),
    }))
}
