use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::middleware::AdminUser;
use crate::services::SeedSummary;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WipeResponse {
    pub message: String,
    pub users: u64,
    pub courses: u64,
    pub orders: u64,
    pub failed_orders: u64,
}

impl From<SeedSummary> for WipeResponse {
    fn from(summary: SeedSummary) -> Self {
        Self {
            message: "Database wiped and reseeded successfully".to_string(),
            users: summary.users,
            courses: summary.courses,
            orders: summary.orders,
            failed_orders: summary.failed_orders,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/wipe",
    responses(
        (status = 200, description = "Store wiped and demo data reloaded", body = WipeResponse),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Wipe or reseed failed")
    ),
    security(("bearer" = [])),
    tag = "Admin"
)]
pub async fn wipe(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<WipeResponse>, AppError> {
    tracing::warn!(admin_id = %admin.id, "Wiping and reseeding the store");
    let summary = state.seeder.wipe_and_reseed().await?;
    Ok(Json(summary.into()))
}
