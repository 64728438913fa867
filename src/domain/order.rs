//! Order domain entity.
//! Holds the status enums and the timestamp stamping rule; pricing and
//! persistence are driven from `services::order_lifecycle`.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::validation::{validate_enum, ValidationError};

pub const ORDER_STATUSES: &[&str] = &["pending", "completed", "cancelled"];
pub const PAYMENT_STATUSES: &[&str] = &["pending", "completed", "failed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        validate_enum("status", value, ORDER_STATUSES)?;
        Ok(match value {
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Pending,
        })
    }
}

/// Payment progress. Varies independently of [`OrderStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        validate_enum("paymentStatus", value, PAYMENT_STATUSES)?;
        Ok(match value {
            "completed" => PaymentStatus::Completed,
            "failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        })
    }
}

/// Domain entity representing a course purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Course references in purchase order. Duplicates are kept and priced per occurrence.
    pub courses: Vec<Uuid>,
    pub status: OrderStatus,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub purchased_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub total_price: BigDecimal,
}

impl Order {
    /// Records the timestamp belonging to the current status.
    ///
    /// Each timestamp is written at most once: re-entering `completed` or
    /// `cancelled` keeps the first value.
    pub fn stamp_status(&mut self, now: DateTime<Utc>) {
        match self.status {
            OrderStatus::Completed if self.completed_at.is_none() => {
                self.completed_at = Some(now);
            }
            OrderStatus::Cancelled if self.cancelled_at.is_none() => {
                self.cancelled_at = Some(now);
            }
            _ => {}
        }
    }
}

/// Sums course prices per occurrence. An empty list totals zero.
pub fn total_price(prices: &[BigDecimal]) -> BigDecimal {
    prices
        .iter()
        .fold(BigDecimal::from(0), |acc, price| acc + price)
}

/// Selection criteria for order scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub user_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn completed() -> Self {
        Self {
            status: Some(OrderStatus::Completed),
            ..Self::default()
        }
    }

    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.user_id.map_or(true, |id| order.user_id == id)
            && self.status.map_or(true, |status| order.status == status)
    }
}
