//! Order lifecycle engine.
//!
//! Every write goes through the same explicit pipeline:
//! `validate -> reprice -> stamp -> persist`. Prices are resolved from the
//! catalog at save time, never cached from an earlier save.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::order::total_price;
use crate::domain::{Order, OrderStatus, PaymentStatus};
use crate::ports::{CourseCatalog, OrderRepository, RepositoryError};
use crate::validation::{
    normalize_optional, validate_max_len, validate_required, ValidationError, NOTES_MAX_LEN,
    PAYMENT_METHOD_MAX_LEN,
};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("order {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

/// Input for creating an order. `user` comes from the caller's identity, not from here.
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    pub courses: Vec<Uuid>,
    pub payment_method: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub purchased_at: Option<DateTime<Utc>>,
    /// Only honoured for historical loads; live orders get stamped on transition.
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub courses: Option<Vec<Uuid>>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// One record of a bulk load that could not be stored.
#[derive(Debug)]
pub struct PartialBulkFailure {
    /// Position of the record in the submitted batch.
    pub index: usize,
    pub error: OrderError,
}

#[derive(Debug, Default)]
pub struct BulkInsertReport {
    pub inserted: Vec<Order>,
    pub failures: Vec<PartialBulkFailure>,
}

impl BulkInsertReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone)]
pub struct OrderLifecycle {
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn CourseCatalog>,
}

impl OrderLifecycle {
    pub fn new(orders: Arc<dyn OrderRepository>, catalog: Arc<dyn CourseCatalog>) -> Self {
        Self { orders, catalog }
    }

    pub async fn create(&self, user_id: Uuid, input: NewOrder) -> Result<Order, OrderError> {
        let order = self.prepare(user_id, input, Utc::now()).await?;
        let stored = self.orders.insert(&order).await?;

        info!(
            order_id = %stored.id,
            user_id = %stored.user_id,
            courses = stored.courses.len(),
            total_price = %stored.total_price,
            "Order created"
        );
        Ok(stored)
    }

    pub async fn update(&self, id: Uuid, patch: OrderPatch) -> Result<Order, OrderError> {
        let mut order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or(OrderError::NotFound(id))?;

        let status = parse_opt::<OrderStatus>(patch.status.as_deref())?;
        let payment_status = parse_opt::<PaymentStatus>(patch.payment_status.as_deref())?;
        if let Some(courses) = &patch.courses {
            validate_courses(courses)?;
        }
        let payment_method = patch
            .payment_method
            .as_deref()
            .map(validate_payment_method)
            .transpose()?;
        if let Some(notes) = &patch.notes {
            validate_max_len("notes", notes.trim(), NOTES_MAX_LEN)?;
        }

        if let Some(courses) = patch.courses.filter(|c| *c != order.courses) {
            order.total_price = self.reprice(&courses).await?;
            order.courses = courses;
        }

        if let Some(status) = status.filter(|s| *s != order.status) {
            let previous = order.status;
            order.status = status;
            order.stamp_status(Utc::now());
            info!(order_id = %order.id, from = %previous, to = %status, "Order status changed");
        }

        if let Some(payment_status) = payment_status {
            order.payment_status = payment_status;
        }
        if let Some(payment_method) = payment_method {
            order.payment_method = payment_method;
        }
        if patch.notes.is_some() {
            order.notes = normalize_optional(patch.notes);
        }

        let stored = self.orders.update(&order).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => OrderError::NotFound(id),
            other => OrderError::Persistence(other),
        })?;

        info!(order_id = %stored.id, total_price = %stored.total_price, "Order updated");
        Ok(stored)
    }

    /// Loads many orders at once.
    ///
    /// Each record is validated, priced and stamped before anything is
    /// written. Records that fail are reported by position and skipped; the
    /// rest are stored in a single batch.
    pub async fn bulk_insert(&self, records: Vec<(Uuid, NewOrder)>) -> BulkInsertReport {
        let now = Utc::now();
        let mut prepared: Vec<(usize, Order)> = Vec::with_capacity(records.len());
        let mut report = BulkInsertReport::default();

        for (index, (user_id, input)) in records.into_iter().enumerate() {
            match self.prepare(user_id, input, now).await {
                Ok(order) => prepared.push((index, order)),
                Err(error) => {
                    warn!(index, error = %error, "Skipping order in bulk insert");
                    report.failures.push(PartialBulkFailure { index, error });
                }
            }
        }

        if prepared.is_empty() {
            return report;
        }

        let orders: Vec<Order> = prepared.iter().map(|(_, order)| order.clone()).collect();
        match self.orders.insert_many(&orders).await {
            Ok(count) => {
                info!(inserted = count, failed = report.failures.len(), "Bulk order insert finished");
                report.inserted = orders;
            }
            Err(e) => {
                error!(error = %e, records = orders.len(), "Bulk order write failed");
                let message = e.to_string();
                report
                    .failures
                    .extend(prepared.into_iter().map(|(index, _)| PartialBulkFailure {
                        index,
                        error: OrderError::Persistence(RepositoryError::Database(message.clone())),
                    }));
                report.failures.sort_by_key(|f| f.index);
            }
        }

        report
    }

    async fn prepare(
        &self,
        user_id: Uuid,
        input: NewOrder,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        validate_courses(&input.courses)?;
        let payment_method = validate_payment_method(input.payment_method.as_deref().unwrap_or(""))?;
        let status = parse_opt::<OrderStatus>(input.status.as_deref())?.unwrap_or_default();
        let payment_status =
            parse_opt::<PaymentStatus>(input.payment_status.as_deref())?.unwrap_or_default();
        if let Some(notes) = &input.notes {
            validate_max_len("notes", notes.trim(), NOTES_MAX_LEN)?;
        }

        let total_price = self.reprice(&input.courses).await?;

        let mut order = Order {
            id: Uuid::new_v4(),
            user_id,
            courses: input.courses,
            status,
            payment_method,
            payment_status,
            purchased_at: input.purchased_at.unwrap_or(now),
            completed_at: input.completed_at,
            cancelled_at: input.cancelled_at,
            notes: normalize_optional(input.notes),
            total_price,
        };
        order.stamp_status(now);
        Ok(order)
    }

    async fn reprice(&self, courses: &[Uuid]) -> Result<BigDecimal, OrderError> {
        if courses.is_empty() {
            return Ok(BigDecimal::from(0));
        }
        let prices = self.catalog.resolve_prices(courses).await?;
        Ok(total_price(&prices))
    }
}

fn parse_opt<T>(value: Option<&str>) -> Result<Option<T>, ValidationError>
where
    T: std::str::FromStr<Err = ValidationError>,
{
    value.map(str::parse).transpose()
}

fn validate_courses(courses: &[Uuid]) -> Result<(), ValidationError> {
    if courses.is_empty() {
        return Err(ValidationError::new(
            "courses",
            "You must purchase at least one course",
        ));
    }
    Ok(())
}

fn validate_payment_method(value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    validate_required("paymentMethod", value)?;
    validate_max_len("paymentMethod", value, PAYMENT_METHOD_MAX_LEN)?;
    Ok(value.to_string())
}
