//! Postgres implementation of OrderRepository.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Order, OrderFilter};
use crate::ports::{OrderRepository, RepositoryError, RepositoryResult};

const ORDER_COLUMNS: &str = "id, user_id, course_ids, status, payment_method, payment_status, \
     purchased_at, completed_at, cancelled_at, notes, total_price";

/// Postgres-backed order repository.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, order: &Order) -> RepositoryResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO orders ({ORDER_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.id)
        .bind(order.user_id)
        .bind(&order.courses)
        .bind(order.status.as_str())
        .bind(&order.payment_method)
        .bind(order.payment_status.as_str())
        .bind(order.purchased_at)
        .bind(order.completed_at)
        .bind(order.cancelled_at)
        .bind(&order.notes)
        .bind(&order.total_price)
        .fetch_one(&self.pool)
        .await?;

        row.into_domain()
    }

    async fn insert_many(&self, orders: &[Order]) -> RepositoryResult<u64> {
        let mut tx = self.pool.begin().await?;

        for order in orders {
            sqlx::query(&format!(
                "INSERT INTO orders ({ORDER_COLUMNS}) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
            ))
            .bind(order.id)
            .bind(order.user_id)
            .bind(&order.courses)
            .bind(order.status.as_str())
            .bind(&order.payment_method)
            .bind(order.payment_status.as_str())
            .bind(order.purchased_at)
            .bind(order.completed_at)
            .bind(order.cancelled_at)
            .bind(&order.notes)
            .bind(&order.total_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(orders.len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(OrderRow::into_domain).transpose()
    }

    async fn find(&self, filter: &OrderFilter) -> RepositoryResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY purchased_at ASC, id ASC
            "#
        ))
        .bind(filter.user_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    async fn update(&self, order: &Order) -> RepositoryResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders SET
                course_ids = $2, status = $3, payment_method = $4, payment_status = $5,
                purchased_at = $6, completed_at = $7, cancelled_at = $8, notes = $9,
                total_price = $10
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.id)
        .bind(&order.courses)
        .bind(order.status.as_str())
        .bind(&order.payment_method)
        .bind(order.payment_status.as_str())
        .bind(order.purchased_at)
        .bind(order.completed_at)
        .bind(order.cancelled_at)
        .bind(&order.notes)
        .bind(&order.total_price)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| RepositoryError::NotFound(order.id.to_string()))?
            .into_domain()
    }

    async fn delete_all(&self) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM orders").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    course_ids: Vec<Uuid>,
    status: String,
    payment_method: String,
    payment_status: String,
    purchased_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    notes: Option<String>,
    total_price: BigDecimal,
}

impl OrderRow {
    fn into_domain(self) -> RepositoryResult<Order> {
        let status = self
            .status
            .parse()
            .map_err(|e| RepositoryError::Database(format!("order {}: {}", self.id, e)))?;
        let payment_status = self
            .payment_status
            .parse()
            .map_err(|e| RepositoryError::Database(format!("order {}: {}", self.id, e)))?;

        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            courses: self.course_ids,
            status,
            payment_method: self.payment_method,
            payment_status,
            purchased_at: self.purchased_at,
            completed_at: self.completed_at,
            cancelled_at: self.cancelled_at,
            notes: self.notes,
            total_price: self.total_price,
        })
    }
}
