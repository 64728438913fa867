//! Storage capabilities the services depend on.
//! Postgres and in-memory implementations live in `crate::adapters`.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Course, CustomerSummary, Order, OrderFilter, User};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("course {0} does not exist")]
    UnresolvedCourse(Uuid),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("row".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(db.message().to_string())
            }
            other => RepositoryError::Database(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Price lookup used by the order lifecycle.
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    /// Returns the current price of every id, positionally. Repeated ids
    /// repeat their price. Fails with `UnresolvedCourse` on the first id
    /// that does not exist.
    async fn resolve_prices(&self, ids: &[Uuid]) -> RepositoryResult<Vec<BigDecimal>>;
}

#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn insert(&self, course: &Course) -> RepositoryResult<Course>;
    async fn insert_many(&self, courses: &[Course]) -> RepositoryResult<u64>;
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Course>>;
    /// Existing courses among `ids`, each at most once. Missing ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Course>>;
    async fn list(&self) -> RepositoryResult<Vec<Course>>;
    /// Overwrites the stored course. `NotFound` if it vanished.
    async fn update(&self, course: &Course) -> RepositoryResult<Course>;
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
    async fn delete_all(&self) -> RepositoryResult<u64>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn ping(&self) -> RepositoryResult<()>;
    async fn insert(&self, order: &Order) -> RepositoryResult<Order>;
    /// Writes every order or none of them.
    async fn insert_many(&self, orders: &[Order]) -> RepositoryResult<u64>;
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Order>>;
    /// Matching orders, oldest purchase first.
    async fn find(&self, filter: &OrderFilter) -> RepositoryResult<Vec<Order>>;
    /// Overwrites the stored order. `NotFound` if it vanished.
    async fn update(&self, order: &Order) -> RepositoryResult<Order>;
    async fn delete_all(&self) -> RepositoryResult<u64>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// `Conflict` when the email is already registered.
    async fn insert(&self, user: &User) -> RepositoryResult<User>;
    async fn insert_many(&self, users: &[User]) -> RepositoryResult<u64>;
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_summaries(&self, ids: &[Uuid])
        -> RepositoryResult<HashMap<Uuid, CustomerSummary>>;
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> RepositoryResult<()>;
    async fn count(&self) -> RepositoryResult<i64>;
    async fn delete_all(&self) -> RepositoryResult<u64>;
}
