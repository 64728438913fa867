//! In-memory port implementations.
//!
//! Behave like the Postgres adapters (ordering, conflicts, all-or-nothing
//! batches) so services and the HTTP layer can be exercised without a
//! database.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Course, CustomerSummary, Order, OrderFilter, User};
use crate::ports::{
    CourseCatalog, CourseRepository, OrderRepository, RepositoryError, RepositoryResult,
    UserRepository,
};

#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }

    async fn insert(&self, order: &Order) -> RepositoryResult<Order> {
        let mut orders = self.orders.write().await;
        if orders.iter().any(|o| o.id == order.id) {
            return Err(RepositoryError::Conflict(format!("order {} exists", order.id)));
        }
        orders.push(order.clone());
        Ok(order.clone())
    }

    async fn insert_many(&self, batch: &[Order]) -> RepositoryResult<u64> {
        let mut orders = self.orders.write().await;
        if let Some(dup) = batch.iter().find(|b| orders.iter().any(|o| o.id == b.id)) {
            return Err(RepositoryError::Conflict(format!("order {} exists", dup.id)));
        }
        orders.extend(batch.iter().cloned());
        Ok(batch.len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    async fn find(&self, filter: &OrderFilter) -> RepositoryResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders.iter().filter(|o| filter.matches(o)).cloned().collect();
        // Stable: equal purchase times keep insertion order.
        matching.sort_by_key(|o| o.purchased_at);
        Ok(matching)
    }

    async fn update(&self, order: &Order) -> RepositoryResult<Order> {
        let mut orders = self.orders.write().await;
        let slot = orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(|| RepositoryError::NotFound(order.id.to_string()))?;
        *slot = order.clone();
        Ok(order.clone())
    }

    async fn delete_all(&self) -> RepositoryResult<u64> {
        let mut orders = self.orders.write().await;
        let removed = orders.len() as u64;
        orders.clear();
        Ok(removed)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCourseRepository {
    courses: Arc<RwLock<Vec<Course>>>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseCatalog for InMemoryCourseRepository {
    async fn resolve_prices(&self, ids: &[Uuid]) -> RepositoryResult<Vec<BigDecimal>> {
        let courses = self.courses.read().await;
        ids.iter()
            .map(|id| {
                courses
                    .iter()
                    .find(|c| c.id == *id)
                    .map(|c| c.price.clone())
                    .ok_or(RepositoryError::UnresolvedCourse(*id))
            })
            .collect()
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn insert(&self, course: &Course) -> RepositoryResult<Course> {
        let mut courses = self.courses.write().await;
        if courses.iter().any(|c| c.id == course.id) {
            return Err(RepositoryError::Conflict(format!("course {} exists", course.id)));
        }
        courses.push(course.clone());
        Ok(course.clone())
    }

    async fn insert_many(&self, batch: &[Course]) -> RepositoryResult<u64> {
        let mut courses = self.courses.write().await;
        if let Some(dup) = batch.iter().find(|b| courses.iter().any(|c| c.id == b.id)) {
            return Err(RepositoryError::Conflict(format!("course {} exists", dup.id)));
        }
        courses.extend(batch.iter().cloned());
        Ok(batch.len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.iter().find(|c| c.id == id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Course>> {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        let courses = self.courses.read().await;
        Ok(courses
            .iter()
            .filter(|c| wanted.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn list(&self) -> RepositoryResult<Vec<Course>> {
        Ok(self.courses.read().await.clone())
    }

    async fn update(&self, course: &Course) -> RepositoryResult<Course> {
        let mut courses = self.courses.write().await;
        let slot = courses
            .iter_mut()
            .find(|c| c.id == course.id)
            .ok_or_else(|| RepositoryError::NotFound(course.id.to_string()))?;
        *slot = course.clone();
        Ok(course.clone())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut courses = self.courses.write().await;
        let before = courses.len();
        courses.retain(|c| c.id != id);
        Ok(courses.len() < before)
    }

    async fn delete_all(&self) -> RepositoryResult<u64> {
        let mut courses = self.courses.write().await;
        let removed = courses.len() as u64;
        courses.clear();
        Ok(removed)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> RepositoryResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn insert_many(&self, batch: &[User]) -> RepositoryResult<u64> {
        let mut users = self.users.write().await;
        for (i, user) in batch.iter().enumerate() {
            let taken = users.iter().chain(&batch[..i]).any(|u| u.email == user.email);
            if taken {
                return Err(RepositoryError::Conflict(format!(
                    "email {} is already registered",
                    user.email
                )));
            }
        }
        users.extend(batch.iter().cloned());
        Ok(batch.len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_summaries(
        &self,
        ids: &[Uuid],
    ) -> RepositoryResult<HashMap<Uuid, CustomerSummary>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .map(|u| (u.id, u.summary()))
            .collect())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> RepositoryResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        user.last_login = Some(at);
        user.updated_at = at;
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.users.read().await.len() as i64)
    }

    async fn delete_all(&self) -> RepositoryResult<u64> {
        let mut users = self.users.write().await;
        let removed = users.len() as u64;
        users.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn course(price: &str) -> Course {
        Course::new(
            "Algebra".into(),
            "Intro".into(),
            "Mathematics".into(),
            "High School".into(),
            price.parse().unwrap(),
            "8 weeks".into(),
            vec![],
            0.0,
        )
    }

    #[tokio::test]
    async fn resolves_prices_positionally() {
        let repo = InMemoryCourseRepository::new();
        let a = repo.insert(&course("50")).await.unwrap();
        let b = repo.insert(&course("30")).await.unwrap();

        let prices = repo.resolve_prices(&[b.id, a.id, b.id]).await.unwrap();
        assert_eq!(
            prices,
            vec![BigDecimal::from(30), BigDecimal::from(50), BigDecimal::from(30)]
        );
    }

    #[tokio::test]
    async fn fails_on_unknown_course() {
        let repo = InMemoryCourseRepository::new();
        let a = repo.insert(&course("50")).await.unwrap();
        let missing = Uuid::new_v4();

        let err = repo.resolve_prices(&[a.id, missing]).await.unwrap_err();
        assert!(matches!(err, RepositoryError::UnresolvedCourse(id) if id == missing));
    }

    #[tokio::test]
    async fn find_many_skips_missing_and_repeats() {
        let repo = InMemoryCourseRepository::new();
        let a = repo.insert(&course("50")).await.unwrap();
        repo.insert(&course("30")).await.unwrap();

        let found = repo.find_many(&[a.id, Uuid::new_v4(), a.id]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a.id);
    }

    #[tokio::test]
    async fn rejects_duplicate_email_in_batch() {
        let repo = InMemoryUserRepository::new();
        let make = |email: &str| {
            User::new("A".into(), "B".into(), email, "h".into(), Role::Teacher, None, vec![])
        };

        let err = repo
            .insert_many(&[make("x@example.com"), make("X@example.com")])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
