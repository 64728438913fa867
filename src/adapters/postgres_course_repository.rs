//! Postgres implementation of CourseRepository and CourseCatalog.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::Course;
use crate::ports::{CourseCatalog, CourseRepository, RepositoryError, RepositoryResult};

const COURSE_COLUMNS: &str = "id, title, description, subject, grade_level, price, duration, \
     tags, rating, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresCourseRepository {
    pool: PgPool,
}

impl PostgresCourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseCatalog for PostgresCourseRepository {
    async fn resolve_prices(&self, ids: &[Uuid]) -> RepositoryResult<Vec<BigDecimal>> {
        // Read at call time so each save prices against the committed catalog.
        let rows: Vec<(Uuid, BigDecimal)> =
            sqlx::query_as("SELECT id, price FROM courses WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;

        let prices: HashMap<Uuid, BigDecimal> = rows.into_iter().collect();

        ids.iter()
            .map(|id| {
                prices
                    .get(id)
                    .cloned()
                    .ok_or(RepositoryError::UnresolvedCourse(*id))
            })
            .collect()
    }
}

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn insert(&self, course: &Course) -> RepositoryResult<Course> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            r#"
            INSERT INTO courses ({COURSE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(course.id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.subject)
        .bind(&course.grade_level)
        .bind(&course.price)
        .bind(&course.duration)
        .bind(&course.tags)
        .bind(course.rating)
        .bind(course.created_at)
        .bind(course.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_domain())
    }

    async fn insert_many(&self, courses: &[Course]) -> RepositoryResult<u64> {
        let mut tx = self.pool.begin().await?;

        for course in courses {
            sqlx::query(&format!(
                "INSERT INTO courses ({COURSE_COLUMNS}) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
            ))
            .bind(course.id)
            .bind(&course.title)
            .bind(&course.description)
            .bind(&course.subject)
            .bind(&course.grade_level)
            .bind(&course.price)
            .bind(&course.duration)
            .bind(&course.tags)
            .bind(course.rating)
            .bind(course.created_at)
            .bind(course.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(courses.len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Course>> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CourseRow::into_domain))
    }

    async fn find_many(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CourseRow::into_domain).collect())
    }

    async fn list(&self) -> RepositoryResult<Vec<Course>> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CourseRow::into_domain).collect())
    }

    async fn update(&self, course: &Course) -> RepositoryResult<Course> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            r#"
            UPDATE courses SET
                title = $2, description = $3, subject = $4, grade_level = $5, price = $6,
                duration = $7, tags = $8, rating = $9, updated_at = $10
            WHERE id = $1
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(course.id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.subject)
        .bind(&course.grade_level)
        .bind(&course.price)
        .bind(&course.duration)
        .bind(&course.tags)
        .bind(course.rating)
        .bind(course.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CourseRow::into_domain)
            .ok_or_else(|| RepositoryError::NotFound(course.id.to_string()))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM courses").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    title: String,
    description: String,
    subject: String,
    grade_level: String,
    price: BigDecimal,
    duration: String,
    tags: Vec<String>,
    rating: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CourseRow {
    fn into_domain(self) -> Course {
        Course {
            id: self.id,
            title: self.title,
            description: self.description,
            subject: self.subject,
            grade_level: self.grade_level,
            price: self.price,
            duration: self.duration,
            tags: self.tags,
            rating: self.rating,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
