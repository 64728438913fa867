//! Demo dataset loading: wipe everything and reload, or load once into an
//! empty store at startup.

use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Course, Role, User};
use crate::ports::{CourseRepository, OrderRepository, RepositoryError, UserRepository};
use crate::services::auth::{hash_password, AuthError};
use crate::services::order_lifecycle::{NewOrder, OrderLifecycle};

pub const SEED_PASSWORD: &str = "password123";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("invalid seed data: {0}")]
    Data(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub users: u64,
    pub courses: u64,
    pub orders: u64,
    pub failed_orders: u64,
}

struct SeedUser {
    first_name: &'static str,
    last_name: &'static str,
    email: &'static str,
    role: Role,
    school: Option<&'static str>,
    subjects: &'static [&'static str],
}

struct SeedCourse {
    title: &'static str,
    description: &'static str,
    subject: &'static str,
    grade_level: &'static str,
    price: &'static str,
    duration: &'static str,
    tags: &'static [&'static str],
    rating: f64,
}

struct SeedOrder {
    user: usize,
    courses: &'static [usize],
    status: &'static str,
    payment_method: &'static str,
    payment_status: &'static str,
    purchased: (i32, u32, u32),
}

const USERS: &[SeedUser] = &[
    SeedUser {
        first_name: "Admin",
        last_name: "User",
        email: "admin@coreacademy.com",
        role: Role::Admin,
        school: None,
        subjects: &[],
    },
    SeedUser {
        first_name: "Sarah",
        last_name: "Johnson",
        email: "sarah.johnson@school.edu",
        role: Role::Teacher,
        school: Some("Lincoln High School"),
        subjects: &["Mathematics", "Physics"],
    },
    SeedUser {
        first_name: "Michael",
        last_name: "Chen",
        email: "michael.chen@school.edu",
        role: Role::Teacher,
        school: Some("Roosevelt Middle School"),
        subjects: &["Science"],
    },
    SeedUser {
        first_name: "Emily",
        last_name: "Davis",
        email: "emily.davis@school.edu",
        role: Role::Teacher,
        school: Some("Washington Elementary"),
        subjects: &["English", "History"],
    },
];

const COURSES: &[SeedCourse] = &[
    SeedCourse {
        title: "Algebra Foundations",
        description: "Linear equations, inequalities and functions for classroom use.",
        subject: "Mathematics",
        grade_level: "Middle School",
        price: "49.99",
        duration: "6 weeks",
        tags: &["algebra", "equations"],
        rating: 4.6,
    },
    SeedCourse {
        title: "Intro to Physics",
        description: "Motion, forces and energy with lab activities.",
        subject: "Physics",
        grade_level: "High School",
        price: "79.99",
        duration: "8 weeks",
        tags: &["mechanics", "labs"],
        rating: 4.8,
    },
    SeedCourse {
        title: "Cell Biology Basics",
        description: "Cells, organelles and how they work together.",
        subject: "Science",
        grade_level: "Middle School",
        price: "39.99",
        duration: "4 weeks",
        tags: &["biology", "cells"],
        rating: 4.4,
    },
    SeedCourse {
        title: "Creative Writing Workshop",
        description: "Story structure, voice and peer review exercises.",
        subject: "English",
        grade_level: "High School",
        price: "59.99",
        duration: "6 weeks",
        tags: &["writing", "literature"],
        rating: 4.7,
    },
    SeedCourse {
        title: "World History Survey",
        description: "Major civilizations from antiquity to the modern era.",
        subject: "History",
        grade_level: "High School",
        price: "69.99",
        duration: "10 weeks",
        tags: &["history", "civilizations"],
        rating: 4.5,
    },
    SeedCourse {
        title: "Early Reading Skills",
        description: "Phonics and comprehension strategies for young readers.",
        subject: "English",
        grade_level: "Elementary",
        price: "29.99",
        duration: "4 weeks",
        tags: &["reading", "phonics"],
        rating: 4.9,
    },
];

const ORDERS: &[SeedOrder] = &[
    SeedOrder {
        user: 1,
        courses: &[0, 1],
        status: "completed",
        payment_method: "credit_card",
        payment_status: "completed",
        purchased: (2024, 1, 15),
    },
    SeedOrder {
        user: 2,
        courses: &[2],
        status: "completed",
        payment_method: "paypal",
        payment_status: "completed",
        purchased: (2024, 1, 22),
    },
    SeedOrder {
        user: 3,
        courses: &[3, 5],
        status: "completed",
        payment_method: "credit_card",
        payment_status: "completed",
        purchased: (2024, 2, 3),
    },
    SeedOrder {
        user: 1,
        courses: &[4],
        status: "completed",
        payment_method: "credit_card",
        payment_status: "completed",
        purchased: (2024, 2, 18),
    },
    SeedOrder {
        user: 2,
        courses: &[0, 2, 2],
        status: "pending",
        payment_method: "bank_transfer",
        payment_status: "pending",
        purchased: (2024, 3, 2),
    },
    SeedOrder {
        user: 3,
        courses: &[1],
        status: "cancelled",
        payment_method: "paypal",
        payment_status: "failed",
        purchased: (2024, 3, 9),
    },
    SeedOrder {
        user: 2,
        courses: &[1, 4],
        status: "completed",
        payment_method: "credit_card",
        payment_status: "completed",
        purchased: (2024, 3, 27),
    },
    SeedOrder {
        user: 3,
        courses: &[0],
        status: "completed",
        payment_method: "credit_card",
        payment_status: "completed",
        purchased: (2024, 4, 5),
    },
];

#[derive(Clone)]
pub struct SeedService {
    users: Arc<dyn UserRepository>,
    courses: Arc<dyn CourseRepository>,
    orders: Arc<dyn OrderRepository>,
    lifecycle: OrderLifecycle,
}

impl SeedService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        courses: Arc<dyn CourseRepository>,
        orders: Arc<dyn OrderRepository>,
        lifecycle: OrderLifecycle,
    ) -> Self {
        Self {
            users,
            courses,
            orders,
            lifecycle,
        }
    }

    /// Loads the dataset only when no account exists yet.
    pub async fn seed_if_empty(&self) -> Result<Option<SeedSummary>, SeedError> {
        if self.users.count().await? > 0 {
            info!("Users already present, skipping seed");
            return Ok(None);
        }
        self.load().await.map(Some)
    }

    /// Deletes every order, course and account, then loads the dataset.
    pub async fn wipe_and_reseed(&self) -> Result<SeedSummary, SeedError> {
        let orders = self.orders.delete_all().await?;
        let courses = self.courses.delete_all().await?;
        let users = self.users.delete_all().await?;
        info!(orders, courses, users, "Store wiped");

        self.load().await
    }

    async fn load(&self) -> Result<SeedSummary, SeedError> {
        let password_hash = hash_password(SEED_PASSWORD)?;

        let users: Vec<User> = USERS
            .iter()
            .map(|u| {
                User::new(
                    u.first_name.to_string(),
                    u.last_name.to_string(),
                    u.email,
                    password_hash.clone(),
                    u.role,
                    u.school.map(str::to_string),
                    u.subjects.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect();
        let user_count = self.users.insert_many(&users).await?;

        let courses = COURSES
            .iter()
            .map(|c| -> Result<Course, SeedError> {
                let price = BigDecimal::from_str(c.price)
                    .map_err(|e| SeedError::Data(format!("{}: {}", c.title, e)))?;
                Ok(Course::new(
                    c.title.to_string(),
                    c.description.to_string(),
                    c.subject.to_string(),
                    c.grade_level.to_string(),
                    price,
                    c.duration.to_string(),
                    c.tags.iter().map(|t| t.to_string()).collect(),
                    c.rating,
                ))
            })
            .collect::<Result<Vec<Course>, SeedError>>()?;
        let course_count = self.courses.insert_many(&courses).await?;

        let records = ORDERS
            .iter()
            .map(|o| -> Result<(Uuid, NewOrder), SeedError> {
                let user = users
                    .get(o.user)
                    .ok_or_else(|| SeedError::Data(format!("unknown seed user {}", o.user)))?;
                let course_ids = o
                    .courses
                    .iter()
                    .map(|&i| {
                        courses
                            .get(i)
                            .map(|c| c.id)
                            .ok_or_else(|| SeedError::Data(format!("unknown seed course {}", i)))
                    })
                    .collect::<Result<Vec<Uuid>, SeedError>>()?;
                let purchased_at = seed_date(o.purchased)?;
                let completed_at = (o.status == "completed").then_some(purchased_at);
                let cancelled_at = (o.status == "cancelled").then_some(purchased_at);

                Ok((
                    user.id,
                    NewOrder {
                        courses: course_ids,
                        payment_method: Some(o.payment_method.to_string()),
                        status: Some(o.status.to_string()),
                        payment_status: Some(o.payment_status.to_string()),
                        purchased_at: Some(purchased_at),
                        completed_at,
                        cancelled_at,
                        notes: None,
                    },
                ))
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        let report = self.lifecycle.bulk_insert(records).await;
        for failure in &report.failures {
            warn!(index = failure.index, error = %failure.error, "Seed order rejected");
        }

        let summary = SeedSummary {
            users: user_count,
            courses: course_count,
            orders: report.inserted.len() as u64,
            failed_orders: report.failures.len() as u64,
        };
        info!(
            users = summary.users,
            courses = summary.courses,
            orders = summary.orders,
            failed_orders = summary.failed_orders,
            "Seed data loaded"
        );
        Ok(summary)
    }
}

fn seed_date((year, month, day): (i32, u32, u32)) -> Result<DateTime<Utc>, SeedError> {
    Utc.with_ymd_and_hms(year, month, day, 10, 0, 0)
        .single()
        .ok_or_else(|| SeedError::Data(format!("invalid date {}-{}-{}", year, month, day)))
}
