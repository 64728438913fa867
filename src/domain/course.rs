use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Catalog item. `price` is what orders are priced against at save time.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub grade_level: String,
    pub price: BigDecimal,
    pub duration: String,
    pub tags: Vec<String>,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn new(
        title: String,
        description: String,
        subject: String,
        grade_level: String,
        price: BigDecimal,
        duration: String,
        tags: Vec<String>,
        rating: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            subject,
            grade_level,
            price,
            duration,
            tags,
            rating,
            created_at: now,
            updated_at: now,
        }
    }
}
