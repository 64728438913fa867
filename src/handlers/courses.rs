use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::MessageResponse;
use crate::domain::Course;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::AuthUser;
use crate::ports::RepositoryError;
use crate::validation::{
    sanitize_string, validate_max_len, validate_non_negative, validate_rating, validate_required,
    ValidationResult, TITLE_MAX_LEN,
};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub grade_level: String,
    #[schema(value_type = String, example = "49.99")]
    pub price: BigDecimal,
    pub duration: String,
    pub tags: Vec<String>,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            subject: course.subject,
            grade_level: course.grade_level,
            price: course.price,
            duration: course.duration,
            tags: course.tags,
            rating: course.rating,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub grade_level: String,
    #[serde(deserialize_with = "decimal")]
    #[schema(value_type = String, example = "49.99")]
    pub price: BigDecimal,
    pub duration: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rating: f64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    #[serde(default, deserialize_with = "optional_decimal")]
    #[schema(value_type = Option<String>, example = "49.99")]
    pub price: Option<BigDecimal>,
    pub duration: Option<String>,
    pub tags: Option<Vec<String>>,
    pub rating: Option<f64>,
}

/// Accepts a JSON number or a numeric string without going through `f64`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalInput {
    Number(serde_json::Number),
    Text(String),
}

impl DecimalInput {
    fn parse<E: serde::de::Error>(self) -> Result<BigDecimal, E> {
        let raw = match self {
            DecimalInput::Number(n) => n.to_string(),
            DecimalInput::Text(s) => s,
        };
        BigDecimal::from_str(raw.trim()).map_err(|_| E::custom(format!("invalid amount '{}'", raw)))
    }
}

fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
    DecimalInput::deserialize(deserializer)?.parse()
}

fn optional_decimal<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<BigDecimal>, D::Error> {
    Option::<DecimalInput>::deserialize(deserializer)?
        .map(DecimalInput::parse)
        .transpose()
}

fn validate_course(course: &Course) -> ValidationResult {
    validate_required("title", &course.title)?;
    validate_max_len("title", &course.title, TITLE_MAX_LEN)?;
    validate_required("description", &course.description)?;
    validate_required("subject", &course.subject)?;
    validate_required("gradeLevel", &course.grade_level)?;
    validate_required("duration", &course.duration)?;
    validate_non_negative("price", &course.price)?;
    validate_rating(course.rating)
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.iter()
        .map(|t| sanitize_string(t))
        .filter(|t| !t.is_empty())
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/courses",
    responses((status = 200, description = "All courses", body = [CourseResponse])),
    tag = "Courses"
)]
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, AppError> {
    let courses = state.courses.list().await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course", body = CourseResponse),
        (status = 404, description = "Course not found")
    ),
    tag = "Courses"
)]
pub async fn get_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<CourseResponse>, AppError> {
    let course = state
        .courses
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    Ok(Json(course.into()))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "Courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(payload): ApiJson<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), AppError> {
    let course = Course::new(
        sanitize_string(&payload.title),
        payload.description.trim().to_string(),
        sanitize_string(&payload.subject),
        sanitize_string(&payload.grade_level),
        payload.price,
        sanitize_string(&payload.duration),
        clean_tags(payload.tags),
        payload.rating,
    );
    validate_course(&course)?;

    let course = state.courses.insert(&course).await?;
    tracing::info!(course_id = %course.id, price = %course.price, "Course created");

    Ok((StatusCode::CREATED, Json(course.into())))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer" = [])),
    tag = "Courses"
)]
pub async fn update_course(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>, AppError> {
    let mut course = state
        .courses
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    if let Some(title) = payload.title {
        course.title = sanitize_string(&title);
    }
    if let Some(description) = payload.description {
        course.description = description.trim().to_string();
    }
    if let Some(subject) = payload.subject {
        course.subject = sanitize_string(&subject);
    }
    if let Some(grade_level) = payload.grade_level {
        course.grade_level = sanitize_string(&grade_level);
    }
    if let Some(price) = payload.price {
        course.price = price;
    }
    if let Some(duration) = payload.duration {
        course.duration = sanitize_string(&duration);
    }
    if let Some(tags) = payload.tags {
        course.tags = clean_tags(tags);
    }
    if let Some(rating) = payload.rating {
        course.rating = rating;
    }
    course.updated_at = Utc::now();
    validate_course(&course)?;

    // Existing orders keep their stored totals; only later saves see the new price.
    let course = state.courses.update(&course).await.map_err(|e| match e {
        RepositoryError::NotFound(_) => AppError::NotFound("Course not found".to_string()),
        other => other.into(),
    })?;
    tracing::info!(course_id = %course.id, price = %course.price, "Course updated");

    Ok(Json(course.into()))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 404, description = "Course not found")
    ),
    security(("bearer" = [])),
    tag = "Courses"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.courses.delete(id).await? {
        return Err(AppError::NotFound("Course not found".to_string()));
    }
    tracing::info!(course_id = %id, "Course deleted");

    Ok(Json(MessageResponse {
        message: "Course deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn price_accepts_number_or_string() {
        let from_number: CreateCourseRequest = serde_json::from_value(json!({
            "title": "T", "description": "D", "subject": "S",
            "gradeLevel": "G", "price": 49.99, "duration": "1 week"
        }))
        .unwrap();
        assert_eq!(from_number.price, "49.99".parse::<BigDecimal>().unwrap());
        assert!(from_number.tags.is_empty());
        assert_eq!(from_number.rating, 0.0);

        let from_text: UpdateCourseRequest =
            serde_json::from_value(json!({ "price": "19.95" })).unwrap();
        assert_eq!(from_text.price, Some("19.95".parse::<BigDecimal>().unwrap()));

        let absent: UpdateCourseRequest = serde_json::from_value(json!({})).unwrap();
        assert!(absent.price.is_none());
    }

    #[test]
    fn rejects_negative_price_and_bad_rating() {
        let mut course = Course::new(
            "T".into(),
            "D".into(),
            "S".into(),
            "G".into(),
            BigDecimal::from(-1),
            "1 week".into(),
            vec![],
            0.0,
        );
        assert!(validate_course(&course).is_err());

        course.price = BigDecimal::from(0);
        course.rating = 5.5;
        assert!(validate_course(&course).is_err());

        course.rating = 5.0;
        assert!(validate_course(&course).is_ok());
    }
}
