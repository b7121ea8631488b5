use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub student_code: String,
    pub full_name: String,
    pub email: Option<String>,
    pub dob: Option<String>,
    pub class_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated, normalized field set written by both insert and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentFields {
    pub student_code: String,
    pub full_name: String,
    pub email: Option<String>,
    pub dob: Option<String>,
    pub class_name: Option<String>,
}
