use serde_json::Value;
use tracing::{info, warn};

use crate::{
    error::AppError,
    students::{
        dto::StudentPayload,
        repo::StudentStore,
        repo_types::{Student, StudentFields},
    },
};

pub const REQUIRED_FIELDS_MESSAGE: &str = "student_code and full_name are required";
pub const NOT_FOUND_MESSAGE: &str = "Student not found";
pub const OPTIONAL_FIELDS_MESSAGE: &str = "email, dob and class_name must be strings";

/// Strings pass through and numbers are rendered as text; `Err` for other JSON types.
fn scalar_text(v: Option<Value>) -> Result<Option<String>, ()> {
    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(()),
    }
}

fn required(v: Option<Value>) -> Option<String> {
    scalar_text(v)
        .ok()
        .flatten()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn optional(v: Option<Value>) -> Result<Option<String>, AppError> {
    let text = scalar_text(v).map_err(|_| AppError::Validation(OPTIONAL_FIELDS_MESSAGE.into()))?;
    Ok(text.filter(|s| !s.trim().is_empty()))
}

impl StudentPayload {
    /// Rejects missing/blank required fields and turns blank optionals into NULL.
    pub fn into_fields(self) -> Result<StudentFields, AppError> {
        let (Some(student_code), Some(full_name)) =
            (required(self.student_code), required(self.full_name))
        else {
            return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.into()));
        };
        Ok(StudentFields {
            student_code,
            full_name,
            email: optional(self.email)?,
            dob: optional(self.dob)?,
            class_name: optional(self.class_name)?,
        })
    }
}

/// Path ids that are not integers can never match a row.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::NotFound(NOT_FOUND_MESSAGE.into()))
}

pub async fn list_students(
    store: &dyn StudentStore,
    q: Option<String>,
) -> Result<Vec<Student>, AppError> {
    let q = q.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    Ok(store.list(q.as_deref()).await?)
}

pub async fn get_student(store: &dyn StudentStore, id: i64) -> Result<Student, AppError> {
    store
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.into()))
}

pub async fn create_student(
    store: &dyn StudentStore,
    fields: StudentFields,
) -> Result<Student, AppError> {
    let res = store.insert(&fields).await.map_err(|e| {
        let e = AppError::from(e);
        if matches!(e, AppError::Conflict(_)) {
            warn!(student_code = %fields.student_code, "duplicate student_code on create");
        }
        e
    })?;
    let id = i64::try_from(res.insert_id)
        .map_err(|_| AppError::Server(format!("generated id {} out of range", res.insert_id)))?;
    let student = store.find(id).await?.ok_or_else(|| {
        AppError::Server(format!("inserted student {id} could not be read back"))
    })?;
    info!(student_id = student.id, "student created");
    Ok(student)
}

pub async fn update_student(
    store: &dyn StudentStore,
    id: i64,
    fields: StudentFields,
) -> Result<Student, AppError> {
    let res = store.update(id, &fields).await.map_err(|e| {
        let e = AppError::from(e);
        if matches!(e, AppError::Conflict(_)) {
            warn!(student_id = id, student_code = %fields.student_code, "duplicate student_code on update");
        }
        e
    })?;
    if res.affected_rows == 0 {
        return Err(AppError::NotFound(NOT_FOUND_MESSAGE.into()));
    }
    let student = get_student(store, id).await?;
    info!(student_id = id, "student updated");
    Ok(student)
}

pub async fn delete_student(store: &dyn StudentStore, id: i64) -> Result<(), AppError> {
    let res = store.delete(id).await?;
    if res.affected_rows == 0 {
        return Err(AppError::NotFound(NOT_FOUND_MESSAGE.into()));
    }
    info!(student_id = id, "student deleted");
    Ok(())
}
