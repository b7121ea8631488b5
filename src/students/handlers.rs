use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{error::AppError, state::AppState};

use super::dto::{DeletedResponse, ListQuery, StudentPayload};
use super::repo_types::Student;
use super::services;

pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/api/students", get(list_students).post(create_student))
        .route(
            "/api/students/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
}

fn body(payload: Result<Json<StudentPayload>, JsonRejection>) -> Result<StudentPayload, AppError> {
    payload
        .map(|Json(p)| p)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

#[instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Student>>, AppError> {
    let rows = services::list_students(state.students.as_ref(), query.q).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, AppError> {
    let id = services::parse_id(&id)?;
    let student = services::get_student(state.students.as_ref(), id).await?;
    Ok(Json(student))
}

#[instrument(skip(state, payload))]
pub async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let fields = body(payload)?.into_fields()?;
    let student = services::create_student(state.students.as_ref(), fields).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

#[instrument(skip(state, payload))]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<Json<Student>, AppError> {
    // Field validation runs before the id is looked at.
    let fields = body(payload)?.into_fields()?;
    let id = services::parse_id(&id)?;
    let student = services::update_student(state.students.as_ref(), id, fields).await?;
    Ok(Json(student))
}

#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = services::parse_id(&id)?;
    services::delete_student(state.students.as_ref(), id).await?;
    Ok(Json(DeletedResponse { ok: true }))
}
