// ============================================================================
// Registrar API - Student Handlers
// File: crates/registrar-api/src/handlers/students.rs
// ============================================================================
//! Student CRUD handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use registrar_core::services::{CreateStudentCommand, UpdateStudentCommand};
use registrar_core::DomainError;
use registrar_shared::constants::{IDEMPOTENCY_KEY_HEADER, IDEMPOTENT_REPLAYED_HEADER};
use registrar_shared::utils::first_non_empty;

use crate::dto::{CreateStudentRequest, StudentResponse, UpdateStudentRequest};
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Header key first, then the body field. A header that is not visible
/// ASCII is rejected rather than ignored.
fn resolve_idempotency_key(
    headers: &HeaderMap,
    body_key: Option<String>,
) -> Result<Option<String>, ApiError> {
    let header_key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .map(|value| {
            value.to_str().map_err(|_| {
                ApiError::BadRequest("Idempotency-Key header must be visible ASCII".to_string())
            })
        })
        .transpose()?;

    Ok(first_non_empty([header_key, body_key.as_deref()]).map(str::to_string))
}

fn parse_student_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid student id: {}", raw)))
}

/// Stored status on replay, flagged with the replay header.
fn command_response<T: Serialize>(
    status_code: u16,
    replayed: bool,
    data: T,
) -> Result<Response, ApiError> {
    let status = StatusCode::from_u16(status_code)
        .map_err(|_| ApiError::Internal(format!("Invalid stored status code: {}", status_code)))?;

    let mut response = (status, Json(ApiResponse::success(data))).into_response();
    if replayed {
        response
            .headers_mut()
            .insert(IDEMPOTENT_REPLAYED_HEADER, HeaderValue::from_static("true"));
    }
    Ok(response)
}

/// Create handler - POST /api/v1/students
pub async fn create_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(mut payload) = payload?;
    payload.idempotency_key = resolve_idempotency_key(&headers, payload.idempotency_key.take())?;
    payload.validate()?;

    let outcome = state
        .students
        .create_student(CreateStudentCommand::from(payload))
        .await?;
    debug!(replayed = outcome.replayed, "Create student handled");

    command_response(
        outcome.status_code,
        outcome.replayed,
        StudentResponse::from(outcome.result.result),
    )
}

/// List handler - GET /api/v1/students
pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<StudentResponse>>>, ApiError> {
    let list = state.students.find_all_student().await?;

    Ok(Json(ApiResponse::success(
        list.result.into_iter().map(StudentResponse::from).collect(),
    )))
}

/// Lookup handler - GET /api/v1/students/{id}
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<StudentResponse>>, ApiError> {
    let id = parse_student_id(&id)?;
    let found = state.students.find_student_by_id(id).await?;

    Ok(Json(ApiResponse::success(StudentResponse::from(found.result))))
}

/// Update handler - PUT /api/v1/students
pub async fn update_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpdateStudentRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(mut payload) = payload?;
    payload.idempotency_key = resolve_idempotency_key(&headers, payload.idempotency_key.take())?;
    payload.validate()?;

    let outcome = state
        .students
        .update_student(UpdateStudentCommand::from(payload))
        .await
        .map_err(|e| match e {
            // Updating a missing student is a client error, not a lookup miss
            DomainError::StudentNotFound(_) => ApiError::BadRequest(e.to_string()),
            other => other.into(),
        })?;
    debug!(replayed = outcome.replayed, "Update student handled");

    command_response(
        outcome.status_code,
        outcome.replayed,
        StudentResponse::from(outcome.result.result),
    )
}

/// Delete handler - DELETE /api/v1/students/{id}
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_student_id(&id)?;
    state.students.delete_student(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
