use axum::extract::{Path, Query, State};
use kaayjang_core::{ApiResponse, AppError, PaginatedResponse};
use kaayjang_models::StudentId;
use kaayjang_models::students::{
    CreateStudentDto, Student, StudentSearchParams, StudentWithClass, UpdateStudentDto,
};
use tracing::instrument;

use crate::metrics::{track_entity_created, track_entity_deleted};
use crate::modules::repository::{Repository, ensure_exists, find_or_404, not_found, parse_id};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/etudiants",
    params(StudentSearchParams),
    responses(
        (status = 200, description = "Page of students with their class, newest first", body = PaginatedResponse<StudentWithClass>)
    ),
    tag = "Etudiants"
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    Query(params): Query<StudentSearchParams>,
) -> Result<ApiResponse<PaginatedResponse<StudentWithClass>>, AppError> {
    let page = state
        .students
        .search(params.term(), &params.pagination)
        .await?;
    Ok(ApiResponse::ok(page, "Students retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/etudiants/{id}",
    params(("id" = String, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student", body = Student),
        (status = 404, description = "Student not found"),
        (status = 422, description = "Invalid id")
    ),
    tag = "Etudiants"
)]
#[instrument(skip(state))]
pub async fn get_student_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Student>, AppError> {
    let id: StudentId = parse_id(id)?;
    let student = find_or_404(&state.students, &id).await?;
    Ok(ApiResponse::ok(student, "Student retrieved successfully"))
}

#[utoipa::path(
    post,
    path = "/api/etudiants",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created successfully", body = Student),
        (status = 400, description = "Matricule already used or class does not exist"),
        (status = 422, description = "Missing, blank or malformed field")
    ),
    tag = "Etudiants"
)]
#[instrument(skip(state))]
pub async fn create_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<ApiResponse<Student>, AppError> {
    let student = state.students.insert(dto).await?;
    track_entity_created("student");
    Ok(ApiResponse::created(student, "Student created successfully"))
}

#[utoipa::path(
    put,
    path = "/api/etudiants/{id}",
    params(("id" = String, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated successfully", body = Student),
        (status = 400, description = "Matricule already used or class does not exist"),
        (status = 404, description = "Student not found"),
        (status = 422, description = "Invalid id or body")
    ),
    tag = "Etudiants"
)]
#[instrument(skip(state))]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<ApiResponse<Student>, AppError> {
    let id: StudentId = parse_id(id)?;
    ensure_exists(&state.students, &id).await?;
    let student = state.students.update_partial(&id, dto).await?;
    Ok(ApiResponse::ok(student, "Student updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/etudiants/{id}",
    params(("id" = String, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deleted successfully"),
        (status = 404, description = "Student not found")
    ),
    tag = "Etudiants"
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let id: StudentId = parse_id(id)?;
    ensure_exists(&state.students, &id).await?;
    state.students.remove(&id).await?;
    track_entity_deleted("student");
    Ok(ApiResponse::empty("Student deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/api/etudiants/matricule/{matricule}",
    params(("matricule" = String, Path, description = "Student matricule")),
    responses(
        (status = 200, description = "Student with class", body = StudentWithClass),
        (status = 404, description = "Student not found")
    ),
    tag = "Etudiants"
)]
#[instrument(skip(state))]
pub async fn get_student_by_matricule(
    State(state): State<AppState>,
    Path(matricule): Path<String>,
) -> Result<ApiResponse<StudentWithClass>, AppError> {
    let student = state
        .students
        .find_by_matricule(matricule.trim())
        .await?
        .ok_or_else(|| not_found("Student"))?;
    Ok(ApiResponse::ok(student, "Student retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/etudiants/{id}/details",
    params(("id" = String, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student with class, level and track", body = StudentWithClass),
        (status = 404, description = "Student not found")
    ),
    tag = "Etudiants"
)]
#[instrument(skip(state))]
pub async fn get_student_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<StudentWithClass>, AppError> {
    let id: StudentId = parse_id(id)?;
    let student = state
        .students
        .find_with_class(&id)
        .await?
        .ok_or_else(|| not_found("Student"))?;
    Ok(ApiResponse::ok(student, "Student retrieved successfully"))
}
