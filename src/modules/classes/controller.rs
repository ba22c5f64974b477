use axum::extract::{Path, Query, State};
use kaayjang_core::{ApiResponse, AppError, PaginatedResponse, PaginationParams};
use kaayjang_models::ClassId;
use kaayjang_models::classes::{Class, ClassDetails, ClassStatistics, CreateClassDto, UpdateClassDto};
use kaayjang_models::students::StudentWithClass;
use tracing::instrument;

use crate::metrics::{track_entity_created, track_entity_deleted};
use crate::modules::repository::{Repository, ensure_exists, find_or_404, not_found, parse_id};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/classes",
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of classes, newest first", body = PaginatedResponse<Class>)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_classes(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<ApiResponse<PaginatedResponse<Class>>, AppError> {
    let page = state.classes.list_page(&params).await?;
    Ok(ApiResponse::ok(page, "Classes retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class", body = Class),
        (status = 404, description = "Class not found"),
        (status = 422, description = "Invalid id")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_class_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Class>, AppError> {
    let id: ClassId = parse_id(id)?;
    let class = find_or_404(&state.classes, &id).await?;
    Ok(ApiResponse::ok(class, "Class retrieved successfully"))
}

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created successfully", body = Class),
        (status = 400, description = "Code already used, or track outside the level"),
        (status = 422, description = "Missing or blank field")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn create_class(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<ApiResponse<Class>, AppError> {
    let class = state.classes.insert(dto).await?;
    track_entity_created("class");
    Ok(ApiResponse::created(class, "Class created successfully"))
}

#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    params(("id" = String, Path, description = "Class ID")),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated successfully", body = Class),
        (status = 400, description = "Code already used, or track outside the level"),
        (status = 404, description = "Class not found"),
        (status = 422, description = "Invalid id or body")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<ApiResponse<Class>, AppError> {
    let id: ClassId = parse_id(id)?;
    ensure_exists(&state.classes, &id).await?;
    let class = state.classes.update_partial(&id, dto).await?;
    Ok(ApiResponse::ok(class, "Class updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class deleted successfully"),
        (status = 400, description = "Class still has enrolled students"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let id: ClassId = parse_id(id)?;
    ensure_exists(&state.classes, &id).await?;
    state.classes.remove(&id).await?;
    track_entity_deleted("class");
    Ok(ApiResponse::empty("Class deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/api/classes/code/{code}",
    params(("code" = String, Path, description = "Class code")),
    responses(
        (status = 200, description = "Class with level, track and students", body = ClassDetails),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_class_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<ApiResponse<ClassDetails>, AppError> {
    let class = state
        .classes
        .find_by_code(code.trim())
        .await?
        .ok_or_else(|| not_found("Class"))?;
    Ok(ApiResponse::ok(class, "Class retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/classes/statistics",
    responses(
        (status = 200, description = "Class counts per level and per track", body = ClassStatistics)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_class_statistics(
    State(state): State<AppState>,
) -> Result<ApiResponse<ClassStatistics>, AppError> {
    let stats = state.classes.statistics().await?;
    Ok(ApiResponse::ok(stats, "Statistics retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}/details",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class with level, track and students", body = ClassDetails),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_class_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ClassDetails>, AppError> {
    let id: ClassId = parse_id(id)?;
    let details = state
        .classes
        .find_with_relations(&id)
        .await?
        .ok_or_else(|| not_found("Class"))?;
    Ok(ApiResponse::ok(details, "Class retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}/etudiants",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Students of the class by name", body = Vec<StudentWithClass>),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_class_students(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<StudentWithClass>>, AppError> {
    let id: ClassId = parse_id(id)?;
    ensure_exists(&state.classes, &id).await?;
    let students = state.students.list_by_class(&id).await?;
    Ok(ApiResponse::ok(students, "Students retrieved successfully"))
}
