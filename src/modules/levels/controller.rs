use axum::extract::{Path, Query, State};
use kaayjang_core::{ApiResponse, AppError, PaginatedResponse, PaginationParams};
use kaayjang_models::LevelId;
use kaayjang_models::classes::ClassSummary;
use kaayjang_models::levels::{CreateLevelDto, Level, LevelDetails, UpdateLevelDto};
use kaayjang_models::tracks::TrackSummary;
use tracing::instrument;

use crate::metrics::{track_entity_created, track_entity_deleted};
use crate::modules::repository::{Repository, ensure_exists, find_or_404, not_found, parse_id};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/niveaux",
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of levels, newest first", body = PaginatedResponse<Level>)
    ),
    tag = "Niveaux"
)]
#[instrument(skip(state))]
pub async fn get_levels(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<ApiResponse<PaginatedResponse<Level>>, AppError> {
    let page = state.levels.list_page(&params).await?;
    Ok(ApiResponse::ok(page, "Levels retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/niveaux/{id}",
    params(("id" = String, Path, description = "Level ID")),
    responses(
        (status = 200, description = "Level", body = Level),
        (status = 404, description = "Level not found"),
        (status = 422, description = "Invalid id")
    ),
    tag = "Niveaux"
)]
#[instrument(skip(state))]
pub async fn get_level_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Level>, AppError> {
    let id: LevelId = parse_id(id)?;
    let level = find_or_404(&state.levels, &id).await?;
    Ok(ApiResponse::ok(level, "Level retrieved successfully"))
}

#[utoipa::path(
    post,
    path = "/api/niveaux",
    request_body = CreateLevelDto,
    responses(
        (status = 201, description = "Level created successfully", body = Level),
        (status = 400, description = "Label already used"),
        (status = 422, description = "Missing or blank libelle")
    ),
    tag = "Niveaux"
)]
#[instrument(skip(state))]
pub async fn create_level(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateLevelDto>,
) -> Result<ApiResponse<Level>, AppError> {
    let level = state.levels.insert(dto).await?;
    track_entity_created("level");
    Ok(ApiResponse::created(level, "Level created successfully"))
}

#[utoipa::path(
    put,
    path = "/api/niveaux/{id}",
    params(("id" = String, Path, description = "Level ID")),
    request_body = UpdateLevelDto,
    responses(
        (status = 200, description = "Level updated successfully", body = Level),
        (status = 400, description = "Label already used"),
        (status = 404, description = "Level not found"),
        (status = 422, description = "Invalid id or body")
    ),
    tag = "Niveaux"
)]
#[instrument(skip(state))]
pub async fn update_level(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateLevelDto>,
) -> Result<ApiResponse<Level>, AppError> {
    let id: LevelId = parse_id(id)?;
    ensure_exists(&state.levels, &id).await?;
    let level = state.levels.update_partial(&id, dto).await?;
    Ok(ApiResponse::ok(level, "Level updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/niveaux/{id}",
    params(("id" = String, Path, description = "Level ID")),
    responses(
        (status = 200, description = "Level deleted successfully"),
        (status = 400, description = "Level is still referenced"),
        (status = 404, description = "Level not found")
    ),
    tag = "Niveaux"
)]
#[instrument(skip(state))]
pub async fn delete_level(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let id: LevelId = parse_id(id)?;
    ensure_exists(&state.levels, &id).await?;
    state.levels.remove(&id).await?;
    track_entity_deleted("level");
    Ok(ApiResponse::empty("Level deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/api/niveaux/libelle/{libelle}",
    params(("libelle" = String, Path, description = "Level label")),
    responses(
        (status = 200, description = "Level", body = Level),
        (status = 404, description = "Level not found")
    ),
    tag = "Niveaux"
)]
#[instrument(skip(state))]
pub async fn get_level_by_label(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Result<ApiResponse<Level>, AppError> {
    let level = state
        .levels
        .find_by_label(label.trim())
        .await?
        .ok_or_else(|| not_found("Level"))?;
    Ok(ApiResponse::ok(level, "Level retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/niveaux/{id}/details",
    params(("id" = String, Path, description = "Level ID")),
    responses(
        (status = 200, description = "Level with its tracks and classes", body = LevelDetails),
        (status = 404, description = "Level not found")
    ),
    tag = "Niveaux"
)]
#[instrument(skip(state))]
pub async fn get_level_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<LevelDetails>, AppError> {
    let id: LevelId = parse_id(id)?;
    let details = state
        .levels
        .find_with_relations(&id)
        .await?
        .ok_or_else(|| not_found("Level"))?;
    Ok(ApiResponse::ok(details, "Level retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/niveaux/{id}/filieres",
    params(("id" = String, Path, description = "Level ID")),
    responses(
        (status = 200, description = "Tracks of the level", body = Vec<TrackSummary>),
        (status = 404, description = "Level not found")
    ),
    tag = "Niveaux"
)]
#[instrument(skip(state))]
pub async fn get_level_tracks(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<TrackSummary>>, AppError> {
    let id: LevelId = parse_id(id)?;
    ensure_exists(&state.levels, &id).await?;
    let tracks = state.tracks.list_by_level(&id).await?;
    Ok(ApiResponse::ok(tracks, "Tracks retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/niveaux/{id}/classes",
    params(("id" = String, Path, description = "Level ID")),
    responses(
        (status = 200, description = "Classes of the level", body = Vec<ClassSummary>),
        (status = 404, description = "Level not found")
    ),
    tag = "Niveaux"
)]
#[instrument(skip(state))]
pub async fn get_level_classes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<ClassSummary>>, AppError> {
    let id: LevelId = parse_id(id)?;
    ensure_exists(&state.levels, &id).await?;
    let classes = state.classes.list_by_level(&id).await?;
    Ok(ApiResponse::ok(classes, "Classes retrieved successfully"))
}
