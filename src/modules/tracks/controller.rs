use axum::extract::{Path, Query, State};
use kaayjang_core::{ApiResponse, AppError, PaginatedResponse, PaginationParams};
use kaayjang_models::TrackId;
use kaayjang_models::classes::ClassSummary;
use kaayjang_models::tracks::{CreateTrackDto, Track, TrackDetails, UpdateTrackDto};
use tracing::instrument;

use crate::metrics::{track_entity_created, track_entity_deleted};
use crate::modules::repository::{Repository, ensure_exists, find_or_404, not_found, parse_id};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/filieres",
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of tracks, newest first", body = PaginatedResponse<Track>)
    ),
    tag = "Filieres"
)]
#[instrument(skip(state))]
pub async fn get_tracks(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<ApiResponse<PaginatedResponse<Track>>, AppError> {
    let page = state.tracks.list_page(&params).await?;
    Ok(ApiResponse::ok(page, "Tracks retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/filieres/{id}",
    params(("id" = String, Path, description = "Track ID")),
    responses(
        (status = 200, description = "Track", body = Track),
        (status = 404, description = "Track not found"),
        (status = 422, description = "Invalid id")
    ),
    tag = "Filieres"
)]
#[instrument(skip(state))]
pub async fn get_track_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Track>, AppError> {
    let id: TrackId = parse_id(id)?;
    let track = find_or_404(&state.tracks, &id).await?;
    Ok(ApiResponse::ok(track, "Track retrieved successfully"))
}

#[utoipa::path(
    post,
    path = "/api/filieres",
    request_body = CreateTrackDto,
    responses(
        (status = 201, description = "Track created successfully", body = Track),
        (status = 400, description = "Label already used or level does not exist"),
        (status = 422, description = "Missing or blank field")
    ),
    tag = "Filieres"
)]
#[instrument(skip(state))]
pub async fn create_track(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateTrackDto>,
) -> Result<ApiResponse<Track>, AppError> {
    let track = state.tracks.insert(dto).await?;
    track_entity_created("track");
    Ok(ApiResponse::created(track, "Track created successfully"))
}

#[utoipa::path(
    put,
    path = "/api/filieres/{id}",
    params(("id" = String, Path, description = "Track ID")),
    request_body = UpdateTrackDto,
    responses(
        (status = 200, description = "Track updated successfully", body = Track),
        (status = 400, description = "Label already used or level does not exist"),
        (status = 404, description = "Track not found"),
        (status = 422, description = "Invalid id or body")
    ),
    tag = "Filieres"
)]
#[instrument(skip(state))]
pub async fn update_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateTrackDto>,
) -> Result<ApiResponse<Track>, AppError> {
    let id: TrackId = parse_id(id)?;
    ensure_exists(&state.tracks, &id).await?;
    let track = state.tracks.update_partial(&id, dto).await?;
    Ok(ApiResponse::ok(track, "Track updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/filieres/{id}",
    params(("id" = String, Path, description = "Track ID")),
    responses(
        (status = 200, description = "Track deleted successfully"),
        (status = 400, description = "Track is still referenced by classes"),
        (status = 404, description = "Track not found")
    ),
    tag = "Filieres"
)]
#[instrument(skip(state))]
pub async fn delete_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let id: TrackId = parse_id(id)?;
    ensure_exists(&state.tracks, &id).await?;
    state.tracks.remove(&id).await?;
    track_entity_deleted("track");
    Ok(ApiResponse::empty("Track deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/api/filieres/libelle/{libelle}",
    params(("libelle" = String, Path, description = "Track label")),
    responses(
        (status = 200, description = "Track with its level and classes", body = TrackDetails),
        (status = 404, description = "Track not found")
    ),
    tag = "Filieres"
)]
#[instrument(skip(state))]
pub async fn get_track_by_label(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Result<ApiResponse<TrackDetails>, AppError> {
    let track = state
        .tracks
        .find_by_label(label.trim())
        .await?
        .ok_or_else(|| not_found("Track"))?;
    Ok(ApiResponse::ok(track, "Track retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/filieres/{id}/details",
    params(("id" = String, Path, description = "Track ID")),
    responses(
        (status = 200, description = "Track with its level and classes", body = TrackDetails),
        (status = 404, description = "Track not found")
    ),
    tag = "Filieres"
)]
#[instrument(skip(state))]
pub async fn get_track_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<TrackDetails>, AppError> {
    let id: TrackId = parse_id(id)?;
    let details = state
        .tracks
        .find_with_relations(&id)
        .await?
        .ok_or_else(|| not_found("Track"))?;
    Ok(ApiResponse::ok(details, "Track retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/filieres/{id}/classes",
    params(("id" = String, Path, description = "Track ID")),
    responses(
        (status = 200, description = "Classes of the track", body = Vec<ClassSummary>),
        (status = 404, description = "Track not found")
    ),
    tag = "Filieres"
)]
#[instrument(skip(state))]
pub async fn get_track_classes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<ClassSummary>>, AppError> {
    let id: TrackId = parse_id(id)?;
    ensure_exists(&state.tracks, &id).await?;
    let classes = state.classes.list_by_track(&id).await?;
    Ok(ApiResponse::ok(classes, "Classes retrieved successfully"))
}
