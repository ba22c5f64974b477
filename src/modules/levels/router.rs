use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_level, delete_level, get_level_by_id, get_level_by_label, get_level_classes,
    get_level_details, get_level_tracks, get_levels, update_level,
};

pub fn init_levels_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_levels).post(create_level))
        .route("/libelle/{libelle}", get(get_level_by_label))
        .route(
            "/{id}",
            get(get_level_by_id).put(update_level).delete(delete_level),
        )
        .route("/{id}/details", get(get_level_details))
        .route("/{id}/filieres", get(get_level_tracks))
        .route("/{id}/classes", get(get_level_classes))
}
