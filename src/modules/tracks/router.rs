use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_track, delete_track, get_track_by_id, get_track_by_label, get_track_classes,
    get_track_details, get_tracks, update_track,
};

pub fn init_tracks_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_tracks).post(create_track))
        .route("/libelle/{libelle}", get(get_track_by_label))
        .route(
            "/{id}",
            get(get_track_by_id).put(update_track).delete(delete_track),
        )
        .route("/{id}/details", get(get_track_details))
        .route("/{id}/classes", get(get_track_classes))
}
