use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_class, delete_class, get_class_by_code, get_class_by_id, get_class_details,
    get_class_statistics, get_class_students, get_classes, update_class,
};

pub fn init_classes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_classes).post(create_class))
        .route("/code/{code}", get(get_class_by_code))
        .route("/statistics", get(get_class_statistics))
        .route(
            "/{id}",
            get(get_class_by_id).put(update_class).delete(delete_class),
        )
        .route("/{id}/details", get(get_class_details))
        .route("/{id}/etudiants", get(get_class_students))
}
