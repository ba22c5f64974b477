mod common;

use axum::http::StatusCode;
use common::{create_class, create_level, create_track, get, lazy_pool, send, setup_test_app};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_create_level(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(&app, "POST", "/api/niveaux", Some(json!({"libelle": " 6ème "}))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Level created successfully");
    assert_eq!(body["data"]["libelle"], "6ème");
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["createdAt"].is_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_label_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool);
    create_level(&app, "6ème").await;

    let (status, body) = send(&app, "POST", "/api/niveaux", Some(json!({"libelle": "6ème"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("6ème"));
}

#[tokio::test]
async fn test_blank_label_is_unprocessable() {
    let app = setup_test_app(lazy_pool());

    let (status, body) = send(&app, "POST", "/api/niveaux", Some(json!({"libelle": "  "}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "libelle is required");

    let (status, body) = send(&app, "POST", "/api/niveaux", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "libelle is required");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_levels_paginates_newest_first(pool: PgPool) {
    let app = setup_test_app(pool);
    let first = create_level(&app, "6ème").await;
    let second = create_level(&app, "5ème").await;

    let (status, body) = get(&app, "/api/niveaux?page=1&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["totalPages"], 2);
    assert_eq!(body["data"]["data"][0]["id"], second.as_str());

    let (_, body) = get(&app, "/api/niveaux?page=2&limit=1").await;
    assert_eq!(body["data"]["page"], 2);
    assert_eq!(body["data"]["limit"], 1);
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["data"][0]["id"], first.as_str());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_levels_lenient_query(pool: PgPool) {
    let app = setup_test_app(pool);
    create_level(&app, "6ème").await;

    let (status, body) = get(&app, "/api/niveaux?page=abc&limit=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["limit"], 10);

    let (_, body) = get(&app, "/api/niveaux?limit=1000").await;
    assert_eq!(body["data"]["limit"], 100);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_levels_far_past_the_end(pool: PgPool) {
    let app = setup_test_app(pool);
    create_level(&app, "6ème").await;

    let (status, body) = get(&app, "/api/niveaux?page=9223372036854775807&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page"], i64::MAX);
    assert_eq!(body["data"]["total"], 1);
    assert!(body["data"]["data"].as_array().unwrap().is_empty());

    let (status, body) = get(&app, "/api/etudiants?search=x&page=9223372036854775807").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_update_delete_level(pool: PgPool) {
    let app = setup_test_app(pool);
    let id = create_level(&app, "6ème").await;

    let (status, body) = get(&app, &format!("/api/niveaux/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["libelle"], "6ème");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/niveaux/{}", id),
        Some(json!({"libelle": "Sixième"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["libelle"], "Sixième");
    assert_eq!(body["message"], "Level updated successfully");

    let (status, body) = send(&app, "DELETE", &format!("/api/niveaux/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());

    let (status, body) = get(&app, &format!("/api/niveaux/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Level not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_and_delete_missing_level(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/niveaux/does-not-exist",
        Some(json!({"libelle": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Level not found");

    let (status, _) = send(&app, "DELETE", "/api/niveaux/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_id_is_unprocessable() {
    let app = setup_test_app(lazy_pool());

    let (status, body) = get(&app, "/api/niveaux/%20").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Invalid id");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_referenced_level_conflicts(pool: PgPool) {
    let app = setup_test_app(pool);
    let id = create_level(&app, "6ème").await;
    create_track(&app, "Lettres", &id).await;

    let (status, body) = send(&app, "DELETE", &format!("/api/niveaux/{}", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_level_relations(pool: PgPool) {
    let app = setup_test_app(pool);
    let level_id = create_level(&app, "6ème").await;
    let track_id = create_track(&app, "Lettres", &level_id).await;
    create_class(&app, "6A", &level_id, &track_id).await;

    let (status, body) = get(&app, "/api/niveaux/libelle/6%C3%A8me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], level_id.as_str());

    let (status, body) = get(&app, &format!("/api/niveaux/{}/details", level_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["filieres"][0]["libelle"], "Lettres");
    assert_eq!(body["data"]["classes"][0]["code"], "6A");
    assert_eq!(body["data"]["classes"][0]["filiere"]["libelle"], "Lettres");

    let (status, body) = get(&app, &format!("/api/niveaux/{}/filieres", level_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["classesCount"], 1);
    assert_eq!(body["data"][0]["niveau"]["libelle"], "6ème");

    let (status, body) = get(&app, &format!("/api/niveaux/{}/classes", level_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["code"], "6A");
    assert_eq!(body["data"][0]["etudiantsCount"], 0);

    let (status, _) = get(&app, "/api/niveaux/missing/filieres").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
