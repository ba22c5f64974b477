use std::collections::HashMap;

use async_trait::async_trait;
use kaayjang_core::{PaginatedResponse, PaginationParams, ServiceError, ServiceResult};
use kaayjang_models::classes::{Class, ClassWithTrack};
use kaayjang_models::levels::{CreateLevelDto, Level, LevelDetails, UpdateLevelDto};
use kaayjang_models::tracks::Track;
use kaayjang_models::{LevelId, TrackId};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::repository::Repository;
use crate::modules::tracks::service::tracks_by_ids;

const LEVEL_COLUMNS: &str = "id, label, created_at, updated_at";

fn duplicate_label(label: &str) -> String {
    format!("Level with label \"{}\" already exists", label)
}

#[derive(Clone, Debug)]
pub struct LevelService {
    db: PgPool,
}

impl LevelService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Advisory check; the `levels_label_key` constraint has the final word.
    async fn ensure_unique_label(&self, label: &str, exclude: Option<&LevelId>) -> ServiceResult<()> {
        let existing: Option<LevelId> =
            sqlx::query_scalar("SELECT id FROM levels WHERE label = $1")
                .bind(label)
                .fetch_optional(&self.db)
                .await?;

        match existing {
            Some(id) if Some(&id) != exclude => Err(ServiceError::conflict(duplicate_label(label))),
            _ => Ok(()),
        }
    }

    #[instrument(skip(self))]
    pub async fn find_by_label(&self, label: &str) -> ServiceResult<Option<Level>> {
        let level = sqlx::query_as::<_, Level>(&format!(
            "SELECT {} FROM levels WHERE label = $1",
            LEVEL_COLUMNS
        ))
        .bind(label)
        .fetch_optional(&self.db)
        .await?;

        Ok(level)
    }

    /// The level with its tracks and its classes, each class with its track.
    #[instrument(skip(self))]
    pub async fn find_with_relations(&self, id: &LevelId) -> ServiceResult<Option<LevelDetails>> {
        let Some(level) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let (filieres, classes) = tokio::try_join!(
            sqlx::query_as::<_, Track>(
                "SELECT id, label, level_id, created_at, updated_at
                 FROM tracks WHERE level_id = $1 ORDER BY label ASC",
            )
            .bind(id)
            .fetch_all(&self.db),
            sqlx::query_as::<_, Class>(
                "SELECT id, code, label, level_id, track_id, created_at, updated_at
                 FROM classes WHERE level_id = $1 ORDER BY code ASC",
            )
            .bind(id)
            .fetch_all(&self.db),
        )?;

        let track_ids: Vec<TrackId> = classes.iter().map(|c| c.track_id.clone()).collect();
        let tracks = tracks_by_ids(&self.db, &track_ids).await?;

        let classes = classes
            .into_iter()
            .map(|class| {
                let filiere = tracks
                    .get(&class.track_id)
                    .cloned()
                    .ok_or(ServiceError::Database(sqlx::Error::RowNotFound))?;
                Ok(ClassWithTrack { class, filiere })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(Some(LevelDetails {
            level,
            filieres,
            classes,
        }))
    }
}

#[async_trait]
impl Repository for LevelService {
    type Id = LevelId;
    type Entity = Level;
    type CreateDto = CreateLevelDto;
    type UpdateDto = UpdateLevelDto;

    const RESOURCE: &'static str = "Level";

    #[instrument(skip(self))]
    async fn list_page(&self, params: &PaginationParams) -> ServiceResult<PaginatedResponse<Level>> {
        let page_sql = format!(
            "SELECT {} FROM levels ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            LEVEL_COLUMNS
        );
        let (levels, total) = tokio::try_join!(
            sqlx::query_as::<_, Level>(&page_sql)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.db),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM levels").fetch_one(&self.db),
        )?;

        Ok(PaginatedResponse::new(levels, total, params))
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &LevelId) -> ServiceResult<Option<Level>> {
        let level = sqlx::query_as::<_, Level>(&format!(
            "SELECT {} FROM levels WHERE id = $1",
            LEVEL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(level)
    }

    #[instrument(skip(self))]
    async fn insert(&self, dto: CreateLevelDto) -> ServiceResult<Level> {
        self.ensure_unique_label(&dto.label, None).await?;

        sqlx::query_as::<_, Level>(&format!(
            "INSERT INTO levels (label) VALUES ($1) RETURNING {}",
            LEVEL_COLUMNS
        ))
        .bind(&dto.label)
        .fetch_one(&self.db)
        .await
        .map_err(|e| ServiceError::from_db(e, &duplicate_label(&dto.label), "Level does not exist"))
    }

    #[instrument(skip(self))]
    async fn update_partial(&self, id: &LevelId, dto: UpdateLevelDto) -> ServiceResult<Level> {
        if let Some(label) = &dto.label {
            self.ensure_unique_label(label, Some(id)).await?;
        }

        sqlx::query_as::<_, Level>(&format!(
            "UPDATE levels
             SET label = COALESCE($2, label), updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            LEVEL_COLUMNS
        ))
        .bind(id)
        .bind(&dto.label)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            let label = dto.label.as_deref().unwrap_or_default();
            ServiceError::from_db(e, &duplicate_label(label), "Level does not exist")
        })?
        .ok_or_else(|| ServiceError::not_found("Level not found"))
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: &LevelId) -> ServiceResult<Level> {
        sqlx::query_as::<_, Level>(&format!(
            "DELETE FROM levels WHERE id = $1 RETURNING {}",
            LEVEL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            ServiceError::from_delete(e, "Level is still referenced by tracks or classes")
        })?
        .ok_or_else(|| ServiceError::not_found("Level not found"))
    }

    #[instrument(skip(self))]
    async fn exists_by_id(&self, id: &LevelId) -> ServiceResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM levels WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await?;

        Ok(exists)
    }
}

/// Loads the given levels keyed by id. Unknown ids are skipped.
pub(crate) async fn levels_by_ids(
    db: &PgPool,
    ids: &[LevelId],
) -> ServiceResult<HashMap<LevelId, Level>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let levels = sqlx::query_as::<_, Level>(&format!(
        "SELECT {} FROM levels WHERE id = ANY($1)",
        LEVEL_COLUMNS
    ))
    .bind(ids)
    .fetch_all(db)
    .await?;

    Ok(levels.into_iter().map(|l| (l.id.clone(), l)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto(label: &str) -> CreateLevelDto {
        CreateLevelDto {
            label: label.to_string(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_insert_and_get(pool: PgPool) {
        let service = LevelService::new(pool);

        let level = service.insert(create_dto("6ème")).await.unwrap();
        assert_eq!(level.label, "6ème");
        assert!(!level.id.as_str().is_empty());

        let found = service.get_by_id(&level.id).await.unwrap();
        assert_eq!(found, Some(level));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_insert_duplicate_label_conflicts(pool: PgPool) {
        let service = LevelService::new(pool);
        service.insert(create_dto("6ème")).await.unwrap();

        let err = service.insert(create_dto("6ème")).await.unwrap_err();
        match err {
            ServiceError::Conflict(msg) => {
                assert_eq!(msg, "Level with label \"6ème\" already exists")
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_keeps_own_label(pool: PgPool) {
        let service = LevelService::new(pool);
        let level = service.insert(create_dto("5ème")).await.unwrap();

        let updated = service
            .update_partial(
                &level.id,
                UpdateLevelDto {
                    label: Some("5ème".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.label, "5ème");
        assert!(updated.updated_at >= level.updated_at);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_to_taken_label_conflicts(pool: PgPool) {
        let service = LevelService::new(pool);
        service.insert(create_dto("4ème")).await.unwrap();
        let level = service.insert(create_dto("3ème")).await.unwrap();

        let err = service
            .update_partial(
                &level.id,
                UpdateLevelDto {
                    label: Some("4ème".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_without_fields_is_noop(pool: PgPool) {
        let service = LevelService::new(pool);
        let level = service.insert(create_dto("6ème")).await.unwrap();

        let updated = service
            .update_partial(&level.id, UpdateLevelDto::default())
            .await
            .unwrap();
        assert_eq!(updated.label, "6ème");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_missing_is_not_found(pool: PgPool) {
        let service = LevelService::new(pool);

        let err = service
            .update_partial(&LevelId::from("missing"), UpdateLevelDto::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_page_paginates_newest_first(pool: PgPool) {
        let service = LevelService::new(pool);
        service.insert(create_dto("6ème")).await.unwrap();
        let newest = service.insert(create_dto("5ème")).await.unwrap();

        let page = service
            .list_page(&PaginationParams::new(1, 1))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, newest.id);

        let second = service
            .list_page(&PaginationParams::new(2, 1))
            .await
            .unwrap();
        assert_eq!(second.page, 2);
        assert_eq!(second.data.len(), 1);
        assert_ne!(second.data[0].id, newest.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_remove_and_exists(pool: PgPool) {
        let service = LevelService::new(pool);
        let level = service.insert(create_dto("3ème")).await.unwrap();
        assert!(service.exists_by_id(&level.id).await.unwrap());

        let removed = service.remove(&level.id).await.unwrap();
        assert_eq!(removed.id, level.id);
        assert!(!service.exists_by_id(&level.id).await.unwrap());

        let err = service.remove(&level.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_remove_referenced_level_conflicts(pool: PgPool) {
        let service = LevelService::new(pool.clone());
        let level = service.insert(create_dto("6ème")).await.unwrap();
        sqlx::query("INSERT INTO tracks (label, level_id) VALUES ('Lettres', $1)")
            .bind(&level.id)
            .execute(&pool)
            .await
            .unwrap();

        let err = service.remove(&level.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert!(service.exists_by_id(&level.id).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_with_relations(pool: PgPool) {
        let service = LevelService::new(pool.clone());
        let level = service.insert(create_dto("6ème")).await.unwrap();
        let track_id: TrackId = sqlx::query_scalar(
            "INSERT INTO tracks (label, level_id) VALUES ('Lettres', $1) RETURNING id",
        )
        .bind(&level.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO classes (code, label, level_id, track_id) VALUES ('6A', '6ème A', $1, $2)",
        )
        .bind(&level.id)
        .bind(&track_id)
        .execute(&pool)
        .await
        .unwrap();

        let details = service.find_with_relations(&level.id).await.unwrap().unwrap();
        assert_eq!(details.filieres.len(), 1);
        assert_eq!(details.classes.len(), 1);
        assert_eq!(details.classes[0].filiere.id, track_id);

        let missing = service.find_with_relations(&LevelId::from("missing")).await.unwrap();
        assert!(missing.is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_by_label(pool: PgPool) {
        let service = LevelService::new(pool);
        let level = service.insert(create_dto("4ème")).await.unwrap();

        assert_eq!(service.find_by_label("4ème").await.unwrap(), Some(level));
        assert!(service.find_by_label("2nde").await.unwrap().is_none());
    }
}
