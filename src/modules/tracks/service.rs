use std::collections::HashMap;

use async_trait::async_trait;
use kaayjang_core::{PaginatedResponse, PaginationParams, ServiceError, ServiceResult};
use kaayjang_models::classes::ClassWithCount;
use kaayjang_models::levels::Level;
use kaayjang_models::tracks::{CreateTrackDto, Track, TrackDetails, TrackSummary, UpdateTrackDto};
use kaayjang_models::{LevelId, TrackId};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::levels::service::LevelService;
use crate::modules::repository::Repository;

const TRACK_COLUMNS: &str = "id, label, level_id, created_at, updated_at";

const LEVEL_MISSING: &str = "Level does not exist";

fn duplicate_label(label: &str) -> String {
    format!("Track with label \"{}\" already exists", label)
}

#[derive(Clone, Debug)]
pub struct TrackService {
    db: PgPool,
}

impl TrackService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn ensure_unique_label(&self, label: &str, exclude: Option<&TrackId>) -> ServiceResult<()> {
        let existing: Option<TrackId> =
            sqlx::query_scalar("SELECT id FROM tracks WHERE label = $1")
                .bind(label)
                .fetch_optional(&self.db)
                .await?;

        match existing {
            Some(id) if Some(&id) != exclude => Err(ServiceError::conflict(duplicate_label(label))),
            _ => Ok(()),
        }
    }

    async fn ensure_level_exists(&self, level_id: &LevelId) -> ServiceResult<()> {
        let levels = LevelService::new(self.db.clone());
        if levels.exists_by_id(level_id).await? {
            Ok(())
        } else {
            Err(ServiceError::invalid_reference(LEVEL_MISSING))
        }
    }

    async fn load_level(&self, level_id: &LevelId) -> ServiceResult<Level> {
        LevelService::new(self.db.clone())
            .get_by_id(level_id)
            .await?
            .ok_or(ServiceError::Database(sqlx::Error::RowNotFound))
    }

    async fn classes_with_counts(&self, id: &TrackId) -> ServiceResult<Vec<ClassWithCount>> {
        let classes = sqlx::query_as::<_, ClassWithCount>(
            "SELECT c.id, c.code, c.label, c.level_id, c.track_id, c.created_at, c.updated_at,
                    (SELECT COUNT(*) FROM students s WHERE s.class_id = c.id) AS etudiants_count
             FROM classes c
             WHERE c.track_id = $1
             ORDER BY c.code ASC",
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(classes)
    }

    async fn details(&self, track: Track) -> ServiceResult<TrackDetails> {
        let (niveau, classes) = tokio::try_join!(
            self.load_level(&track.level_id),
            self.classes_with_counts(&track.id),
        )?;

        Ok(TrackDetails {
            track,
            niveau,
            classes,
        })
    }

    /// The track with its level and classes.
    #[instrument(skip(self))]
    pub async fn find_by_label(&self, label: &str) -> ServiceResult<Option<TrackDetails>> {
        let track = sqlx::query_as::<_, Track>(&format!(
            "SELECT {} FROM tracks WHERE label = $1",
            TRACK_COLUMNS
        ))
        .bind(label)
        .fetch_optional(&self.db)
        .await?;

        match track {
            Some(track) => Ok(Some(self.details(track).await?)),
            None => Ok(None),
        }
    }

    /// The track with its level and classes, each class with its student count.
    #[instrument(skip(self))]
    pub async fn find_with_relations(&self, id: &TrackId) -> ServiceResult<Option<TrackDetails>> {
        match self.get_by_id(id).await? {
            Some(track) => Ok(Some(self.details(track).await?)),
            None => Ok(None),
        }
    }

    /// Tracks of one level ordered by label, each with its class count.
    #[instrument(skip(self))]
    pub async fn list_by_level(&self, level_id: &LevelId) -> ServiceResult<Vec<TrackSummary>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            track: Track,
            classes_count: i64,
        }

        let rows = sqlx::query_as::<_, Row>(
            "SELECT t.id, t.label, t.level_id, t.created_at, t.updated_at,
                    (SELECT COUNT(*) FROM classes c WHERE c.track_id = t.id) AS classes_count
             FROM tracks t
             WHERE t.level_id = $1
             ORDER BY t.label ASC",
        )
        .bind(level_id)
        .fetch_all(&self.db)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let niveau = self.load_level(level_id).await?;

        Ok(rows
            .into_iter()
            .map(|row| TrackSummary {
                track: row.track,
                niveau: niveau.clone(),
                classes_count: row.classes_count,
            })
            .collect())
    }
}

#[async_trait]
impl Repository for TrackService {
    type Id = TrackId;
    type Entity = Track;
    type CreateDto = CreateTrackDto;
    type UpdateDto = UpdateTrackDto;

    const RESOURCE: &'static str = "Track";

    #[instrument(skip(self))]
    async fn list_page(&self, params: &PaginationParams) -> ServiceResult<PaginatedResponse<Track>> {
        let page_sql = format!(
            "SELECT {} FROM tracks ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            TRACK_COLUMNS
        );
        let (tracks, total) = tokio::try_join!(
            sqlx::query_as::<_, Track>(&page_sql)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.db),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tracks").fetch_one(&self.db),
        )?;

        Ok(PaginatedResponse::new(tracks, total, params))
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &TrackId) -> ServiceResult<Option<Track>> {
        let track = sqlx::query_as::<_, Track>(&format!(
            "SELECT {} FROM tracks WHERE id = $1",
            TRACK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(track)
    }

    #[instrument(skip(self))]
    async fn insert(&self, dto: CreateTrackDto) -> ServiceResult<Track> {
        self.ensure_unique_label(&dto.label, None).await?;

        let level_id = LevelId::from(dto.level_id.as_str());
        self.ensure_level_exists(&level_id).await?;

        sqlx::query_as::<_, Track>(&format!(
            "INSERT INTO tracks (label, level_id) VALUES ($1, $2) RETURNING {}",
            TRACK_COLUMNS
        ))
        .bind(&dto.label)
        .bind(&level_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| ServiceError::from_db(e, &duplicate_label(&dto.label), LEVEL_MISSING))
    }

    #[instrument(skip(self))]
    async fn update_partial(&self, id: &TrackId, dto: UpdateTrackDto) -> ServiceResult<Track> {
        if let Some(label) = &dto.label {
            self.ensure_unique_label(label, Some(id)).await?;
        }

        let level_id = dto.level_id.as_deref().map(LevelId::from);
        if let Some(level_id) = &level_id {
            self.ensure_level_exists(level_id).await?;
        }

        sqlx::query_as::<_, Track>(&format!(
            "UPDATE tracks
             SET label = COALESCE($2, label),
                 level_id = COALESCE($3, level_id),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            TRACK_COLUMNS
        ))
        .bind(id)
        .bind(&dto.label)
        .bind(&level_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            let label = dto.label.as_deref().unwrap_or_default();
            ServiceError::from_db(e, &duplicate_label(label), LEVEL_MISSING)
        })?
        .ok_or_else(|| ServiceError::not_found("Track not found"))
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: &TrackId) -> ServiceResult<Track> {
        sqlx::query_as::<_, Track>(&format!(
            "DELETE FROM tracks WHERE id = $1 RETURNING {}",
            TRACK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| ServiceError::from_delete(e, "Track is still referenced by classes"))?
        .ok_or_else(|| ServiceError::not_found("Track not found"))
    }

    #[instrument(skip(self))]
    async fn exists_by_id(&self, id: &TrackId) -> ServiceResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tracks WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await?;

        Ok(exists)
    }
}

/// Loads the given tracks keyed by id. Unknown ids are skipped.
pub(crate) async fn tracks_by_ids(
    db: &PgPool,
    ids: &[TrackId],
) -> ServiceResult<HashMap<TrackId, Track>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let tracks = sqlx::query_as::<_, Track>(&format!(
        "SELECT {} FROM tracks WHERE id = ANY($1)",
        TRACK_COLUMNS
    ))
    .bind(ids)
    .fetch_all(db)
    .await?;

    Ok(tracks.into_iter().map(|t| (t.id.clone(), t)).collect())
}
