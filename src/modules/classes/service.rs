use async_trait::async_trait;
use kaayjang_core::{PaginatedResponse, PaginationParams, ServiceError, ServiceResult};
use kaayjang_models::classes::{
    Class, ClassDetails, ClassStatistics, ClassSummary, ClassWithCount, ClassWithRelations,
    CreateClassDto, UpdateClassDto,
};
use kaayjang_models::levels::LevelClassCount;
use kaayjang_models::students::Student;
use kaayjang_models::tracks::TrackClassCount;
use kaayjang_models::{ClassId, LevelId, TrackId};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::levels::service::levels_by_ids;
use crate::modules::repository::Repository;
use crate::modules::tracks::service::tracks_by_ids;

const CLASS_COLUMNS: &str = "id, code, label, level_id, track_id, created_at, updated_at";

const TRACK_OUTSIDE_LEVEL: &str = "Track does not belong to the selected level";

const REFERENCE_MISSING: &str = "Referenced level or track does not exist";

fn duplicate_code(code: &str) -> String {
    format!("Class with code \"{}\" already exists", code)
}

#[derive(Clone, Debug)]
pub struct ClassService {
    db: PgPool,
}

impl ClassService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn ensure_unique_code(&self, code: &str, exclude: Option<&ClassId>) -> ServiceResult<()> {
        let existing: Option<ClassId> =
            sqlx::query_scalar("SELECT id FROM classes WHERE code = $1")
                .bind(code)
                .fetch_optional(&self.db)
                .await?;

        match existing {
            Some(id) if Some(&id) != exclude => Err(ServiceError::conflict(duplicate_code(code))),
            _ => Ok(()),
        }
    }

    /// A class's track must belong to the class's level.
    async fn ensure_track_in_level(&self, level_id: &LevelId, track_id: &TrackId) -> ServiceResult<()> {
        let matches = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tracks WHERE id = $1 AND level_id = $2)",
        )
        .bind(track_id)
        .bind(level_id)
        .fetch_one(&self.db)
        .await?;

        if matches {
            Ok(())
        } else {
            Err(ServiceError::invalid_reference(TRACK_OUTSIDE_LEVEL))
        }
    }

    /// Resolves the level and track of each class, keeping the input order.
    pub(crate) async fn expand(&self, classes: Vec<Class>) -> ServiceResult<Vec<ClassWithRelations>> {
        let level_ids: Vec<LevelId> = classes.iter().map(|c| c.level_id.clone()).collect();
        let track_ids: Vec<TrackId> = classes.iter().map(|c| c.track_id.clone()).collect();

        let (levels, tracks) = tokio::try_join!(
            levels_by_ids(&self.db, &level_ids),
            tracks_by_ids(&self.db, &track_ids),
        )?;

        classes
            .into_iter()
            .map(|class| {
                let niveau = levels.get(&class.level_id).cloned();
                let filiere = tracks.get(&class.track_id).cloned();
                match (niveau, filiere) {
                    (Some(niveau), Some(filiere)) => Ok(ClassWithRelations {
                        class,
                        niveau,
                        filiere,
                    }),
                    _ => Err(ServiceError::Database(sqlx::Error::RowNotFound)),
                }
            })
            .collect()
    }

    async fn students_of(&self, id: &ClassId) -> ServiceResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT id, matricule, last_name, first_name, birth_date, phone, address, class_id,
                    created_at, updated_at
             FROM students
             WHERE class_id = $1
             ORDER BY last_name ASC, first_name ASC",
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(students)
    }

    async fn details(&self, class: Class) -> ServiceResult<ClassDetails> {
        let id = class.id.clone();
        let (expanded, etudiants) =
            tokio::try_join!(self.expand(vec![class]), self.students_of(&id))?;

        let ClassWithRelations {
            class,
            niveau,
            filiere,
        } = expanded
            .into_iter()
            .next()
            .ok_or(ServiceError::Database(sqlx::Error::RowNotFound))?;

        Ok(ClassDetails {
            class,
            niveau,
            filiere,
            etudiants,
        })
    }

    async fn summaries(&self, rows: Vec<ClassWithCount>) -> ServiceResult<Vec<ClassSummary>> {
        let (classes, counts): (Vec<Class>, Vec<i64>) = rows
            .into_iter()
            .map(|row| (row.class, row.etudiants_count))
            .unzip();

        Ok(self
            .expand(classes)
            .await?
            .into_iter()
            .zip(counts)
            .map(|(expanded, etudiants_count)| ClassSummary {
                class: expanded.class,
                niveau: expanded.niveau,
                filiere: expanded.filiere,
                etudiants_count,
            })
            .collect())
    }

    /// The class with its level, track and students.
    #[instrument(skip(self))]
    pub async fn find_by_code(&self, code: &str) -> ServiceResult<Option<ClassDetails>> {
        let class = sqlx::query_as::<_, Class>(&format!(
            "SELECT {} FROM classes WHERE code = $1",
            CLASS_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.db)
        .await?;

        match class {
            Some(class) => Ok(Some(self.details(class).await?)),
            None => Ok(None),
        }
    }

    /// The class with its level, track and students ordered by last then
    /// first name.
    #[instrument(skip(self))]
    pub async fn find_with_relations(&self, id: &ClassId) -> ServiceResult<Option<ClassDetails>> {
        match self.get_by_id(id).await? {
            Some(class) => Ok(Some(self.details(class).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_by_level(&self, level_id: &LevelId) -> ServiceResult<Vec<ClassSummary>> {
        let rows = sqlx::query_as::<_, ClassWithCount>(
            "SELECT c.id, c.code, c.label, c.level_id, c.track_id, c.created_at, c.updated_at,
                    (SELECT COUNT(*) FROM students s WHERE s.class_id = c.id) AS etudiants_count
             FROM classes c
             WHERE c.level_id = $1
             ORDER BY c.code ASC",
        )
        .bind(level_id)
        .fetch_all(&self.db)
        .await?;

        self.summaries(rows).await
    }

    #[instrument(skip(self))]
    pub async fn list_by_track(&self, track_id: &TrackId) -> ServiceResult<Vec<ClassSummary>> {
        let rows = sqlx::query_as::<_, ClassWithCount>(
            "SELECT c.id, c.code, c.label, c.level_id, c.track_id, c.created_at, c.updated_at,
                    (SELECT COUNT(*) FROM students s WHERE s.class_id = c.id) AS etudiants_count
             FROM classes c
             WHERE c.track_id = $1
             ORDER BY c.code ASC",
        )
        .bind(track_id)
        .fetch_all(&self.db)
        .await?;

        self.summaries(rows).await
    }

    /// Total classes, and class counts per level and per track.
    #[instrument(skip(self))]
    pub async fn statistics(&self) -> ServiceResult<ClassStatistics> {
        let (total_classes, classes_by_niveau, classes_by_filiere) = tokio::try_join!(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classes").fetch_one(&self.db),
            sqlx::query_as::<_, LevelClassCount>(
                "SELECT l.id, l.label, l.created_at, l.updated_at,
                        COUNT(c.id) AS classes_count
                 FROM levels l
                 LEFT JOIN classes c ON c.level_id = l.id
                 GROUP BY l.id
                 ORDER BY l.label ASC",
            )
            .fetch_all(&self.db),
            sqlx::query_as::<_, TrackClassCount>(
                "SELECT t.id, t.label, t.level_id, t.created_at, t.updated_at,
                        COUNT(c.id) AS classes_count
                 FROM tracks t
                 LEFT JOIN classes c ON c.track_id = t.id
                 GROUP BY t.id
                 ORDER BY t.label ASC",
            )
            .fetch_all(&self.db),
        )?;

        Ok(ClassStatistics {
            total_classes,
            classes_by_niveau,
            classes_by_filiere,
        })
    }
}

#[async_trait]
impl Repository for ClassService {
    type Id = ClassId;
    type Entity = Class;
    type CreateDto = CreateClassDto;
    type UpdateDto = UpdateClassDto;

    const RESOURCE: &'static str = "Class";

    #[instrument(skip(self))]
    async fn list_page(&self, params: &PaginationParams) -> ServiceResult<PaginatedResponse<Class>> {
        let page_sql = format!(
            "SELECT {} FROM classes ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            CLASS_COLUMNS
        );
        let (classes, total) = tokio::try_join!(
            sqlx::query_as::<_, Class>(&page_sql)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.db),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classes").fetch_one(&self.db),
        )?;

        Ok(PaginatedResponse::new(classes, total, params))
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &ClassId) -> ServiceResult<Option<Class>> {
        let class = sqlx::query_as::<_, Class>(&format!(
            "SELECT {} FROM classes WHERE id = $1",
            CLASS_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(class)
    }

    #[instrument(skip(self))]
    async fn insert(&self, dto: CreateClassDto) -> ServiceResult<Class> {
        self.ensure_unique_code(&dto.code, None).await?;

        let level_id = LevelId::from(dto.level_id.as_str());
        let track_id = TrackId::from(dto.track_id.as_str());
        self.ensure_track_in_level(&level_id, &track_id).await?;

        sqlx::query_as::<_, Class>(&format!(
            "INSERT INTO classes (code, label, level_id, track_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            CLASS_COLUMNS
        ))
        .bind(&dto.code)
        .bind(&dto.label)
        .bind(&level_id)
        .bind(&track_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| ServiceError::from_db(e, &duplicate_code(&dto.code), REFERENCE_MISSING))
    }

    /// The level/track cross check only runs when both ids are supplied.
    #[instrument(skip(self))]
    async fn update_partial(&self, id: &ClassId, dto: UpdateClassDto) -> ServiceResult<Class> {
        if let Some(code) = &dto.code {
            self.ensure_unique_code(code, Some(id)).await?;
        }

        let level_id = dto.level_id.as_deref().map(LevelId::from);
        let track_id = dto.track_id.as_deref().map(TrackId::from);
        if let (Some(level_id), Some(track_id)) = (&level_id, &track_id) {
            self.ensure_track_in_level(level_id, track_id).await?;
        }

        sqlx::query_as::<_, Class>(&format!(
            "UPDATE classes
             SET code = COALESCE($2, code),
                 label = COALESCE($3, label),
                 level_id = COALESCE($4, level_id),
                 track_id = COALESCE($5, track_id),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            CLASS_COLUMNS
        ))
        .bind(id)
        .bind(&dto.code)
        .bind(&dto.label)
        .bind(&level_id)
        .bind(&track_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            let code = dto.code.as_deref().unwrap_or_default();
            ServiceError::from_db(e, &duplicate_code(code), REFERENCE_MISSING)
        })?
        .ok_or_else(|| ServiceError::not_found("Class not found"))
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: &ClassId) -> ServiceResult<Class> {
        sqlx::query_as::<_, Class>(&format!(
            "DELETE FROM classes WHERE id = $1 RETURNING {}",
            CLASS_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| ServiceError::from_delete(e, "Class still has enrolled students"))?
        .ok_or_else(|| ServiceError::not_found("Class not found"))
    }

    #[instrument(skip(self))]
    async fn exists_by_id(&self, id: &ClassId) -> ServiceResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM classes WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }
}
