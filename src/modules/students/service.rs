use std::collections::HashMap;

use async_trait::async_trait;
use kaayjang_core::{PaginatedResponse, PaginationParams, ServiceError, ServiceResult};
use kaayjang_models::classes::Class;
use kaayjang_models::students::{CreateStudentDto, Student, StudentWithClass, UpdateStudentDto};
use kaayjang_models::{ClassId, StudentId};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::classes::service::ClassService;
use crate::modules::repository::{Repository, like_pattern};

const STUDENT_COLUMNS: &str = "id, matricule, last_name, first_name, birth_date, phone, address, \
                               class_id, created_at, updated_at";

const CLASS_MISSING: &str = "Class does not exist";

const SEARCH_FILTER: &str = "last_name ILIKE $1 OR first_name ILIKE $1 OR matricule ILIKE $1";

fn duplicate_matricule(matricule: &str) -> String {
    format!("Student with matricule \"{}\" already exists", matricule)
}

#[derive(Clone, Debug)]
pub struct StudentService {
    db: PgPool,
    classes: ClassService,
}

impl StudentService {
    pub fn new(db: PgPool) -> Self {
        Self {
            classes: ClassService::new(db.clone()),
            db,
        }
    }

    async fn ensure_unique_matricule(
        &self,
        matricule: &str,
        exclude: Option<&StudentId>,
    ) -> ServiceResult<()> {
        let existing: Option<StudentId> =
            sqlx::query_scalar("SELECT id FROM students WHERE matricule = $1")
                .bind(matricule)
                .fetch_optional(&self.db)
                .await?;

        match existing {
            Some(id) if Some(&id) != exclude => {
                Err(ServiceError::conflict(duplicate_matricule(matricule)))
            }
            _ => Ok(()),
        }
    }

    /// Attaches each student's class, with the class's level and track.
    async fn expand(&self, students: Vec<Student>) -> ServiceResult<Vec<StudentWithClass>> {
        let mut class_ids: Vec<ClassId> = students.iter().map(|s| s.class_id.clone()).collect();
        class_ids.sort();
        class_ids.dedup();

        let classes = sqlx::query_as::<_, Class>(
            "SELECT id, code, label, level_id, track_id, created_at, updated_at
             FROM classes
             WHERE id = ANY($1)",
        )
        .bind(&class_ids)
        .fetch_all(&self.db)
        .await?;

        let classes: HashMap<ClassId, _> = self
            .classes
            .expand(classes)
            .await?
            .into_iter()
            .map(|c| (c.class.id.clone(), c))
            .collect();

        students
            .into_iter()
            .map(|student| match classes.get(&student.class_id) {
                Some(classe) => Ok(StudentWithClass {
                    classe: classe.clone(),
                    student,
                }),
                None => Err(ServiceError::Database(sqlx::Error::RowNotFound)),
            })
            .collect()
    }

    /// A page of students whose last name, first name or matricule contains
    /// `term`, ignoring case. Without a term every student is listed.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        term: Option<&str>,
        params: &PaginationParams,
    ) -> ServiceResult<PaginatedResponse<StudentWithClass>> {
        let (students, total) = match term.map(str::trim).filter(|t| !t.is_empty()) {
            Some(term) => {
                let pattern = like_pattern(term);
                let page_sql = format!(
                    "SELECT {} FROM students
                     WHERE {}
                     ORDER BY created_at DESC, id DESC
                     LIMIT $2 OFFSET $3",
                    STUDENT_COLUMNS, SEARCH_FILTER
                );
                let count_sql = format!("SELECT COUNT(*) FROM students WHERE {}", SEARCH_FILTER);
                tokio::try_join!(
                    sqlx::query_as::<_, Student>(&page_sql)
                        .bind(&pattern)
                        .bind(params.limit())
                        .bind(params.offset())
                        .fetch_all(&self.db),
                    sqlx::query_scalar::<_, i64>(&count_sql)
                        .bind(&pattern)
                        .fetch_one(&self.db),
                )?
            }
            None => {
                let page = self.list_page(params).await?;
                (page.data, page.total)
            }
        };

        let expanded = self.expand(students).await?;
        Ok(PaginatedResponse::new(expanded, total, params))
    }

    /// Every student of the class, ordered by last then first name.
    #[instrument(skip(self))]
    pub async fn list_by_class(&self, class_id: &ClassId) -> ServiceResult<Vec<StudentWithClass>> {
        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM students
             WHERE class_id = $1
             ORDER BY last_name ASC, first_name ASC",
            STUDENT_COLUMNS
        ))
        .bind(class_id)
        .fetch_all(&self.db)
        .await?;

        self.expand(students).await
    }

    #[instrument(skip(self))]
    pub async fn find_by_matricule(
        &self,
        matricule: &str,
    ) -> ServiceResult<Option<StudentWithClass>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM students WHERE matricule = $1",
            STUDENT_COLUMNS
        ))
        .bind(matricule)
        .fetch_optional(&self.db)
        .await?;

        Ok(self.expand(student.into_iter().collect()).await?.pop())
    }

    #[instrument(skip(self))]
    pub async fn find_with_class(&self, id: &StudentId) -> ServiceResult<Option<StudentWithClass>> {
        let student = self.get_by_id(id).await?;
        Ok(self.expand(student.into_iter().collect()).await?.pop())
    }
}

#[async_trait]
impl Repository for StudentService {
    type Id = StudentId;
    type Entity = Student;
    type CreateDto = CreateStudentDto;
    type UpdateDto = UpdateStudentDto;

    const RESOURCE: &'static str = "Student";

    #[instrument(skip(self))]
    async fn list_page(
        &self,
        params: &PaginationParams,
    ) -> ServiceResult<PaginatedResponse<Student>> {
        let page_sql = format!(
            "SELECT {} FROM students ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            STUDENT_COLUMNS
        );
        let (students, total) = tokio::try_join!(
            sqlx::query_as::<_, Student>(&page_sql)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.db),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students").fetch_one(&self.db),
        )?;

        Ok(PaginatedResponse::new(students, total, params))
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &StudentId) -> ServiceResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM students WHERE id = $1",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(student)
    }

    /// The class reference is left to the foreign key.
    #[instrument(skip(self))]
    async fn insert(&self, dto: CreateStudentDto) -> ServiceResult<Student> {
        self.ensure_unique_matricule(&dto.matricule, None).await?;

        sqlx::query_as::<_, Student>(&format!(
            "INSERT INTO students
                (matricule, last_name, first_name, birth_date, phone, address, class_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            STUDENT_COLUMNS
        ))
        .bind(&dto.matricule)
        .bind(&dto.last_name)
        .bind(&dto.first_name)
        .bind(dto.birth_date)
        .bind(&dto.phone)
        .bind(&dto.address)
        .bind(ClassId::from(dto.class_id.as_str()))
        .fetch_one(&self.db)
        .await
        .map_err(|e| ServiceError::from_db(e, &duplicate_matricule(&dto.matricule), CLASS_MISSING))
    }

    #[instrument(skip(self))]
    async fn update_partial(&self, id: &StudentId, dto: UpdateStudentDto) -> ServiceResult<Student> {
        if let Some(matricule) = &dto.matricule {
            self.ensure_unique_matricule(matricule, Some(id)).await?;
        }

        let class_id = dto.class_id.as_deref().map(ClassId::from);

        sqlx::query_as::<_, Student>(&format!(
            "UPDATE students
             SET matricule = COALESCE($2, matricule),
                 last_name = COALESCE($3, last_name),
                 first_name = COALESCE($4, first_name),
                 birth_date = COALESCE($5, birth_date),
                 phone = COALESCE($6, phone),
                 address = COALESCE($7, address),
                 class_id = COALESCE($8, class_id),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .bind(&dto.matricule)
        .bind(&dto.last_name)
        .bind(&dto.first_name)
        .bind(dto.birth_date)
        .bind(&dto.phone)
        .bind(&dto.address)
        .bind(&class_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            let matricule = dto.matricule.as_deref().unwrap_or_default();
            ServiceError::from_db(e, &duplicate_matricule(matricule), CLASS_MISSING)
        })?
        .ok_or_else(|| ServiceError::not_found("Student not found"))
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: &StudentId) -> ServiceResult<Student> {
        sqlx::query_as::<_, Student>(&format!(
            "DELETE FROM students WHERE id = $1 RETURNING {}",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Student not found"))
    }

    #[instrument(skip(self))]
    async fn exists_by_id(&self, id: &StudentId) -> ServiceResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }
}
