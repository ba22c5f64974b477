//! The CRUD contract shared by every entity service, plus the handler-side
//! helpers that turn its `Option`/`bool` answers into HTTP errors.

use anyhow::anyhow;
use async_trait::async_trait;
use kaayjang_core::{AppError, PaginatedResponse, PaginationParams, ServiceResult};

/// Paginated CRUD over one table.
///
/// Implementors hold their own pool handle. Business rules (uniqueness,
/// parent references) live inside `insert` and `update_partial` and surface
/// as [`ServiceError::Conflict`](kaayjang_core::ServiceError::Conflict) or
/// [`ServiceError::InvalidReference`](kaayjang_core::ServiceError::InvalidReference).
#[async_trait]
pub trait Repository: Send + Sync {
    type Id: Send + Sync;
    type Entity: Send;
    type CreateDto: Send;
    type UpdateDto: Send;

    /// Human-readable name used in "<Resource> not found".
    const RESOURCE: &'static str;

    /// One page ordered newest first.
    async fn list_page(
        &self,
        params: &PaginationParams,
    ) -> ServiceResult<PaginatedResponse<Self::Entity>>;

    async fn get_by_id(&self, id: &Self::Id) -> ServiceResult<Option<Self::Entity>>;

    async fn insert(&self, dto: Self::CreateDto) -> ServiceResult<Self::Entity>;

    /// Applies the fields present in `dto`; absent fields keep their value.
    async fn update_partial(
        &self,
        id: &Self::Id,
        dto: Self::UpdateDto,
    ) -> ServiceResult<Self::Entity>;

    /// Deletes the row and returns its last state.
    async fn remove(&self, id: &Self::Id) -> ServiceResult<Self::Entity>;

    async fn exists_by_id(&self, id: &Self::Id) -> ServiceResult<bool>;
}

/// Rejects blank path identifiers with `422 Invalid id`.
pub fn parse_id<I: From<String>>(raw: String) -> Result<I, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::unprocessable(anyhow!("Invalid id")));
    }
    Ok(I::from(trimmed.to_string()))
}

pub fn not_found(resource: &str) -> AppError {
    AppError::not_found(anyhow!("{} not found", resource))
}

/// `get_by_id`, with absence turned into a 404.
pub async fn find_or_404<R: Repository>(repo: &R, id: &R::Id) -> Result<R::Entity, AppError> {
    repo.get_by_id(id)
        .await?
        .ok_or_else(|| not_found(R::RESOURCE))
}

/// Fails with a 404 unless the row exists. Runs before any mutation.
pub async fn ensure_exists<R: Repository>(repo: &R, id: &R::Id) -> Result<(), AppError> {
    if repo.exists_by_id(id).await? {
        Ok(())
    } else {
        Err(not_found(R::RESOURCE))
    }
}

/// Escapes `%`, `_` and `\` so a user term matches literally inside `ILIKE`.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use kaayjang_models::LevelId;

    #[test]
    fn test_parse_id_rejects_blank() {
        let err = parse_id::<LevelId>("   ".to_string()).unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.public_message(), "Invalid id");
    }

    #[test]
    fn test_parse_id_trims() {
        let id: LevelId = parse_id(" abc ".to_string()).unwrap();
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn test_not_found_message() {
        let err = not_found("Class");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Class not found");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("diop"), "%diop%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
