//! Page-based pagination utilities for list endpoints.
//!
//! Every list endpoint accepts `page` and `limit` query parameters:
//!
//! - `page`: Page number (1-indexed, default: 1)
//! - `limit`: Items per page (1-100, default: 10)
//!
//! Both are parsed leniently: a missing, empty, zero, or non-numeric value
//! falls back to the default instead of rejecting the request. A `limit`
//! above 100 is clamped to 100.
//!
//! # Example
//!
//! ```ignore
//! use kaayjang_core::pagination::{PaginatedResponse, PaginationParams};
//!
//! async fn list_levels(
//!     Query(params): Query<PaginationParams>,
//! ) -> Result<Json<PaginatedResponse<Level>>, AppError> {
//!     let (levels, total) = tokio::try_join!(
//!         fetch_levels(params.limit(), params.offset()),
//!         count_levels(),
//!     )?;
//!
//!     Ok(Json(PaginatedResponse::new(levels, total, &params)))
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Deserializes a query value into an optional i64.
///
/// Query parameters arrive as strings; empty or unparseable values are
/// treated as `None` so the caller's defaults apply.
fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    let raw: Option<Raw> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(Raw::Int(v)) => Some(v),
        Some(Raw::Str(s)) => s.trim().parse::<i64>().ok(),
        None => None,
    })
}

/// Query parameters for page-based pagination.
///
/// # Limits
///
/// - `page` below 1 (or absent) becomes 1
/// - `limit` of 0 (or absent) becomes 10, negative values become 1,
///   anything above 100 becomes 100
#[derive(Debug, Clone, Default, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub page: Option<i64>,
    /// Maximum number of items per page (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Returns the effective page number, at least 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        match self.page {
            Some(p) if p >= 1 => p,
            _ => DEFAULT_PAGE,
        }
    }

    /// Returns the effective limit, clamped to [1, 100].
    #[must_use]
    pub fn limit(&self) -> i64 {
        match self.limit {
            None | Some(0) => DEFAULT_LIMIT,
            Some(l) => l.clamp(1, MAX_LIMIT),
        }
    }

    /// Number of rows to skip for the current page. Saturates for page
    /// numbers far past the end, which then yield an empty page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// `ceil(total / limit)`, or 0 when there is nothing to page over.
#[must_use]
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// One page of records plus the numbers needed to navigate the rest.
///
/// ```json
/// {
///   "data": [...],
///   "total": 42,
///   "page": 2,
///   "limit": 10,
///   "totalPages": 5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, params: &PaginationParams) -> Self {
        let limit = params.limit();
        Self {
            data,
            total,
            page: params.page(),
            limit,
            total_pages: total_pages(total, limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}
