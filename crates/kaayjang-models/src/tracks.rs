//! Track (filière) models and DTOs.
//!
//! Every track belongs to exactly one level.

use chrono::{DateTime, Utc};
use kaayjang_core::serde::{deserialize_optional_trimmed, deserialize_trimmed};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::classes::ClassWithCount;
use crate::ids::{LevelId, TrackId};
use crate::levels::Level;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    #[serde(rename = "libelle")]
    pub label: String,
    #[serde(rename = "niveauId")]
    pub level_id: LevelId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTrackDto {
    #[serde(rename = "libelle", deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "libelle is required"))]
    #[schema(example = "Sciences")]
    pub label: String,
    #[serde(rename = "niveauId", deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "niveauId is required"))]
    pub level_id: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTrackDto {
    #[serde(
        rename = "libelle",
        default,
        deserialize_with = "deserialize_optional_trimmed"
    )]
    #[validate(length(min = 1, message = "libelle cannot be empty"))]
    pub label: Option<String>,
    #[serde(
        rename = "niveauId",
        default,
        deserialize_with = "deserialize_optional_trimmed"
    )]
    #[validate(length(min = 1, message = "niveauId cannot be empty"))]
    pub level_id: Option<String>,
}

/// A track with its level and the number of classes it holds.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    #[serde(flatten)]
    pub track: Track,
    pub niveau: Level,
    pub classes_count: i64,
}

/// A track with its level and its classes, each carrying a student count.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrackDetails {
    #[serde(flatten)]
    pub track: Track,
    pub niveau: Level,
    pub classes: Vec<ClassWithCount>,
}

/// A track together with the number of classes it holds.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackClassCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub track: Track,
    pub classes_count: i64,
}
