//! Level (niveau) models and DTOs.

use chrono::{DateTime, Utc};
use kaayjang_core::serde::{deserialize_optional_trimmed, deserialize_trimmed};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::classes::ClassWithTrack;
use crate::ids::LevelId;
use crate::tracks::Track;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: LevelId,
    #[serde(rename = "libelle")]
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLevelDto {
    #[serde(rename = "libelle", deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "libelle is required"))]
    #[schema(example = "6ème")]
    pub label: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLevelDto {
    #[serde(
        rename = "libelle",
        default,
        deserialize_with = "deserialize_optional_trimmed"
    )]
    #[validate(length(min = 1, message = "libelle cannot be empty"))]
    pub label: Option<String>,
}

/// A level with every track and class attached to it.
#[derive(Debug, Serialize, ToSchema)]
pub struct LevelDetails {
    #[serde(flatten)]
    pub level: Level,
    pub filieres: Vec<Track>,
    pub classes: Vec<ClassWithTrack>,
}

/// A level together with the number of classes it holds.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LevelClassCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub level: Level,
    pub classes_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_level_dto_validation() {
        let valid: CreateLevelDto = serde_json::from_str(r#"{"libelle":"6ème"}"#).unwrap();
        assert!(valid.validate().is_ok());
        assert_eq!(valid.label, "6ème");

        let blank: CreateLevelDto = serde_json::from_str(r#"{"libelle":"   "}"#).unwrap();
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("label"));
    }

    #[test]
    fn test_create_level_dto_requires_libelle() {
        let result = serde_json::from_str::<CreateLevelDto>("{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_update_level_dto_validation() {
        let empty: UpdateLevelDto = serde_json::from_str("{}").unwrap();
        assert!(empty.label.is_none());
        assert!(empty.validate().is_ok());

        let blank: UpdateLevelDto = serde_json::from_str(r#"{"libelle":""}"#).unwrap();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_level_serializes_public_field_names() {
        let level = Level {
            id: LevelId::from("lvl-1"),
            label: "5ème".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&level).unwrap();

        assert_eq!(value["id"], "lvl-1");
        assert_eq!(value["libelle"], "5ème");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }

    #[test]
    fn test_level_class_count_is_flattened() {
        let row = LevelClassCount {
            level: Level {
                id: LevelId::from("lvl-1"),
                label: "6ème".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            classes_count: 3,
        };
        let value = serde_json::to_value(&row).unwrap();

        assert_eq!(value["libelle"], "6ème");
        assert_eq!(value["classesCount"], 3);
    }
}
