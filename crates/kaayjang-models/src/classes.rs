//! Class (classe) models and DTOs.
//!
//! A class pairs a level with one of that level's tracks.

use chrono::{DateTime, Utc};
use kaayjang_core::serde::{deserialize_optional_trimmed, deserialize_trimmed};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{ClassId, LevelId, TrackId};
use crate::levels::{Level, LevelClassCount};
use crate::students::Student;
use crate::tracks::{Track, TrackClassCount};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: ClassId,
    pub code: String,
    #[serde(rename = "libelle")]
    pub label: String,
    #[serde(rename = "niveauId")]
    pub level_id: LevelId,
    #[serde(rename = "filiereId")]
    pub track_id: TrackId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "code is required"))]
    #[schema(example = "6A")]
    pub code: String,
    #[serde(rename = "libelle", deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "libelle is required"))]
    #[schema(example = "Sixième A")]
    pub label: String,
    #[serde(rename = "niveauId", deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "niveauId is required"))]
    pub level_id: String,
    #[serde(rename = "filiereId", deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "filiereId is required"))]
    pub track_id: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClassDto {
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(length(min = 1, message = "code cannot be empty"))]
    pub code: Option<String>,
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
    #[serde(
        rename = "filiereId",
        default,
        deserialize_with = "deserialize_optional_trimmed"
    )]
    #[validate(length(min = 1, message = "filiereId cannot be empty"))]
    pub track_id: Option<String>,
}

/// A class with the number of students enrolled in it.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassWithCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub class: Class,
    pub etudiants_count: i64,
}

/// A class with its track, as listed under a level.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClassWithTrack {
    #[serde(flatten)]
    pub class: Class,
    pub filiere: Track,
}

/// A class with its level and track resolved.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClassWithRelations {
    #[serde(flatten)]
    pub class: Class,
    pub niveau: Level,
    pub filiere: Track,
}

/// A class with its level, track and student count.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    #[serde(flatten)]
    pub class: Class,
    pub niveau: Level,
    pub filiere: Track,
    pub etudiants_count: i64,
}

/// A class with its level, track and enrolled students.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClassDetails {
    #[serde(flatten)]
    pub class: Class,
    pub niveau: Level,
    pub filiere: Track,
    pub etudiants: Vec<Student>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassStatistics {
    pub total_classes: i64,
    pub classes_by_niveau: Vec<LevelClassCount>,
    pub classes_by_filiere: Vec<TrackClassCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_class() -> Class {
        Class {
            id: ClassId::from("cls-1"),
            code: "6A".to_string(),
            label: "Sixième A".to_string(),
            level_id: LevelId::from("lvl-1"),
            track_id: TrackId::from("trk-1"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_class_dto_validation() {
        let valid: CreateClassDto = serde_json::from_str(
            r#"{"code":"6A","libelle":"Sixième A","niveauId":"lvl-1","filiereId":"trk-1"}"#,
        )
        .unwrap();
        assert!(valid.validate().is_ok());

        let blank: CreateClassDto = serde_json::from_str(
            r#"{"code":"","libelle":" ","niveauId":"lvl-1","filiereId":"trk-1"}"#,
        )
        .unwrap();
        let errors = blank.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("code"));
        assert!(fields.contains_key("label"));
    }

    #[test]
    fn test_create_class_dto_requires_track() {
        let result = serde_json::from_str::<CreateClassDto>(
            r#"{"code":"6A","libelle":"Sixième A","niveauId":"lvl-1"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_update_class_dto_code_only() {
        let dto: UpdateClassDto = serde_json::from_str(r#"{"code":"6B"}"#).unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.code.as_deref(), Some("6B"));
        assert!(dto.level_id.is_none());
        assert!(dto.track_id.is_none());
    }

    #[test]
    fn test_class_serializes_public_field_names() {
        let value = serde_json::to_value(sample_class()).unwrap();

        assert_eq!(value["code"], "6A");
        assert_eq!(value["libelle"], "Sixième A");
        assert_eq!(value["niveauId"], "lvl-1");
        assert_eq!(value["filiereId"], "trk-1");
    }

    #[test]
    fn test_class_with_count_is_flattened() {
        let row = ClassWithCount {
            class: sample_class(),
            etudiants_count: 12,
        };
        let value = serde_json::to_value(&row).unwrap();

        assert_eq!(value["code"], "6A");
        assert_eq!(value["etudiantsCount"], 12);
    }

    #[test]
    fn test_statistics_field_names() {
        let stats = ClassStatistics {
            total_classes: 0,
            classes_by_niveau: vec![],
            classes_by_filiere: vec![],
        };
        let value = serde_json::to_value(&stats).unwrap();

        assert_eq!(value["totalClasses"], 0);
        assert!(value["classesByNiveau"].is_array());
        assert!(value["classesByFiliere"].is_array());
    }
}
