//! Student (étudiant) models and DTOs.

use chrono::{DateTime, Utc};
use kaayjang_core::PaginationParams;
use kaayjang_core::serde::{
    deserialize_date_time, deserialize_optional_date_time, deserialize_optional_trimmed,
    deserialize_trimmed,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::classes::ClassWithRelations;
use crate::ids::{ClassId, StudentId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub matricule: String,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "dateNaissance")]
    pub birth_date: DateTime<Utc>,
    #[serde(rename = "telephone")]
    pub phone: Option<String>,
    #[serde(rename = "adresse")]
    pub address: Option<String>,
    #[serde(rename = "classeId")]
    pub class_id: ClassId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Birth dates are accepted as `YYYY-MM-DD` or RFC 3339 and stored as a UTC
/// instant; a bare date lands on midnight UTC.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "matricule is required"))]
    #[schema(example = "ETU001")]
    pub matricule: String,
    #[serde(rename = "nom", deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "nom is required"))]
    #[schema(example = "Diop")]
    pub last_name: String,
    #[serde(rename = "prenom", deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "prenom is required"))]
    #[schema(example = "Amadou")]
    pub first_name: String,
    #[serde(rename = "dateNaissance", deserialize_with = "deserialize_date_time")]
    #[schema(value_type = String, example = "2008-03-15")]
    pub birth_date: DateTime<Utc>,
    #[serde(
        rename = "telephone",
        default,
        deserialize_with = "deserialize_optional_trimmed"
    )]
    pub phone: Option<String>,
    #[serde(
        rename = "adresse",
        default,
        deserialize_with = "deserialize_optional_trimmed"
    )]
    pub address: Option<String>,
    #[serde(rename = "classeId", deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "classeId is required"))]
    pub class_id: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(length(min = 1, message = "matricule cannot be empty"))]
    pub matricule: Option<String>,
    #[serde(rename = "nom", default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(length(min = 1, message = "nom cannot be empty"))]
    pub last_name: Option<String>,
    #[serde(
        rename = "prenom",
        default,
        deserialize_with = "deserialize_optional_trimmed"
    )]
    #[validate(length(min = 1, message = "prenom cannot be empty"))]
    pub first_name: Option<String>,
    #[serde(
        rename = "dateNaissance",
        default,
        deserialize_with = "deserialize_optional_date_time"
    )]
    #[schema(value_type = Option<String>, example = "2008-03-15")]
    pub birth_date: Option<DateTime<Utc>>,
    #[serde(
        rename = "telephone",
        default,
        deserialize_with = "deserialize_optional_trimmed"
    )]
    pub phone: Option<String>,
    #[serde(
        rename = "adresse",
        default,
        deserialize_with = "deserialize_optional_trimmed"
    )]
    pub address: Option<String>,
    #[serde(
        rename = "classeId",
        default,
        deserialize_with = "deserialize_optional_trimmed"
    )]
    #[validate(length(min = 1, message = "classeId cannot be empty"))]
    pub class_id: Option<String>,
}

/// A student with its class, whose level and track are resolved too.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentWithClass {
    #[serde(flatten)]
    pub student: Student,
    pub classe: ClassWithRelations,
}

/// Query string of the student listing: an optional search term on top of
/// the usual pagination parameters.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentSearchParams {
    /// Matched case-insensitively against last name, first name and matricule
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl StudentSearchParams {
    /// The trimmed search term, or `None` when it is absent or blank.
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_create_student_dto_normalizes_birth_date() {
        let dto: CreateStudentDto = serde_json::from_str(
            r#"{"matricule":"ETU001","nom":"Diop","prenom":"Amadou",
                "dateNaissance":"2008-03-15","classeId":"cls-1"}"#,
        )
        .unwrap();

        assert!(dto.validate().is_ok());
        assert_eq!(
            dto.birth_date,
            Utc.with_ymd_and_hms(2008, 3, 15, 0, 0, 0).unwrap()
        );
        assert!(dto.phone.is_none());
        assert!(dto.address.is_none());
    }

    #[test]
    fn test_create_student_dto_rejects_bad_date() {
        let result = serde_json::from_str::<CreateStudentDto>(
            r#"{"matricule":"ETU001","nom":"Diop","prenom":"Amadou",
                "dateNaissance":"15/03/2008","classeId":"cls-1"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_create_student_dto_blank_names_fail_validation() {
        let dto: CreateStudentDto = serde_json::from_str(
            r#"{"matricule":"ETU001","nom":" ","prenom":"",
                "dateNaissance":"2008-03-15","classeId":"cls-1"}"#,
        )
        .unwrap();

        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("last_name"));
        assert!(fields.contains_key("first_name"));
    }

    #[test]
    fn test_update_student_dto_optional_date() {
        let dto: UpdateStudentDto =
            serde_json::from_str(r#"{"dateNaissance":"2007-07-22"}"#).unwrap();
        assert_eq!(
            dto.birth_date,
            Some(Utc.with_ymd_and_hms(2007, 7, 22, 0, 0, 0).unwrap())
        );

        let none: UpdateStudentDto = serde_json::from_str("{}").unwrap();
        assert!(none.birth_date.is_none());
        assert!(none.validate().is_ok());
    }

    #[test]
    fn test_student_serializes_public_field_names() {
        let student = Student {
            id: StudentId::from("stu-1"),
            matricule: "ETU002".to_string(),
            last_name: "Fall".to_string(),
            first_name: "Fatou".to_string(),
            birth_date: Utc.with_ymd_and_hms(2007, 7, 22, 0, 0, 0).unwrap(),
            phone: None,
            address: Some("Dakar".to_string()),
            class_id: ClassId::from("cls-1"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&student).unwrap();

        assert_eq!(value["nom"], "Fall");
        assert_eq!(value["prenom"], "Fatou");
        assert_eq!(value["classeId"], "cls-1");
        assert_eq!(value["adresse"], "Dakar");
        assert!(value["telephone"].is_null());
        assert_eq!(value["dateNaissance"], "2007-07-22T00:00:00Z");
    }

    #[test]
    fn test_search_term_ignores_blank() {
        let params = StudentSearchParams {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(params.term().is_none());

        let params = StudentSearchParams {
            search: Some(" diop ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.term(), Some("diop"));
    }
}
