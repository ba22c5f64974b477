//! The success envelope wrapped around every handler payload.
//!
//! Failures are rendered by [`AppError`](crate::errors::AppError) as
//! `{"success": false, "error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `{"success": true, "data": ..., "message": "..."}`
///
/// `data` is always present and serializes as `null` for `()`-like payloads
/// such as deletes.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            status: StatusCode::OK,
        }
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data, message)
        }
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            status: StatusCode::OK,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope() {
        let body = ApiResponse::ok(json!({"libelle": "6ème"}), "Level retrieved successfully");
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(body.status(), StatusCode::OK);
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["libelle"], "6ème");
        assert_eq!(value["message"], "Level retrieved successfully");
    }

    #[test]
    fn test_created_envelope_status() {
        let body = ApiResponse::created(1, "Level created successfully");
        assert_eq!(body.status(), StatusCode::CREATED);
        assert_eq!(body.into_response().status(), StatusCode::CREATED);
    }

    #[test]
    fn test_empty_envelope_has_null_data() {
        let body = ApiResponse::<()>::empty("Level deleted successfully");
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["success"], true);
        assert!(value["data"].is_null());
        assert!(value.as_object().unwrap().contains_key("data"));
    }
}
