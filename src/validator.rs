use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use kaayjang_core::AppError;
use kaayjang_core::errors::format_validation_errors;
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor that runs `validator` rules before the handler.
///
/// Every rejection is a `422`: malformed JSON, a missing field, a wrong type
/// and a failed rule alike.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::unprocessable(anyhow!(
            "Missing 'Content-Type: application/json' header"
        ));
    }

    let error_msg = rejection.body_text();

    if let Some(field) = error_msg
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
    {
        return AppError::unprocessable(anyhow!("{} is required", field));
    }

    if error_msg.contains("invalid type") {
        return AppError::unprocessable(anyhow!("Invalid field type in request"));
    }

    if error_msg.contains("invalid date") {
        return AppError::unprocessable(anyhow!("dateNaissance must be a valid date"));
    }

    AppError::unprocessable(anyhow!("Invalid request body"))
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value
            .validate()
            .map_err(|errors| AppError::unprocessable(anyhow!("{}", format_validation_errors(&errors))))?;

        Ok(ValidatedJson(value))
    }
}
