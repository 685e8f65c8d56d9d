//! JSON body extractor that runs `validator` rules after deserializing.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use drive_core::error::AppError;

use crate::error::ApiError;

/// A JSON body that passed its `Validate` rules.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::invalid_input(format!("Invalid JSON body: {}", e.body_text())))?;

        value.validate().map_err(validation_error)?;
        Ok(Self(value))
    }
}

/// Flatten field errors into one message, e.g. `name: Name is required`.
fn validation_error(errors: ValidationErrors) -> ApiError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: invalid value"),
            })
        })
        .collect();
    messages.sort();
    AppError::invalid_input(messages.join("; ")).into()
}
