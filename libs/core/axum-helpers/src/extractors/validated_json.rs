//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Malformed bodies are rejected as `JSON_EXTRACTION`, bodies that fail
/// `Validate` as `VALIDATION_ERROR` with per-field details.
///
/// # Example
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct RecommendationRequest {
///     #[validate(length(min = 1))]
///     id: String,
/// }
///
/// async fn recommend(ValidatedJson(body): ValidatedJson<RecommendationRequest>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
