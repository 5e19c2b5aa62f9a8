//! Query-string extractor with automatic validation.

use crate::errors::AppError;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

/// Deserializes the query string into `T` and runs `Validate` on it.
///
/// Values that do not parse (e.g. `page=abc`) are rejected as
/// `QUERY_EXTRACTION`; values outside declared ranges as `VALIDATION_ERROR`.
/// Both map to 400 before the handler runs.
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(data) = Query::<T>::from_request_parts(parts, state).await?;
        data.validate()?;
        Ok(ValidatedQuery(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Paging {
        #[validate(range(min = 1))]
        page: u32,
    }

    async fn handler(ValidatedQuery(p): ValidatedQuery<Paging>) -> String {
        p.page.to_string()
    }

    fn app() -> Router {
        Router::new().route("/", get(handler))
    }

    async fn status_for(uri: &str) -> StatusCode {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_valid_query_passes() {
        assert_eq!(status_for("/?page=3").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_out_of_range_is_bad_request() {
        assert_eq!(status_for("/?page=0").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unparseable_is_bad_request() {
        assert_eq!(status_for("/?page=abc").await, StatusCode::BAD_REQUEST);
    }
}
