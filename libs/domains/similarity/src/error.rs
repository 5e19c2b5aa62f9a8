use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use domain_catalog::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("Image could not be decoded: {0}")]
    ImageDecode(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Source image not found for record {0}")]
    SourceImageNotFound(String),

    #[error("Source image error: {0}")]
    ImageSource(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type SimilarityResult<T> = Result<T, SimilarityError>;

impl From<qdrant_client::QdrantError> for SimilarityError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        SimilarityError::VectorIndex(err.to_string())
    }
}

impl From<SimilarityError> for AppError {
    fn from(err: SimilarityError) -> Self {
        match err {
            SimilarityError::ImageDecode(_) => {
                AppError::UnprocessableEntity("Image could not be decoded".to_string())
            }
            SimilarityError::Embedding(message) => AppError::Upstream {
                code: ErrorCode::EmbeddingError,
                message,
            },
            SimilarityError::VectorIndex(message) => AppError::Upstream {
                code: ErrorCode::VectorIndexError,
                message,
            },
            SimilarityError::SourceImageNotFound(_) => {
                AppError::NotFound("Source image not found".to_string())
            }
            SimilarityError::ImageSource(message) => AppError::Upstream {
                code: ErrorCode::ImageSourceError,
                message,
            },
            SimilarityError::Validation(msg) => AppError::BadRequest(msg),
            SimilarityError::Internal(msg) => AppError::InternalServerError(msg),
            SimilarityError::Catalog(err) => err.into(),
        }
    }
}

impl IntoResponse for SimilarityError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
