//! HTTP handlers for the Similarity API

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    routing::post,
};
use axum_helpers::{
    AppError, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
        UnprocessableEntityResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{ItemsResponse, RecommendationRequest, UploadForm};
use crate::service::SimilarityService;

/// Multipart field carrying the query image
pub const UPLOAD_FIELD: &str = "file";

/// Default request body limit for image uploads
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// OpenAPI documentation for the Similarity API
#[derive(OpenApi)]
#[openapi(
    paths(get_similar_images, get_recommendations),
    components(
        schemas(ItemsResponse, RecommendationRequest, UploadForm),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            UnprocessableEntityResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Similarity", description = "Visually similar products and recommendations")
    )
)]
pub struct ApiDoc;

/// Create the similarity router; uploads above `max_upload_bytes` are rejected with 413.
pub fn router(service: Arc<SimilarityService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(
            "/getSimilarImages",
            post(get_similar_images).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/getrecommendations", post(get_recommendations))
        .with_state(service)
}

/// Find products that look like the uploaded image
#[utoipa::path(
    post,
    path = "/getSimilarImages",
    tag = "Similarity",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Similar products, most similar first", body = ItemsResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_similar_images(
    State(service): State<Arc<SimilarityService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ItemsResponse>, AppError> {
    let mut multipart = multipart?;

    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            image = Some(field.bytes().await?);
            break;
        }
    }

    let image = image.ok_or_else(|| {
        AppError::BadRequest(format!("Missing '{}' field in multipart form", UPLOAD_FIELD))
    })?;

    let items = service.similar_to_upload(image.to_vec()).await?;
    Ok(Json(ItemsResponse { items }))
}

/// Recommend products similar to a stored product
///
/// The referenced product is never part of the result. Non-blank
/// `masterCategory` / `subCategory` restrict results to equal values.
#[utoipa::path(
    post,
    path = "/getrecommendations",
    tag = "Similarity",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Recommended products, most similar first", body = ItemsResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_recommendations(
    State(service): State<Arc<SimilarityService>>,
    ValidatedJson(request): ValidatedJson<RecommendationRequest>,
) -> Result<Json<ItemsResponse>, AppError> {
    let items = service.recommend(request).await?;
    Ok(Json(ItemsResponse { items }))
}
