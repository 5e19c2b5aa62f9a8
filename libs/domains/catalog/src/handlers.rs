//! HTTP handlers for the Catalog API

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
    },
    ValidatedQuery,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CatalogResult;
use crate::models::{ListQuery, PageResponse, Record};
use crate::repository::CatalogRepository;
use crate::service::CatalogService;

/// OpenAPI documentation for the Catalog API
#[derive(OpenApi)]
#[openapi(
    paths(list_products, get_product),
    components(
        schemas(Record, PageResponse),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Catalog", description = "Paginated, filterable product catalog")
    )
)]
pub struct ApiDoc;

/// Create the catalog router. Mount under `/products`.
pub fn router<R: CatalogRepository + 'static>(service: Arc<CatalogService<R>>) -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
        .with_state(service)
}

/// List one page of products, optionally filtered by attribute equality
#[utoipa::path(
    get,
    path = "",
    tag = "Catalog",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of products", body = PageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> CatalogResult<Json<PageResponse>> {
    let page = service.list_products(query).await?;
    Ok(Json(page))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Catalog",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Record),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<String>,
) -> CatalogResult<Json<Record>> {
    let product = service.get_product(&id).await?;
    Ok(Json(product))
}
