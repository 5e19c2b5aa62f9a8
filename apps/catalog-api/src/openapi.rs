//! OpenAPI documentation configuration

use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa::{Modify, OpenApi};

/// Combined OpenAPI documentation for Catalog API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Fashion catalog browsing with pagination, attribute filters and image similarity",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/products", api = domain_catalog::ApiDoc)
    ),
    modifiers(&SimilarityPaths)
)]
pub struct ApiDoc;

/// Similarity routes live at the root, so they are merged rather than nested.
struct SimilarityPaths;

impl Modify for SimilarityPaths {
    fn modify(&self, openapi: &mut OpenApiSpec) {
        openapi.merge(domain_similarity::ApiDoc::openapi());
    }
}
