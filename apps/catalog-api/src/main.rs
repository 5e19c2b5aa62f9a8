//! Catalog API - product listing and visual similarity server

use axum::routing::get;
use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_catalog::{CatalogService, MongoCatalogRepository};
use domain_similarity::{
    HttpImageEmbedder, ImageEmbedder, PrefixImageLoader, QdrantVectorIndex, SerializedEmbedder,
    SimilarityService,
};
use observability::{init_metrics, metrics_handler};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    init_metrics().map_err(|e| eyre::eyre!("Metrics recorder setup failed: {}", e))?;

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;

    let db = mongo_client.database(config.mongodb.database());

    info!(
        database = %config.mongodb.database(),
        collection = %config.catalog.collection,
        "Successfully connected to MongoDB"
    );

    let repository = MongoCatalogRepository::with_collection(&db, &config.catalog.collection);
    if config.catalog.create_indexes {
        api::catalog::init_indexes(&repository).await?;
    }

    let catalog = Arc::new(
        CatalogService::new(repository).with_default_page_size(config.catalog.default_page_size),
    );

    let embedder: Arc<dyn ImageEmbedder> = {
        let http = HttpImageEmbedder::new(config.similarity.embedder.clone());
        if config.similarity.serialize_embedding {
            info!("Embedding calls are serialized");
            Arc::new(SerializedEmbedder::new(http))
        } else {
            Arc::new(http)
        }
    };

    let vector_index = Arc::new(QdrantVectorIndex::new(config.similarity.qdrant.clone())?);
    let source_images = Arc::new(PrefixImageLoader::new(
        config.similarity.image_source_prefix.clone(),
    ));

    let similarity = Arc::new(
        SimilarityService::new(
            embedder,
            vector_index.clone(),
            catalog.clone(),
            source_images,
        )
        .with_top_k(config.similarity.top_k),
    );

    let state = AppState {
        config,
        mongo_client,
        db,
        catalog,
        similarity,
        vector_index,
    };

    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // /health: liveness, /ready: MongoDB and Qdrant, /metrics: Prometheus
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()))
        .route("/metrics", get(metrics_handler));

    info!(
        port = state.config.server.port,
        top_k = state.similarity.top_k(),
        "Starting Catalog API with production-ready shutdown (30s timeout)"
    );

    let server_config = state.config.server.clone();
    create_production_app(app, &server_config, Duration::from_secs(30), async move {
        info!("Shutting down: closing MongoDB connections");
        drop(state.mongo_client);
        info!("MongoDB connection closed");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog API shutdown complete");
    Ok(())
}
