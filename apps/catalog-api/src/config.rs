//! Configuration for Catalog API

use core_config::{
    app_info, env_or_default, env_parse, env_required, server::ServerConfig, AppInfo,
    ConfigError, FromEnv,
};
use database::mongodb::MongoConfig;
use domain_catalog::models::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use domain_catalog::mongodb::DEFAULT_COLLECTION;
use domain_similarity::{HttpEmbedderConfig, QdrantConfig, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_TOP_K};

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub catalog: CatalogConfig,
    pub similarity: SimilarityConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            mongodb: MongoConfig::from_env()?,
            server: ServerConfig::from_env()?,
            environment: Environment::from_env(),
            catalog: CatalogConfig::from_env()?,
            similarity: SimilarityConfig::from_env()?,
        })
    }
}

/// Catalog listing settings
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub collection: String,
    pub default_page_size: u32,
    pub create_indexes: bool,
}

impl FromEnv for CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let default_page_size = env_parse("DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if !(1..=MAX_PAGE_SIZE).contains(&default_page_size) {
            return Err(ConfigError::ParseError {
                key: "DEFAULT_PAGE_SIZE".to_string(),
                details: format!("must be within 1..={}", MAX_PAGE_SIZE),
            });
        }

        Ok(Self {
            collection: env_or_default("CATALOG_COLLECTION", DEFAULT_COLLECTION),
            default_page_size,
            create_indexes: env_parse("CATALOG_CREATE_INDEXES", false)?,
        })
    }
}

/// Similarity pipeline collaborators and limits
#[derive(Clone, Debug)]
pub struct SimilarityConfig {
    pub qdrant: QdrantConfig,
    pub embedder: HttpEmbedderConfig,
    pub serialize_embedding: bool,
    pub image_source_prefix: String,
    pub top_k: u64,
    pub max_upload_bytes: usize,
}

impl FromEnv for SimilarityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let top_k = env_parse("SIMILARITY_TOP_K", DEFAULT_TOP_K)?;
        if top_k == 0 {
            return Err(ConfigError::ParseError {
                key: "SIMILARITY_TOP_K".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            qdrant: QdrantConfig::from_env()?,
            embedder: HttpEmbedderConfig::from_env()?,
            serialize_embedding: env_parse("EMBEDDING_SERIALIZE", false)?,
            image_source_prefix: env_required("IMAGE_SOURCE_PREFIX")?,
            top_k,
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_config_defaults() {
        temp_env::with_vars(
            [
                ("CATALOG_COLLECTION", None::<&str>),
                ("DEFAULT_PAGE_SIZE", None),
                ("CATALOG_CREATE_INDEXES", None),
            ],
            || {
                let config = CatalogConfig::from_env().unwrap();
                assert_eq!(config.collection, "FashionData");
                assert_eq!(config.default_page_size, 9);
                assert!(!config.create_indexes);
            },
        );
    }

    #[test]
    fn test_catalog_config_rejects_page_size_out_of_range() {
        for raw in ["0", "101"] {
            temp_env::with_var("DEFAULT_PAGE_SIZE", Some(raw), || {
                assert!(CatalogConfig::from_env().is_err());
            });
        }
    }

    #[test]
    fn test_similarity_config_from_env() {
        temp_env::with_vars(
            [
                ("QDRANT_COLLECTION", Some("fashion-images")),
                ("EMBEDDING_URL", Some("http://localhost:9000/embed")),
                ("EMBEDDING_SERIALIZE", Some("true")),
                ("IMAGE_SOURCE_PREFIX", Some("/data/images/")),
                ("SIMILARITY_TOP_K", Some("25")),
                ("MAX_UPLOAD_BYTES", None),
            ],
            || {
                let config = SimilarityConfig::from_env().unwrap();
                assert_eq!(config.qdrant.collection, "fashion-images");
                assert!(config.serialize_embedding);
                assert_eq!(config.image_source_prefix, "/data/images/");
                assert_eq!(config.top_k, 25);
                assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
            },
        );
    }

    #[test]
    fn test_similarity_config_requires_image_prefix() {
        temp_env::with_vars(
            [
                ("QDRANT_COLLECTION", Some("fashion-images")),
                ("EMBEDDING_URL", Some("http://localhost:9000/embed")),
                ("IMAGE_SOURCE_PREFIX", None),
            ],
            || {
                let err = SimilarityConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "IMAGE_SOURCE_PREFIX"));
            },
        );
    }

    #[test]
    fn test_similarity_config_rejects_zero_top_k() {
        temp_env::with_vars(
            [
                ("QDRANT_COLLECTION", Some("fashion-images")),
                ("EMBEDDING_URL", Some("http://localhost:9000/embed")),
                ("IMAGE_SOURCE_PREFIX", Some("/data/images/")),
                ("SIMILARITY_TOP_K", Some("0")),
            ],
            || {
                assert!(SimilarityConfig::from_env().is_err());
            },
        );
    }
}
