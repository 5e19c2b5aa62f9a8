use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse, env_required};

/// Qdrant connection and collection settings
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub collection: String,
    /// Payload key holding the catalog record id; the point id is used when absent
    pub id_payload_key: String,
}

impl QdrantConfig {
    pub fn new(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            collection: collection.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_id_payload_key(mut self, key: impl Into<String>) -> Self {
        self.id_payload_key = key.into();
        self
    }
}

impl FromEnv for QdrantConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("QDRANT_URL", "http://localhost:6334"),
            api_key: env_optional("QDRANT_API_KEY"),
            timeout_secs: env_parse("QDRANT_TIMEOUT_SECS", 30)?,
            collection: env_required("QDRANT_COLLECTION")?,
            id_payload_key: env_or_default("VECTOR_ID_PAYLOAD_KEY", "id"),
        })
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            timeout_secs: 30,
            collection: String::new(),
            id_payload_key: "id".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("QDRANT_URL", None),
                ("QDRANT_API_KEY", None),
                ("QDRANT_TIMEOUT_SECS", None),
                ("QDRANT_COLLECTION", Some("fashion-images")),
                ("VECTOR_ID_PAYLOAD_KEY", None),
            ],
            || {
                let config = QdrantConfig::from_env().unwrap();
                assert_eq!(config.url, "http://localhost:6334");
                assert!(config.api_key.is_none());
                assert_eq!(config.timeout_secs, 30);
                assert_eq!(config.collection, "fashion-images");
                assert_eq!(config.id_payload_key, "id");
            },
        );
    }

    #[test]
    fn test_from_env_requires_collection() {
        temp_env::with_var_unset("QDRANT_COLLECTION", || {
            assert!(matches!(
                QdrantConfig::from_env(),
                Err(ConfigError::MissingEnvVar(key)) if key == "QDRANT_COLLECTION"
            ));
        });
    }

    #[test]
    fn test_from_env_rejects_bad_timeout() {
        temp_env::with_vars(
            [
                ("QDRANT_COLLECTION", Some("c")),
                ("QDRANT_TIMEOUT_SECS", Some("soon")),
            ],
            || {
                assert!(matches!(
                    QdrantConfig::from_env(),
                    Err(ConfigError::ParseError { .. })
                ));
            },
        );
    }
}
