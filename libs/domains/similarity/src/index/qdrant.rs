use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    PointId, SearchPointsBuilder, Value as QdrantValue, point_id::PointIdOptions, value::Kind,
};
use tracing::instrument;

use super::{QdrantConfig, VectorIndex};
use crate::error::{SimilarityError, SimilarityResult};
use crate::models::SimilarityMatch;

/// Qdrant-backed implementation of VectorIndex
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection: String,
    id_payload_key: String,
}

impl QdrantVectorIndex {
    pub fn new(config: QdrantConfig) -> SimilarityResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| SimilarityError::VectorIndex(format!("Failed to build client: {}", e)))?;

        Ok(Self::from_client(
            client,
            config.collection,
            config.id_payload_key,
        ))
    }

    pub fn from_client(client: Qdrant, collection: String, id_payload_key: String) -> Self {
        Self {
            client,
            collection,
            id_payload_key,
        }
    }

    /// Round trip to the Qdrant server, for readiness checks
    pub async fn health_check(&self) -> SimilarityResult<()> {
        self.client.health_check().await?;
        Ok(())
    }
}

/// Record id for a hit: the payload value under `key` when it is a string or
/// integer, else the point id.
fn record_id(
    point_id: Option<&PointId>,
    payload: &HashMap<String, QdrantValue>,
    key: &str,
) -> Option<String> {
    let from_payload = payload.get(key).and_then(|value| match &value.kind {
        Some(Kind::StringValue(s)) if !s.is_empty() => Some(s.clone()),
        Some(Kind::IntegerValue(n)) => Some(n.to_string()),
        _ => None,
    });

    from_payload.or_else(|| match point_id?.point_id_options.as_ref()? {
        PointIdOptions::Num(n) => Some(n.to_string()),
        PointIdOptions::Uuid(uuid) => Some(uuid.clone()),
    })
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    #[instrument(skip(self, vector), fields(collection = %self.collection, dimension = vector.len()))]
    async fn query(&self, vector: Vec<f32>, top_k: u64) -> SimilarityResult<Vec<SimilarityMatch>> {
        let builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);

        let response = self.client.search_points(builder).await?;

        let matches = response
            .result
            .into_iter()
            .filter_map(|point| {
                let id = record_id(point.id.as_ref(), &point.payload, &self.id_payload_key);
                if id.is_none() {
                    tracing::warn!(score = point.score, "Vector hit without a record id, skipping");
                }
                id.map(|record_id| SimilarityMatch {
                    record_id,
                    score: point.score,
                })
            })
            .collect();

        Ok(matches)
    }
}
