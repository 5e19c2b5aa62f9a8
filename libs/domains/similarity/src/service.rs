//! Similarity Service - image to similar catalog records

use std::sync::Arc;

use domain_catalog::{CatalogQuery, Record};
use observability::{SimilarityMetrics, StageTimer};
use tracing::instrument;

use crate::decode::DecodedImage;
use crate::embedding::ImageEmbedder;
use crate::error::{SimilarityError, SimilarityResult};
use crate::index::VectorIndex;
use crate::lookup::CatalogLookup;
use crate::models::{RecommendationRequest, SearchSource};
use crate::source::SourceImageLoader;

pub const DEFAULT_TOP_K: u64 = 10;

/// Runs the similarity pipeline: decode, embed, query the index, drop the
/// source record, resolve ids against the catalog, then apply the optional
/// category filter.
pub struct SimilarityService {
    embedder: Arc<dyn ImageEmbedder>,
    index: Arc<dyn VectorIndex>,
    catalog: Arc<dyn CatalogLookup>,
    source_images: Arc<dyn SourceImageLoader>,
    top_k: u64,
}

impl SimilarityService {
    pub fn new(
        embedder: Arc<dyn ImageEmbedder>,
        index: Arc<dyn VectorIndex>,
        catalog: Arc<dyn CatalogLookup>,
        source_images: Arc<dyn SourceImageLoader>,
    ) -> Self {
        Self {
            embedder,
            index,
            catalog,
            source_images,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Number of nearest neighbors requested from the index (at least 1)
    pub fn with_top_k(mut self, top_k: u64) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn top_k(&self) -> u64 {
        self.top_k
    }

    /// Records visually similar to an uploaded image, most similar first.
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    pub async fn similar_to_upload(&self, image: Vec<u8>) -> SimilarityResult<Vec<Record>> {
        self.observe(
            SearchSource::Upload,
            self.search(image, None, &CatalogQuery::unfiltered()),
        )
        .await
    }

    /// Records similar to a stored record's image, excluding the record
    /// itself and, when given, restricted to its categories.
    #[instrument(skip(self, request), fields(record_id = %request.id))]
    pub async fn recommend(&self, request: RecommendationRequest) -> SimilarityResult<Vec<Record>> {
        let record_id = request.id.trim();
        if record_id.is_empty() {
            return Err(SimilarityError::Validation("id must not be blank".to_string()));
        }

        let categories = CatalogQuery::unfiltered()
            .with_str("masterCategory", request.master_category.as_deref())
            .with_str("subCategory", request.sub_category.as_deref());

        self.observe(SearchSource::Record, async {
            let image = self
                .source_images
                .load(record_id)
                .await?
                .ok_or_else(|| SimilarityError::SourceImageNotFound(record_id.to_string()))?;

            self.search(image, Some(record_id), &categories).await
        })
        .await
    }

    async fn observe(
        &self,
        source: SearchSource,
        search: impl Future<Output = SimilarityResult<(usize, Vec<Record>)>>,
    ) -> SimilarityResult<Vec<Record>> {
        match search.await {
            Ok((candidates, records)) => {
                SimilarityMetrics::record_search(source.as_str(), true, candidates, records.len());
                Ok(records)
            }
            Err(err) => {
                SimilarityMetrics::record_search(source.as_str(), false, 0, 0);
                Err(err)
            }
        }
    }

    /// Returns the number of index candidates alongside the final records.
    async fn search(
        &self,
        image: Vec<u8>,
        exclude: Option<&str>,
        categories: &CatalogQuery,
    ) -> SimilarityResult<(usize, Vec<Record>)> {
        let mut timer = StageTimer::start("decode");
        let image = tokio::task::spawn_blocking(move || DecodedImage::decode(image))
            .await
            .map_err(|e| SimilarityError::Internal(format!("decode task failed: {}", e)))??;
        timer.stop();

        let mut timer = StageTimer::start("embed");
        let vector = self.embedder.embed_image(&image).await?;
        timer.stop();
        if vector.len() != self.embedder.dimension() {
            return Err(SimilarityError::Embedding(format!(
                "expected {} dimensions, got {}",
                self.embedder.dimension(),
                vector.len()
            )));
        }

        let mut timer = StageTimer::start("query");
        let matches = self.index.query(vector, self.top_k).await?;
        timer.stop();
        let candidates = matches.len();

        let ids: Vec<String> = matches
            .into_iter()
            .map(|m| m.record_id)
            .filter(|id| Some(id.as_str()) != exclude)
            .collect();

        let mut timer = StageTimer::start("join");
        let mut records = self.catalog.batch_fetch(&ids).await?;
        timer.stop();

        if !categories.is_unfiltered() {
            records.retain(|record| categories.matches(record));
        }

        tracing::debug!(
            candidates,
            returned = records.len(),
            width = image.width(),
            height = image.height(),
            "Similarity search complete"
        );

        Ok((candidates, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::encode_png;
    use crate::embedding::MockImageEmbedder;
    use crate::index::MockVectorIndex;
    use crate::lookup::MockCatalogLookup;
    use crate::models::SimilarityMatch;
    use crate::source::MockSourceImageLoader;
    use domain_catalog::CatalogError;
    use serde_json::{Value, json};

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    fn hits(ids: &[&str]) -> Vec<SimilarityMatch> {
        ids.iter()
            .enumerate()
            .map(|(rank, id)| SimilarityMatch {
                record_id: id.to_string(),
                score: 1.0 - rank as f32 * 0.1,
            })
            .collect()
    }

    fn embedder() -> MockImageEmbedder {
        let mut embedder = MockImageEmbedder::new();
        embedder.expect_dimension().return_const(3usize);
        embedder
            .expect_embed_image()
            .returning(|_| Ok(vec![0.1, 0.2, 0.3]));
        embedder
    }

    fn service(
        embedder: MockImageEmbedder,
        index: MockVectorIndex,
        catalog: MockCatalogLookup,
        source: MockSourceImageLoader,
    ) -> SimilarityService {
        SimilarityService::new(
            Arc::new(embedder),
            Arc::new(index),
            Arc::new(catalog),
            Arc::new(source),
        )
    }

    #[tokio::test]
    async fn test_upload_returns_records_in_index_order() {
        let mut index = MockVectorIndex::new();
        index
            .expect_query()
            .withf(|vector, top_k| vector.len() == 3 && *top_k == 10)
            .returning(|_, _| Ok(hits(&["3", "1", "2"])));

        let mut catalog = MockCatalogLookup::new();
        catalog
            .expect_batch_fetch()
            .withf(|ids| ids == ["3", "1", "2"])
            .returning(|_| {
                Ok(vec![
                    record(json!({"id": "3"})),
                    record(json!({"id": "1"})),
                    record(json!({"id": "2"})),
                ])
            });

        let service = service(embedder(), index, catalog, MockSourceImageLoader::new());
        let records = service.similar_to_upload(encode_png(2, 2)).await.unwrap();

        let ids: Vec<_> = records.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[tokio::test]
    async fn test_upload_rejects_undecodable_image_before_embedding() {
        let mut embedder = MockImageEmbedder::new();
        embedder.expect_embed_image().times(0);

        let service = service(
            embedder,
            MockVectorIndex::new(),
            MockCatalogLookup::new(),
            MockSourceImageLoader::new(),
        );
        let result = service.similar_to_upload(b"not an image".to_vec()).await;
        assert!(matches!(result, Err(SimilarityError::ImageDecode(_))));
    }

    #[tokio::test]
    async fn test_index_failure_propagates() {
        let mut index = MockVectorIndex::new();
        index
            .expect_query()
            .returning(|_, _| Err(SimilarityError::VectorIndex("unavailable".to_string())));
        let mut catalog = MockCatalogLookup::new();
        catalog.expect_batch_fetch().times(0);

        let service = service(embedder(), index, catalog, MockSourceImageLoader::new());
        let result = service.similar_to_upload(encode_png(2, 2)).await;
        assert!(matches!(result, Err(SimilarityError::VectorIndex(_))));
    }

    #[tokio::test]
    async fn test_wrong_embedding_length_is_embedding_error() {
        let mut embedder = MockImageEmbedder::new();
        embedder.expect_dimension().return_const(4usize);
        embedder.expect_embed_image().returning(|_| Ok(vec![0.5]));
        let mut index = MockVectorIndex::new();
        index.expect_query().times(0);

        let service = service(
            embedder,
            index,
            MockCatalogLookup::new(),
            MockSourceImageLoader::new(),
        );
        let result = service.similar_to_upload(encode_png(2, 2)).await;
        assert!(matches!(result, Err(SimilarityError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_recommend_excludes_source_and_filters_categories() {
        let mut source = MockSourceImageLoader::new();
        source
            .expect_load()
            .withf(|id| id == "10")
            .returning(|_| Ok(Some(encode_png(3, 3))));

        let mut index = MockVectorIndex::new();
        index
            .expect_query()
            .returning(|_, _| Ok(hits(&["10", "11", "12", "13"])));

        let mut catalog = MockCatalogLookup::new();
        catalog
            .expect_batch_fetch()
            .withf(|ids| ids == ["11", "12", "13"])
            .returning(|_| {
                Ok(vec![
                    record(json!({"id": "11", "masterCategory": "Apparel", "subCategory": "Topwear"})),
                    record(json!({"id": "12", "masterCategory": "Apparel", "subCategory": "Bottomwear"})),
                    record(json!({"id": "13", "masterCategory": "Apparel", "subCategory": "Topwear"})),
                ])
            });

        let service = service(embedder(), index, catalog, source).with_top_k(4);
        let request = RecommendationRequest {
            id: "10".to_string(),
            master_category: Some("Apparel".to_string()),
            sub_category: Some("Topwear".to_string()),
        };
        let records = service.recommend(request).await.unwrap();

        let ids: Vec<_> = records.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec!["11", "13"]);
    }

    #[tokio::test]
    async fn test_recommend_without_categories_keeps_all() {
        let mut source = MockSourceImageLoader::new();
        source.expect_load().returning(|_| Ok(Some(encode_png(1, 1))));
        let mut index = MockVectorIndex::new();
        index.expect_query().returning(|_, _| Ok(hits(&["2", "1"])));
        let mut catalog = MockCatalogLookup::new();
        catalog
            .expect_batch_fetch()
            .returning(|_| Ok(vec![record(json!({"id": "2", "subCategory": "Shoes"}))]));

        let service = service(embedder(), index, catalog, source);
        let request = RecommendationRequest {
            id: "1".to_string(),
            master_category: Some("  ".to_string()),
            sub_category: None,
        };
        let records = service.recommend(request).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_recommend_missing_source_image() {
        let mut source = MockSourceImageLoader::new();
        source.expect_load().returning(|_| Ok(None));
        let mut embedder = MockImageEmbedder::new();
        embedder.expect_embed_image().times(0);

        let service = service(embedder, MockVectorIndex::new(), MockCatalogLookup::new(), source);
        let request = RecommendationRequest {
            id: "404".to_string(),
            ..Default::default()
        };
        let result = service.recommend(request).await;
        assert!(matches!(result, Err(SimilarityError::SourceImageNotFound(id)) if id == "404"));
    }

    #[tokio::test]
    async fn test_recommend_rejects_blank_id() {
        let service = service(
            MockImageEmbedder::new(),
            MockVectorIndex::new(),
            MockCatalogLookup::new(),
            MockSourceImageLoader::new(),
        );
        let request = RecommendationRequest {
            id: "   ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            service.recommend(request).await,
            Err(SimilarityError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_catalog_failure_propagates() {
        let mut index = MockVectorIndex::new();
        index.expect_query().returning(|_, _| Ok(hits(&["1"])));
        let mut catalog = MockCatalogLookup::new();
        catalog
            .expect_batch_fetch()
            .returning(|_| Err(CatalogError::Database("down".to_string())));

        let service = service(embedder(), index, catalog, MockSourceImageLoader::new());
        let result = service.similar_to_upload(encode_png(1, 1)).await;
        assert!(matches!(
            result,
            Err(SimilarityError::Catalog(CatalogError::Database(_)))
        ));
    }
}
