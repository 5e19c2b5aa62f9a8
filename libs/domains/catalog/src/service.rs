//! Catalog Service - query orchestration over the repository

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use observability::CatalogMetrics;
use tracing::instrument;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::filter::CatalogQuery;
use crate::models::{
    CatalogFilter, ListQuery, PageRequest, PageResponse, Record, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use crate::pagination::PageDescriptor;
use crate::repository::CatalogRepository;
use crate::sanitize::sanitize;

pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
    default_page_size: u32,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Page size used when a list request omits `page_size`. Clamped to `1..=100`.
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// List one page of records from the raw query string parameters.
    #[instrument(skip(self, query))]
    pub async fn list_products(&self, query: ListQuery) -> CatalogResult<PageResponse> {
        query
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let (request, filter) = query.into_parts(self.default_page_size);
        self.list_page(request, &filter).await
    }

    /// Filter, count, clamp the page, then fetch and sanitize that page.
    #[instrument(skip(self, filter), fields(page = request.page, page_size = request.page_size))]
    pub async fn list_page(
        &self,
        request: PageRequest,
        filter: &CatalogFilter,
    ) -> CatalogResult<PageResponse> {
        if request.page < 1 {
            return Err(CatalogError::Validation("page must be at least 1".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&request.page_size) {
            return Err(CatalogError::Validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let start = Instant::now();
        let result = self.fetch_page(request, filter).await;
        CatalogMetrics::record_query("list", result.is_ok(), start.elapsed());
        result
    }

    async fn fetch_page(
        &self,
        request: PageRequest,
        filter: &CatalogFilter,
    ) -> CatalogResult<PageResponse> {
        let query = CatalogQuery::from_filter(filter);
        let total_count = self.count(&query).await?;
        let descriptor = PageDescriptor::compute(request.page, request.page_size, total_count);

        let items = self
            .repository
            .find_page(&query, descriptor.offset(), descriptor.limit())
            .await?
            .into_iter()
            .map(sanitize)
            .collect();

        Ok(PageResponse {
            page: descriptor.page,
            page_size: descriptor.page_size,
            total_count: descriptor.total_count,
            total_pages: descriptor.total_pages,
            pages: descriptor.pages(),
            items,
        })
    }

    /// Native count, falling back to a streamed count when the store rejects it.
    async fn count(&self, query: &CatalogQuery) -> CatalogResult<u64> {
        match self.repository.count(query).await {
            Ok(total) => Ok(total),
            Err(err) => {
                tracing::warn!(error = %err, "Native count failed, counting by scan");
                CatalogMetrics::record_count_fallback();
                self.repository.count_by_scan(query).await
            }
        }
    }

    /// Get a single sanitized record by id
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> CatalogResult<Record> {
        let start = Instant::now();
        let result = match self.repository.find_by_id(id).await {
            Ok(Some(raw)) => Ok(sanitize(raw)),
            Ok(None) => Err(CatalogError::NotFound(id.to_string())),
            Err(err) => Err(err),
        };

        let success = !matches!(result, Err(CatalogError::Database(_)));
        CatalogMetrics::record_query("get", success, start.elapsed());
        result
    }

    /// Fetch many records in one store round trip.
    ///
    /// Duplicate ids are collapsed and results follow the order of first
    /// appearance. Ids without a record are dropped.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn batch_fetch(&self, ids: &[String]) -> CatalogResult<Vec<Record>> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let raw = match self.repository.find_many(&unique).await {
            Ok(raw) => raw,
            Err(err) => {
                CatalogMetrics::record_query("batch", false, start.elapsed());
                return Err(err);
            }
        };

        let mut by_id: HashMap<String, Record> = raw
            .into_iter()
            .map(sanitize)
            .filter_map(|record| {
                let id = record.id()?.to_string();
                Some((id, record))
            })
            .collect();

        let records: Vec<Record> = unique.iter().filter_map(|id| by_id.remove(id)).collect();

        let missing = unique.len() - records.len();
        if missing > 0 {
            tracing::debug!(missing, "Batch lookup dropped ids with no record");
        }
        CatalogMetrics::record_batch_missing(missing);
        CatalogMetrics::record_query("batch", true, start.elapsed());

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRecord;
    use crate::repository::MockCatalogRepository;
    use serde_json::{json, Value};

    fn raw(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_list_clamps_page_and_uses_offset() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo.expect_count().returning(|_| Ok(25));
        mock_repo
            .expect_find_page()
            .withf(|_, offset, limit| *offset == 18 && *limit == 9)
            .returning(|_, _, _| Ok(vec![raw(json!({"id": 19, "season": null}))]));

        let service = CatalogService::new(mock_repo);
        let page = service
            .list_page(
                PageRequest {
                    page: 5,
                    page_size: 9,
                },
                &CatalogFilter::default(),
            )
            .await
            .unwrap();

        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.pages, vec![1, 2, 3]);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id(), Some("19"));
        assert_eq!(page.items[0].get_str("season"), Some(""));
    }

    #[tokio::test]
    async fn test_list_passes_filter_to_repository() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_count()
            .withf(|query| query.predicates().len() == 2)
            .returning(|_| Ok(0));
        mock_repo
            .expect_find_page()
            .withf(|query, offset, _| query.predicates().len() == 2 && *offset == 0)
            .returning(|_, _, _| Ok(vec![]));

        let service = CatalogService::new(mock_repo);
        let query = ListQuery {
            gender: Some("Women".to_string()),
            year: Some(2017),
            season: Some(" ".to_string()),
            ..Default::default()
        };
        let page = service.list_products(query).await.unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.total_count, 0);
        assert_eq!(page.pages, vec![1]);
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_count_falls_back_to_scan() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_count()
            .returning(|_| Err(CatalogError::Database("aggregation unsupported".to_string())));
        mock_repo.expect_count_by_scan().times(1).returning(|_| Ok(4));
        mock_repo
            .expect_find_page()
            .returning(|_, _, _| Ok(vec![]));

        let service = CatalogService::new(mock_repo).with_default_page_size(2);
        let page = service.list_products(ListQuery::default()).await.unwrap();

        assert_eq!(page.total_count, 4);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_list_rejects_invalid_page_size() {
        let mock_repo = MockCatalogRepository::new();
        let service = CatalogService::new(mock_repo);

        let query = ListQuery {
            page_size: Some(101),
            ..Default::default()
        };
        let result = service.list_products(query).await;
        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_find_by_id()
            .withf(|id| id == "missing")
            .returning(|_| Ok(None));

        let service = CatalogService::new(mock_repo);
        let result = service.get_product("missing").await;
        assert!(matches!(result, Err(CatalogError::NotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_get_product_sanitizes() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(raw(json!({"id": "abc", "usage": null})))));

        let service = CatalogService::new(mock_repo);
        let record = service.get_product("abc").await.unwrap();
        assert_eq!(record.id(), Some("abc"));
        assert_eq!(record.get_str("usage"), Some(""));
    }

    #[tokio::test]
    async fn test_batch_fetch_empty_skips_store() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo.expect_find_many().times(0);

        let service = CatalogService::new(mock_repo);
        let records = service.batch_fetch(&[]).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_batch_fetch_orders_dedups_and_drops_missing() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_find_many()
            .withf(|requested| requested == ids(&["b", "a", "x"]).as_slice())
            .times(1)
            .returning(|_| {
                Ok(vec![
                    raw(json!({"id": "a", "gender": "Men"})),
                    raw(json!({"id": "b", "gender": "Women"})),
                ])
            });

        let service = CatalogService::new(mock_repo);
        let records = service
            .batch_fetch(&ids(&["b", "a", "b", "x"]))
            .await
            .unwrap();

        let returned: Vec<_> = records.iter().filter_map(Record::id).collect();
        assert_eq!(returned, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_batch_fetch_propagates_store_error() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_find_many()
            .returning(|_| Err(CatalogError::Database("unreachable".to_string())));

        let service = CatalogService::new(mock_repo);
        let result = service.batch_fetch(&ids(&["a"])).await;
        assert!(matches!(result, Err(CatalogError::Database(_))));
    }
}
