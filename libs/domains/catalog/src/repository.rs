use async_trait::async_trait;

use crate::error::CatalogResult;
use crate::filter::CatalogQuery;
use crate::models::RawRecord;

/// Read-only access to the product catalog store.
///
/// Records come back unsanitized; the service owns sanitizing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Native count of records matching the query
    async fn count(&self, query: &CatalogQuery) -> CatalogResult<u64>;

    /// Count by streaming matching records. Slow; only used when `count` fails.
    async fn count_by_scan(&self, query: &CatalogQuery) -> CatalogResult<u64>;

    /// Matching records in the store's stable default order, `offset` skipped, at most `limit` returned.
    /// List records keep a stored `id` attribute, falling back to the record key.
    async fn find_page(
        &self,
        query: &CatalogQuery,
        offset: u64,
        limit: u32,
    ) -> CatalogResult<Vec<RawRecord>>;

    /// Single record by key, with `id` set to the key
    async fn find_by_id(&self, id: &str) -> CatalogResult<Option<RawRecord>>;

    /// Records for the given keys in one round trip, `id` set to the key.
    /// Missing keys are absent from the result; order is unspecified.
    async fn find_many(&self, ids: &[String]) -> CatalogResult<Vec<RawRecord>>;
}
