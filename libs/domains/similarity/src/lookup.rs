use async_trait::async_trait;
use domain_catalog::{CatalogRepository, CatalogResult, CatalogService, Record};

/// Batch resolution of record ids into sanitized catalog records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Records in first-occurrence order of `ids`; unknown ids are dropped
    async fn batch_fetch(&self, ids: &[String]) -> CatalogResult<Vec<Record>>;
}

#[async_trait]
impl<R: CatalogRepository> CatalogLookup for CatalogService<R> {
    async fn batch_fetch(&self, ids: &[String]) -> CatalogResult<Vec<Record>> {
        CatalogService::batch_fetch(self, ids).await
    }
}
