//! Catalog Domain
//!
//! Read-only product catalog: filtered, paginated listing, single lookups
//! and batch fetches, backed by MongoDB.
//!
//! ## Architecture
//!
//! ```text
//! handlers (HTTP) -> service (pagination, count fallback, sanitizing)
//!                 -> repository (trait) -> mongodb (implementation)
//! ```
//!
//! Records are open attribute maps. Every record leaving the service has
//! no null values and a string `id`.

pub mod error;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod pagination;
pub mod repository;
pub mod sanitize;
pub mod service;

pub use error::{CatalogError, CatalogResult};
pub use filter::{CatalogQuery, Predicate, PredicateValue};
pub use handlers::ApiDoc;
pub use models::{
    CatalogFilter, ListQuery, PageRequest, PageResponse, RawRecord, Record, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
pub use crate::mongodb::MongoCatalogRepository;
pub use pagination::PageDescriptor;
pub use repository::CatalogRepository;
pub use sanitize::sanitize;
pub use service::CatalogService;
