//! MongoDB implementation of CatalogRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::{FindOptions, IndexOptions},
    Collection, Database, IndexModel,
};
use serde_json::Value;
use tracing::instrument;

use crate::error::CatalogResult;
use crate::filter::{CatalogQuery, PredicateValue};
use crate::models::RawRecord;
use crate::repository::CatalogRepository;

/// Collection name used when none is configured
pub const DEFAULT_COLLECTION: &str = "FashionData";

const FILTER_FIELDS: [&str; 8] = [
    "gender",
    "masterCategory",
    "subCategory",
    "articleType",
    "baseColour",
    "season",
    "year",
    "usage",
];

pub struct MongoCatalogRepository {
    collection: Collection<Document>,
}

impl MongoCatalogRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, DEFAULT_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Document>(collection_name);
        Self { collection }
    }

    /// Single-field ascending index per filterable attribute
    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let indexes = FILTER_FIELDS.iter().map(|field| {
            let mut keys = Document::new();
            keys.insert(*field, 1);
            IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(format!("idx_{field}"))
                        .build(),
                )
                .build()
        });

        self.collection.create_indexes(indexes).await?;
        tracing::info!(
            collection = %self.collection.name(),
            "Catalog indexes created successfully"
        );
        Ok(())
    }

    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }

    fn build_filter(query: &CatalogQuery) -> Document {
        let mut filter = doc! {};
        for predicate in query.predicates() {
            let value = match &predicate.value {
                PredicateValue::Str(s) => Bson::String(s.clone()),
                PredicateValue::Int(n) => match i32::try_from(*n) {
                    Ok(n) => Bson::Int32(n),
                    Err(_) => Bson::Int64(*n),
                },
            };
            filter.insert(predicate.field, value);
        }
        filter
    }

    /// Keys a record may be stored under: the raw string, plus the integer
    /// form for decimal ids and the ObjectId form for hex ids.
    fn key_candidates(id: &str) -> Vec<Bson> {
        let mut keys = vec![Bson::String(id.to_string())];
        if let Ok(n) = id.trim().parse::<i64>() {
            if let Ok(n) = i32::try_from(n) {
                keys.push(Bson::Int32(n));
            }
            keys.push(Bson::Int64(n));
        }
        if let Ok(oid) = ObjectId::parse_str(id) {
            keys.push(Bson::ObjectId(oid));
        }
        keys
    }
}

/// Whether a stored `_id` equals a lookup key. Numbers compare by value
/// across BSON numeric types, as `$in` does.
fn same_key(stored: &Bson, candidate: &Bson) -> bool {
    match (as_integer(stored), as_integer(candidate)) {
        (Some(a), Some(b)) => a == b,
        _ => stored == candidate,
    }
}

fn as_integer(key: &Bson) -> Option<i64> {
    match key {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        Bson::Double(n) if n.fract() == 0.0 => Some(*n as i64),
        _ => None,
    }
}

/// Converts batch results to raw records whose `id` is the requested id
/// each document matched, so callers can pair results with their input.
fn into_requested_records(documents: Vec<Document>, ids: &[String]) -> Vec<RawRecord> {
    let keyed: Vec<(Bson, &String)> = ids
        .iter()
        .flat_map(|id| {
            MongoCatalogRepository::key_candidates(id)
                .into_iter()
                .map(move |key| (key, id))
        })
        .collect();

    documents
        .into_iter()
        .map(|document| {
            let requested = document.get("_id").and_then(|stored| {
                keyed
                    .iter()
                    .find(|(key, _)| same_key(stored, key))
                    .map(|(_, id)| (*id).clone())
            });
            let mut record = into_raw_record(document, false);
            if let Some(id) = requested {
                record.insert("id".to_string(), Value::String(id));
            }
            record
        })
        .collect()
}

fn key_to_string(key: Bson) -> String {
    match key {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(n) => n.to_string(),
        other => other.into_relaxed_extjson().to_string(),
    }
}

/// Converts a stored document to a raw record. The key is removed and
/// exposed as `id`; with `keep_stored_id` a stored `id` attribute wins.
fn into_raw_record(mut document: Document, keep_stored_id: bool) -> RawRecord {
    let key = document.remove("_id").map(key_to_string);

    let mut record: RawRecord = document
        .into_iter()
        .map(|(field, value)| (field, value.into_relaxed_extjson()))
        .collect();

    let has_stored_id = record.get("id").is_some_and(|v| !v.is_null());
    if !(keep_stored_id && has_stored_id) {
        if let Some(key) = key {
            record.insert("id".to_string(), Value::String(key));
        }
    }
    record
}

#[async_trait]
impl CatalogRepository for MongoCatalogRepository {
    #[instrument(skip(self))]
    async fn count(&self, query: &CatalogQuery) -> CatalogResult<u64> {
        let count = self
            .collection
            .count_documents(Self::build_filter(query))
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn count_by_scan(&self, query: &CatalogQuery) -> CatalogResult<u64> {
        let options = FindOptions::builder().projection(doc! { "_id": 1 }).build();

        let mut cursor = self
            .collection
            .find(Self::build_filter(query))
            .with_options(options)
            .await?;

        let mut count = 0u64;
        while cursor.try_next().await?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn find_page(
        &self,
        query: &CatalogQuery,
        offset: u64,
        limit: u32,
    ) -> CatalogResult<Vec<RawRecord>> {
        let options = FindOptions::builder()
            .sort(doc! { "_id": 1 })
            .skip(offset)
            .limit(i64::from(limit))
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(query))
            .with_options(options)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        Ok(documents
            .into_iter()
            .map(|document| into_raw_record(document, true))
            .collect())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> CatalogResult<Option<RawRecord>> {
        let filter = doc! { "_id": { "$in": Self::key_candidates(id) } };
        let document = self.collection.find_one(filter).await?;
        Ok(document.map(|document| into_raw_record(document, false)))
    }

    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    async fn find_many(&self, ids: &[String]) -> CatalogResult<Vec<RawRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<Bson> = ids
            .iter()
            .flat_map(|id| Self::key_candidates(id))
            .collect();

        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": keys } })
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        Ok(into_requested_records(documents, ids))
    }
}
