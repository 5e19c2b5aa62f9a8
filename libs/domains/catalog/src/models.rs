use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Attribute map as read from the store, before sanitizing.
pub type RawRecord = Map<String, Value>;

/// Page size used when neither the request nor configuration supplies one.
pub const DEFAULT_PAGE_SIZE: u32 = 9;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A catalog item: a flat, open map of attributes.
///
/// Known attributes are `id`, `gender`, `masterCategory`, `subCategory`,
/// `articleType`, `baseColour`, `season`, `year`, `usage`,
/// `productDisplayName` and `image`; anything else the store holds is kept.
/// Records produced by the service are sanitized: no null values and a
/// string `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object, example = json!({
    "id": "15970",
    "gender": "Men",
    "masterCategory": "Apparel",
    "subCategory": "Topwear",
    "articleType": "Shirts",
    "baseColour": "Navy Blue",
    "season": "Fall",
    "year": 2011,
    "usage": "Casual",
    "productDisplayName": "Turtle Check Men Navy Blue Shirt",
    "image": ""
}))]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String attribute, `None` when absent or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_attributes(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }
}

/// Equality constraints on the fixed set of filterable attributes.
///
/// `None` and blank strings mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub gender: Option<String>,
    pub master_category: Option<String>,
    pub sub_category: Option<String>,
    pub article_type: Option<String>,
    pub base_colour: Option<String>,
    pub season: Option<String>,
    pub year: Option<i32>,
    pub usage: Option<String>,
}

/// Query string of `GET /products`.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number; values past the last page return the last page
    #[validate(range(min = 1))]
    #[param(minimum = 1, default = 1)]
    pub page: Option<u64>,

    /// Records per page (defaults to the configured page size)
    #[validate(range(min = 1, max = 100))]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: Option<u32>,

    pub gender: Option<String>,

    #[serde(rename = "masterCategory")]
    #[param(rename = "masterCategory")]
    pub master_category: Option<String>,

    #[serde(rename = "subCategory")]
    #[param(rename = "subCategory")]
    pub sub_category: Option<String>,

    #[serde(rename = "articleType")]
    #[param(rename = "articleType")]
    pub article_type: Option<String>,

    #[serde(rename = "baseColour")]
    #[param(rename = "baseColour")]
    pub base_colour: Option<String>,

    pub season: Option<String>,

    /// Full year, e.g. 2017
    pub year: Option<i32>,

    pub usage: Option<String>,
}

impl ListQuery {
    /// Splits the query into the page request and the attribute filter.
    pub fn into_parts(self, default_page_size: u32) -> (PageRequest, CatalogFilter) {
        let request = PageRequest {
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(default_page_size),
        };
        let filter = CatalogFilter {
            gender: self.gender,
            master_category: self.master_category,
            sub_category: self.sub_category,
            article_type: self.article_type,
            base_colour: self.base_colour,
            season: self.season,
            year: self.year,
            usage: self.usage,
        };
        (request, filter)
    }
}

/// Validated page parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u32,
}

/// One page of sanitized records plus the page descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageResponse {
    /// Effective page after clamping
    pub page: u64,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u64,
    /// `[1..=total_pages]`, never empty
    pub pages: Vec<u64>,
    pub items: Vec<Record>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_transparent() {
        let record: Record =
            serde_json::from_value(json!({"id": "1", "gender": "Men", "extra": true})).unwrap();
        assert_eq!(record.id(), Some("1"));
        assert_eq!(record.get_str("gender"), Some("Men"));
        assert_eq!(record.get("extra"), Some(&json!(true)));
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"id": "1", "gender": "Men", "extra": true})
        );
    }

    #[test]
    fn test_into_parts_applies_defaults() {
        let (request, filter) = ListQuery::default().into_parts(DEFAULT_PAGE_SIZE);
        assert_eq!(request, PageRequest { page: 1, page_size: 9 });
        assert_eq!(filter, CatalogFilter::default());
    }

    #[test]
    fn test_list_query_validation_bounds() {
        let ok = ListQuery {
            page: Some(1),
            page_size: Some(MAX_PAGE_SIZE),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let zero_page = ListQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(zero_page.validate().is_err());

        let too_large = ListQuery {
            page_size: Some(MAX_PAGE_SIZE + 1),
            ..Default::default()
        };
        assert!(too_large.validate().is_err());
    }
}
