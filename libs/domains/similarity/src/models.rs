use domain_catalog::Record;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// One vector-index hit. Only `record_id` is used downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    pub record_id: String,
    pub score: f32,
}

/// Reference to a stored record whose image seeds the search.
///
/// Any other record attributes in the body are accepted and ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecommendationRequest {
    /// Id of the source record
    #[validate(length(min = 1))]
    #[schema(example = "15970")]
    pub id: String,

    /// When non-blank, results must share this master category
    #[serde(rename = "masterCategory", default)]
    #[schema(example = "Apparel")]
    pub master_category: Option<String>,

    /// When non-blank, results must share this sub category
    #[serde(rename = "subCategory", default)]
    #[schema(example = "Topwear")]
    pub sub_category: Option<String>,
}

/// Similar records, most similar first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemsResponse {
    pub items: Vec<Record>,
}

/// Multipart form of `POST /getSimilarImages`
#[derive(ToSchema)]
pub struct UploadForm {
    /// Encoded query image (JPEG, PNG, ...)
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Where the query image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSource {
    Upload,
    Record,
}

impl SearchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSource::Upload => "upload",
            SearchSource::Record => "record",
        }
    }
}
