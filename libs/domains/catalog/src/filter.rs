//! Store-agnostic conjunction of equality predicates over record attributes.

use serde_json::Value;

use crate::models::{CatalogFilter, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateValue {
    Str(String),
    Int(i64),
}

impl PredicateValue {
    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (PredicateValue::Str(expected), Value::String(actual)) => expected == actual,
            (PredicateValue::Int(expected), Value::Number(actual)) => {
                actual.as_i64() == Some(*expected)
            }
            _ => false,
        }
    }
}

/// `field == value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: &'static str,
    pub value: PredicateValue,
}

/// Filter query built from a [`CatalogFilter`]. Predicates keep a fixed field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    predicates: Vec<Predicate>,
}

impl CatalogQuery {
    /// Matches every record.
    pub fn unfiltered() -> Self {
        Self::default()
    }

    /// One predicate per supplied attribute. Absent and blank values add nothing.
    pub fn from_filter(filter: &CatalogFilter) -> Self {
        let mut query = Self::default();

        let strings = [
            ("gender", &filter.gender),
            ("masterCategory", &filter.master_category),
            ("subCategory", &filter.sub_category),
            ("articleType", &filter.article_type),
            ("baseColour", &filter.base_colour),
            ("season", &filter.season),
        ];
        for (field, value) in strings {
            query.push_str(field, value.as_deref());
        }

        if let Some(year) = filter.year {
            query.predicates.push(Predicate {
                field: "year",
                value: PredicateValue::Int(i64::from(year)),
            });
        }

        query.push_str("usage", filter.usage.as_deref());
        query
    }

    /// Adds `field == value` unless the value is absent or blank.
    pub fn with_str(mut self, field: &'static str, value: Option<&str>) -> Self {
        self.push_str(field, value);
        self
    }

    fn push_str(&mut self, field: &'static str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.predicates.push(Predicate {
                field,
                value: PredicateValue::Str(value.to_string()),
            });
        }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_unfiltered(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Evaluates the query against an in-memory record.
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|predicate| {
            record
                .get(predicate.field)
                .is_some_and(|value| predicate.value.matches(value))
        })
    }
}
