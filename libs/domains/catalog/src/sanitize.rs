use serde_json::Value;

use crate::models::{RawRecord, Record};

/// Replaces nulls with `""` and renders `id` as a string. Other values pass through.
pub fn sanitize(raw: RawRecord) -> Record {
    let attributes = raw
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Null => Value::String(String::new()),
                value if key == "id" => Value::String(id_to_string(value)),
                value => value,
            };
            (key, value)
        })
        .collect();

    Record::new(attributes)
}

fn id_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_nulls_become_empty_strings() {
        let record = sanitize(raw(json!({"id": "1", "season": null, "year": 2012})));
        assert_eq!(record.get_str("season"), Some(""));
        assert_eq!(record.get("year"), Some(&json!(2012)));
    }

    #[test]
    fn test_numeric_id_rendered_as_string() {
        let record = sanitize(raw(json!({"id": 15970})));
        assert_eq!(record.id(), Some("15970"));
    }

    #[test]
    fn test_null_id_becomes_empty_string() {
        let record = sanitize(raw(json!({"id": null})));
        assert_eq!(record.id(), Some(""));
    }

    #[test]
    fn test_nested_values_untouched() {
        let record = sanitize(raw(json!({"id": "a", "tags": ["x", null]})));
        assert_eq!(record.get("tags"), Some(&json!(["x", null])));
    }
}
