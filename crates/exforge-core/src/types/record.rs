//! Record helpers
//!
//! Records are JSON objects. Fields are addressed with dotted paths such as
//! `location.city`; arrays and scalars are leaves.

use serde_json::{Map, Value};

/// A record flowing into or out of an extractor
pub type Record = Value;

/// Split a dotted path into its segments, ignoring empty segments
pub fn segments(path: &str) -> Vec<&str> {
    path.split('.').filter(|s| !s.is_empty()).collect()
}

/// Number of segments in a dotted path
pub fn depth(path: &str) -> usize {
    segments(path).len()
}

/// Look up a dotted path inside a record
pub fn get_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in segments(path) {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Set a dotted path inside a record, creating intermediate objects as needed
///
/// A non-object value sitting on an intermediate segment is replaced by an object.
pub fn set_path(record: &mut Value, path: &str, value: Value) {
    let parts = segments(path);
    if parts.is_empty() {
        *record = value;
        return;
    }

    let mut current = record;
    for segment in &parts[..parts.len() - 1] {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => unreachable!("current was just made an object"),
        };
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(parts[parts.len() - 1].to_string(), value);
    }
}

/// Flatten a record into `(path, leaf)` pairs
///
/// Objects recurse; everything else (including arrays and empty objects) is a leaf.
/// Output order follows the map's key order, which is sorted for `serde_json::Map`.
pub fn flatten(record: &Value) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    flatten_into(record, String::new(), &mut out);
    out
}

fn flatten_into<'a>(value: &'a Value, prefix: String, out: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(child, path, out);
            }
        }
        _ => {
            if !prefix.is_empty() {
                out.push((prefix, value));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested_path() {
        let record = json!({"location": {"city": "Oslo"}});
        assert_eq!(get_path(&record, "location.city"), Some(&json!("Oslo")));
        assert_eq!(get_path(&record, "location.zip"), None);
        assert_eq!(get_path(&record, "location.city.name"), None);
    }

    #[test]
    fn test_set_path_creates_objects() {
        let mut record = json!({});
        set_path(&mut record, "address.city", json!("Oslo"));
        set_path(&mut record, "address.zip", json!("0150"));
        assert_eq!(record, json!({"address": {"city": "Oslo", "zip": "0150"}}));
    }

    #[test]
    fn test_set_path_replaces_scalar_parent() {
        let mut record = json!({"address": "unknown"});
        set_path(&mut record, "address.city", json!("Oslo"));
        assert_eq!(record, json!({"address": {"city": "Oslo"}}));
    }

    #[test]
    fn test_flatten() {
        let record = json!({"name": "Ada", "location": {"city": "London"}, "tags": ["a"]});
        let flat = flatten(&record);
        let paths: Vec<&str> = flat.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["location.city", "name", "tags"]);
    }

    #[test]
    fn test_depth() {
        assert_eq!(depth("name"), 1);
        assert_eq!(depth("a.b.c"), 3);
        assert_eq!(depth(""), 0);
    }
}
