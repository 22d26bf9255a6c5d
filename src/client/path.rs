//! Path traversal over decoded JSON values.
//!
//! GraphQL responses are deeply nested; instead of declaring a struct per
//! query we reach into the decoded `serde_json::Value` with a small path
//! expression: segments separated by `>`, where each segment is either an
//! object key or a numeric array index (e.g. `data>viewer>accounts>0`).
//!
//! Traversal is lenient: a missing key, an out-of-range index, or a scalar
//! in the middle of the path yields `None`. Callers default missing scalars
//! to zero and missing lists to empty, so a partially shaped response never
//! aborts a run.

use serde_json::Value;

/// Segment separator in path expressions.
pub const SEPARATOR: char = '>';

/// Look up a nested value by path expression.
///
/// Returns `None` if any segment is absent or the current value is not a
/// container that the segment can index into.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;

    for segment in path.split(SEPARATOR) {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Look up an unsigned counter by path, defaulting to zero when the value
/// is absent, null, or not a number.
pub fn count(root: &Value, path: &str) -> u64 {
    lookup(root, path).and_then(Value::as_u64).unwrap_or(0)
}

/// Look up a string by path.
pub fn string<'a>(root: &'a Value, path: &str) -> Option<&'a str> {
    lookup(root, path).and_then(Value::as_str)
}

/// Look up an array by path, defaulting to an empty slice when absent.
pub fn list<'a>(root: &'a Value, path: &str) -> &'a [Value] {
    lookup(root, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "data": {
                "viewer": {
                    "followers": { "totalCount": 42 },
                    "accounts": [
                        { "name": "first" },
                        { "name": "second" }
                    ]
                }
            }
        })
    }

    #[test]
    fn test_lookup_nested_key() {
        let value = sample();
        let found = lookup(&value, "data>viewer>followers>totalCount").unwrap();
        assert_eq!(found.as_u64(), Some(42));
    }

    #[test]
    fn test_lookup_array_index() {
        let value = sample();
        assert_eq!(
            string(&value, "data>viewer>accounts>1>name"),
            Some("second")
        );
    }

    #[test]
    fn test_lookup_missing_key_is_none() {
        let value = sample();
        assert!(lookup(&value, "data>viewer>missing>totalCount").is_none());
    }

    #[test]
    fn test_lookup_index_out_of_range_is_none() {
        let value = sample();
        assert!(lookup(&value, "data>viewer>accounts>5").is_none());
    }

    #[test]
    fn test_lookup_scalar_mid_path_is_none() {
        let value = sample();
        assert!(lookup(&value, "data>viewer>followers>totalCount>deeper").is_none());
    }

    #[test]
    fn test_count_defaults_to_zero() {
        let value = sample();
        assert_eq!(count(&value, "data>viewer>followers>totalCount"), 42);
        assert_eq!(count(&value, "data>viewer>following>totalCount"), 0);
        assert_eq!(count(&json!({"n": null}), "n"), 0);
    }

    #[test]
    fn test_list_defaults_to_empty() {
        let value = sample();
        assert_eq!(list(&value, "data>viewer>accounts").len(), 2);
        assert!(list(&value, "data>viewer>repos").is_empty());
    }
}
