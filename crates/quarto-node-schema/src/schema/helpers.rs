//! Helper functions for reading declarative schema options
//!
//! Each getter returns `Ok(None)` when the key is missing or null, the typed
//! value when it has the expected shape, and an
//! [`InvalidOption`](SchemaError::InvalidOption) error otherwise.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::Node;
use super::parser::from_value;
use crate::error::{SchemaError, SchemaResult};

/// The options object of one declaration
pub(super) type Options = Map<String, Value>;

fn get<'a>(options: &'a Options, key: &str) -> Option<&'a Value> {
    options.get(key).filter(|value| !value.is_null())
}

/// Get a string option
pub(super) fn get_string(options: &Options, key: &str) -> SchemaResult<Option<String>> {
    match get(options, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SchemaError::option(key, "must be a string")),
    }
}

/// Get a number option
pub(super) fn get_number(options: &Options, key: &str) -> SchemaResult<Option<f64>> {
    match get(options, key) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| SchemaError::option(key, "must be a number")),
    }
}

/// Get a non-negative integer option
pub(super) fn get_usize(options: &Options, key: &str) -> SchemaResult<Option<usize>> {
    match get(options, key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| SchemaError::option(key, "must be a non-negative integer")),
    }
}

/// Get a boolean option
pub(super) fn get_bool(options: &Options, key: &str) -> SchemaResult<Option<bool>> {
    match get(options, key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(SchemaError::option(key, "must be a boolean")),
    }
}

/// Get an array of strings; a single string counts as a one-element array
pub(super) fn get_string_array(options: &Options, key: &str) -> SchemaResult<Option<Vec<String>>> {
    match get(options, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| SchemaError::option(key, "items must be strings"))
            })
            .collect::<SchemaResult<Vec<_>>>()
            .map(Some),
        Some(_) => Err(SchemaError::option(key, "must be a string or an array of strings")),
    }
}

/// Get an array of literal values
pub(super) fn get_value_array(options: &Options, key: &str) -> SchemaResult<Option<Vec<Value>>> {
    match get(options, key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.clone())),
        Some(_) => Err(SchemaError::option(key, "must be an array")),
    }
}

/// Get a nested schema declaration
pub(super) fn get_node(options: &Options, key: &str) -> SchemaResult<Option<Node>> {
    get(options, key).map(from_value).transpose()
}

/// Get an array of nested schema declarations
pub(super) fn get_node_list(options: &Options, key: &str) -> SchemaResult<Option<Vec<Node>>> {
    match get(options, key) {
        None => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(from_value)
            .collect::<SchemaResult<Vec<_>>>()
            .map(Some),
        Some(_) => Err(SchemaError::option(key, "must be an array of schemas")),
    }
}

/// Get an object whose values are schema declarations, keeping key order
pub(super) fn get_node_map(
    options: &Options,
    key: &str,
) -> SchemaResult<Option<IndexMap<String, Node>>> {
    match get(options, key) {
        None => Ok(None),
        Some(Value::Object(entries)) => entries
            .iter()
            .map(|(name, declaration)| -> SchemaResult<(String, Node)> {
                Ok((name.clone(), from_value(declaration)?))
            })
            .collect::<SchemaResult<IndexMap<_, _>>>()
            .map(Some),
        Some(_) => Err(SchemaError::option(key, "must be an object of schemas")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Options {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_missing_and_null_are_none() {
        let options = options(json!({"title": null}));
        assert_eq!(get_string(&options, "title").unwrap(), None);
        assert_eq!(get_usize(&options, "min_items").unwrap(), None);
    }

    #[test]
    fn test_wrong_shapes_are_rejected() {
        let options = options(json!({"min_items": -1, "required": "yes", "title": 3}));
        assert!(matches!(
            get_usize(&options, "min_items"),
            Err(SchemaError::InvalidOption { .. })
        ));
        assert!(get_bool(&options, "required").is_err());
        assert!(get_string(&options, "title").is_err());
    }

    #[test]
    fn test_string_array_accepts_single_string() {
        let options = options(json!({"includes": "base", "other": ["a", "b"]}));
        assert_eq!(
            get_string_array(&options, "includes").unwrap(),
            Some(vec!["base".to_string()])
        );
        assert_eq!(
            get_string_array(&options, "other").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_node_map_keeps_order() {
        let options = options(json!({"properties": {"b": "string", "a": "integer"}}));
        let nodes = get_node_map(&options, "properties").unwrap().unwrap();
        assert_eq!(nodes.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(nodes["a"].type_name(), "integer");
    }
}
