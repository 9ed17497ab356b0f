//! Scalar node parsers

use crate::error::{SchemaError, SchemaResult};
use crate::formats::StringFormat;
use crate::schema::helpers::{Options, get_bool, get_number, get_string, get_string_array, get_usize};
use crate::schema::{BooleanNode, NodeKind, NumericNode, ObjectNode, StringNode, SymbolNode, ValueKind};

pub(in crate::schema) const STRING_OPTIONS: &[&str] =
    &["min_length", "max_length", "pattern", "format", "allow_blank"];

pub(in crate::schema) const NUMERIC_OPTIONS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusive_minimum",
    "exclusive_maximum",
    "multiple_of",
    "cast_str",
];

pub(in crate::schema) const BOOLEAN_OPTIONS: &[&str] = &["cast_str"];

pub(in crate::schema) const OBJECT_OPTIONS: &[&str] = &["classes"];

pub(in crate::schema) fn parse_string(options: &Options) -> SchemaResult<NodeKind> {
    let mut node = StringNode::new();
    if let Some(min) = get_usize(options, "min_length")? {
        node = node.min_length(min);
    }
    if let Some(max) = get_usize(options, "max_length")? {
        node = node.max_length(max);
    }
    if let Some(pattern) = get_string(options, "pattern")? {
        node = node.pattern(&pattern)?;
    }
    if let Some(format) = get_string(options, "format")? {
        let format = StringFormat::from_name(&format)
            .ok_or_else(|| SchemaError::option("format", format!("unknown format {:?}", format)))?;
        node = node.format(format);
    }
    if let Some(allow) = get_bool(options, "allow_blank")? {
        node = node.allow_blank(allow);
    }
    Ok(NodeKind::String(node))
}

fn parse_numeric(options: &Options) -> SchemaResult<NumericNode> {
    let mut node = NumericNode::new();
    if let Some(min) = get_number(options, "minimum")? {
        node = node.minimum(min);
    }
    if let Some(max) = get_number(options, "maximum")? {
        node = node.maximum(max);
    }
    if let Some(min) = get_number(options, "exclusive_minimum")? {
        node = node.exclusive_minimum(min);
    }
    if let Some(max) = get_number(options, "exclusive_maximum")? {
        node = node.exclusive_maximum(max);
    }
    if let Some(multiple) = get_number(options, "multiple_of")? {
        node = node.multiple_of(multiple);
    }
    Ok(node.cast_str(get_bool(options, "cast_str")?.unwrap_or(false)))
}

pub(in crate::schema) fn parse_integer(options: &Options) -> SchemaResult<NodeKind> {
    Ok(NodeKind::Integer(parse_numeric(options)?))
}

pub(in crate::schema) fn parse_number(options: &Options) -> SchemaResult<NodeKind> {
    Ok(NodeKind::Number(parse_numeric(options)?))
}

pub(in crate::schema) fn parse_boolean(options: &Options) -> SchemaResult<NodeKind> {
    let cast = get_bool(options, "cast_str")?.unwrap_or(false);
    Ok(NodeKind::Boolean(BooleanNode::new().cast_str(cast)))
}

pub(in crate::schema) fn parse_symbol(_options: &Options) -> SchemaResult<NodeKind> {
    Ok(NodeKind::Symbol(SymbolNode))
}

pub(in crate::schema) fn parse_object(options: &Options) -> SchemaResult<NodeKind> {
    let classes = get_string_array(options, "classes")?
        .unwrap_or_default()
        .iter()
        .map(|name| {
            ValueKind::from_name(name)
                .ok_or_else(|| SchemaError::option("classes", format!("unknown class {:?}", name)))
        })
        .collect::<SchemaResult<Vec<_>>>()?;
    Ok(NodeKind::Object(ObjectNode::new().classes(classes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::from_value;
    use serde_json::json;

    // ==================== parse_string tests ====================

    #[test]
    fn test_string_options() {
        let node = from_value(&json!({
            "type": "string",
            "min_length": 1,
            "max_length": 5,
            "pattern": "^a",
            "format": "date",
            "allow_blank": false
        }))
        .unwrap();

        let NodeKind::String(string) = node.kind() else {
            panic!("Expected string node");
        };
        assert_eq!(string.min_length, Some(1));
        assert_eq!(string.max_length, Some(5));
        assert_eq!(string.pattern.as_ref().map(|p| p.as_str()), Some("^a"));
        assert_eq!(string.format, Some(StringFormat::Date));
        assert!(!string.allow_blank);
    }

    #[test]
    fn test_unknown_format() {
        let error = from_value(&json!({"type": "str", "format": "colour"})).unwrap_err();
        assert!(matches!(error, SchemaError::InvalidOption { ref option, .. } if option == "format"));
    }

    #[test]
    fn test_invalid_pattern() {
        let error = from_value(&json!({"type": "string", "pattern": "("})).unwrap_err();
        assert!(matches!(error, SchemaError::InvalidPattern { .. }));
    }

    // ==================== parse_numeric tests ====================

    #[test]
    fn test_numeric_options() {
        let node = from_value(&json!({
            "type": "num",
            "minimum": 0,
            "exclusive_maximum": 1.5,
            "multiple_of": 0.25,
            "cast_str": true
        }))
        .unwrap();

        let NodeKind::Number(number) = node.kind() else {
            panic!("Expected number node");
        };
        assert_eq!(number.minimum, Some(0.0));
        assert_eq!(number.exclusive_maximum, Some(1.5));
        assert_eq!(number.multiple_of, Some(0.25));
        assert!(number.cast_str);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let error = from_value(&json!({"type": "int", "minimum": 3, "maximum": 1})).unwrap_err();
        assert!(matches!(error, SchemaError::InvalidStructure(_)));
    }

    // ==================== parse_object tests ====================

    #[test]
    fn test_object_classes() {
        let node = from_value(&json!({"type": "obj", "classes": ["string", "array"]})).unwrap();
        let NodeKind::Object(object) = node.kind() else {
            panic!("Expected object node");
        };
        assert_eq!(
            object.classes.iter().copied().collect::<Vec<_>>(),
            vec![ValueKind::String, ValueKind::Array]
        );

        assert!(from_value(&json!({"type": "obj", "classes": ["date"]})).is_err());
    }
}
