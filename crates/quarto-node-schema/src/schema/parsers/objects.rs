//! Hash node parser
//!
//! Formats of the looser options:
//! - additional_properties: `true`, `false` or a schema declaration
//! - ignore_obsolete_properties: `true`, `false` or a list of keys
//! - dependencies: `{ "source": ["target", ...] }`
//! - includes: a schema name or a list of names

use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::helpers::{Options, get_node_map, get_string, get_string_array, get_usize};
use crate::schema::parser::from_value;
use crate::schema::{AdditionalProperties, HashNode, IgnoreObsolete, NodeKind};

pub(in crate::schema) const HASH_OPTIONS: &[&str] = &[
    "properties",
    "pattern_properties",
    "additional_properties",
    "property_names",
    "dependencies",
    "min_properties",
    "max_properties",
    "ignore_obsolete_properties",
    "includes",
];

pub(in crate::schema) fn parse_hash(options: &Options) -> SchemaResult<NodeKind> {
    let mut node = HashNode::new();

    for (name, property) in get_node_map(options, "properties")?.unwrap_or_default() {
        node = node.property(name, property);
    }
    for (pattern, property) in get_node_map(options, "pattern_properties")?.unwrap_or_default() {
        node = node.pattern_property(&pattern, property)?;
    }

    node = node.additional_properties(match options.get("additional_properties") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => AdditionalProperties::Reject,
        Some(Value::Bool(true)) => AdditionalProperties::Allow,
        Some(declaration) => AdditionalProperties::Schema(Box::new(from_value(declaration)?)),
    });

    if let Some(pattern) = get_string(options, "property_names")? {
        node = node.property_names(&pattern)?;
    }

    match options.get("dependencies") {
        None | Some(Value::Null) => {}
        Some(Value::Object(dependencies)) => {
            for (source, targets) in dependencies {
                let targets = match targets {
                    Value::String(target) => vec![target.clone()],
                    Value::Array(items) => items
                        .iter()
                        .map(|item| {
                            item.as_str().map(str::to_string).ok_or_else(|| {
                                SchemaError::option("dependencies", "targets must be strings")
                            })
                        })
                        .collect::<SchemaResult<Vec<_>>>()?,
                    _ => {
                        return Err(SchemaError::option(
                            "dependencies",
                            "targets must be a string or an array of strings",
                        ));
                    }
                };
                node = node.dependency(source.clone(), targets);
            }
        }
        Some(_) => return Err(SchemaError::option("dependencies", "must be an object")),
    }

    if let Some(min) = get_usize(options, "min_properties")? {
        node = node.min_properties(min);
    }
    if let Some(max) = get_usize(options, "max_properties")? {
        node = node.max_properties(max);
    }

    node = node.ignore_obsolete_properties(match options.get("ignore_obsolete_properties") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => IgnoreObsolete::None,
        Some(Value::Bool(true)) => IgnoreObsolete::All,
        Some(_) => IgnoreObsolete::Keys(
            get_string_array(options, "ignore_obsolete_properties")?
                .unwrap_or_default()
                .into_iter()
                .collect(),
        ),
    });

    for include in get_string_array(options, "includes")?.unwrap_or_default() {
        node = node.include(include);
    }

    Ok(NodeKind::Hash(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::from_value;
    use serde_json::json;

    // ==================== parse_hash tests ====================

    #[test]
    fn test_hash_options() {
        let node = from_value(&json!({
            "type": "hash",
            "properties": {
                "name": {"type": "string", "required": true},
                "age": "integer"
            },
            "pattern_properties": {"^x-": "string"},
            "additional_properties": {"type": "boolean"},
            "property_names": "^[a-z-]+$",
            "dependencies": {"name": ["age"]},
            "min_properties": 1,
            "includes": "base"
        }))
        .unwrap();

        let NodeKind::Hash(hash) = node.kind() else {
            panic!("Expected hash node");
        };
        assert_eq!(hash.properties().keys().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(hash.properties()["name"].name(), Some("name"));
        assert!(hash.properties()["name"].is_required());
        assert!(hash.pattern_property_for("x-custom").is_some());
        assert!(matches!(
            hash.additional_properties,
            AdditionalProperties::Schema(_)
        ));
        assert_eq!(hash.dependencies["name"], vec!["age".to_string()]);
        assert_eq!(hash.includes, vec!["base".to_string()]);
    }

    #[test]
    fn test_ignore_obsolete_forms() {
        let all = from_value(&json!({"type": "hsh", "ignore_obsolete_properties": true})).unwrap();
        let NodeKind::Hash(hash) = all.kind() else {
            panic!("Expected hash node");
        };
        assert!(hash.ignore_obsolete_properties.ignores("anything"));

        let keys =
            from_value(&json!({"type": "hsh", "ignore_obsolete_properties": ["old"]})).unwrap();
        let NodeKind::Hash(hash) = keys.kind() else {
            panic!("Expected hash node");
        };
        assert!(hash.ignore_obsolete_properties.ignores("old"));
        assert!(!hash.ignore_obsolete_properties.ignores("new"));
    }

    #[test]
    fn test_conflicting_additional_and_ignore() {
        let error = from_value(&json!({
            "type": "hash",
            "additional_properties": true,
            "ignore_obsolete_properties": true
        }))
        .unwrap_err();
        assert!(matches!(error, SchemaError::InvalidStructure(_)));
    }

    #[test]
    fn test_required_pattern_property_rejected() {
        let error = from_value(&json!({
            "type": "hash",
            "pattern_properties": {"^x": {"type": "string", "required": true}}
        }))
        .unwrap_err();
        assert!(matches!(error, SchemaError::InvalidStructure(_)));
    }

    #[test]
    fn test_empty_dependency_rejected() {
        let error = from_value(&json!({"type": "hash", "dependencies": {"a": [""]}})).unwrap_err();
        assert!(matches!(error, SchemaError::InvalidOption { .. }));
    }
}
