//! Declarative schema construction
//!
//! A declaration is either a bare type name or an object with a `type` key
//! and the options of that type:
//!
//! ```yaml
//! type: hash
//! properties:
//!   foo: { type: string, required: true }
//!   bar: int
//! ```
//!
//! The type name is looked up in [`NODE_TYPES`], and every other key must be
//! either a shared option or one of the options the type accepts.

use serde_json::{Map, Value};

use super::Node;
use super::NodeKind;
use super::annotations::{BASE_OPTIONS, parse_base_options};
use super::helpers::Options;
use super::parsers::*;
use crate::error::{SchemaError, SchemaResult};

/// Entry of the node type registry
pub struct NodeType {
    /// Canonical name, as reported by [`Node::type_name`]
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Type-specific option keys, in addition to the shared ones
    pub options: &'static [&'static str],
    parse: fn(&Options) -> SchemaResult<NodeKind>,
}

impl NodeType {
    fn is_named(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }

    fn accepts(&self, option: &str) -> bool {
        BASE_OPTIONS.contains(&option) || self.options.contains(&option)
    }
}

/// All node types known to the declarative form
pub static NODE_TYPES: &[NodeType] = &[
    NodeType {
        name: "string",
        aliases: &["str"],
        options: STRING_OPTIONS,
        parse: parse_string,
    },
    NodeType {
        name: "integer",
        aliases: &["int"],
        options: NUMERIC_OPTIONS,
        parse: parse_integer,
    },
    NodeType {
        name: "number",
        aliases: &["num"],
        options: NUMERIC_OPTIONS,
        parse: parse_number,
    },
    NodeType {
        name: "boolean",
        aliases: &["boo"],
        options: BOOLEAN_OPTIONS,
        parse: parse_boolean,
    },
    NodeType {
        name: "symbol",
        aliases: &["sym"],
        options: &[],
        parse: parse_symbol,
    },
    NodeType {
        name: "object",
        aliases: &["obj"],
        options: OBJECT_OPTIONS,
        parse: parse_object,
    },
    NodeType {
        name: "hash",
        aliases: &["hsh"],
        options: HASH_OPTIONS,
        parse: parse_hash,
    },
    NodeType {
        name: "array",
        aliases: &["ary"],
        options: ARRAY_OPTIONS,
        parse: parse_array,
    },
    NodeType {
        name: "all_of",
        aliases: &[],
        options: COMBINATION_OPTIONS,
        parse: parse_all_of,
    },
    NodeType {
        name: "any_of",
        aliases: &[],
        options: COMBINATION_OPTIONS,
        parse: parse_any_of,
    },
    NodeType {
        name: "one_of",
        aliases: &[],
        options: COMBINATION_OPTIONS,
        parse: parse_one_of,
    },
    NodeType {
        name: "is_not",
        aliases: &["not"],
        options: COMBINATION_OPTIONS,
        parse: parse_not,
    },
    NodeType {
        name: "reference",
        aliases: &["ref"],
        options: REFERENCE_OPTIONS,
        parse: parse_reference,
    },
];

/// Find a node type by canonical name or alias
pub fn lookup_node_type(name: &str) -> Option<&'static NodeType> {
    NODE_TYPES.iter().find(|node_type| node_type.is_named(name))
}

/// Build a node from its declarative form
pub fn from_value(value: &Value) -> SchemaResult<Node> {
    match value {
        Value::String(name) => build(name, &Map::new()),
        Value::Object(options) => match options.get("type") {
            Some(Value::String(name)) => build(name, options),
            None | Some(Value::Null) => Err(SchemaError::MissingType),
            Some(_) => Err(SchemaError::option("type", "must be a string")),
        },
        _ => Err(SchemaError::invalid(format!(
            "Schema declaration must be a type name or an object, got {}",
            value
        ))),
    }
}

fn build(name: &str, options: &Options) -> SchemaResult<Node> {
    let node_type =
        lookup_node_type(name).ok_or_else(|| SchemaError::UnknownType(name.to_string()))?;

    let disallowed: Vec<String> = options
        .keys()
        .filter(|key| !node_type.accepts(key))
        .cloned()
        .collect();
    if !disallowed.is_empty() {
        return Err(SchemaError::DisallowedOptions {
            node_type: node_type.name.to_string(),
            options: disallowed,
        });
    }

    let base = parse_base_options(options)?;
    let kind = (node_type.parse)(options)?;
    Node::from_parts(base, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_type_name() {
        let node = from_value(&json!("int")).unwrap();
        assert_eq!(node.type_name(), "integer");
        assert!(!node.is_required());
    }

    #[test]
    fn test_aliases_resolve_to_canonical_names() {
        for node_type in NODE_TYPES {
            for alias in node_type.aliases {
                assert_eq!(lookup_node_type(alias).map(|t| t.name), Some(node_type.name));
            }
        }
        assert!(lookup_node_type("float").is_none());
    }

    #[test]
    fn test_missing_type() {
        let error = from_value(&json!({"required": true})).unwrap_err();
        assert!(matches!(error, SchemaError::MissingType));
    }

    #[test]
    fn test_unknown_type() {
        let error = from_value(&json!({"type": "float"})).unwrap_err();
        assert!(matches!(error, SchemaError::UnknownType(ref name) if name == "float"));
    }

    #[test]
    fn test_disallowed_options_are_named() {
        let error = from_value(&json!({
            "type": "int",
            "min_length": 1,
            "minimum": 0,
            "pattern": "x"
        }))
        .unwrap_err();
        let SchemaError::DisallowedOptions { node_type, options } = error else {
            panic!("Expected DisallowedOptions, got {:?}", error);
        };
        assert_eq!(node_type, "integer");
        assert_eq!(options, vec!["min_length".to_string(), "pattern".to_string()]);
    }

    #[test]
    fn test_base_options_on_any_type() {
        let node = from_value(&json!({
            "type": "boolean",
            "required": true,
            "default": false,
            "description": "Enable the feature"
        }))
        .unwrap();
        assert!(node.is_required());
        assert_eq!(node.options().default_value(), Some(&json!(false)));
        assert_eq!(node.options().description(), Some("Enable the feature"));
    }

    #[test]
    fn test_non_declaration_rejected() {
        assert!(matches!(
            from_value(&json!(42)),
            Err(SchemaError::InvalidStructure(_))
        ));
        assert!(matches!(
            from_value(&json!({"type": 1})),
            Err(SchemaError::InvalidOption { .. })
        ));
    }
}
