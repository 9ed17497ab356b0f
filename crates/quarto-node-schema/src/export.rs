//! JSON-Schema-like export
//!
//! The export is structural: it mirrors the constraints of each node using
//! JSON Schema keyword names, without trying to be a complete JSON Schema
//! or Swagger document. References become `{"$ref": "#/definitions/<name>"}`, with the name
//! escaped as a JSON Pointer token.

use serde_json::{Map, Value, json};

use crate::context::Resolver;
use crate::error::{SchemaError, SchemaResult};
use crate::schema::{AdditionalItems, AdditionalProperties, ItemShape, Node, NodeKind, NumericNode};

impl Node {
    /// Export this node, including its local definitions
    pub fn as_json(&self) -> Value {
        node_json(self)
    }

    /// Export this node together with every schema it needs from the
    /// call-scoped and global registries, under `definitions`
    pub fn as_json_schema(&self, resolver: Resolver<'_>) -> SchemaResult<Value> {
        let mut json = node_json(self);
        let names = self.external_schema_names(resolver)?;
        if names.is_empty() {
            return Ok(json);
        }

        let mut external = Map::new();
        for name in names {
            let target = resolver
                .external(&name)?
                .ok_or_else(|| SchemaError::UnresolvedReference(name.clone()))?;
            external.insert(name, node_json(&target));
        }

        if let Value::Object(root) = &mut json
            && let Value::Object(definitions) = root
                .entry("definitions")
                .or_insert_with(|| Value::Object(Map::new()))
        {
            for (name, schema) in external {
                definitions.entry(name).or_insert(schema);
            }
        }
        Ok(json)
    }
}

pub(crate) fn node_json(node: &Node) -> Value {
    let mut json = Map::new();

    match &node.kind {
        NodeKind::String(string) => {
            json.insert("type".into(), json!("string"));
            insert_opt(&mut json, "minLength", string.min_length.map(Value::from));
            insert_opt(&mut json, "maxLength", string.max_length.map(Value::from));
            insert_opt(
                &mut json,
                "pattern",
                string.pattern.as_ref().map(|p| json!(p.as_str())),
            );
            insert_opt(&mut json, "format", string.format.map(|f| json!(f.name())));
        }
        NodeKind::Integer(numeric) => {
            json.insert("type".into(), json!("integer"));
            numeric_json(&mut json, numeric);
        }
        NodeKind::Number(numeric) => {
            json.insert("type".into(), json!("number"));
            numeric_json(&mut json, numeric);
        }
        NodeKind::Boolean(_) => {
            json.insert("type".into(), json!("boolean"));
        }
        NodeKind::Symbol(_) => {
            json.insert("type".into(), json!("string"));
        }
        NodeKind::Object(object) => {
            let kinds: Vec<&str> = object.classes.iter().map(|kind| kind.name()).collect();
            match kinds.as_slice() {
                [] => {}
                [kind] => {
                    json.insert("type".into(), json!(kind));
                }
                _ => {
                    json.insert("type".into(), json!(kinds));
                }
            }
        }
        NodeKind::Hash(hash) => {
            json.insert("type".into(), json!("object"));
            if !hash.properties.is_empty() {
                let properties: Map<String, Value> = hash
                    .properties
                    .iter()
                    .map(|(name, property)| (name.clone(), node_json(property)))
                    .collect();
                json.insert("properties".into(), Value::Object(properties));
            }
            let required: Vec<&str> = hash
                .properties
                .iter()
                .filter(|(_, property)| property.is_required())
                .map(|(name, _)| name.as_str())
                .collect();
            if !required.is_empty() {
                json.insert("required".into(), json!(required));
            }
            if !hash.pattern_properties.is_empty() {
                let patterns: Map<String, Value> = hash
                    .pattern_properties
                    .iter()
                    .map(|(pattern, property)| (pattern.as_str().to_string(), node_json(property)))
                    .collect();
                json.insert("patternProperties".into(), Value::Object(patterns));
            }
            let additional = match &hash.additional_properties {
                AdditionalProperties::Reject => json!(false),
                AdditionalProperties::Allow => json!(true),
                AdditionalProperties::Schema(property) => node_json(property),
            };
            json.insert("additionalProperties".into(), additional);
            insert_opt(
                &mut json,
                "propertyNames",
                hash.property_names
                    .as_ref()
                    .map(|p| json!({ "pattern": p.as_str() })),
            );
            if !hash.dependencies.is_empty() {
                json.insert("dependencies".into(), json!(hash.dependencies));
            }
            insert_opt(&mut json, "minProperties", hash.min_properties.map(Value::from));
            insert_opt(&mut json, "maxProperties", hash.max_properties.map(Value::from));
            if !hash.includes.is_empty() {
                let refs: Vec<Value> = hash.includes.iter().map(|name| reference(name)).collect();
                json.insert("allOf".into(), Value::Array(refs));
            }
        }
        NodeKind::Array(array) => {
            json.insert("type".into(), json!("array"));
            match &array.items {
                ItemShape::Any => {}
                ItemShape::List(item) => {
                    json.insert("items".into(), node_json(item));
                }
                ItemShape::Tuple(positions) => {
                    json.insert(
                        "items".into(),
                        Value::Array(positions.iter().map(node_json).collect()),
                    );
                    let additional = match array.tail_policy() {
                        AdditionalItems::Reject => json!(false),
                        AdditionalItems::Allow => json!(true),
                        AdditionalItems::Schema(tail) => node_json(tail),
                    };
                    json.insert("additionalItems".into(), additional);
                }
            }
            insert_opt(&mut json, "contains", array.contains.as_deref().map(node_json));
            insert_opt(&mut json, "minItems", array.min_items.map(Value::from));
            insert_opt(&mut json, "maxItems", array.max_items.map(Value::from));
            if array.unique_items {
                json.insert("uniqueItems".into(), json!(true));
            }
        }
        NodeKind::AllOf(c) => {
            json.insert("allOf".into(), alternatives_json(&c.alternatives));
        }
        NodeKind::AnyOf(c) => {
            json.insert("anyOf".into(), alternatives_json(&c.alternatives));
        }
        NodeKind::OneOf(c) => {
            json.insert("oneOf".into(), alternatives_json(&c.alternatives));
        }
        NodeKind::Not(c) => {
            insert_opt(&mut json, "not", c.alternatives.first().map(node_json));
        }
        NodeKind::Reference(target) => {
            return with_metadata(reference(target.target()), node);
        }
    }

    with_metadata(Value::Object(json), node)
}

fn with_metadata(mut json: Value, node: &Node) -> Value {
    let Value::Object(map) = &mut json else {
        return json;
    };
    let options = &node.options;
    insert_opt(map, "title", options.title.as_ref().map(|t| json!(t)));
    insert_opt(map, "description", options.description.as_ref().map(|d| json!(d)));
    if !options.examples.is_empty() {
        map.insert("examples".into(), Value::Array(options.examples.clone()));
    }
    insert_opt(map, "enum", options.enum_values.clone().map(Value::Array));
    insert_opt(map, "default", options.default.clone());
    if !options.definitions.is_empty() {
        let definitions: Map<String, Value> = options
            .definitions
            .iter()
            .map(|(name, definition)| (name.clone(), node_json(definition)))
            .collect();
        map.insert("definitions".into(), Value::Object(definitions));
    }
    json
}

fn numeric_json(json: &mut Map<String, Value>, numeric: &NumericNode) {
    insert_opt(json, "minimum", numeric.minimum.map(number));
    insert_opt(json, "maximum", numeric.maximum.map(number));
    insert_opt(json, "exclusiveMinimum", numeric.exclusive_minimum.map(number));
    insert_opt(json, "exclusiveMaximum", numeric.exclusive_maximum.map(number));
    insert_opt(json, "multipleOf", numeric.multiple_of.map(number));
}

fn alternatives_json(alternatives: &[Node]) -> Value {
    Value::Array(alternatives.iter().map(node_json).collect())
}

/// JSON Pointer into `definitions`, with `~` and `/` escaped per RFC 6901
fn reference(name: &str) -> Value {
    let escaped = name.replace('~', "~0").replace('/', "~1");
    json!({ "$ref": format!("#/definitions/{}", escaped) })
}

/// Integral bounds are written as integers
fn number(x: f64) -> Value {
    if x.fract() == 0.0 && x.abs() < 9_007_199_254_740_992.0 {
        Value::from(x as i64)
    } else {
        serde_json::Number::from_f64(x).map_or(Value::Null, Value::Number)
    }
}

fn insert_opt(json: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        json.insert(key.to_string(), value);
    }
}
