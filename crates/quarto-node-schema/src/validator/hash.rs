// Hash (object) validation and casting

use serde_json::{Map, Value};
use std::collections::HashSet;

use super::{NULL, cast_node, validate_node};
use crate::context::Scope;
use crate::error::{SchemaError, SchemaResult};
use crate::result::ValidationErrors;
use crate::schema::{AdditionalProperties, HashNode, Node, NodeKind};

pub(super) fn validate<'s>(
    node: &'s HashNode,
    value: &Value,
    errors: &mut ValidationErrors,
    scope: &Scope<'s>,
) -> SchemaResult<()> {
    let Some(map) = value.as_object() else {
        return Ok(());
    };

    let ambiguous = ambiguous_keys(map);
    if !ambiguous.is_empty() {
        errors.error(format!(
            "Has {} ambiguous properties: {:?}.",
            ambiguous.len(),
            ambiguous
        ));
    }

    let count = map.len();
    if let Some(min) = node.min_properties
        && count < min
    {
        errors.error(format!(
            "Has {} properties but needs at least {}.",
            count, min
        ));
    }
    if let Some(max) = node.max_properties
        && count > max
    {
        errors.error(format!(
            "Has {} properties but needs at most {}.",
            count, max
        ));
    }

    for (name, property) in &node.properties {
        validate_property(name, property, map, errors, scope)?;
    }

    let mut included: Vec<String> = Vec::new();
    for include in &node.includes {
        scope.with_target(include, |target, scope| {
            let entered = scope.enter(target);
            let scope = entered.as_ref().unwrap_or(scope);
            for (name, property) in &included_hash(include, target)?.properties {
                if node.properties.contains_key(name) || included.contains(name) {
                    continue;
                }
                included.push(name.clone());
                validate_property(name, property, map, errors, scope)?;
            }
            Ok(())
        })?;
    }

    let extras: Vec<(&String, &Value)> = map
        .iter()
        .filter(|(key, _)| !node.properties.contains_key(*key) && !included.contains(*key))
        .collect();

    for (key, item) in &extras {
        if let Some(property) = node.pattern_property_for(key) {
            errors.in_path(key.as_str(), |errors| {
                validate_node(property, item, errors, scope)
            })?;
            continue;
        }
        match &node.additional_properties {
            AdditionalProperties::Allow => {}
            AdditionalProperties::Schema(property) => {
                errors.in_path(key.as_str(), |errors| {
                    validate_node(property, item, errors, scope)
                })?;
            }
            AdditionalProperties::Reject => {
                if !node.ignore_obsolete_properties.ignores(key) {
                    errors.error(format!("Obsolete property {:?}.", key));
                }
            }
        }
    }

    if let Some(pattern) = &node.property_names {
        for (key, _) in &extras {
            if !pattern.is_match(key) {
                errors.error(format!(
                    "Property name {:?} does not match {:?}.",
                    key,
                    pattern.as_str()
                ));
            }
        }
    }

    for (source, targets) in &node.dependencies {
        if !is_given(map, source) {
            continue;
        }
        for target in targets {
            if !is_given(map, target) {
                errors.error(format!(
                    "Missing property {:?} because {:?} is given.",
                    target, source
                ));
            }
        }
    }

    Ok(())
}

pub(super) fn cast<'s>(node: &'s HashNode, value: &Value, scope: &Scope<'s>) -> SchemaResult<Value> {
    let Some(map) = value.as_object() else {
        return Ok(value.clone());
    };
    let mut output = Map::new();

    for (name, property) in &node.properties {
        cast_property(name, property, map, &mut output, scope)?;
    }

    let mut included: Vec<String> = Vec::new();
    for include in &node.includes {
        scope.with_target(include, |target, scope| {
            let entered = scope.enter(target);
            let scope = entered.as_ref().unwrap_or(scope);
            for (name, property) in &included_hash(include, target)?.properties {
                if node.properties.contains_key(name) || included.contains(name) {
                    continue;
                }
                included.push(name.clone());
                cast_property(name, property, map, &mut output, scope)?;
            }
            Ok(())
        })?;
    }

    for (key, item) in map {
        if node.properties.contains_key(key) || included.contains(key) {
            continue;
        }
        let casted = match node.pattern_property_for(key) {
            Some(property) => cast_node(property, item, scope)?,
            None => match &node.additional_properties {
                AdditionalProperties::Allow => item.clone(),
                AdditionalProperties::Schema(property) => cast_node(property, item, scope)?,
                AdditionalProperties::Reject => continue,
            },
        };
        output.entry(key.clone()).or_insert(casted);
    }

    Ok(Value::Object(output))
}

fn validate_property<'s>(
    name: &str,
    property: &'s Node,
    map: &Map<String, Value>,
    errors: &mut ValidationErrors,
    scope: &Scope<'s>,
) -> SchemaResult<()> {
    errors.in_path(name, |errors| {
        if property.options.require_key && !map.contains_key(name) {
            errors.error("Key must be given.");
        }
        validate_node(property, map.get(name).unwrap_or(&NULL), errors, scope)
    })
}

/// Absent optional properties stay absent unless their key was given
fn cast_property<'s>(
    name: &str,
    property: &'s Node,
    map: &Map<String, Value>,
    output: &mut Map<String, Value>,
    scope: &Scope<'s>,
) -> SchemaResult<()> {
    let casted = cast_node(property, map.get(name).unwrap_or(&NULL), scope)?;
    if map.contains_key(name) || !casted.is_null() {
        let key = property.options.output_name.as_deref().unwrap_or(name);
        output.insert(key.to_string(), casted);
    }
    Ok(())
}

fn included_hash<'n>(name: &str, target: &'n Node) -> SchemaResult<&'n HashNode> {
    match &target.kind {
        NodeKind::Hash(hash) => Ok(hash),
        other => Err(SchemaError::invalid(format!(
            "Included schema {:?} must be a hash, got {:?}",
            name,
            other.type_name()
        ))),
    }
}

/// Keys that collide with an earlier key when compared case-insensitively
fn ambiguous_keys(map: &Map<String, Value>) -> Vec<&str> {
    let mut seen = HashSet::new();
    map.keys()
        .filter(|key| !seen.insert(key.to_ascii_lowercase()))
        .map(String::as_str)
        .collect()
}

fn is_given(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).is_some_and(|value| !value.is_null())
}
