// Array validation and casting

use serde_json::Value;
use std::borrow::Cow;

use super::{cast_node, matches, validate_node};
use crate::context::Scope;
use crate::error::SchemaResult;
use crate::export::node_json;
use crate::result::ValidationErrors;
use crate::schema::{AdditionalItems, ArrayNode, ItemShape};

/// The raw elements of `value`, parsing a JSON string when allowed
fn elements<'v>(node: &ArrayNode, value: &'v Value) -> Result<Cow<'v, [Value]>, &'static str> {
    match value {
        Value::Array(items) => Ok(Cow::Borrowed(items.as_slice())),
        Value::String(s) if node.parse_json => match serde_json::from_str(s) {
            Ok(Value::Array(items)) => Ok(Cow::Owned(items)),
            Ok(_) => Err("Invalid type, expected array."),
            Err(_) => Err("String does not contain valid JSON."),
        },
        _ => Err("Invalid type, expected array."),
    }
}

pub(super) fn validate<'s>(
    node: &'s ArrayNode,
    value: &Value,
    errors: &mut ValidationErrors,
    scope: &Scope<'s>,
) -> SchemaResult<()> {
    let elements = match elements(node, value) {
        Ok(elements) => elements,
        Err(message) => {
            errors.error(message);
            return Ok(());
        }
    };
    let items = node.preprocess(&elements);
    let count = items.len();

    if let Some(min) = node.min_items
        && count < min
    {
        errors.error(format!(
            "Array has {} items but needs at least {}.",
            count, min
        ));
    }
    if let Some(max) = node.max_items
        && count > max
    {
        errors.error(format!(
            "Array has {} items but needs at most {}.",
            count, max
        ));
    }

    if node.unique_items && has_duplicates(&items) {
        errors.error("Array has duplicate items.");
    }

    match &node.items {
        ItemShape::Any => {}
        ItemShape::List(item) => {
            for (index, element) in items.iter().copied().enumerate() {
                errors.in_path(index, |errors| validate_node(item, element, errors, scope))?;
            }
        }
        ItemShape::Tuple(positions) => {
            let policy = node.tail_policy();
            let fits = count == positions.len()
                || (count > positions.len() && !matches!(policy, AdditionalItems::Reject));
            if !fits {
                errors.error(format!(
                    "Array has {} items but must have exactly {}.",
                    count,
                    positions.len()
                ));
            } else {
                for (index, element) in items.iter().copied().enumerate() {
                    let schema = match positions.get(index) {
                        Some(position) => position,
                        None => match policy {
                            AdditionalItems::Schema(tail) => tail.as_ref(),
                            _ => continue,
                        },
                    };
                    errors.in_path(index, |errors| validate_node(schema, element, errors, scope))?;
                }
            }
        }
    }

    if let Some(contains) = &node.contains {
        let mut found = false;
        for element in items.iter().copied() {
            if matches(contains, element, scope)? {
                found = true;
                break;
            }
        }
        if !found {
            errors.error(format!(
                "At least one entry must match schema {}.",
                node_json(contains)
            ));
        }
    }

    Ok(())
}

pub(super) fn cast<'s>(node: &'s ArrayNode, value: &Value, scope: &Scope<'s>) -> SchemaResult<Value> {
    let Ok(elements) = elements(node, value) else {
        return Ok(value.clone());
    };
    let items = node.preprocess(&elements);

    let mut output = Vec::with_capacity(items.len());
    for (index, element) in items.into_iter().enumerate() {
        output.push(cast_element(node, index, element, scope)?);
    }
    Ok(Value::Array(output))
}

fn cast_element<'s>(
    node: &'s ArrayNode,
    index: usize,
    element: &Value,
    scope: &Scope<'s>,
) -> SchemaResult<Value> {
    if let Some(contains) = &node.contains
        && matches(contains, element, scope)?
    {
        return cast_node(contains, element, scope);
    }
    match &node.items {
        ItemShape::Any => Ok(element.clone()),
        ItemShape::List(item) => cast_node(item, element, scope),
        ItemShape::Tuple(positions) => match positions.get(index) {
            Some(position) => cast_node(position, element, scope),
            None => match node.tail_policy() {
                AdditionalItems::Schema(tail) => cast_node(tail, element, scope),
                _ => Ok(element.clone()),
            },
        },
    }
}

fn has_duplicates(items: &[&Value]) -> bool {
    items
        .iter()
        .enumerate()
        .any(|(index, item)| items[..index].contains(item))
}
