//! Array node parser
//!
//! `items` selects the mode:
//! - a single declaration (object or type-name string): list of that schema
//! - an array of declarations: positional tuple
//!
//! `additional_items` is only meaningful for tuples and takes `true`,
//! `false` or a declaration for the tail. `filter` and `reject` name one of
//! the built-in predicates (see [`Predicate::named`]).

use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::helpers::{Options, get_bool, get_node, get_string, get_usize};
use crate::schema::parser::from_value;
use crate::schema::{AdditionalItems, ArrayNode, NodeKind, Predicate};

pub(in crate::schema) const ARRAY_OPTIONS: &[&str] = &[
    "items",
    "additional_items",
    "contains",
    "min_items",
    "max_items",
    "unique_items",
    "filter",
    "reject",
    "parse_json",
];

pub(in crate::schema) fn parse_array(options: &Options) -> SchemaResult<NodeKind> {
    let mut node = match options.get("items") {
        None | Some(Value::Null) => ArrayNode::new(),
        Some(Value::Array(items)) => ArrayNode::tuple(
            items
                .iter()
                .map(from_value)
                .collect::<SchemaResult<Vec<_>>>()?,
        ),
        Some(item) => ArrayNode::list(from_value(item)?),
    };

    match options.get("additional_items") {
        None | Some(Value::Null) => {}
        Some(Value::Bool(false)) => node = node.additional_items(AdditionalItems::Reject),
        Some(Value::Bool(true)) => node = node.additional_items(AdditionalItems::Allow),
        Some(declaration) => {
            node = node.additional_items(AdditionalItems::Schema(Box::new(from_value(
                declaration,
            )?)))
        }
    }

    if let Some(contains) = get_node(options, "contains")? {
        node = node.contains(contains);
    }
    if let Some(min) = get_usize(options, "min_items")? {
        node = node.min_items(min);
    }
    if let Some(max) = get_usize(options, "max_items")? {
        node = node.max_items(max);
    }
    if let Some(unique) = get_bool(options, "unique_items")? {
        node = node.unique_items(unique);
    }
    if let Some(predicate) = get_predicate(options, "filter")? {
        node = node.filter(predicate);
    }
    if let Some(predicate) = get_predicate(options, "reject")? {
        node = node.reject(predicate);
    }
    if let Some(parse) = get_bool(options, "parse_json")? {
        node = node.parse_json(parse);
    }

    Ok(NodeKind::Array(node))
}

fn get_predicate(options: &Options, key: &str) -> SchemaResult<Option<Predicate>> {
    get_string(options, key)?
        .map(|name| {
            Predicate::named(&name)
                .ok_or_else(|| SchemaError::option(key, format!("unknown predicate {:?}", name)))
        })
        .transpose()
}
