//! Combinator node parsers
//!
//! Formats:
//! ```yaml
//! type: any_of
//! of: [string, integer]
//! treat_blank_as_nil: true
//!
//! type: not
//! of: string        # or a one-element array
//! ```

use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::helpers::{Options, get_bool, get_node_list};
use crate::schema::parser::from_value;
use crate::schema::{CombinationNode, NodeKind};

pub(in crate::schema) const COMBINATION_OPTIONS: &[&str] = &["of", "treat_blank_as_nil"];

fn parse_combination(options: &Options) -> SchemaResult<CombinationNode> {
    let alternatives = get_node_list(options, "of")?
        .ok_or_else(|| SchemaError::option("of", "alternatives must be given"))?;
    let treat = get_bool(options, "treat_blank_as_nil")?.unwrap_or(false);
    Ok(CombinationNode::new(alternatives).treat_blank_as_nil(treat))
}

pub(in crate::schema) fn parse_all_of(options: &Options) -> SchemaResult<NodeKind> {
    Ok(NodeKind::AllOf(parse_combination(options)?))
}

pub(in crate::schema) fn parse_any_of(options: &Options) -> SchemaResult<NodeKind> {
    Ok(NodeKind::AnyOf(parse_combination(options)?))
}

pub(in crate::schema) fn parse_one_of(options: &Options) -> SchemaResult<NodeKind> {
    Ok(NodeKind::OneOf(parse_combination(options)?))
}

pub(in crate::schema) fn parse_not(options: &Options) -> SchemaResult<NodeKind> {
    let node = match options.get("of") {
        None | Some(Value::Null) => {
            return Err(SchemaError::option("of", "alternative must be given"));
        }
        Some(Value::Array(_)) => parse_combination(options)?,
        Some(declaration) => CombinationNode::new(vec![from_value(declaration)?])
            .treat_blank_as_nil(get_bool(options, "treat_blank_as_nil")?.unwrap_or(false)),
    };
    Ok(NodeKind::Not(node))
}
