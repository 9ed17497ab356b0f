//! Options shared by every node type
//!
//! Required flags, defaults, enum values, documentation metadata and local
//! definitions can be attached to any declaration, regardless of its type.

use crate::error::SchemaResult;

use super::NodeOptions;
use super::helpers::{Options, get_bool, get_node_map, get_string, get_value_array};

/// Option keys accepted by every node type
pub(super) const BASE_OPTIONS: &[&str] = &[
    "type",
    "required",
    "require_key",
    "default",
    "title",
    "description",
    "examples",
    "enum",
    "as",
    "definitions",
];

/// Parse the shared options of a declaration
pub(super) fn parse_base_options(options: &Options) -> SchemaResult<NodeOptions> {
    Ok(NodeOptions {
        name: None,
        required: get_bool(options, "required")?.unwrap_or(false),
        require_key: get_bool(options, "require_key")?.unwrap_or(false),
        default: options.get("default").filter(|v| !v.is_null()).cloned(),
        title: get_string(options, "title")?,
        description: get_string(options, "description")?,
        examples: get_value_array(options, "examples")?.unwrap_or_default(),
        enum_values: get_value_array(options, "enum")?,
        output_name: get_string(options, "as")?,
        definitions: get_node_map(options, "definitions")?.unwrap_or_default(),
    })
}
