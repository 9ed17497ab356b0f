//! # quarto-node-schema
//!
//! Node-based schema validation and casting for nested data.
//!
//! A schema is a tree of [`Node`]s describing the shape of a JSON-like value
//! (`serde_json::Value`): strings, numbers, booleans, hashes, arrays, logical
//! combinations (all of / any of / one of / not) and named references.
//! Validating a value produces a [`ValidationResult`] holding every error
//! keyed by its path in the input, plus the cast output when the input is
//! valid.
//!
//! ## Building schemas
//!
//! Schemas are built either with the typed builders:
//!
//! ```
//! use quarto_node_schema::{HashNode, Node, StringNode};
//!
//! let schema = Node::hash(
//!     HashNode::new().property("foo", Node::string(StringNode::new()).unwrap().required()),
//! )
//! .unwrap();
//! assert!(schema.validate(&serde_json::json!({"foo": "x"})).unwrap().is_valid());
//! ```
//!
//! or from a declarative value, which is what schema files contain:
//!
//! ```
//! use quarto_node_schema::from_value;
//!
//! let schema = from_value(&serde_json::json!({
//!     "type": "any_of",
//!     "of": ["string", "integer"]
//! }))
//! .unwrap();
//! assert!(!schema.validate(&serde_json::json!(true)).unwrap().is_valid());
//! ```
//!
//! ## Errors
//!
//! Problems with the schema itself ([`SchemaError`]) are returned as `Err`
//! and never mixed with problems in the validated data, which are recorded in
//! the [`ValidationResult`].
//!
//! ## References
//!
//! Reference nodes name their target and are resolved while validating:
//! first against the `definitions` of enclosing nodes, then against the
//! call-scoped [`Context`], then against a file-backed [`GlobalContext`].

pub mod context;
pub mod error;
mod export;
pub mod formats;
pub mod global;
pub mod result;
pub mod schema;
mod validator;

pub use context::{Context, Resolver};
pub use error::{ErrorReport, InstancePath, PathSegment, SchemaError, SchemaResult, ValidationError};
pub use formats::StringFormat;
pub use global::{GlobalContext, GlobalContextConfig, LoadPhase};
pub use result::{ValidationErrors, ValidationResult};
pub use schema::{
    AdditionalItems, AdditionalProperties, ArrayNode, BooleanNode, CombinationNode, Combinator,
    Definitions, HashNode, IgnoreObsolete, ItemShape, Node, NodeKind, NodeOptions, NumericNode,
    ObjectNode, Pattern, Predicate, ReferenceNode, StringNode, SymbolNode, ValueKind, from_value,
};
