//! Schema nodes
//!
//! A schema is a tree of [`Node`]s. Every node carries the common
//! [`NodeOptions`] (required flag, default, enum, metadata, local definitions)
//! and a type-specific [`NodeKind`]. A parent exclusively owns its children;
//! the only non-tree edge is [`ReferenceNode`], which names its target and is
//! resolved at call time.
//!
//! Nodes are built either through the constructors on [`Node`] or from a
//! declarative value with [`from_value`]. Both paths run the node's
//! `validate_self` check, so a `Node` that exists is structurally valid.

mod annotations;
mod helpers;
mod parser;
mod parsers;
mod types;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::SchemaResult;

pub use parser::{NODE_TYPES, NodeType, from_value, lookup_node_type};
pub use types::{
    AdditionalItems, AdditionalProperties, ArrayNode, BooleanNode, CombinationNode, Combinator,
    HashNode, IgnoreObsolete, ItemShape, NumericNode, ObjectNode, Pattern, Predicate,
    ReferenceNode, StringNode, SymbolNode, ValueKind,
};

pub(crate) use types::is_blank;

/// Locally declared named sub-schemas
pub type Definitions = IndexMap<String, Node>;

/// Options shared by every node type
#[derive(Debug, Clone, Default)]
pub struct NodeOptions {
    /// Property key in the parent hash (absent at the root)
    pub(crate) name: Option<String>,
    pub(crate) required: bool,
    /// The key must be present in the parent hash, even with a null value
    pub(crate) require_key: bool,
    pub(crate) default: Option<Value>,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) examples: Vec<Value>,
    pub(crate) enum_values: Option<Vec<Value>>,
    /// Output key used by the parent hash when casting
    pub(crate) output_name: Option<String>,
    pub(crate) definitions: Definitions,
}

impl NodeOptions {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn examples(&self) -> &[Value] {
        &self.examples
    }

    pub fn enum_values(&self) -> Option<&[Value]> {
        self.enum_values.as_deref()
    }

    pub fn output_name(&self) -> Option<&str> {
        self.output_name.as_deref()
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }
}

/// Type-specific part of a node
#[derive(Debug, Clone)]
pub enum NodeKind {
    String(StringNode),
    Integer(NumericNode),
    Number(NumericNode),
    Boolean(BooleanNode),
    Symbol(SymbolNode),
    Object(ObjectNode),
    Hash(HashNode),
    Array(ArrayNode),
    AllOf(CombinationNode),
    AnyOf(CombinationNode),
    OneOf(CombinationNode),
    Not(CombinationNode),
    Reference(ReferenceNode),
}

impl NodeKind {
    /// Canonical type name, as used by the declarative form
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::String(_) => "string",
            NodeKind::Integer(_) => "integer",
            NodeKind::Number(_) => "number",
            NodeKind::Boolean(_) => "boolean",
            NodeKind::Symbol(_) => "symbol",
            NodeKind::Object(_) => "object",
            NodeKind::Hash(_) => "hash",
            NodeKind::Array(_) => "array",
            NodeKind::AllOf(_) => Combinator::AllOf.name(),
            NodeKind::AnyOf(_) => Combinator::AnyOf.name(),
            NodeKind::OneOf(_) => Combinator::OneOf.name(),
            NodeKind::Not(_) => Combinator::Not.name(),
            NodeKind::Reference(_) => "reference",
        }
    }

    /// The combination node and its mode, for the combinator variants
    pub(crate) fn combination(&self) -> Option<(Combinator, &CombinationNode)> {
        match self {
            NodeKind::AllOf(c) => Some((Combinator::AllOf, c)),
            NodeKind::AnyOf(c) => Some((Combinator::AnyOf, c)),
            NodeKind::OneOf(c) => Some((Combinator::OneOf, c)),
            NodeKind::Not(c) => Some((Combinator::Not, c)),
            _ => None,
        }
    }

    fn validate_self(&self) -> SchemaResult<()> {
        match self {
            NodeKind::String(s) => s.validate_self(),
            NodeKind::Integer(n) | NodeKind::Number(n) => n.validate_self(),
            NodeKind::Hash(h) => h.validate_self(),
            NodeKind::Array(a) => a.validate_self(),
            NodeKind::Reference(r) => r.validate_self(),
            NodeKind::Boolean(_) | NodeKind::Symbol(_) | NodeKind::Object(_) => Ok(()),
            other => match other.combination() {
                Some((combinator, c)) => c.validate_self(combinator),
                None => Ok(()),
            },
        }
    }
}

/// One constraint unit of a schema tree
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) options: NodeOptions,
    pub(crate) kind: NodeKind,
}

impl Node {
    /// Wrap `kind` into a node, rejecting invalid configuration
    pub fn new(kind: NodeKind) -> SchemaResult<Self> {
        Self::from_parts(NodeOptions::default(), kind)
    }

    pub(crate) fn from_parts(options: NodeOptions, kind: NodeKind) -> SchemaResult<Self> {
        kind.validate_self()?;
        Ok(Self { options, kind })
    }

    pub fn string(node: StringNode) -> SchemaResult<Self> {
        Self::new(NodeKind::String(node))
    }

    pub fn integer(node: NumericNode) -> SchemaResult<Self> {
        Self::new(NodeKind::Integer(node))
    }

    pub fn number(node: NumericNode) -> SchemaResult<Self> {
        Self::new(NodeKind::Number(node))
    }

    pub fn boolean(node: BooleanNode) -> SchemaResult<Self> {
        Self::new(NodeKind::Boolean(node))
    }

    pub fn symbol() -> SchemaResult<Self> {
        Self::new(NodeKind::Symbol(SymbolNode))
    }

    pub fn object(node: ObjectNode) -> SchemaResult<Self> {
        Self::new(NodeKind::Object(node))
    }

    pub fn hash(node: HashNode) -> SchemaResult<Self> {
        Self::new(NodeKind::Hash(node))
    }

    pub fn array(node: ArrayNode) -> SchemaResult<Self> {
        Self::new(NodeKind::Array(node))
    }

    pub fn all_of(alternatives: Vec<Node>) -> SchemaResult<Self> {
        Self::new(NodeKind::AllOf(CombinationNode::new(alternatives)))
    }

    pub fn any_of(alternatives: Vec<Node>) -> SchemaResult<Self> {
        Self::new(NodeKind::AnyOf(CombinationNode::new(alternatives)))
    }

    pub fn one_of(alternatives: Vec<Node>) -> SchemaResult<Self> {
        Self::new(NodeKind::OneOf(CombinationNode::new(alternatives)))
    }

    pub fn not(alternative: Node) -> SchemaResult<Self> {
        Self::new(NodeKind::Not(CombinationNode::new(vec![alternative])))
    }

    pub fn reference(target: impl Into<String>) -> SchemaResult<Self> {
        Self::new(NodeKind::Reference(ReferenceNode::new(target)))
    }

    pub fn required(mut self) -> Self {
        self.options.required = true;
        self
    }

    pub fn require_key(mut self) -> Self {
        self.options.require_key = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.options.default = Some(default.into());
        self
    }

    pub fn with_enum<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.options.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.options.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.options.description = Some(description.into());
        self
    }

    pub fn with_examples(mut self, examples: impl IntoIterator<Item = Value>) -> Self {
        self.options.examples = examples.into_iter().collect();
        self
    }

    /// Rename this property in the parent hash's cast output
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.options.output_name = Some(name.into());
        self
    }

    /// Declare a named sub-schema visible to this node and its descendants
    pub fn with_definition(mut self, name: impl Into<String>, node: Node) -> Self {
        self.options.definitions.insert(name.into(), node);
        self
    }

    pub fn options(&self) -> &NodeOptions {
        &self.options
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn name(&self) -> Option<&str> {
        self.options.name()
    }

    pub fn is_required(&self) -> bool {
        self.options.required
    }

    /// Owned child nodes, excluding local definitions
    pub(crate) fn children(&self) -> Vec<&Node> {
        let mut children = Vec::new();
        match &self.kind {
            NodeKind::Hash(h) => {
                children.extend(h.properties.values());
                children.extend(h.pattern_properties.iter().map(|(_, node)| node));
                if let AdditionalProperties::Schema(node) = &h.additional_properties {
                    children.push(node.as_ref());
                }
            }
            NodeKind::Array(a) => {
                match &a.items {
                    ItemShape::Any => {}
                    ItemShape::List(node) => children.push(node.as_ref()),
                    ItemShape::Tuple(nodes) => children.extend(nodes.iter()),
                }
                if let Some(AdditionalItems::Schema(node)) = &a.additional_items {
                    children.push(node.as_ref());
                }
                if let Some(node) = &a.contains {
                    children.push(node.as_ref());
                }
            }
            other => {
                if let Some((_, c)) = other.combination() {
                    children.extend(c.alternatives.iter());
                }
            }
        }
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use serde_json::json;

    #[test]
    fn test_minimum_greater_than_maximum_is_rejected() {
        let result = Node::integer(NumericNode::new().minimum(5.0).maximum(1.0));
        assert!(matches!(result, Err(SchemaError::InvalidStructure(_))));
    }

    #[test]
    fn test_multiple_of_must_be_positive() {
        let result = Node::number(NumericNode::new().multiple_of(0.0));
        assert!(matches!(result, Err(SchemaError::InvalidOption { .. })));
    }

    #[test]
    fn test_combinator_arity() {
        let string = || Node::string(StringNode::new()).unwrap();

        assert!(Node::any_of(vec![]).is_err());
        assert!(Node::any_of(vec![string()]).is_ok());
        assert!(Node::one_of(vec![string()]).is_err());
        assert!(Node::one_of(vec![string(), string()]).is_ok());
        assert!(Node::all_of(vec![]).is_ok());

        let not_two = Node::new(NodeKind::Not(CombinationNode::new(vec![string(), string()])));
        assert!(not_two.is_err());
    }

    #[test]
    fn test_pattern_property_cannot_be_required() {
        let hash = HashNode::new()
            .pattern_property("^x-", Node::string(StringNode::new()).unwrap().required())
            .unwrap();
        assert!(Node::hash(hash).is_err());
    }

    #[test]
    fn test_additional_and_ignore_obsolete_conflict() {
        let hash = HashNode::new()
            .additional_properties(AdditionalProperties::Allow)
            .ignore_obsolete_properties(IgnoreObsolete::All);
        assert!(Node::hash(hash).is_err());
    }

    #[test]
    fn test_additional_items_requires_tuple() {
        let list = ArrayNode::list(Node::symbol().unwrap()).additional_items(AdditionalItems::Allow);
        assert!(Node::array(list).is_err());
    }

    #[test]
    fn test_property_records_name() {
        let hash = HashNode::new().property("foo", Node::symbol().unwrap());
        assert_eq!(hash.properties()["foo"].name(), Some("foo"));
    }

    #[test]
    fn test_base_setters() {
        let node = Node::string(StringNode::new())
            .unwrap()
            .required()
            .with_default("x")
            .with_enum(["x", "y"])
            .with_output_name("renamed");

        assert!(node.is_required());
        assert_eq!(node.options().default_value(), Some(&json!("x")));
        assert_eq!(node.options().enum_values().map(<[Value]>::len), Some(2));
        assert_eq!(node.options().output_name(), Some("renamed"));
        assert_eq!(node.type_name(), "string");
    }
}
