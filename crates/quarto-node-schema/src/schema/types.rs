//! Schema node type definitions
//!
//! Each node type is a plain configuration struct with named optional fields.
//! Builder methods consume and return the struct; the invariants of each type
//! are checked by `validate_self` when the struct is wrapped into a
//! [`Node`](super::Node).

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::Node;
use crate::error::{SchemaError, SchemaResult};
use crate::formats::StringFormat;

/// A compiled regular expression that remembers its source text
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> SchemaResult<Self> {
        let regex = Regex::new(source).map_err(|e| SchemaError::InvalidPattern {
            pattern: source.to_string(),
            source: e,
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Unanchored match, like `Regex::is_match`
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.source)
    }
}

/// Element predicate used by array `filter` / `reject`.
///
/// Returns `None` when the predicate does not apply to the element (for
/// example `zero` on a string); such elements are always kept.
#[derive(Clone)]
pub struct Predicate {
    name: String,
    test: Arc<dyn Fn(&Value) -> Option<bool> + Send + Sync>,
}

impl Predicate {
    pub fn new(
        name: impl Into<String>,
        test: impl Fn(&Value) -> Option<bool> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            test: Arc::new(test),
        }
    }

    /// Look up one of the built-in predicates by name
    pub fn named(name: &str) -> Option<Self> {
        let test: fn(&Value) -> Option<bool> = match name {
            "blank" => |v| Some(is_blank(v)),
            "present" => |v| Some(!is_blank(v)),
            "empty" => |v| match v {
                Value::String(s) => Some(s.is_empty()),
                Value::Array(a) => Some(a.is_empty()),
                Value::Object(o) => Some(o.is_empty()),
                _ => None,
            },
            "zero" => |v| v.as_f64().map(|n| n == 0.0),
            "negative" => |v| v.as_f64().map(|n| n < 0.0),
            "positive" => |v| v.as_f64().map(|n| n > 0.0),
            _ => return None,
        };
        Some(Self::new(name, test))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn test(&self, value: &Value) -> Option<bool> {
        (self.test)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({:?})", self.name)
    }
}

/// Null, whitespace-only strings, empty collections and `false`
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(_) => false,
    }
}

/// String node
#[derive(Debug, Clone)]
pub struct StringNode {
    pub(crate) min_length: Option<usize>,
    pub(crate) max_length: Option<usize>,
    pub(crate) pattern: Option<Pattern>,
    pub(crate) format: Option<StringFormat>,
    pub(crate) allow_blank: bool,
}

impl Default for StringNode {
    fn default() -> Self {
        Self {
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
            allow_blank: true,
        }
    }
}

impl StringNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: &str) -> SchemaResult<Self> {
        self.pattern = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    pub fn format(mut self, format: StringFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = allow;
        self
    }

    pub(crate) fn validate_self(&self) -> SchemaResult<()> {
        if let (Some(min), Some(max)) = (self.min_length, self.max_length)
            && min > max
        {
            return Err(SchemaError::invalid(
                "Option \"min_length\" can't be greater than \"max_length\"",
            ));
        }
        Ok(())
    }
}

/// Integer and number nodes
#[derive(Debug, Clone, Default)]
pub struct NumericNode {
    pub(crate) minimum: Option<f64>,
    pub(crate) maximum: Option<f64>,
    pub(crate) exclusive_minimum: Option<f64>,
    pub(crate) exclusive_maximum: Option<f64>,
    pub(crate) multiple_of: Option<f64>,
    pub(crate) cast_str: bool,
}

impl NumericNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minimum(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self
    }

    pub fn maximum(mut self, max: f64) -> Self {
        self.maximum = Some(max);
        self
    }

    pub fn exclusive_minimum(mut self, min: f64) -> Self {
        self.exclusive_minimum = Some(min);
        self
    }

    pub fn exclusive_maximum(mut self, max: f64) -> Self {
        self.exclusive_maximum = Some(max);
        self
    }

    pub fn multiple_of(mut self, multiple: f64) -> Self {
        self.multiple_of = Some(multiple);
        self
    }

    /// Accept numeric strings and cast them to numbers
    pub fn cast_str(mut self, cast: bool) -> Self {
        self.cast_str = cast;
        self
    }

    pub(crate) fn validate_self(&self) -> SchemaResult<()> {
        let lower = [("minimum", self.minimum), ("exclusive_minimum", self.exclusive_minimum)];
        let upper = [("maximum", self.maximum), ("exclusive_maximum", self.exclusive_maximum)];
        for (lower_name, lower_value) in lower {
            for (upper_name, upper_value) in upper {
                if let (Some(l), Some(u)) = (lower_value, upper_value)
                    && l > u
                {
                    return Err(SchemaError::invalid(format!(
                        "Option {:?} can't be greater than {:?}",
                        lower_name, upper_name
                    )));
                }
            }
        }
        if let Some(multiple) = self.multiple_of
            && !(multiple > 0.0 && multiple.is_finite())
        {
            return Err(SchemaError::option("multiple_of", "must be a positive number"));
        }
        Ok(())
    }
}

/// Boolean node
#[derive(Debug, Clone, Default)]
pub struct BooleanNode {
    pub(crate) cast_str: bool,
}

impl BooleanNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `"true"` / `"false"` and cast them to booleans
    pub fn cast_str(mut self, cast: bool) -> Self {
        self.cast_str = cast;
        self
    }
}

/// Symbol (atom) node. Symbols travel as strings in JSON data.
#[derive(Debug, Clone, Default)]
pub struct SymbolNode;

/// Kind of a JSON value, used by [`ObjectNode`] as its class set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "boolean" => ValueKind::Boolean,
            "integer" => ValueKind::Integer,
            "number" => ValueKind::Number,
            "string" => ValueKind::String,
            "array" => ValueKind::Array,
            "object" => ValueKind::Object,
            _ => return None,
        })
    }

    /// `Number` also covers integral numbers
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ValueKind::Boolean => value.is_boolean(),
            ValueKind::Integer => value.is_i64() || value.is_u64(),
            ValueKind::Number => value.is_number(),
            ValueKind::String => value.is_string(),
            ValueKind::Array => value.is_array(),
            ValueKind::Object => value.is_object(),
        }
    }
}

/// Class-instance node: any present value whose kind is in `classes`
/// (an empty set accepts every kind)
#[derive(Debug, Clone, Default)]
pub struct ObjectNode {
    pub(crate) classes: IndexSet<ValueKind>,
}

impl ObjectNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classes(mut self, classes: impl IntoIterator<Item = ValueKind>) -> Self {
        self.classes = classes.into_iter().collect();
        self
    }
}

/// Policy for hash keys not covered by declared or pattern properties
#[derive(Debug, Clone, Default)]
pub enum AdditionalProperties {
    #[default]
    Reject,
    Allow,
    Schema(Box<Node>),
}

/// Obsolete keys that are tolerated without loosening declared properties
#[derive(Debug, Clone, Default)]
pub enum IgnoreObsolete {
    #[default]
    None,
    All,
    Keys(IndexSet<String>),
}

impl IgnoreObsolete {
    pub(crate) fn ignores(&self, key: &str) -> bool {
        match self {
            IgnoreObsolete::None => false,
            IgnoreObsolete::All => true,
            IgnoreObsolete::Keys(keys) => keys.contains(key),
        }
    }
}

/// Hash (object) node
#[derive(Debug, Clone, Default)]
pub struct HashNode {
    pub(crate) properties: IndexMap<String, Node>,
    pub(crate) pattern_properties: Vec<(Pattern, Node)>,
    pub(crate) additional_properties: AdditionalProperties,
    pub(crate) property_names: Option<Pattern>,
    pub(crate) dependencies: IndexMap<String, Vec<String>>,
    pub(crate) min_properties: Option<usize>,
    pub(crate) max_properties: Option<usize>,
    pub(crate) ignore_obsolete_properties: IgnoreObsolete,
    pub(crate) includes: Vec<String>,
}

impl HashNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a property; a later declaration with the same name replaces
    /// the earlier one in place
    pub fn property(mut self, name: impl Into<String>, mut node: Node) -> Self {
        let name = name.into();
        node.options.name = Some(name.clone());
        self.properties.insert(name, node);
        self
    }

    pub fn pattern_property(mut self, pattern: &str, mut node: Node) -> SchemaResult<Self> {
        node.options.name = Some(pattern.to_string());
        self.pattern_properties.push((Pattern::new(pattern)?, node));
        Ok(self)
    }

    pub fn additional_properties(mut self, policy: AdditionalProperties) -> Self {
        self.additional_properties = policy;
        self
    }

    pub fn property_names(mut self, pattern: &str) -> SchemaResult<Self> {
        self.property_names = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    /// If `source` is present, every key in `targets` must be present too
    pub fn dependency<I, S>(mut self, source: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .insert(source.into(), targets.into_iter().map(Into::into).collect());
        self
    }

    pub fn min_properties(mut self, min: usize) -> Self {
        self.min_properties = Some(min);
        self
    }

    pub fn max_properties(mut self, max: usize) -> Self {
        self.max_properties = Some(max);
        self
    }

    pub fn ignore_obsolete_properties(mut self, ignore: IgnoreObsolete) -> Self {
        self.ignore_obsolete_properties = ignore;
        self
    }

    /// Inline the properties of the named hash schema
    pub fn include(mut self, schema: impl Into<String>) -> Self {
        self.includes.push(schema.into());
        self
    }

    pub fn properties(&self) -> &IndexMap<String, Node> {
        &self.properties
    }

    pub(crate) fn pattern_property_for(&self, key: &str) -> Option<&Node> {
        self.pattern_properties
            .iter()
            .find(|(pattern, _)| pattern.is_match(key))
            .map(|(_, node)| node)
    }

    pub(crate) fn validate_self(&self) -> SchemaResult<()> {
        if let Some((pattern, _)) = self
            .pattern_properties
            .iter()
            .find(|(_, node)| node.is_required())
        {
            return Err(SchemaError::invalid(format!(
                "Pattern properties can't be required: {:?}",
                pattern.as_str()
            )));
        }
        if matches!(self.additional_properties, AdditionalProperties::Allow)
            && matches!(self.ignore_obsolete_properties, IgnoreObsolete::All)
        {
            return Err(SchemaError::invalid(
                "Options \"additional_properties\" and \"ignore_obsolete_properties\" can't both be true",
            ));
        }
        if let (Some(min), Some(max)) = (self.min_properties, self.max_properties)
            && min > max
        {
            return Err(SchemaError::invalid(
                "Option \"min_properties\" can't be greater than \"max_properties\"",
            ));
        }
        for (source, targets) in &self.dependencies {
            if source.is_empty() || targets.iter().any(String::is_empty) {
                return Err(SchemaError::option(
                    "dependencies",
                    "keys and targets must be non-empty",
                ));
            }
        }
        if self.includes.iter().any(String::is_empty) {
            return Err(SchemaError::option("includes", "names must be non-empty"));
        }
        Ok(())
    }
}

/// Item shape of an array node
#[derive(Debug, Clone, Default)]
pub enum ItemShape {
    /// No per-item schema
    #[default]
    Any,
    /// One schema applied to every element
    List(Box<Node>),
    /// Positional schemas
    Tuple(Vec<Node>),
}

/// Policy for tuple elements beyond the declared positions
#[derive(Debug, Clone, Default)]
pub enum AdditionalItems {
    #[default]
    Reject,
    Allow,
    Schema(Box<Node>),
}

/// Array node
#[derive(Debug, Clone, Default)]
pub struct ArrayNode {
    pub(crate) items: ItemShape,
    pub(crate) additional_items: Option<AdditionalItems>,
    pub(crate) contains: Option<Box<Node>>,
    pub(crate) min_items: Option<usize>,
    pub(crate) max_items: Option<usize>,
    pub(crate) unique_items: bool,
    pub(crate) filter: Option<Predicate>,
    pub(crate) reject: Option<Predicate>,
    pub(crate) parse_json: bool,
}

impl ArrayNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Homogeneous list of `item`
    pub fn list(item: Node) -> Self {
        Self {
            items: ItemShape::List(Box::new(item)),
            ..Self::default()
        }
    }

    /// Positional tuple of `items`
    pub fn tuple(items: Vec<Node>) -> Self {
        Self {
            items: ItemShape::Tuple(items),
            ..Self::default()
        }
    }

    pub fn additional_items(mut self, policy: AdditionalItems) -> Self {
        self.additional_items = Some(policy);
        self
    }

    pub fn contains(mut self, node: Node) -> Self {
        self.contains = Some(Box::new(node));
        self
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn unique_items(mut self, unique: bool) -> Self {
        self.unique_items = unique;
        self
    }

    /// Keep only elements for which `predicate` holds
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }

    /// Drop elements for which `predicate` holds
    pub fn reject(mut self, predicate: Predicate) -> Self {
        self.reject = Some(predicate);
        self
    }

    /// Accept a string holding a JSON array
    pub fn parse_json(mut self, parse: bool) -> Self {
        self.parse_json = parse;
        self
    }

    pub(crate) fn tail_policy(&self) -> &AdditionalItems {
        static REJECT: AdditionalItems = AdditionalItems::Reject;
        self.additional_items.as_ref().unwrap_or(&REJECT)
    }

    /// Apply `filter` and `reject` to the raw elements
    pub(crate) fn preprocess<'v>(&self, items: &'v [Value]) -> Vec<&'v Value> {
        items
            .iter()
            .filter(|item| {
                let kept = self
                    .filter
                    .as_ref()
                    .is_none_or(|p| p.test(item).unwrap_or(true));
                let rejected = self
                    .reject
                    .as_ref()
                    .is_some_and(|p| p.test(item).unwrap_or(false));
                kept && !rejected
            })
            .collect()
    }

    pub(crate) fn validate_self(&self) -> SchemaResult<()> {
        if self.additional_items.is_some() && !matches!(self.items, ItemShape::Tuple(_)) {
            return Err(SchemaError::invalid(
                "Option \"additional_items\" can only be used with tuple items",
            ));
        }
        if let (Some(min), Some(max)) = (self.min_items, self.max_items)
            && min > max
        {
            return Err(SchemaError::invalid(
                "Option \"min_items\" can't be greater than \"max_items\"",
            ));
        }
        Ok(())
    }
}

/// Which combination a [`CombinationNode`] performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    AllOf,
    AnyOf,
    OneOf,
    Not,
}

impl Combinator {
    pub fn name(self) -> &'static str {
        match self {
            Combinator::AllOf => "all_of",
            Combinator::AnyOf => "any_of",
            Combinator::OneOf => "one_of",
            Combinator::Not => "is_not",
        }
    }
}

/// Alternatives of an all-of / any-of / one-of / not node
#[derive(Debug, Clone, Default)]
pub struct CombinationNode {
    pub(crate) alternatives: Vec<Node>,
    pub(crate) treat_blank_as_nil: bool,
}

impl CombinationNode {
    pub fn new(alternatives: Vec<Node>) -> Self {
        Self {
            alternatives,
            treat_blank_as_nil: false,
        }
    }

    /// Treat blank input (empty strings, empty collections) as absent
    pub fn treat_blank_as_nil(mut self, treat: bool) -> Self {
        self.treat_blank_as_nil = treat;
        self
    }

    pub fn alternatives(&self) -> &[Node] {
        &self.alternatives
    }

    pub(crate) fn validate_self(&self, combinator: Combinator) -> SchemaResult<()> {
        let count = self.alternatives.len();
        let ok = match combinator {
            Combinator::AllOf => true,
            Combinator::AnyOf => count >= 1,
            Combinator::OneOf => count >= 2,
            Combinator::Not => count == 1,
        };
        if ok {
            return Ok(());
        }
        let expected = match combinator {
            Combinator::AnyOf => "at least 1",
            Combinator::OneOf => "at least 2",
            _ => "exactly 1",
        };
        Err(SchemaError::invalid(format!(
            "Node {:?} takes {} alternative(s), got {}",
            combinator.name(),
            expected,
            count
        )))
    }
}

/// Named reference to another schema, resolved at call time
#[derive(Debug, Clone)]
pub struct ReferenceNode {
    pub(crate) target: String,
}

impl ReferenceNode {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub(crate) fn validate_self(&self) -> SchemaResult<()> {
        if self.target.is_empty() {
            return Err(SchemaError::option("path", "reference name must be given"));
        }
        Ok(())
    }
}
