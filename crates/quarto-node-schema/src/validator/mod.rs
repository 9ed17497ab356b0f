// Validation and casting engine

mod array;
mod combinators;
mod hash;
mod scalars;

use serde_json::Value;

use crate::context::{Resolver, Scope};
use crate::error::{SchemaResult, ValidationError};
use crate::result::{ValidationErrors, ValidationResult};
use crate::schema::{Combinator, Node, NodeKind, ReferenceNode, is_blank};

static NULL: Value = Value::Null;

impl Node {
    /// Validate `input` using only local definitions for references
    pub fn validate<'a>(&'a self, input: &'a Value) -> SchemaResult<ValidationResult<'a>> {
        self.validate_with(input, Resolver::new())
    }

    /// Validate `input`, resolving references through `resolver`.
    ///
    /// Data errors end up in the returned result. An `Err` means the schema
    /// itself is broken, for example a reference that cannot be resolved.
    pub fn validate_with<'a>(
        &'a self,
        input: &'a Value,
        resolver: Resolver<'a>,
    ) -> SchemaResult<ValidationResult<'a>> {
        let mut errors = ValidationErrors::new();
        validate_node(self, input, &mut errors, &Scope::root(resolver))?;
        Ok(ValidationResult::new(self, input, resolver, errors))
    }

    /// Validate and cast in one step, failing on any data error
    pub fn validate_strict(&self, input: &Value) -> Result<Value, ValidationError> {
        self.validate_strict_with(input, Resolver::new())
    }

    pub fn validate_strict_with(
        &self,
        input: &Value,
        resolver: Resolver<'_>,
    ) -> Result<Value, ValidationError> {
        let result = self.validate_with(input, resolver)?;
        if !result.is_valid() {
            return Err(ValidationError::Invalid(result.report()));
        }
        Ok(result.into_data()?.unwrap_or(Value::Null))
    }

    /// Normalize `value` without validating it first.
    ///
    /// Values of an unexpected shape pass through unchanged.
    pub fn cast(&self, value: &Value) -> SchemaResult<Value> {
        self.cast_with(value, Resolver::new())
    }

    pub fn cast_with(&self, value: &Value, resolver: Resolver<'_>) -> SchemaResult<Value> {
        cast_node(self, value, &Scope::root(resolver))
    }
}

/// Walk `node` against `value`, recording data errors in `errors`
pub(crate) fn validate_node<'s>(
    node: &'s Node,
    value: &Value,
    errors: &mut ValidationErrors,
    scope: &Scope<'s>,
) -> SchemaResult<()> {
    let entered = scope.enter(node);
    let scope = entered.as_ref().unwrap_or(scope);

    let value = blank_as_nil(node, value);
    let Some(value) = validate_base(node, value, errors) else {
        return Ok(());
    };

    match &node.kind {
        NodeKind::String(string) => scalars::validate_string(string, value, errors),
        NodeKind::Integer(numeric) => scalars::validate_numeric(numeric, true, value, errors),
        NodeKind::Number(numeric) => scalars::validate_numeric(numeric, false, value, errors),
        NodeKind::Boolean(_) => scalars::validate_boolean(value, errors),
        NodeKind::Symbol(_) | NodeKind::Object(_) => {}
        NodeKind::Hash(hash) => hash::validate(hash, value, errors, scope)?,
        NodeKind::Array(array) => array::validate(array, value, errors, scope)?,
        NodeKind::AllOf(c) => combinators::validate(Combinator::AllOf, c, value, errors, scope)?,
        NodeKind::AnyOf(c) => combinators::validate(Combinator::AnyOf, c, value, errors, scope)?,
        NodeKind::OneOf(c) => combinators::validate(Combinator::OneOf, c, value, errors, scope)?,
        NodeKind::Not(c) => combinators::validate(Combinator::Not, c, value, errors, scope)?,
        NodeKind::Reference(reference) => validate_reference(reference, value, errors, scope)?,
    }
    Ok(())
}

/// Cast a value that passed [`validate_node`]
pub(crate) fn cast_node<'s>(node: &'s Node, value: &Value, scope: &Scope<'s>) -> SchemaResult<Value> {
    let entered = scope.enter(node);
    let scope = entered.as_ref().unwrap_or(scope);

    let mut value = blank_as_nil(node, value);
    if value.is_null() {
        match node.options.default.as_ref() {
            Some(default) if !default.is_null() => value = default,
            _ => return Ok(Value::Null),
        }
    }

    match &node.kind {
        NodeKind::String(string) => Ok(scalars::cast_string(string, value)),
        NodeKind::Integer(numeric) => Ok(scalars::cast_numeric(numeric, true, value)),
        NodeKind::Number(numeric) => Ok(scalars::cast_numeric(numeric, false, value)),
        NodeKind::Boolean(boolean) => Ok(scalars::cast_boolean(boolean, value)),
        NodeKind::Symbol(_) | NodeKind::Object(_) => Ok(value.clone()),
        NodeKind::Hash(hash) => hash::cast(hash, value, scope),
        NodeKind::Array(array) => array::cast(array, value, scope),
        NodeKind::AllOf(c) => combinators::cast(Combinator::AllOf, c, value, scope),
        NodeKind::AnyOf(c) => combinators::cast(Combinator::AnyOf, c, value, scope),
        NodeKind::OneOf(c) => combinators::cast(Combinator::OneOf, c, value, scope),
        NodeKind::Not(c) => combinators::cast(Combinator::Not, c, value, scope),
        NodeKind::Reference(reference) => scope.with_target(reference.target(), |target, scope| {
            cast_node(target, value, scope)
        }),
    }
}

/// Validate `value` against `node` on a throw-away error list
pub(crate) fn trial<'s>(
    node: &'s Node,
    value: &Value,
    scope: &Scope<'s>,
) -> SchemaResult<ValidationErrors> {
    let mut errors = ValidationErrors::new();
    validate_node(node, value, &mut errors, scope)?;
    Ok(errors)
}

pub(crate) fn matches<'s>(node: &'s Node, value: &Value, scope: &Scope<'s>) -> SchemaResult<bool> {
    Ok(trial(node, value, scope)?.is_empty())
}

fn validate_reference(
    reference: &ReferenceNode,
    value: &Value,
    errors: &mut ValidationErrors,
    scope: &Scope<'_>,
) -> SchemaResult<()> {
    scope.with_target(reference.target(), |target, scope| {
        validate_node(target, value, errors, scope)
    })
}

/// Combinators with `treat_blank_as_nil` see blank input as absent
fn blank_as_nil<'v>(node: &Node, value: &'v Value) -> &'v Value {
    match node.kind.combination() {
        Some((_, combination))
            if combination.treat_blank_as_nil && !value.is_boolean() && is_blank(value) =>
        {
            &NULL
        }
        _ => value,
    }
}

/// Presence, default, type and enum checks shared by every node type.
///
/// Returns the value the type-specific checks should see, or `None` when
/// validation of this node stops here.
fn validate_base<'v>(
    node: &'v Node,
    value: &'v Value,
    errors: &mut ValidationErrors,
) -> Option<&'v Value> {
    let options = &node.options;
    let value = if value.is_null() {
        if options.required {
            errors.error("Value must be given.");
            return None;
        }
        options.default.as_ref().filter(|default| !default.is_null())?
    } else {
        value
    };

    if !accepts_type(&node.kind, value) {
        errors.error(format!("Invalid type, expected {}.", type_label(&node.kind)));
        return None;
    }

    if let Some(allowed) = &options.enum_values
        && !allowed.contains(value)
    {
        errors.error(format!(
            "Value not included in enum {}.",
            Value::Array(allowed.clone())
        ));
    }

    Some(value)
}

fn accepts_type(kind: &NodeKind, value: &Value) -> bool {
    match kind {
        NodeKind::String(_) | NodeKind::Symbol(_) => value.is_string(),
        NodeKind::Integer(numeric) => {
            value.is_i64() || value.is_u64() || (numeric.cast_str && value.is_string())
        }
        NodeKind::Number(numeric) => value.is_number() || (numeric.cast_str && value.is_string()),
        NodeKind::Boolean(boolean) => value.is_boolean() || (boolean.cast_str && value.is_string()),
        NodeKind::Object(object) => {
            object.classes.is_empty() || object.classes.iter().any(|kind| kind.matches(value))
        }
        NodeKind::Hash(_) => value.is_object(),
        NodeKind::Array(array) => value.is_array() || (array.parse_json && value.is_string()),
        _ => true,
    }
}

fn type_label(kind: &NodeKind) -> String {
    let with_string = |name: &str, cast: bool| {
        if cast {
            format!("{} or string", name)
        } else {
            name.to_string()
        }
    };
    match kind {
        NodeKind::Integer(numeric) => with_string("integer", numeric.cast_str),
        NodeKind::Number(numeric) => with_string("number", numeric.cast_str),
        NodeKind::Boolean(boolean) => with_string("boolean", boolean.cast_str),
        NodeKind::Array(array) => with_string("array", array.parse_json),
        NodeKind::Hash(_) => "object".to_string(),
        NodeKind::Object(object) => object
            .classes
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(" or "),
        other => other.type_name().to_string(),
    }
}
