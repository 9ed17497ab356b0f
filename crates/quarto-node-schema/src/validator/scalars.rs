// String, numeric and boolean checks

use serde_json::Value;

use crate::formats::StringFormat;
use crate::result::ValidationErrors;
use crate::schema::{BooleanNode, NumericNode, StringNode};

pub(super) fn validate_string(node: &StringNode, value: &Value, errors: &mut ValidationErrors) {
    let Some(s) = value.as_str() else {
        return;
    };

    if !node.allow_blank && s.trim().is_empty() {
        errors.error("String is blank but must not be blank.");
    }

    let length = s.chars().count();
    if let Some(min) = node.min_length
        && length < min
    {
        errors.error(format!(
            "String is {} characters long but must be at least {}.",
            length, min
        ));
    }
    if let Some(max) = node.max_length
        && length > max
    {
        errors.error(format!(
            "String is {} characters long but must be at most {}.",
            length, max
        ));
    }

    if let Some(pattern) = &node.pattern
        && !pattern.is_match(s)
    {
        errors.error(format!("String does not match pattern {:?}.", pattern.as_str()));
    }

    if let Some(format) = node.format
        && !format.matches(s)
    {
        errors.error(format!("String does not match format {:?}.", format.name()));
    }
}

pub(super) fn cast_string(node: &StringNode, value: &Value) -> Value {
    match (node.format, value.as_str()) {
        (Some(format), Some(s)) if format.matches(s) => format.cast(s),
        _ => value.clone(),
    }
}

fn numeric_format(integer: bool) -> StringFormat {
    if integer {
        StringFormat::Integer
    } else {
        StringFormat::Number
    }
}

pub(super) fn validate_numeric(
    node: &NumericNode,
    integer: bool,
    value: &Value,
    errors: &mut ValidationErrors,
) {
    let number = match value {
        Value::String(s) => {
            let format = numeric_format(integer);
            if !format.matches(s) {
                errors.error(format!("String does not match format {:?}.", format.name()));
                return;
            }
            format.cast(s)
        }
        other => other.clone(),
    };
    let Some(x) = number.as_f64() else {
        return;
    };

    if let Some(min) = node.minimum
        && x < min
    {
        errors.error(format!("Value must have a minimum of {}.", min));
    }
    if let Some(max) = node.maximum
        && x > max
    {
        errors.error(format!("Value must have a maximum of {}.", max));
    }
    if let Some(min) = node.exclusive_minimum
        && x <= min
    {
        errors.error(format!("Value must have an exclusive minimum of {}.", min));
    }
    if let Some(max) = node.exclusive_maximum
        && x >= max
    {
        errors.error(format!("Value must have an exclusive maximum of {}.", max));
    }
    if let Some(divisor) = node.multiple_of
        && !is_multiple_of(&number, divisor)
    {
        errors.error(format!("Value must be a multiple of {}.", divisor));
    }
}

/// Exact for integers and integral divisors, relative tolerance otherwise
fn is_multiple_of(number: &Value, divisor: f64) -> bool {
    if let Some(i) = number.as_i64()
        && divisor.fract() == 0.0
        && divisor.abs() < 9e15
    {
        return i128::from(i) % (divisor as i128) == 0;
    }
    let Some(x) = number.as_f64() else {
        return false;
    };
    let quotient = x / divisor;
    (quotient - quotient.round()).abs() <= 1e-9 * quotient.abs().max(1.0)
}

pub(super) fn cast_numeric(node: &NumericNode, integer: bool, value: &Value) -> Value {
    match value {
        Value::String(s) if node.cast_str => {
            let format = numeric_format(integer);
            if format.matches(s) {
                format.cast(s)
            } else {
                value.clone()
            }
        }
        _ => value.clone(),
    }
}

pub(super) fn validate_boolean(value: &Value, errors: &mut ValidationErrors) {
    if let Some(s) = value.as_str()
        && !matches!(s, "true" | "false")
    {
        errors.error(r#"String must be "true" or "false"."#);
    }
}

pub(super) fn cast_boolean(node: &BooleanNode, value: &Value) -> Value {
    match value.as_str() {
        Some(s) if node.cast_str && matches!(s, "true" | "false") => Value::Bool(s == "true"),
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Node;
    use serde_json::json;

    fn messages(node: &Node, input: &Value) -> Vec<String> {
        node.validate(input).unwrap().report().to_lines()
    }

    // ==================== String Tests ====================

    #[test]
    fn test_string_length() {
        let node = Node::string(StringNode::new().min_length(2).max_length(3)).unwrap();
        assert!(node.validate(&json!("ab")).unwrap().is_valid());
        assert_eq!(
            messages(&node, &json!("a")),
            vec!["/: String is 1 characters long but must be at least 2."]
        );
        assert_eq!(
            messages(&node, &json!("abcd")),
            vec!["/: String is 4 characters long but must be at most 3."]
        );
    }

    #[test]
    fn test_string_length_counts_characters() {
        let node = Node::string(StringNode::new().max_length(2)).unwrap();
        assert!(node.validate(&json!("äö")).unwrap().is_valid());
    }

    #[test]
    fn test_string_blank() {
        let node = Node::string(StringNode::new().allow_blank(false)).unwrap();
        assert_eq!(
            messages(&node, &json!("  ")),
            vec!["/: String is blank but must not be blank."]
        );
    }

    #[test]
    fn test_string_pattern() {
        let node = Node::string(StringNode::new().pattern("^[a-z]+$").unwrap()).unwrap();
        assert!(node.validate(&json!("abc")).unwrap().is_valid());
        assert_eq!(
            messages(&node, &json!("ABC")),
            vec!["/: String does not match pattern \"^[a-z]+$\"."]
        );
    }

    #[test]
    fn test_string_format_and_cast() {
        let node = Node::string(StringNode::new().format(StringFormat::IntegerList)).unwrap();
        assert_eq!(
            messages(&node, &json!("1,x")),
            vec!["/: String does not match format \"integer-list\"."]
        );
        assert_eq!(node.cast(&json!("1,2,3")).unwrap(), json!([1, 2, 3]));

        let date = Node::string(StringNode::new().format(StringFormat::Date)).unwrap();
        assert_eq!(date.cast(&json!("2024-05-01")).unwrap(), json!("2024-05-01"));
    }

    // ==================== Numeric Tests ====================

    #[test]
    fn test_numeric_bounds() {
        let node = Node::number(
            NumericNode::new()
                .minimum(0.0)
                .maximum(10.0)
                .exclusive_maximum(10.0),
        )
        .unwrap();
        assert!(node.validate(&json!(9.5)).unwrap().is_valid());
        assert_eq!(
            messages(&node, &json!(-1)),
            vec!["/: Value must have a minimum of 0."]
        );
        assert_eq!(
            messages(&node, &json!(10)),
            vec!["/: Value must have an exclusive maximum of 10."]
        );
        assert_eq!(
            messages(&node, &json!(11)),
            vec![
                "/: Value must have a maximum of 10.",
                "/: Value must have an exclusive maximum of 10."
            ]
        );
    }

    #[test]
    fn test_numeric_exclusive_minimum() {
        let node = Node::integer(NumericNode::new().exclusive_minimum(1.0)).unwrap();
        assert_eq!(
            messages(&node, &json!(1)),
            vec!["/: Value must have an exclusive minimum of 1."]
        );
        assert!(node.validate(&json!(2)).unwrap().is_valid());
    }

    #[test]
    fn test_multiple_of() {
        let integer = Node::integer(NumericNode::new().multiple_of(3.0)).unwrap();
        assert!(integer.validate(&json!(9)).unwrap().is_valid());
        assert_eq!(
            messages(&integer, &json!(10)),
            vec!["/: Value must be a multiple of 3."]
        );

        let decimal = Node::number(NumericNode::new().multiple_of(0.1)).unwrap();
        assert!(decimal.validate(&json!(0.3)).unwrap().is_valid());
        assert!(decimal.validate(&json!(7)).unwrap().is_valid());
        assert!(!decimal.validate(&json!(0.35)).unwrap().is_valid());
    }

    #[test]
    fn test_numeric_cast_str() {
        let node = Node::number(NumericNode::new().cast_str(true).minimum(1.0)).unwrap();
        assert_eq!(node.validate_strict(&json!("2.5")).unwrap(), json!(2.5));
        assert_eq!(
            messages(&node, &json!("0.5")),
            vec!["/: Value must have a minimum of 1."]
        );
        assert_eq!(
            messages(&node, &json!("abc")),
            vec!["/: String does not match format \"number\"."]
        );
    }

    // ==================== Boolean Tests ====================

    #[test]
    fn test_boolean_cast_str() {
        let node = Node::boolean(BooleanNode::new().cast_str(true)).unwrap();
        assert_eq!(node.validate_strict(&json!("false")).unwrap(), json!(false));
        assert_eq!(node.validate_strict(&json!(true)).unwrap(), json!(true));
        assert_eq!(
            messages(&node, &json!("yes")),
            vec![r#"/: String must be "true" or "false"."#]
        );
        assert_eq!(
            messages(&node, &json!("1")),
            vec![r#"/: String must be "true" or "false"."#]
        );
    }
}
