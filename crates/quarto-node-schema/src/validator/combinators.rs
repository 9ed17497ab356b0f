// allOf / anyOf / oneOf / not
//
// Every alternative is validated on its own throw-away error list; an
// alternative matches when that list stays empty. Failed alternatives are
// embedded in the aggregate message as an indented report.

use serde_json::Value;
use tracing::trace;

use super::{cast_node, matches, trial};
use crate::context::Scope;
use crate::error::SchemaResult;
use crate::export::node_json;
use crate::result::ValidationErrors;
use crate::schema::{CombinationNode, Combinator};

pub(super) fn validate<'s>(
    combinator: Combinator,
    node: &'s CombinationNode,
    value: &Value,
    errors: &mut ValidationErrors,
    scope: &Scope<'s>,
) -> SchemaResult<()> {
    let total = node.alternatives.len();
    let mut matched = 0;
    let mut failures = Vec::new();
    for (index, alternative) in node.alternatives.iter().enumerate() {
        let outcome = trial(alternative, value, scope)?;
        if outcome.is_empty() {
            matched += 1;
        } else {
            failures.push((index, outcome));
        }
    }
    trace!(combinator = combinator.name(), matched, total, "evaluated alternatives");

    match combinator {
        Combinator::AllOf if matched < total => errors.error(aggregate(
            format!(
                "Matches {} of {} allOf conditions but must match all.",
                matched, total
            ),
            &failures,
        )),
        Combinator::AnyOf if matched == 0 => errors.error(aggregate(
            format!("Matches 0 of {} anyOf conditions.", total),
            &failures,
        )),
        Combinator::OneOf if matched != 1 => {
            let headline = format!(
                "Matches {} of {} oneOf conditions but must match exactly 1.",
                matched, total
            );
            if matched == 0 {
                errors.error(aggregate(headline, &failures));
            } else {
                errors.error(headline);
            }
        }
        Combinator::Not if matched > 0 => {
            if let Some(alternative) = node.alternatives.first() {
                errors.error(format!("Must not match schema: {}.", node_json(alternative)));
            }
        }
        _ => {}
    }
    Ok(())
}

pub(super) fn cast<'s>(
    combinator: Combinator,
    node: &'s CombinationNode,
    value: &Value,
    scope: &Scope<'s>,
) -> SchemaResult<Value> {
    match combinator {
        Combinator::AllOf => {
            let mut output = value.clone();
            for alternative in &node.alternatives {
                if matches(alternative, value, scope)? {
                    output = cast_node(alternative, &output, scope)?;
                }
            }
            Ok(output)
        }
        Combinator::AnyOf | Combinator::OneOf => {
            for alternative in &node.alternatives {
                if matches(alternative, value, scope)? {
                    return cast_node(alternative, value, scope);
                }
            }
            Ok(value.clone())
        }
        Combinator::Not => Ok(value.clone()),
    }
}

/// Headline followed by one indented report per failed alternative
fn aggregate(headline: String, failures: &[(usize, ValidationErrors)]) -> String {
    let mut message = headline;
    for (index, failure) in failures {
        message.push_str(&format!(
            "\n  - Condition {}:\n{}",
            index + 1,
            failure.render_nested(4)
        ));
    }
    message
}
