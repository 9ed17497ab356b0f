//! Reference node parser
//!
//! ```yaml
//! type: ref
//! path: person
//! ```
//!
//! The target is looked up by name at validation time, first in the local
//! definitions of enclosing nodes, then in the call-scoped and global
//! registries.

use crate::error::{SchemaError, SchemaResult};
use crate::schema::helpers::{Options, get_string};
use crate::schema::{NodeKind, ReferenceNode};

pub(in crate::schema) const REFERENCE_OPTIONS: &[&str] = &["path"];

pub(in crate::schema) fn parse_reference(options: &Options) -> SchemaResult<NodeKind> {
    let target = get_string(options, "path")?
        .ok_or_else(|| SchemaError::option("path", "reference name must be given"))?;
    Ok(NodeKind::Reference(ReferenceNode::new(target)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::from_value;
    use serde_json::json;

    #[test]
    fn test_reference() {
        let node = from_value(&json!({"type": "ref", "path": "person"})).unwrap();
        let NodeKind::Reference(reference) = node.kind() else {
            panic!("Expected reference node");
        };
        assert_eq!(reference.target(), "person");
    }

    #[test]
    fn test_missing_path() {
        assert!(from_value(&json!({"type": "reference"})).is_err());
        assert!(from_value(&json!({"type": "reference", "path": ""})).is_err());
    }
}
