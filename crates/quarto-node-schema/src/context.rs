//! Named schema lookup
//!
//! A reference name is resolved against three layers, nearest first:
//!
//! 1. the `definitions` declared on the reference's ancestors,
//! 2. the call-scoped [`Context`] handed to `validate_with` / `cast_with`,
//! 3. the process-wide [`GlobalContext`].
//!
//! The first layer is tracked during traversal by [`Scope`], a stack of the
//! definition maps entered so far. The other two are bundled in a
//! [`Resolver`], which is cheap to copy and is threaded through every call.

use indexmap::{IndexMap, IndexSet};
use std::ops::Deref;
use std::sync::Arc;

use crate::error::{SchemaError, SchemaResult};
use crate::global::GlobalContext;
use crate::schema::{Definitions, Node, NodeKind};

/// Call-scoped schema registry.
///
/// Built once, then only read.
#[derive(Debug, Clone, Default)]
pub struct Context {
    schemas: IndexMap<String, Node>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` under `name`, replacing an earlier registration
    pub fn with_schema(mut self, name: impl Into<String>, node: Node) -> Self {
        self.schemas.insert(name.into(), node);
        self
    }

    pub fn schema(&self, name: &str) -> Option<&Node> {
        self.schemas.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// The registries consulted after local definitions
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver<'a> {
    context: Option<&'a Context>,
    global: Option<&'a GlobalContext>,
}

impl<'a> Resolver<'a> {
    /// A resolver that only sees local definitions
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, context: &'a Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_global(mut self, global: &'a GlobalContext) -> Self {
        self.global = Some(global);
        self
    }

    pub fn context(&self) -> Option<&'a Context> {
        self.context
    }

    pub fn global(&self) -> Option<&'a GlobalContext> {
        self.global
    }

    /// Look `name` up in the call-scoped context, then the global one
    pub(crate) fn external(&self, name: &str) -> SchemaResult<Option<External<'a>>> {
        if let Some(node) = self.context.and_then(|context| context.schema(name)) {
            return Ok(Some(External::Borrowed(node)));
        }
        match self.global {
            Some(global) => Ok(global.schema_for(name)?.map(External::Shared)),
            None => Ok(None),
        }
    }
}

/// A schema found outside the local definitions
pub(crate) enum External<'a> {
    Borrowed(&'a Node),
    Shared(Arc<Node>),
}

impl Deref for External<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        match self {
            External::Borrowed(node) => node,
            External::Shared(node) => node,
        }
    }
}

/// Where a reference name resolved to
pub(crate) enum Target<'a> {
    /// Found in `definitions[depth - 1]` of the current scope
    Local { node: &'a Node, depth: usize },
    External(External<'a>),
}

/// Traversal-time view of the visible definitions
#[derive(Clone)]
pub(crate) struct Scope<'a> {
    resolver: Resolver<'a>,
    definitions: Vec<&'a Definitions>,
}

impl<'a> Scope<'a> {
    pub(crate) fn root(resolver: Resolver<'a>) -> Self {
        Self {
            resolver,
            definitions: Vec::new(),
        }
    }

    /// The scope below `node`, if `node` declares definitions
    pub(crate) fn enter(&self, node: &'a Node) -> Option<Scope<'a>> {
        if node.options.definitions.is_empty() {
            return None;
        }
        let mut scope = self.clone();
        scope.definitions.push(&node.options.definitions);
        Some(scope)
    }

    pub(crate) fn resolve(&self, name: &str) -> SchemaResult<Target<'a>> {
        for (index, definitions) in self.definitions.iter().enumerate().rev() {
            if let Some(node) = definitions.get(name) {
                return Ok(Target::Local {
                    node,
                    depth: index + 1,
                });
            }
        }
        match self.resolver.external(name)? {
            Some(external) => Ok(Target::External(external)),
            None => {
                tracing::debug!(name, "unresolved schema reference");
                Err(SchemaError::UnresolvedReference(name.to_string()))
            }
        }
    }

    /// Resolve `name` and run `f` on the target within the target's own scope.
    ///
    /// A local target sees the definitions visible where it was declared;
    /// an external target starts from an empty definitions stack.
    pub(crate) fn with_target<R>(
        &self,
        name: &str,
        f: impl for<'b> FnOnce(&'b Node, &Scope<'b>) -> SchemaResult<R>,
    ) -> SchemaResult<R> {
        match self.resolve(name)? {
            Target::Local { node, depth } => {
                let scope = Scope {
                    resolver: self.resolver,
                    definitions: self.definitions[..depth].to_vec(),
                };
                f(node, &scope)
            }
            Target::External(external) => {
                let scope = Scope::root(self.resolver);
                f(&*external, &scope)
            }
        }
    }
}

impl Node {
    /// Names this schema needs from the call-scoped or global registries.
    ///
    /// Walks the tree and every externally resolved target transitively,
    /// skipping names satisfied by local definitions. Each name is visited
    /// once, so recursive schemas terminate. A name that no registry
    /// provides is an error.
    pub fn external_schema_names(&self, resolver: Resolver<'_>) -> SchemaResult<IndexSet<String>> {
        let mut names = IndexSet::new();
        collect_external(self, &mut Vec::new(), &mut names);

        let mut index = 0;
        while let Some(name) = names.get_index(index).cloned() {
            let target = resolver
                .external(&name)?
                .ok_or_else(|| SchemaError::UnresolvedReference(name.clone()))?;
            collect_external(&target, &mut Vec::new(), &mut names);
            index += 1;
        }
        Ok(names)
    }
}

fn collect_external<'a>(
    node: &'a Node,
    stack: &mut Vec<&'a Definitions>,
    names: &mut IndexSet<String>,
) {
    let pushed = !node.options.definitions.is_empty();
    if pushed {
        stack.push(&node.options.definitions);
    }

    let referenced: Vec<&str> = match &node.kind {
        NodeKind::Reference(reference) => vec![reference.target()],
        NodeKind::Hash(hash) => hash.includes.iter().map(String::as_str).collect(),
        _ => Vec::new(),
    };
    for name in referenced {
        if !stack.iter().any(|definitions| definitions.contains_key(name)) {
            names.insert(name.to_string());
        }
    }

    for definition in node.options.definitions.values() {
        collect_external(definition, stack, names);
    }
    for child in node.children() {
        collect_external(child, stack, names);
    }

    if pushed {
        stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HashNode, StringNode};
    use serde_json::json;

    fn string() -> Node {
        Node::string(StringNode::new()).unwrap()
    }

    #[test]
    fn test_local_definition_shadows_context() {
        let context = Context::new().with_schema("name", Node::integer(Default::default()).unwrap());
        let schema = Node::reference("name").unwrap().with_definition("name", string());

        let resolver = Resolver::new().with_context(&context);
        let input = json!("bob");
        let result = schema.validate_with(&input, resolver).unwrap();
        assert!(result.is_valid());
    }

    #[test]
    fn test_context_used_when_no_local_definition() {
        let context = Context::new().with_schema("name", string());
        let schema = Node::reference("name").unwrap();

        let input = json!(1);
        let result = schema
            .validate_with(&input, Resolver::new().with_context(&context))
            .unwrap();
        assert_eq!(
            result.errors().messages_at("/"),
            &["Invalid type, expected string.".to_string()]
        );
    }

    #[test]
    fn test_unresolved_reference_is_schema_error() {
        let schema = Node::reference("missing").unwrap();
        let error = schema.validate(&json!("x")).unwrap_err();
        assert!(matches!(error, SchemaError::UnresolvedReference(name) if name == "missing"));
    }

    #[test]
    fn test_local_target_does_not_see_inner_definitions() {
        // `outer` is declared at the root, so the `inner` definition on the
        // hash is not visible from its body.
        let schema = Node::hash(
            HashNode::new().property("value", Node::reference("outer").unwrap()),
        )
        .unwrap()
        .with_definition("inner", string())
        .with_definition("outer", Node::reference("inner").unwrap());

        assert!(schema.validate(&json!({"value": "x"})).unwrap().is_valid());

        let nested = Node::hash(
            HashNode::new().property(
                "value",
                Node::reference("outer")
                    .unwrap()
                    .with_definition("inner", string()),
            ),
        )
        .unwrap()
        .with_definition("outer", Node::reference("inner").unwrap());

        let error = nested.validate(&json!({"value": "x"})).unwrap_err();
        assert!(matches!(error, SchemaError::UnresolvedReference(_)));
    }

    #[test]
    fn test_external_schema_names() {
        let context = Context::new()
            .with_schema("person", {
                Node::hash(
                    HashNode::new()
                        .property("name", Node::reference("name").unwrap())
                        .property("friends", Node::reference("people").unwrap()),
                )
                .unwrap()
            })
            .with_schema("people", Node::reference("person").unwrap())
            .with_schema("name", string());

        let schema = Node::hash(
            HashNode::new()
                .property("owner", Node::reference("person").unwrap())
                .property("local", Node::reference("here").unwrap()),
        )
        .unwrap()
        .with_definition("here", string());

        let names = schema
            .external_schema_names(Resolver::new().with_context(&context))
            .unwrap();
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["person", "name", "people"]
        );
    }

    #[test]
    fn test_external_schema_names_reports_missing() {
        let schema = Node::hash(HashNode::new().include("base")).unwrap();
        let error = schema.external_schema_names(Resolver::new()).unwrap_err();
        assert!(matches!(error, SchemaError::UnresolvedReference(name) if name == "base"));
    }
}
