// Per-call validation state: path-scoped errors and lazily cast output

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use serde_json::Value;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::context::Resolver;
use crate::error::{ErrorReport, InstancePath, PathSegment, SchemaResult};
use crate::schema::Node;

/// Accumulates errors for one validation pass.
///
/// Errors are recorded at the current path; [`in_path`](Self::in_path)
/// scopes a segment for the duration of a closure.
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    current: InstancePath,
    errors: IndexMap<InstancePath, Vec<String>>,
}

/// Pops the pushed segment on every exit from `in_path`, unwinding included
struct PathGuard<'e> {
    errors: &'e mut ValidationErrors,
}

impl Deref for PathGuard<'_> {
    type Target = ValidationErrors;

    fn deref(&self) -> &ValidationErrors {
        self.errors
    }
}

impl DerefMut for PathGuard<'_> {
    fn deref_mut(&mut self) -> &mut ValidationErrors {
        self.errors
    }
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.errors.current.pop();
    }
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` at the current path
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors
            .entry(self.current.clone())
            .or_default()
            .push(message.into());
    }

    /// Run `f` with `segment` appended to the current path
    pub fn in_path<R>(
        &mut self,
        segment: impl Into<PathSegment>,
        f: impl FnOnce(&mut ValidationErrors) -> R,
    ) -> R {
        self.current.push(segment.into());
        let mut guard = PathGuard { errors: self };
        f(&mut guard)
    }

    pub fn current_path(&self) -> &InstancePath {
        &self.current
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of recorded messages
    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn by_path(&self) -> &IndexMap<InstancePath, Vec<String>> {
        &self.errors
    }

    /// Messages keyed by rendered path (`/a/[0]`)
    pub fn messages_by_path(&self) -> IndexMap<String, Vec<String>> {
        self.errors
            .iter()
            .map(|(path, messages)| (path.to_string(), messages.clone()))
            .collect()
    }

    /// Messages recorded at exactly `path`
    pub fn messages_at(&self, path: &str) -> &[String] {
        self.errors
            .iter()
            .find(|(p, _)| p.to_string() == path)
            .map_or(&[][..], |(_, messages)| messages.as_slice())
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::new(
            self.errors
                .iter()
                .flat_map(|(path, messages)| {
                    messages.iter().map(move |m| (path.clone(), m.clone()))
                })
                .collect(),
        )
    }

    /// Flat `path: message` lines
    pub fn render(&self) -> String {
        self.report().to_string()
    }

    /// Flat lines indented by `indent` spaces, continuation lines included
    pub fn render_nested(&self, indent: usize) -> String {
        let pad = " ".repeat(indent);
        self.render()
            .lines()
            .map(|line| format!("{}{}", pad, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Outcome of [`Node::validate`].
///
/// Holds the errors of the pass and, when there are none, computes the cast
/// output of the original input on first access.
pub struct ValidationResult<'a> {
    root: &'a Node,
    input: &'a Value,
    resolver: Resolver<'a>,
    errors: ValidationErrors,
    data: OnceCell<Value>,
}

impl<'a> ValidationResult<'a> {
    pub(crate) fn new(
        root: &'a Node,
        input: &'a Value,
        resolver: Resolver<'a>,
        errors: ValidationErrors,
    ) -> Self {
        Self {
            root,
            input,
            resolver,
            errors,
            data: OnceCell::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn messages_by_path(&self) -> IndexMap<String, Vec<String>> {
        self.errors.messages_by_path()
    }

    pub fn report(&self) -> ErrorReport {
        self.errors.report()
    }

    /// Cast output, or `None` if the input is invalid.
    ///
    /// Computed at most once per result.
    pub fn data(&self) -> SchemaResult<Option<&Value>> {
        if !self.is_valid() {
            return Ok(None);
        }
        self.data
            .get_or_try_init(|| self.root.cast_with(self.input, self.resolver))
            .map(Some)
    }

    pub fn into_data(self) -> SchemaResult<Option<Value>> {
        self.data()?;
        Ok(self.data.into_inner())
    }
}

impl fmt::Debug for ValidationResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationResult")
            .field("root", &self.root.type_name())
            .field("errors", &self.errors.messages_by_path())
            .field("data", &self.data.get())
            .finish()
    }
}

impl fmt::Display for ValidationResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.errors)
    }
}
