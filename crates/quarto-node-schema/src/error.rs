// Error types for schema construction and validation

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors in a schema definition.
///
/// These are programmer mistakes: malformed options, impossible constraints,
/// references that cannot be resolved. They are returned as `Err` and are
/// never recorded in a [`ValidationResult`](crate::ValidationResult).
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Node type tag missing from a declaration
    #[error("Node type must be given")]
    MissingType,

    /// Node type tag not present in the type registry
    #[error("Unknown node type {0:?}")]
    UnknownType(String),

    /// Declaration carries options the node type does not accept
    #[error("Options {options:?} are not allowed for node type {node_type:?}")]
    DisallowedOptions {
        node_type: String,
        options: Vec<String>,
    },

    /// Option present but with an unusable value
    #[error("Invalid option {option:?}: {message}")]
    InvalidOption { option: String, message: String },

    /// Node configuration that can never be satisfied
    #[error("Invalid schema: {0}")]
    InvalidStructure(String),

    /// Regular expression that does not compile
    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Reference name not found in any visible registry
    #[error("Schema {0:?} not found")]
    UnresolvedReference(String),

    /// Same schema name defined by more than one file
    #[error("Schema {name:?} is defined more than once: {paths:?}")]
    Collision { name: String, paths: Vec<PathBuf> },

    /// `eager_load` called on an already frozen global context
    #[error("Global context has already been eager loaded")]
    AlreadyEagerLoaded,

    /// Schema file could not be read
    #[error("Could not read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema file is not valid JSON or YAML
    #[error("Could not parse schema file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl SchemaError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SchemaError::InvalidStructure(message.into())
    }

    pub(crate) fn option(option: &str, message: impl Into<String>) -> Self {
        SchemaError::InvalidOption {
            option: option.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for schema construction and resolution
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Error returned by [`Node::validate_strict`](crate::Node::validate_strict).
///
/// This is the only place where data errors surface as an `Err`.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Input does not satisfy the schema
    #[error("{0}")]
    Invalid(ErrorReport),

    /// Schema itself is broken (e.g. a dangling reference)
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ValidationError {
    /// The data report, if this is a data error
    pub fn report(&self) -> Option<&ErrorReport> {
        match self {
            ValidationError::Invalid(report) => Some(report),
            ValidationError::Schema(_) => None,
        }
    }
}

/// Owned, ordered list of `(path, message)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    entries: Vec<(InstancePath, String)>,
}

impl ErrorReport {
    pub(crate) fn new(entries: Vec<(InstancePath, String)>) -> Self {
        Self { entries }
    }

    /// Entries in report order
    pub fn entries(&self) -> &[(InstancePath, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Render one `path: message` line per entry
    pub fn to_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(path, message)| format!("{}: {}", path, message))
            .collect()
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_lines().join("\n"))
    }
}

/// Instance path (e.g. `/users/[0]/name`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    /// Create a new empty instance path
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Push a key segment onto the path
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    /// Push an index segment onto the path
    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Pop the last segment from the path
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Get the segments as a slice
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Check if the path is empty
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the length of the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl From<Vec<PathSegment>> for InstancePath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }
}

/// A segment in an instance path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// Array index
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}
