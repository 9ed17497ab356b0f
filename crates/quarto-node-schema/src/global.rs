//! Process-wide schema registry backed by schema files
//!
//! A [`GlobalContext`] maps schema names to files under its search roots:
//! the name `shapes/circle` is looked up as `<root>/shapes/circle.<ext>` for
//! every root and extension. Files hold the declarative form of a schema
//! (see [`from_value`](crate::schema::from_value)) as JSON or YAML.
//!
//! The registry moves through three phases:
//!
//! - [`LoadPhase::Empty`]: nothing loaded yet
//! - [`LoadPhase::PartiallyLoaded`]: schemas are loaded on first use and
//!   reloaded when their file's modification time changes
//! - [`LoadPhase::EagerLoaded`]: every schema was loaded up front by
//!   [`GlobalContext::eager_load`]; the cache is frozen and the filesystem is
//!   no longer consulted
//!
//! There is no ambient instance. Callers create one and pass it through a
//! [`Resolver`](crate::Resolver).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{Node, from_value};

/// Settings for a [`GlobalContext`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalContextConfig {
    /// Directories searched for schema files, in order
    pub search_roots: Vec<PathBuf>,
    /// File extensions tried for each name, without the dot
    pub extensions: Vec<String>,
    /// Load every schema when the context is created
    pub eager_load: bool,
}

impl Default for GlobalContextConfig {
    fn default() -> Self {
        Self {
            search_roots: Vec::new(),
            extensions: vec!["json".to_string(), "yaml".to_string(), "yml".to_string()],
            eager_load: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Empty,
    PartiallyLoaded,
    EagerLoaded,
}

#[derive(Debug)]
struct Loaded {
    node: Arc<Node>,
    path: PathBuf,
    modified: Option<SystemTime>,
}

#[derive(Debug)]
struct State {
    schemas: HashMap<String, Loaded>,
    phase: LoadPhase,
}

/// File-backed schema registry shared across validation calls
#[derive(Debug)]
pub struct GlobalContext {
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
    state: Mutex<State>,
}

impl GlobalContext {
    /// Registry over `roots` with the default extensions
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::with_extensions(roots, GlobalContextConfig::default().extensions)
    }

    pub fn with_extensions<I, P>(roots: I, extensions: Vec<String>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            extensions,
            state: Mutex::new(State {
                schemas: HashMap::new(),
                phase: LoadPhase::Empty,
            }),
        }
    }

    /// Build a registry from `config`, eager loading if it asks to
    pub fn from_config(config: &GlobalContextConfig) -> SchemaResult<Self> {
        let context =
            Self::with_extensions(config.search_roots.iter().cloned(), config.extensions.clone());
        if config.eager_load {
            context.eager_load()?;
        }
        Ok(context)
    }

    pub fn phase(&self) -> LoadPhase {
        self.lock().phase
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Names of the schemas currently cached, sorted
    pub fn schema_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().schemas.keys().cloned().collect();
        names.sort();
        names
    }

    /// The schema registered as `name`, loading it if needed.
    ///
    /// Returns `Ok(None)` if no file provides `name`. Two files providing
    /// it is a [`SchemaError::Collision`].
    pub fn schema_for(&self, name: &str) -> SchemaResult<Option<Arc<Node>>> {
        let mut state = self.lock();
        if state.phase == LoadPhase::EagerLoaded {
            return Ok(state.schemas.get(name).map(|loaded| loaded.node.clone()));
        }
        if !is_loadable_name(name) {
            debug!(name, "schema name is not a relative path");
            return Ok(None);
        }

        let mut candidates = self.candidates(name);
        let path = match candidates.len() {
            0 => {
                state.schemas.remove(name);
                return Ok(None);
            }
            1 => candidates.remove(0),
            _ => {
                warn!(name, ?candidates, "schema defined more than once");
                return Err(SchemaError::Collision {
                    name: name.to_string(),
                    paths: candidates,
                });
            }
        };

        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
        if let Some(loaded) = state.schemas.get(name)
            && loaded.path == path
            && loaded.modified == modified
        {
            return Ok(Some(loaded.node.clone()));
        }

        let node = Arc::new(load_file(&path)?);
        let previous = state.schemas.insert(
            name.to_string(),
            Loaded {
                node: node.clone(),
                path: path.clone(),
                modified,
            },
        );
        if previous.is_some() {
            info!(name, ?path, "reloaded schema");
        } else {
            debug!(name, ?path, "loaded schema");
        }
        state.phase = LoadPhase::PartiallyLoaded;
        Ok(Some(node))
    }

    /// Drop the cached `name` and read it again from disk
    pub fn reload(&self, name: &str) -> SchemaResult<Option<Arc<Node>>> {
        {
            let mut state = self.lock();
            if state.phase == LoadPhase::EagerLoaded {
                return Err(SchemaError::AlreadyEagerLoaded);
            }
            state.schemas.remove(name);
        }
        self.schema_for(name)
    }

    /// Load every schema file under the search roots and freeze the cache.
    ///
    /// Fails on the first name provided by more than one file, and when
    /// called a second time.
    pub fn eager_load(&self) -> SchemaResult<()> {
        let mut state = self.lock();
        if state.phase == LoadPhase::EagerLoaded {
            return Err(SchemaError::AlreadyEagerLoaded);
        }

        let mut found: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for root in &self.roots {
            let walker = WalkDir::new(root).follow_links(false).into_iter();
            for entry in walker.filter_map(|e| e.ok()) {
                let path = entry.path();
                if !path.is_file() || !self.has_schema_extension(path) {
                    continue;
                }
                let Ok(relative) = path.strip_prefix(root) else {
                    continue;
                };
                match schema_name(relative) {
                    Some(name) => found.entry(name).or_default().push(path.to_path_buf()),
                    None => warn!(?path, "skipping schema file with a non UTF-8 name"),
                }
            }
        }

        let mut schemas = HashMap::with_capacity(found.len());
        for (name, mut paths) in found {
            if paths.len() > 1 {
                warn!(name, ?paths, "schema defined more than once");
                return Err(SchemaError::Collision { name, paths });
            }
            let path = paths.remove(0);
            let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
            let node = Arc::new(load_file(&path)?);
            schemas.insert(
                name,
                Loaded {
                    node,
                    path,
                    modified,
                },
            );
        }

        info!(count = schemas.len(), "eager loaded schemas");
        state.schemas = schemas;
        state.phase = LoadPhase::EagerLoaded;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for root in &self.roots {
            for extension in &self.extensions {
                let path = root.join(format!("{}.{}", name, extension));
                if path.is_file() {
                    paths.push(path);
                }
            }
        }
        paths
    }

    fn has_schema_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

/// Only plain relative names map onto files
fn is_loadable_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

/// `shapes/circle.yaml` -> `shapes/circle`
fn schema_name(relative: &Path) -> Option<String> {
    let stem = relative.with_extension("");
    let parts = stem
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

fn load_file(path: &Path) -> SchemaResult<Node> {
    let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |message: String| SchemaError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let value: Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&text).map_err(|e| parse_error(e.to_string()))?,
        _ => serde_yaml::from_str(&text).map_err(|e| parse_error(e.to_string()))?,
    };
    from_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Resolver;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    fn set_modified(path: &Path, secs: u64) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn test_lazy_load_json_and_yaml() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "name.json", r#"{"type": "string", "min_length": 1}"#);
        write(temp.path(), "shapes/circle.yaml", "type: hash\nproperties:\n  radius: num\n");

        let global = GlobalContext::new([temp.path()]);
        assert_eq!(global.phase(), LoadPhase::Empty);

        let name = global.schema_for("name").unwrap().unwrap();
        assert_eq!(name.type_name(), "string");
        assert_eq!(global.phase(), LoadPhase::PartiallyLoaded);

        let circle = global.schema_for("shapes/circle").unwrap().unwrap();
        assert_eq!(circle.type_name(), "hash");

        assert!(global.schema_for("missing").unwrap().is_none());
        assert_eq!(global.schema_names(), vec!["name", "shapes/circle"]);
    }

    #[test]
    fn test_cached_schema_is_shared() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "name.json", r#""string""#);

        let global = GlobalContext::new([temp.path()]);
        let first = global.schema_for("name").unwrap().unwrap();
        let second = global.schema_for("name").unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_reload_on_modification() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "value.json", r#""string""#);
        set_modified(&path, 1_000);

        let global = GlobalContext::new([temp.path()]);
        assert_eq!(global.schema_for("value").unwrap().unwrap().type_name(), "string");

        fs::write(&path, r#""integer""#).unwrap();
        set_modified(&path, 2_000);
        assert_eq!(global.schema_for("value").unwrap().unwrap().type_name(), "integer");
    }

    #[test]
    fn test_explicit_reload() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "value.json", r#""string""#);
        set_modified(&path, 1_000);

        let global = GlobalContext::new([temp.path()]);
        global.schema_for("value").unwrap();

        fs::write(&path, r#""boolean""#).unwrap();
        set_modified(&path, 1_000);
        assert_eq!(global.schema_for("value").unwrap().unwrap().type_name(), "string");
        assert_eq!(global.reload("value").unwrap().unwrap().type_name(), "boolean");
    }

    #[test]
    fn test_collision_across_roots() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write(first.path(), "name.json", r#""string""#);
        write(second.path(), "name.yml", "string");

        let global = GlobalContext::new([first.path(), second.path()]);
        let error = global.schema_for("name").unwrap_err();
        assert!(
            matches!(error, SchemaError::Collision { ref name, ref paths } if name == "name" && paths.len() == 2)
        );
        assert!(matches!(global.eager_load(), Err(SchemaError::Collision { .. })));
    }

    #[test]
    fn test_eager_load_freezes_cache() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.json", r#""string""#);
        write(temp.path(), "nested/b.yaml", "type: integer\nminimum: 0\n");
        write(temp.path(), "notes.txt", "not a schema");

        let global = GlobalContext::new([temp.path()]);
        global.eager_load().unwrap();
        assert_eq!(global.phase(), LoadPhase::EagerLoaded);
        assert_eq!(global.schema_names(), vec!["a", "nested/b"]);

        write(temp.path(), "late.json", r#""string""#);
        assert!(global.schema_for("late").unwrap().is_none());

        assert!(matches!(global.eager_load(), Err(SchemaError::AlreadyEagerLoaded)));
        assert!(matches!(global.reload("a"), Err(SchemaError::AlreadyEagerLoaded)));
    }

    #[test]
    fn test_parent_directory_names_are_not_loaded() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "outside.json", r#""string""#);
        let root = temp.path().join("root");
        fs::create_dir(&root).unwrap();

        let global = GlobalContext::new([&root]);
        assert!(global.schema_for("../outside").unwrap().is_none());
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "broken.json", "{ not json");

        let global = GlobalContext::new([temp.path()]);
        assert!(matches!(global.schema_for("broken"), Err(SchemaError::Parse { .. })));
    }

    #[test]
    fn test_from_config() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "flag.yml", "boolean");

        let config: GlobalContextConfig = serde_json::from_value(json!({
            "search_roots": [temp.path()],
            "eager_load": true,
        }))
        .unwrap();
        assert_eq!(config.extensions, vec!["json", "yaml", "yml"]);

        let global = GlobalContext::from_config(&config).unwrap();
        assert_eq!(global.phase(), LoadPhase::EagerLoaded);
        assert_eq!(global.schema_names(), vec!["flag"]);
    }

    #[test]
    fn test_resolves_references_through_resolver() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "person.yaml", "type: hash\nproperties:\n  name:\n    type: string\n    required: true\n");

        let global = GlobalContext::new([temp.path()]);
        let schema = Node::reference("person").unwrap();
        let resolver = Resolver::new().with_global(&global);

        let input = json!({});
        let result = schema.validate_with(&input, resolver).unwrap();
        assert_eq!(
            result.errors().messages_at("/name"),
            &["Value must be given.".to_string()]
        );
    }
}
