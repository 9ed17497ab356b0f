//! Schema files resolved through a GlobalContext

use std::fs;
use std::path::Path;

use quarto_node_schema::{
    GlobalContext, GlobalContextConfig, LoadPhase, Resolver, SchemaError, from_value,
};
use serde_json::json;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn shapes_root() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "shapes/circle.yaml",
        r#"
type: hash
properties:
  center:
    type: ref
    path: point
    required: true
  radius:
    type: number
    exclusive_minimum: 0
    required: true
"#,
    );
    write(
        dir.path(),
        "point.json",
        r#"{"type": "array", "items": ["number", "number"]}"#,
    );
    dir
}

#[test]
fn test_references_load_yaml_and_json_files() {
    let dir = shapes_root();
    let global = GlobalContext::new([dir.path()]);
    let schema = from_value(&json!({
        "type": "array",
        "items": {"type": "ref", "path": "shapes/circle"}
    }))
    .unwrap();
    let resolver = Resolver::new().with_global(&global);

    let valid = json!([{"center": [0, 0], "radius": 1.5}]);
    assert!(schema.validate_with(&valid, resolver).unwrap().is_valid());
    assert_eq!(global.phase(), LoadPhase::PartiallyLoaded);
    assert_eq!(
        global.schema_names(),
        vec!["point".to_string(), "shapes/circle".to_string()]
    );

    let invalid = json!([{"center": [0], "radius": 0}]);
    let result = schema.validate_with(&invalid, resolver).unwrap();
    assert_eq!(
        result.report().to_lines(),
        vec![
            "/[0]/center: Array has 1 items but must have exactly 2.".to_string(),
            "/[0]/radius: Value must have an exclusive minimum of 0.".to_string(),
        ]
    );
}

#[test]
fn test_external_schema_names_and_export() {
    let dir = shapes_root();
    let global = GlobalContext::new([dir.path()]);
    let resolver = Resolver::new().with_global(&global);
    let schema = from_value(&json!({"type": "ref", "path": "shapes/circle"})).unwrap();

    let names: Vec<String> = schema
        .external_schema_names(resolver)
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(names, vec!["shapes/circle".to_string(), "point".to_string()]);

    let exported = schema.as_json_schema(resolver).unwrap();
    assert_eq!(exported["$ref"], json!("#/definitions/shapes~1circle"));
    assert_eq!(
        exported.pointer("/definitions/shapes~1circle/type"),
        Some(&json!("object"))
    );
    assert_eq!(exported["definitions"]["point"]["type"], json!("array"));
}

#[test]
fn test_eager_load_from_config() {
    let dir = shapes_root();
    let config: GlobalContextConfig = serde_json::from_value(json!({
        "search_roots": [dir.path()],
        "eager_load": true
    }))
    .unwrap();

    let global = GlobalContext::from_config(&config).unwrap();
    assert_eq!(global.phase(), LoadPhase::EagerLoaded);
    assert_eq!(
        global.schema_names(),
        vec!["point".to_string(), "shapes/circle".to_string()]
    );

    write(dir.path(), "late.yaml", "type: string\n");
    assert!(global.schema_for("late").unwrap().is_none());
    assert!(matches!(global.eager_load(), Err(SchemaError::AlreadyEagerLoaded)));
}

#[test]
fn test_missing_file_is_unresolved() {
    let dir = shapes_root();
    let global = GlobalContext::new([dir.path()]);
    let schema = from_value(&json!({"type": "ref", "path": "square"})).unwrap();

    let error = schema
        .validate_with(&json!({}), Resolver::new().with_global(&global))
        .unwrap_err();
    assert!(matches!(error, SchemaError::UnresolvedReference(ref name) if name == "square"));
}
