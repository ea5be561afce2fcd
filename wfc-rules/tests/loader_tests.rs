// wfc-rules/tests/loader_tests.rs

use std::io::Write;
use tempfile::{Builder, NamedTempFile};
use wfc_rules::loader::load_from_file;
use wfc_rules::{Direction, LoadError, Topology};

const SIMPLE_RON: &str = r#"(
    topology: Square3d,
    tiles: [
        (name: "ground", weight: 4, asset: Some("ground.prefab")),
        (name: "air"),
        (name: "unused", enabled: false),
    ],
    connections: [
        ("ground", "ground", [right, left, up, down]),
        ("air", "air", [right, left, up, down, above, below]),
        ("ground", "air", [above]),
    ],
)"#;

// Helper writing `content` to a temp file with the given suffix.
fn write_temp(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

#[test]
fn test_load_valid_ron() {
    let file = write_temp(SIMPLE_RON, ".ron");
    let catalog = load_from_file(file.path()).expect("catalog should load");

    assert_eq!(catalog.topology(), Topology::Square3d);
    assert_eq!(catalog.len(), 3);
    let ground = catalog.tile_id("ground").unwrap();
    let air = catalog.tile_id("air").unwrap();

    assert_eq!(catalog.tile(ground).unwrap().weight, 4);
    assert!(catalog.allows(ground, air, Direction::Above));
    assert!(catalog.allows(air, ground, Direction::Below));
    assert!(!catalog.allows(air, ground, Direction::Above));
    assert!(catalog.allows(air, air, Direction::Below));

    assert_eq!(catalog.enabled_and_valid_tiles(), vec![ground, air]);
}

#[test]
fn test_load_valid_json() {
    let content = r#"{
        "topology": "Square2d",
        "tiles": [{ "name": "a" }, { "name": "b", "weight": 2 }],
        "connections": [["a", "b", ["right"]]]
    }"#;
    let file = write_temp(content, ".json");
    let catalog = load_from_file(file.path()).expect("catalog should load");

    let a = catalog.tile_id("a").unwrap();
    let b = catalog.tile_id("b").unwrap();
    assert!(catalog.allows(a, b, Direction::Right));
    assert!(catalog.allows(b, a, Direction::Left));
}

#[test]
fn test_load_unsupported_extension() {
    let file = write_temp(SIMPLE_RON, ".yaml");
    assert!(matches!(
        load_from_file(file.path()),
        Err(LoadError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.ron");
    assert!(matches!(load_from_file(&path), Err(LoadError::Io(_))));
}

#[test]
fn test_load_duplicate_names() {
    let content = r#"(topology: Square2d, tiles: [(name: "a"), (name: "a")])"#;
    let file = write_temp(content, ".ron");
    assert!(matches!(
        load_from_file(file.path()),
        Err(LoadError::InvalidData(message)) if message.contains("Duplicate")
    ));
}

#[test]
fn test_load_zero_weight() {
    let content = r#"(topology: Square2d, tiles: [(name: "a", weight: 0)])"#;
    let file = write_temp(content, ".ron");
    assert!(matches!(
        load_from_file(file.path()),
        Err(LoadError::InvalidData(_))
    ));
}

#[test]
fn test_load_malformed() {
    let file = write_temp("{ not valid", ".json");
    assert!(matches!(
        load_from_file(file.path()),
        Err(LoadError::ParseError(_))
    ));
}
