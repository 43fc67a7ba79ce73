//! Voice registry behavior against a real document on disk

mod common;

use std::path::PathBuf;

use common::Fixture;
use voice_bridge::{Voice, VoiceRegistry};

#[test]
fn test_add_then_get() {
    let fx = Fixture::new();
    let mut registry = fx.registry();
    registry.add_or_update("narrator", "models/narrator", "Narrator").unwrap();

    assert_eq!(
        registry.get("narrator"),
        Some(&Voice::new("models/narrator", "Narrator"))
    );
}

#[test]
fn test_reload_yields_same_mapping() {
    let fx = Fixture::new();
    let mut registry = fx.registry();
    registry.add_or_update("a", "models/a", "Voice A").unwrap();
    registry.add_or_update("b", "models/b", "Voice B").unwrap();

    let reloaded = VoiceRegistry::open(fx.registry_path()).unwrap();
    assert_eq!(reloaded.list(), registry.list());
}

#[test]
fn test_add_is_idempotent() {
    let fx = Fixture::new();
    let mut registry = fx.registry();
    registry.add_or_update("a", "models/a", "Voice A").unwrap();
    let before = registry.list().clone();
    let document = std::fs::read_to_string(fx.registry_path()).unwrap();

    registry.add_or_update("a", "models/a", "Voice A").unwrap();

    assert_eq!(registry.list(), &before);
    assert_eq!(registry.len(), 1);
    assert_eq!(std::fs::read_to_string(fx.registry_path()).unwrap(), document);
}

#[test]
fn test_update_overwrites() {
    let fx = Fixture::new();
    let mut registry = fx.registry();
    registry.add_or_update("a", "models/a", "Voice A").unwrap();
    registry.add_or_update("a", "models/a2", "Voice A v2").unwrap();

    let voice = registry.get("a").unwrap();
    assert_eq!(voice.model_dir, PathBuf::from("models/a2"));
    assert_eq!(voice.display_name, "Voice A v2");
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_remove_existing() {
    let fx = Fixture::new();
    let mut registry = fx.registry();
    registry.add_or_update("a", "models/a", "Voice A").unwrap();

    assert!(registry.remove("a").unwrap());
    assert!(registry.get("a").is_none());
    assert!(VoiceRegistry::open(fx.registry_path()).unwrap().is_empty());
}

#[test]
fn test_remove_missing_leaves_document() {
    let fx = Fixture::new();
    let mut registry = fx.registry();
    registry.add_or_update("a", "models/a", "Voice A").unwrap();
    let document = std::fs::read(fx.registry_path()).unwrap();

    assert!(!registry.remove("ghost").unwrap());
    assert_eq!(std::fs::read(fx.registry_path()).unwrap(), document);
}

#[test]
fn test_remove_on_empty_registry_writes_nothing() {
    let fx = Fixture::new();
    let mut registry = fx.registry();
    assert!(!registry.remove("ghost").unwrap());
    assert!(!fx.registry_path().exists());
}

#[test]
fn test_validate_is_live() {
    let fx = Fixture::new();
    let model_dir = fx.model_dir("live");
    let mut registry = fx.registry();
    registry.add_or_update("live", &model_dir, "Live").unwrap();

    assert!(!registry.validate("ghost"));
    assert!(registry.validate("live"));

    std::fs::remove_dir_all(&model_dir).unwrap();
    assert!(!registry.validate("live"));

    std::fs::create_dir_all(&model_dir).unwrap();
    assert!(registry.validate("live"));
}

#[test]
fn test_add_does_not_check_model_dir() {
    let fx = Fixture::new();
    let mut registry = fx.registry();
    registry
        .add_or_update("later", fx.path("models/not-yet"), "Later")
        .unwrap();
    assert!(registry.contains("later"));
    assert!(!registry.validate("later"));
}
