//! Engine cache resolution, fallback and isolation

mod common;

use common::{same_engine, Fixture, BROKEN_MARKER, PANIC_MARKER};
use voice_bridge::{Backend, ErrorKind, TtsError, DEFAULT_VOICE_ID};

#[test]
fn test_fallback_to_default() {
    let fx = Fixture::new();
    let cache = fx.cache();

    let none = cache.resolve(None).unwrap();
    let unknown = cache.resolve(Some("nonexistent-id")).unwrap();
    let again = cache.resolve(None).unwrap();

    assert!(same_engine(&none, &unknown));
    assert!(same_engine(&none, &again));
    assert_eq!(fx.loads(), 1);
    assert_eq!(none.model_dir(), fx.builtin_dir().as_path());
}

#[test]
fn test_voices_are_isolated() {
    let fx = Fixture::new();
    let mut registry = fx.registry();
    registry.add_or_update("voiceA", fx.model_dir("a"), "A").unwrap();
    registry.add_or_update("voiceB", fx.model_dir("b"), "B").unwrap();
    let cache = fx.cache();

    let a = cache.resolve(Some("voiceA")).unwrap();
    let b = cache.resolve(Some("voiceB")).unwrap();
    let default = cache.resolve(None).unwrap();

    assert!(!same_engine(&a, &b));
    assert!(!same_engine(&a, &default));
    assert!(!same_engine(&b, &default));
    assert!(same_engine(&a, &cache.resolve(Some("voiceA")).unwrap()));
    assert_eq!(fx.loads(), 3);
}

#[test]
fn test_missing_default_model() {
    let fx = Fixture::new();
    std::fs::remove_dir_all(fx.builtin_dir()).unwrap();
    let cache = fx.cache();

    let err = cache.resolve(None).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::ModelNotFound);
    assert_eq!(fx.loads(), 0);
    assert!(!cache.is_loaded(DEFAULT_VOICE_ID));
    assert!(cache.registry().is_empty());
}

#[test]
fn test_missing_voice_model_dir() {
    let fx = Fixture::new();
    let mut registry = fx.registry();
    registry.add_or_update("gone", fx.path("models/gone"), "Gone").unwrap();
    let cache = fx.cache();

    match cache.resolve(Some("gone")).err().unwrap() {
        TtsError::ModelNotFound { voice_id, path } => {
            assert_eq!(voice_id, "gone");
            assert_eq!(path, fx.path("models/gone"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!cache.is_loaded("gone"));
}

#[test]
fn test_load_failure_is_retried() {
    let fx = Fixture::new();
    let model_dir = fx.model_dir("flaky");
    std::fs::write(model_dir.join(BROKEN_MARKER), "").unwrap();
    let mut registry = fx.registry();
    registry.add_or_update("flaky", &model_dir, "Flaky").unwrap();
    let cache = fx.cache();

    let err = cache.resolve(Some("flaky")).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::EngineLoad);
    assert!(err.to_string().contains("flaky"));
    assert!(!cache.is_loaded("flaky"));

    std::fs::remove_file(model_dir.join(BROKEN_MARKER)).unwrap();
    cache.resolve(Some("flaky")).unwrap();
    assert!(cache.is_loaded("flaky"));
    assert_eq!(fx.loads(), 1);
}

#[test]
fn test_registry_changes_do_not_evict() {
    let fx = Fixture::new();
    let mut registry = fx.registry();
    registry.add_or_update("a", fx.model_dir("a"), "A").unwrap();
    let mut cache = fx.cache();

    let first = cache.resolve(Some("a")).unwrap();
    cache.registry_mut().add_or_update("a", fx.model_dir("a2"), "A2").unwrap();
    let second = cache.resolve(Some("a")).unwrap();

    assert!(same_engine(&first, &second));
    assert_eq!(second.model_dir(), fx.path("models/a").as_path());
}

#[test]
fn test_describe_all() {
    let fx = Fixture::new();
    let mut registry = fx.registry();
    registry.add_or_update("a", fx.model_dir("a"), "Voice A").unwrap();
    registry.add_or_update("stale", fx.path("models/stale"), "Stale").unwrap();
    let cache = fx.cache();

    let before = cache.describe_all().unwrap();
    assert_eq!(before.len(), 3);
    let default = &before[DEFAULT_VOICE_ID];
    assert_eq!(default.display_name, "Default Voice");
    assert!(default.model_dir.is_absolute());
    assert!(default.valid);
    assert!(!default.loaded);
    assert!(before["a"].valid);
    assert!(!before["stale"].valid);

    cache.resolve(Some("a")).unwrap();
    let after = cache.describe_all().unwrap();
    assert!(after["a"].loaded);
    assert!(!after["stale"].loaded);
    assert!(!after[DEFAULT_VOICE_ID].loaded);
}

#[test]
fn test_describe_all_without_integration() {
    let fx = Fixture::new();
    let cache = fx.cache_with(Backend::unavailable("not installed"));
    let voices = cache.describe_all().unwrap();
    assert!(voices.contains_key(DEFAULT_VOICE_ID));
}

#[test]
fn test_loader_panic_is_load_error() {
    let fx = Fixture::new();
    let model_dir = fx.model_dir("fragile");
    std::fs::write(model_dir.join(PANIC_MARKER), "").unwrap();
    let mut registry = fx.registry();
    registry.add_or_update("fragile", &model_dir, "Fragile").unwrap();
    registry.add_or_update("steady", fx.model_dir("steady"), "Steady").unwrap();
    let cache = fx.cache();

    for _ in 0..2 {
        let err = cache.resolve(Some("fragile")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::EngineLoad);
        assert!(err.to_string().contains("tone loader asked to panic"));
        assert!(!cache.is_loaded("fragile"));
    }

    cache.resolve(Some("steady")).unwrap();
    cache.resolve(None).unwrap();
    let voices = cache.describe_all().unwrap();
    assert!(voices["steady"].loaded);
    assert!(!voices["fragile"].loaded);

    std::fs::remove_file(model_dir.join(PANIC_MARKER)).unwrap();
    cache.resolve(Some("fragile")).unwrap();
    assert!(cache.is_loaded("fragile"));
}

#[test]
fn test_empty_default_dir_is_config_error() {
    let fx = Fixture::new();
    let cache = fx.cache().with_default_model_dir("");

    assert_eq!(cache.resolve(None).err().unwrap().kind(), ErrorKind::Config);
    assert_eq!(cache.describe_all().err().unwrap().kind(), ErrorKind::Config);
    assert_eq!(fx.loads(), 0);
}
