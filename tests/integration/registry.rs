//! Plugin registry integration tests
//!
//! Id assignment, unique naming, capacity and format rejection through the
//! engine's add/remove surface.

use crate::helpers::*;
use consort::prelude::*;
use consort::{BinaryType, Error, HostError, PluginError};

#[test]
fn test_ids_fill_lowest_free_slot() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);

    let a = engine.add_plugin(&mock_request("Echo")).unwrap();
    let b = engine.add_plugin(&mock_request("Chorus")).unwrap();
    let c = engine.add_plugin(&mock_request("Flanger")).unwrap();
    assert_eq!((a, b, c), (0, 1, 2));

    engine.remove_plugin(b).unwrap();
    assert_eq!(engine.plugin_count(), 2);

    let d = engine.add_plugin(&mock_request("Phaser")).unwrap();
    assert_eq!(d, 1);
    assert_eq!(engine.host().plugin_info(d).unwrap().name, "Phaser");
}

#[test]
fn test_duplicate_names_get_counters() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);

    let ids: Vec<i32> = (0..3)
        .map(|_| engine.add_plugin(&mock_request("Echo")).unwrap())
        .collect();
    let names: Vec<String> = ids
        .iter()
        .map(|id| engine.host().plugin_info(*id).unwrap().name)
        .collect();

    assert_eq!(names, vec!["Echo", "Echo (2)", "Echo (3)"]);
}

/// A freed name can be handed out again.
#[test]
fn test_removed_name_is_reused() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);

    let first = engine.add_plugin(&mock_request("Echo")).unwrap();
    engine.add_plugin(&mock_request("Echo")).unwrap();
    engine.remove_plugin(first).unwrap();

    let again = engine.add_plugin(&mock_request("Echo")).unwrap();
    assert_eq!(engine.host().plugin_info(again).unwrap().name, "Echo");
}

#[test]
fn test_names_respect_port_budget() {
    let mock = MockLoader::new();
    let engine = Engine::builder()
        .port_name_size(32)
        .loader(Arc::new(mock.clone()))
        .backend(DummyBackend::new(dummy_config()))
        .build()
        .unwrap();

    // 32 / 2 - 5 = 11 characters with no shared client prefix.
    let id = engine.add_plugin(&mock_request("Harmonizer Deluxe")).unwrap();
    assert_eq!(engine.host().plugin_info(id).unwrap().name, "Harmonizer ");

    // The shared client name eats into the same budget.
    engine.open("abc").unwrap();
    let id = engine.add_plugin(&mock_request("Harmonizer Deluxe")).unwrap();
    assert_eq!(engine.host().plugin_info(id).unwrap().name, "Harmoniz");
}

#[test]
fn test_registry_full() {
    let mock = MockLoader::new();
    let engine = Engine::builder()
        .max_plugins(2)
        .loader(Arc::new(mock.clone()))
        .build()
        .unwrap();

    engine.add_plugin(&mock_request("Echo")).unwrap();
    engine.add_plugin(&mock_request("Echo")).unwrap();

    let err = engine.add_plugin(&mock_request("Echo")).unwrap_err();
    assert!(matches!(err, Error::Host(HostError::RegistryFull(2))));
    assert_eq!(engine.plugin_count(), 2);
    assert_eq!(mock.alive(), 2);
    assert!(engine.last_error().is_some_and(|msg| msg.contains("(2)")));
}

#[test]
fn test_foreign_binary_is_rejected() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);

    let foreign = if BinaryType::native() == BinaryType::Win64 {
        BinaryType::Posix32
    } else {
        BinaryType::Win64
    };
    let request = mock_request("Echo").binary_type(foreign);

    let err = engine.add_plugin(&request).unwrap_err();
    assert!(matches!(err, Error::Host(HostError::UnsupportedFormat(_))));
    assert_eq!(mock.alive(), 0);
}

#[test]
fn test_unregistered_format_is_rejected() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);

    let request = LoadRequest::new(PluginType::Vst, "/usr/lib/vst/delay.so", "delay");
    let err = engine.add_plugin(&request).unwrap_err();

    assert!(matches!(err, Error::Host(HostError::UnsupportedFormat(_))));
    assert_eq!(engine.plugin_count(), 0);
}

/// A failed construction frees its reserved slot.
#[test]
fn test_load_failure_frees_slot() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);

    let err = engine.add_plugin(&mock_request("fail")).unwrap_err();
    assert!(matches!(
        err,
        Error::Host(HostError::Plugin(PluginError::LoadFailed { .. }))
    ));
    assert_eq!(engine.plugin_count(), 0);

    assert_eq!(engine.add_plugin(&mock_request("Echo")).unwrap(), 0);
}

#[test]
fn test_remove_unknown_id() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);

    let id = engine.add_plugin(&mock_request("Echo")).unwrap();
    engine.remove_plugin(id).unwrap();

    for bad in [id, -1, 42] {
        assert!(matches!(
            engine.remove_plugin(bad),
            Err(Error::Host(HostError::SlotNotFound(_)))
        ));
    }
    assert_eq!(mock.alive(), 0);
}

/// Built-in and external loaders live side by side.
#[test]
fn test_internal_and_mock_loaders() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);

    let tone = engine
        .add_plugin(&LoadRequest::new(PluginType::Internal, "", "tone"))
        .unwrap();
    let echo = engine.add_plugin(&mock_request("Echo")).unwrap();

    let info = engine.host().plugin_info(tone).unwrap();
    assert_eq!(info.plugin_type, PluginType::Internal);
    assert_eq!(info.name, "Test Tone");
    assert_eq!(engine.host().plugin_info(echo).unwrap().plugin_type, PluginType::Ladspa);
}
