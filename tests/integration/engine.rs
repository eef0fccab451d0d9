//! Engine lifecycle integration tests
//!
//! Opening, closing, option lock and transport failures.

use crate::helpers::*;
use consort::prelude::*;
use consort::{DummyConfig, Error, HostError};
use std::time::Duration;

#[test]
fn test_open_close_cycle() {
    let mock = MockLoader::new();
    let (engine, handle) = test_engine(&mock);

    assert!(!engine.is_running());
    engine.open("consort").unwrap();
    assert!(engine.is_running());
    assert!(handle.is_running());
    assert!(handle.wait_for_blocks(3, Duration::from_secs(2)));

    engine.close().unwrap();
    assert!(!engine.is_running());
    assert!(!handle.is_running());
    assert_eq!(engine.client_name(), None);
}

#[test]
fn test_double_open_is_rejected() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);

    engine.open("consort").unwrap();
    assert!(matches!(engine.open("consort"), Err(Error::AlreadyOpen)));
    assert!(engine.is_running());
    assert!(engine.last_error().is_some());
}

#[test]
fn test_close_without_open() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);

    assert!(matches!(engine.close(), Err(Error::NotOpen)));

    engine.open("consort").unwrap();
    engine.close().unwrap();
    assert!(matches!(engine.close(), Err(Error::NotOpen)));
}

/// The engine can be reopened after a clean close.
#[test]
fn test_reopen_after_close() {
    let mock = MockLoader::new();
    let (engine, handle) = test_engine(&mock);

    engine.open("first").unwrap();
    engine.close().unwrap();

    let before = handle.blocks_processed();
    engine.open("second").unwrap();
    assert!(handle.wait_for_blocks(before + 2, Duration::from_secs(2)));
    assert_eq!(engine.client_name().as_deref(), Some("second"));
}

#[test]
fn test_connection_failure_leaves_engine_closed() {
    let mock = MockLoader::new();
    let (engine, handle) = test_engine_with(
        &mock,
        DummyConfig {
            fail_open: true,
            ..dummy_config()
        },
    );

    let err = engine.open("consort").unwrap_err();
    assert!(matches!(err, Error::Host(HostError::ConnectionFailed(_))));
    assert!(!engine.is_running());
    assert!(!handle.is_running());
    assert!(engine
        .last_error()
        .is_some_and(|msg| msg.contains("Audio connection failed")));
}

#[test]
fn test_activation_failure_leaves_engine_closed() {
    let mock = MockLoader::new();
    let (engine, handle) = test_engine_with(
        &mock,
        DummyConfig {
            fail_activate: true,
            ..dummy_config()
        },
    );

    let err = engine.open("consort").unwrap_err();
    assert!(matches!(err, Error::Host(HostError::ActivationFailed(_))));
    assert!(!engine.is_running());
    assert_eq!(handle.blocks_processed(), 0);
    assert_eq!(engine.client_name(), None);
}

/// Teardown failures are recorded but the engine still closes.
#[test]
fn test_close_records_transport_failures() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine_with(
        &mock,
        DummyConfig {
            fail_deactivate: true,
            fail_close: true,
            ..dummy_config()
        },
    );

    engine.open("consort").unwrap();
    engine.add_plugin(&mock_request("Echo")).unwrap();

    engine.close().unwrap();
    assert!(!engine.is_running());
    assert_eq!(engine.plugin_count(), 0);
    assert_eq!(mock.alive(), 0);
    assert!(engine
        .last_error()
        .is_some_and(|msg| msg.contains("Failed to close audio client")));
}

#[test]
fn test_options_lock_after_first_open() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);

    engine
        .set_option(HostOption::GlobalAudioClient(true))
        .unwrap();

    engine.open("consort").unwrap();
    engine.close().unwrap();

    assert!(matches!(
        engine.set_option(HostOption::GlobalAudioClient(false)),
        Err(Error::OptionsLocked)
    ));
    assert!(engine.host().options().global_audio_client);
}

/// A failed open still counts as the first open.
#[test]
fn test_options_lock_after_failed_open() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine_with(
        &mock,
        DummyConfig {
            fail_open: true,
            ..dummy_config()
        },
    );

    assert!(engine.open("consort").is_err());
    assert!(matches!(
        engine.set_option(HostOption::GlobalAudioClient(false)),
        Err(Error::OptionsLocked)
    ));
}

#[test]
fn test_client_name_is_sanitized() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);

    engine.open("My Host-2").unwrap();
    assert_eq!(engine.client_name().as_deref(), Some("My_Host_2"));
}

/// The server may hand out a different name than the one requested.
#[test]
fn test_assigned_client_name_wins() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine_with(
        &mock,
        DummyConfig {
            assigned_name: Some("consort-01".to_string()),
            ..dummy_config()
        },
    );

    engine.open("consort").unwrap();
    assert_eq!(engine.client_name().as_deref(), Some("consort_01"));
}

#[test]
fn test_transport_properties() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);

    assert_eq!(engine.latency_ms(), 0.0);

    engine.open("consort").unwrap();
    assert_eq!(engine.buffer_size(), TEST_BUFFER_SIZE);
    assert_eq!(engine.sample_rate(), TEST_SAMPLE_RATE);

    let expected = f64::from(TEST_BUFFER_SIZE) / TEST_SAMPLE_RATE * 1000.0;
    approx::assert_relative_eq!(engine.latency_ms(), expected, epsilon = 1e-9);
    assert_eq!(engine.control_url(), None);
}

#[test]
fn test_buffer_and_rate_changes_reach_host() {
    let mock = MockLoader::new();
    let (engine, handle) = test_engine(&mock);
    engine.open("consort").unwrap();

    handle.set_buffer_size(1024);
    handle.set_sample_rate(96_000.0);

    assert!(wait_until(Duration::from_secs(2), || {
        engine.buffer_size() == 1024 && engine.sample_rate() == 96_000.0
    }));
}

#[test]
fn test_close_removes_plugins_and_flushes_cache() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    engine.open("consort").unwrap();

    let id = engine.add_plugin(&mock_request("Echo")).unwrap();
    engine.add_plugin(&mock_request("Chorus")).unwrap();
    assert!(engine.with_cache(|cache, host| cache.plugin_info(host, id).is_valid()));

    engine.close().unwrap();

    assert_eq!(engine.plugin_count(), 0);
    assert_eq!(mock.alive(), 0);
    assert!(engine.with_cache(|cache, _| cache.is_empty()));
}

/// Plugins may be added before the engine connects; they process once it opens.
#[test]
fn test_add_before_open() {
    let mock = MockLoader::new();
    let (engine, handle) = test_engine(&mock);

    let id = engine.add_plugin(&mock_request("Echo")).unwrap();
    assert_eq!(id, 0);
    assert_eq!(mock.processed(), 0);

    engine.open("consort").unwrap();
    assert!(handle.wait_for_blocks(3, Duration::from_secs(2)));
    assert!(wait_until(Duration::from_secs(2), || mock.processed() > 0));
}

#[test]
fn test_drop_closes_open_engine() {
    let mock = MockLoader::new();
    let (engine, handle) = test_engine(&mock);

    engine.open("consort").unwrap();
    engine.add_plugin(&mock_request("Echo")).unwrap();
    drop(engine);

    assert!(!handle.is_running());
    assert_eq!(mock.alive(), 0);
}
