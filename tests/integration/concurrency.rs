//! Concurrency integration tests
//!
//! Control-side changes racing a live audio thread, and notifications
//! travelling from the audio thread to the listener.

use crate::helpers::*;
use consort::prelude::*;
use consort::HostError;
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

/// Adds and removes from several threads while blocks keep running. A
/// removed plugin is never processed again, even while a handle keeps it
/// alive.
#[test]
fn test_add_remove_while_processing() {
    let mock = MockLoader::new();
    let (engine, handle) = test_engine(&mock);
    engine.open("consort").unwrap();
    let engine = Arc::new(engine);

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let engine = Arc::clone(&engine);
            let mock = mock.clone();
            let handle = handle.clone();
            thread::spawn(move || {
                for round in 0..25 {
                    let label = format!("Fx{worker}-{round}");
                    let id = engine.add_plugin(&mock_request(&label)).unwrap();
                    engine.host().set_volume(id, 0.5).unwrap();
                    engine.host().send_midi_note(id, true, 60, 100).unwrap();

                    let held = engine.host().slot(id).unwrap();
                    engine.remove_plugin(id).unwrap();
                    mock.mark_removed(&label);
                    assert!(!held.is_present());

                    let later = handle.blocks_processed() + 2;
                    assert!(handle.wait_for_blocks(later, WAIT));
                    drop(held);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(engine.plugin_count(), 0);
    assert_eq!(mock.alive(), 0);
    assert_eq!(mock.processed_after_removal(), 0);
    assert!(handle.is_running());

    engine.close().unwrap();
}

/// Lookups racing a removal either see the plugin or a clean miss.
#[test]
fn test_queries_during_removal() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    engine.open("consort").unwrap();
    let engine = Arc::new(engine);

    for _ in 0..20 {
        let id = engine.add_plugin(&mock_request("Echo")).unwrap();
        let reader = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..50 {
                    match engine.host().plugin_info(id) {
                        Ok(info) => assert_eq!(info.name, "Echo"),
                        Err(HostError::SlotNotFound(missing)) => assert_eq!(missing, id),
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            })
        };
        engine.remove_plugin(id).unwrap();
        reader.join().unwrap();
    }

    assert_eq!(mock.alive(), 0);
}

#[test]
fn test_notes_reach_listener() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let (listener, events) = recorder();
    engine.set_callback(Some(listener));
    engine.open("consort").unwrap();

    let id = engine.add_plugin(&mock_request("Echo")).unwrap();
    engine.host().send_midi_note(id, true, 64, 90).unwrap();
    engine.host().send_midi_note(id, false, 64, 0).unwrap();

    assert!(wait_until(WAIT, || {
        events
            .lock()
            .iter()
            .any(|e| e.kind == CallbackKind::NoteOff && e.plugin_id == id)
    }));

    let events = events.lock();
    let on = events
        .iter()
        .find(|e| e.kind == CallbackKind::NoteOn)
        .copied()
        .unwrap();
    assert_eq!((on.plugin_id, on.value1, on.value2), (id, 64, 90));
}

/// Notes for a removed plugin are dropped.
#[test]
fn test_notes_discarded_on_remove() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let (listener, events) = recorder();
    engine.set_callback(Some(listener));

    // Closed engine: nothing drains the queue yet.
    let id = engine.add_plugin(&mock_request("Echo")).unwrap();
    engine.host().send_midi_note(id, true, 60, 100).unwrap();
    engine.remove_plugin(id).unwrap();

    let other = engine.add_plugin(&mock_request("Chorus")).unwrap();
    engine.open("consort").unwrap();
    assert!(wait_until(WAIT, || mock.processed() > 5));
    thread::sleep(Duration::from_millis(20));

    assert!(events
        .lock()
        .iter()
        .all(|e| e.kind != CallbackKind::NoteOn));
    assert_eq!(engine.host().plugin_info(other).unwrap().name, "Chorus");
}

#[test]
fn test_note_queue_full() {
    let mock = MockLoader::new();
    let engine = Engine::builder()
        .max_midi_events(2)
        .loader(Arc::new(mock.clone()))
        .build()
        .unwrap();
    let id = engine.add_plugin(&mock_request("Echo")).unwrap();
    let host = engine.host();

    host.send_midi_note(id, true, 60, 100).unwrap();
    host.send_midi_note(id, true, 62, 100).unwrap();
    assert!(matches!(
        host.send_midi_note(id, true, 64, 100),
        Err(HostError::EventQueueFull(2))
    ));
    assert!(matches!(
        host.send_midi_note(id, true, 200, 100),
        Err(HostError::IndexOutOfRange { .. })
    ));
}

/// A server shutdown is reported to the listener exactly once.
#[test]
fn test_shutdown_reports_quit() {
    let mock = MockLoader::new();
    let (engine, handle) = test_engine(&mock);
    let (listener, events) = recorder();
    engine.set_callback(Some(listener));
    engine.open("consort").unwrap();
    assert!(handle.wait_for_blocks(2, WAIT));

    handle.trigger_shutdown();

    assert!(wait_until(WAIT, || {
        events.lock().iter().any(|e| e.kind == CallbackKind::Quit)
    }));
    assert!(!handle.is_running());

    thread::sleep(Duration::from_millis(30));
    let quits = events
        .lock()
        .iter()
        .filter(|e| e.kind == CallbackKind::Quit)
        .count();
    assert_eq!(quits, 1);

    engine.close().unwrap();
}

/// Without the shared client the process callback is never registered.
#[test]
fn test_no_processing_without_global_client() {
    let mock = MockLoader::new();
    let engine = Engine::builder()
        .loader(Arc::new(mock.clone()))
        .option(HostOption::GlobalAudioClient(false))
        .backend(DummyBackend::new(dummy_config()))
        .build()
        .unwrap();

    engine.add_plugin(&mock_request("Echo")).unwrap();
    engine.open("consort").unwrap();
    thread::sleep(Duration::from_millis(30));

    assert_eq!(mock.processed(), 0);
    engine.close().unwrap();
}

#[test]
fn test_inactive_plugin_is_skipped() {
    let mock = MockLoader::new();
    let (engine, handle) = test_engine(&mock);
    let id = engine.add_plugin(&mock_request("Echo")).unwrap();
    engine.open("consort").unwrap();
    assert!(wait_until(WAIT, || mock.processed() > 0));

    engine.host().set_active(id, false).unwrap();
    // Let any block already in flight finish.
    let settled = handle.blocks_processed() + 2;
    assert!(handle.wait_for_blocks(settled, WAIT));

    let frozen = mock.processed();
    let later = handle.blocks_processed() + 5;
    assert!(handle.wait_for_blocks(later, WAIT));

    assert_eq!(mock.processed(), frozen);
    assert_eq!(engine.host().output_peak_value(id, 1), 0.0);
}
