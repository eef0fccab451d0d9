//! Introspection and control integration tests
//!
//! Queries and mutators through an engine, plus the single-slot cache.

use crate::helpers::*;
use consort::prelude::*;
use consort::{HostError, ParameterInfo};
use consort::plugin::{ParameterType, PluginHints};

#[test]
fn test_plugin_info() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let host = engine.host();

    engine.add_plugin(&mock_request("Echo")).unwrap();
    let id = engine.add_plugin(&mock_request("Echo")).unwrap();

    let info = host.plugin_info(id).unwrap();
    assert_eq!(info.name, "Echo (2)");
    assert_eq!(info.label, "echo");
    assert_eq!(info.maker, "mock");
    assert_eq!(info.binary, "/usr/lib/ladspa/mock.so");
    assert_eq!(info.unique_id, 4242);
    assert!(info.hints.contains(PluginHints::USES_CHUNKS));

    // The format's own name is not uniqued.
    assert_eq!(host.real_plugin_name(id).unwrap(), "Echo (LADSPA)");
}

#[test]
fn test_port_and_parameter_counts() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let host = engine.host();
    let id = engine.add_plugin(&mock_request("Echo")).unwrap();

    let audio = host.audio_port_count_info(id).unwrap();
    assert_eq!((audio.ins, audio.outs, audio.total), (2, 2, 4));

    let midi = host.midi_port_count_info(id).unwrap();
    assert_eq!(midi.total, 0);

    let params = host.parameter_count_info(id).unwrap();
    assert_eq!((params.ins, params.outs), (1, 0));
    assert_eq!(host.parameter_count(id).unwrap(), 1);
}

#[test]
fn test_parameter_queries() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let host = engine.host();
    let id = engine.add_plugin(&mock_request("Echo")).unwrap();

    assert_eq!(
        host.parameter_info(id, 0).unwrap(),
        ParameterInfo {
            name: "Amount".to_string(),
            symbol: "amount".to_string(),
            unit: "dB".to_string(),
            scale_point_count: 1,
        }
    );

    let point = host.scale_point_info(id, 0, 0).unwrap();
    assert_eq!(point.label, "Off");

    let data = host.parameter_data(id, 0).unwrap();
    assert_eq!(data.kind, ParameterType::Input);
    assert_eq!((data.midi_channel, data.midi_cc), (0, -1));

    let ranges = host.parameter_ranges(id, 0).unwrap();
    assert_eq!((ranges.min, ranges.max), (0.0, 10.0));
    assert_eq!(host.default_parameter_value(id, 0).unwrap(), 1.0);
}

/// Sub-indices are checked against the plugin's own counts.
#[test]
fn test_out_of_range_indices() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let host = engine.host();
    let id = engine.add_plugin(&mock_request("Echo")).unwrap();

    assert!(matches!(
        host.parameter_info(id, 1),
        Err(HostError::IndexOutOfRange { index: 1, count: 1, .. })
    ));
    assert!(host.scale_point_info(id, 0, 1).is_err());
    assert!(host.midi_program_info(id, 2).is_err());
    assert!(host.program_name(id, 0).is_err());
    assert!(host.custom_data(id, 0).is_err());
    assert!(host.set_parameter_value(id, 5, 1.0).is_err());
    assert!(host.set_midi_program(id, 2).is_err());
}

#[test]
fn test_missing_plugin_is_reported() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let host = engine.host();

    assert!(matches!(host.plugin_info(7), Err(HostError::SlotNotFound(7))));
    assert!(matches!(host.set_volume(7, 0.5), Err(HostError::SlotNotFound(7))));
    assert_eq!(host.output_peak_value(7, 1), 0.0);
    assert_eq!(host.input_peak_value(-1, 1), 0.0);
}

#[test]
fn test_parameter_value_round_trip() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let host = engine.host();
    let id = engine.add_plugin(&mock_request("Echo")).unwrap();

    host.set_parameter_value(id, 0, 4.5).unwrap();
    assert_eq!(host.current_parameter_value(id, 0).unwrap(), 4.5);
}

#[test]
fn test_parameter_midi_mapping() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let host = engine.host();
    let id = engine.add_plugin(&mock_request("Echo")).unwrap();

    host.set_parameter_midi_channel(id, 0, 9).unwrap();
    host.set_parameter_midi_cc(id, 0, 74).unwrap();
    let data = host.parameter_data(id, 0).unwrap();
    assert_eq!((data.midi_channel, data.midi_cc), (9, 74));

    assert!(matches!(
        host.set_parameter_midi_channel(id, 0, 16),
        Err(HostError::InvalidChannelOrCC { .. })
    ));
    assert!(matches!(
        host.set_parameter_midi_cc(id, 0, 96),
        Err(HostError::InvalidChannelOrCC { .. })
    ));

    host.set_parameter_midi_cc(id, 0, -1).unwrap();
    assert_eq!(host.parameter_data(id, 0).unwrap().midi_cc, -1);
}

#[test]
fn test_midi_programs() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let host = engine.host();
    let id = engine.add_plugin(&mock_request("Echo")).unwrap();

    assert_eq!(host.midi_program_count(id).unwrap(), 2);
    assert_eq!(host.current_midi_program_index(id).unwrap(), -1);
    assert_eq!(host.midi_program_name(id, 1).unwrap(), "Preset 2");

    host.set_midi_program(id, 1).unwrap();
    assert_eq!(host.current_midi_program_index(id).unwrap(), 1);
    assert_eq!(host.current_program_index(id).unwrap(), -1);
}

#[test]
fn test_custom_data_upsert() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let host = engine.host();
    let id = engine.add_plugin(&mock_request("Echo")).unwrap();

    host.set_custom_data(id, "string", "mode", "fast").unwrap();
    host.set_custom_data(id, "string", "theme", "dark").unwrap();
    host.set_custom_data(id, "string", "mode", "slow").unwrap();

    assert_eq!(host.custom_data_count(id).unwrap(), 2);
    let entry = host.custom_data(id, 0).unwrap();
    assert_eq!((entry.key.as_str(), entry.value.as_str()), ("mode", "slow"));
}

#[test]
fn test_chunk_round_trip() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let host = engine.host();
    let (listener, events) = recorder();
    engine.set_callback(Some(listener));

    let id = engine.add_plugin(&mock_request("Echo")).unwrap();
    assert_eq!(host.chunk_data(id).unwrap(), "bW9jay1zdGF0ZQ==");

    host.set_chunk_data(id, "bmV3IHN0YXRl").unwrap();
    assert_eq!(host.chunk_data(id).unwrap(), "bmV3IHN0YXRl");

    let events = events.lock();
    assert!(events
        .iter()
        .any(|e| e.kind == CallbackKind::ReloadAll && e.plugin_id == id));
}

#[test]
fn test_chunk_rejections() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let host = engine.host();

    let echo = engine.add_plugin(&mock_request("Echo")).unwrap();
    assert!(matches!(
        host.set_chunk_data(echo, "not base64!"),
        Err(HostError::InvalidChunk { .. })
    ));
    assert_eq!(host.chunk_data(echo).unwrap(), "bW9jay1zdGF0ZQ==");

    let plain = engine.add_plugin(&mock_request("plain")).unwrap();
    assert!(matches!(
        host.chunk_data(plain),
        Err(HostError::CapabilityUnsupported { .. })
    ));
}

/// Mix controls need the matching capability hint.
#[test]
fn test_mix_controls_require_hints() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let host = engine.host();

    let echo = engine.add_plugin(&mock_request("Echo")).unwrap();
    host.set_drywet(echo, 0.5).unwrap();
    host.set_volume(echo, 2.0).unwrap();
    host.set_balance_left(echo, -0.5).unwrap();
    host.set_balance_right(echo, 0.5).unwrap();

    let plain = engine.add_plugin(&mock_request("plain")).unwrap();
    for result in [
        host.set_drywet(plain, 0.5),
        host.set_volume(plain, 0.5),
        host.set_balance_left(plain, 0.0),
        host.set_balance_right(plain, 0.0),
    ] {
        assert!(matches!(result, Err(HostError::CapabilityUnsupported { .. })));
    }

    // Activation is always allowed.
    host.set_active(plain, false).unwrap();
}

#[test]
fn test_gui_and_save_hooks() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let host = engine.host();
    let id = engine.add_plugin(&mock_request("Echo")).unwrap();

    assert!(!host.gui_info(id).unwrap().visible);
    host.set_gui_data(id, 0, 0x1234).unwrap();
    host.show_gui(id, true).unwrap();
    host.idle_gui(id).unwrap();
    host.prepare_for_save(id).unwrap();
}

#[test]
fn test_cache_keeps_last_result() {
    let mock = MockLoader::new();
    let (engine, _handle) = test_engine(&mock);
    let echo = engine.add_plugin(&mock_request("Echo")).unwrap();
    let chorus = engine.add_plugin(&mock_request("Chorus")).unwrap();

    let name = engine.with_cache(|cache, host| {
        cache.plugin_info(host, echo);
        cache
            .plugin_info(host, chorus)
            .get()
            .map(|info| info.name.clone())
    });
    assert_eq!(name.as_deref(), Some("Chorus"));

    // A failed lookup leaves the cell empty instead of stale.
    let valid = engine.with_cache(|cache, host| cache.plugin_info(host, 9).is_valid());
    assert!(!valid);

    let chunk = engine.with_cache(|cache, host| cache.chunk_data(host, echo).get().cloned());
    assert_eq!(chunk.as_deref(), Some("bW9jay1zdGF0ZQ=="));
}

#[test]
fn test_peaks_follow_processing() {
    let mock = MockLoader::new();
    let (engine, handle) = test_engine(&mock);
    let host = engine.host();
    let id = engine.add_plugin(&mock_request("Echo")).unwrap();
    host.set_volume(id, 0.5).unwrap();

    engine.open("consort").unwrap();
    assert!(handle.wait_for_blocks(5, std::time::Duration::from_secs(2)));

    approx::assert_relative_eq!(host.input_peak_value(id, 1), MOCK_PEAK);
    approx::assert_relative_eq!(host.output_peak_value(id, 2), MOCK_PEAK * 0.5);
    assert_eq!(host.output_peak_value(id, 3), 0.0);

    engine.remove_plugin(id).unwrap();
    assert_eq!(host.output_peak_value(id, 1), 0.0);
}
