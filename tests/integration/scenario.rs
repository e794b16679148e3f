//! End-to-end scenario: one gain bundle, one block, full lifecycle.

use crate::helpers::*;
use std::cell::Cell;
use tutti_host::prelude::*;

#[test]
fn test_gain_bundle_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = write_bundle(dir.path(), "gain.tutti", GAIN_MANIFEST);

    let host = Host::builder().no_search_paths().bundle(&bundle).build().unwrap();
    let descriptor = host.find(GAIN_URI).unwrap();
    assert_eq!(descriptor.port_count(), 3);
    assert!(descriptor.required_features().is_empty());
    assert_eq!(descriptor.port_at(0).unwrap().caps(), PortCaps::INPUT | PortCaps::CONTROL);
    assert_eq!(descriptor.port_at(1).unwrap().caps(), PortCaps::INPUT | PortCaps::AUDIO);
    assert_eq!(descriptor.port_at(2).unwrap().caps(), PortCaps::OUTPUT | PortCaps::AUDIO);

    let control = Cell::new(1.0);
    let input = audio_cells(128);
    let output = audio_cells(128);

    let mut instance = host.instantiate(GAIN_URI, 48000.0).unwrap();
    assert_eq!(instance.state(), InstanceState::Created);

    instance.connect_port(0, PortBuffer::control_cell(&control)).unwrap();
    instance.connect_port(1, PortBuffer::audio_cells(&input)).unwrap();
    instance.connect_port(2, PortBuffer::audio_cells(&output)).unwrap();

    instance.activate().unwrap();
    instance.run(128).unwrap();
    assert_eq!(instance.state(), InstanceState::Running);

    instance.deactivate().unwrap();
    assert_eq!(instance.state(), InstanceState::Deactivated);

    instance.free();
    assert_eq!(instance.state(), InstanceState::Freed);
}

#[test]
fn test_plain_slices_through_host() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    let mut input = vec![0.5f32; TEST_BLOCK_SIZE];
    let mut output = vec![0.0f32; TEST_BLOCK_SIZE];
    {
        let mut instance = host.instantiate(PASSTHROUGH_URI, TEST_SAMPLE_RATE).unwrap();
        instance.connect_port(0, PortBuffer::audio(&mut input)).unwrap();
        instance.connect_port(1, PortBuffer::audio(&mut output)).unwrap();
        instance.activate().unwrap();
        instance.run(TEST_BLOCK_SIZE).unwrap();
    }
    assert!(output.iter().all(|&s| s == 0.5));
}
