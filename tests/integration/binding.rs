//! Buffer binding integration tests
//!
//! Ports bind to caller-owned memory. The caller keeps writing inputs and
//! reading outputs between runs without rebinding.

use crate::helpers::*;
use approx::assert_relative_eq;
use std::cell::Cell;
use tutti_host::plugin::{ConnectError, RunError};
use tutti_host::prelude::*;

#[test]
fn test_fully_bound_run_succeeds() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    let gain = Cell::new(0.5);
    let input = audio_cells(TEST_BLOCK_SIZE);
    let output = audio_cells(TEST_BLOCK_SIZE);
    fill_ramp(&input, 0.01);

    let mut instance = host.instantiate(GAIN_URI, TEST_SAMPLE_RATE).unwrap();
    instance.connect_port(0, PortBuffer::control_cell(&gain)).unwrap();
    instance.connect_port(1, PortBuffer::audio_cells(&input)).unwrap();
    instance.connect_port(2, PortBuffer::audio_cells(&output)).unwrap();
    instance.activate().unwrap();
    instance.run(TEST_BLOCK_SIZE).unwrap();

    for (x, y) in input.iter().zip(&output) {
        assert_relative_eq!(y.get(), x.get() * 0.5, epsilon = FLOAT_EPSILON);
    }
}

#[test]
fn test_each_missing_binding_is_reported() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    let gain = Cell::new(1.0);
    let input = audio_cells(TEST_BLOCK_SIZE);
    let output = audio_cells(TEST_BLOCK_SIZE);
    let buffers = [
        PortBuffer::control_cell(&gain),
        PortBuffer::audio_cells(&input),
        PortBuffer::audio_cells(&output),
    ];

    for skipped in 0..buffers.len() {
        let mut instance = host.instantiate(GAIN_URI, TEST_SAMPLE_RATE).unwrap();
        for (index, buffer) in buffers.iter().enumerate() {
            if index != skipped {
                instance.connect_port(index, *buffer).unwrap();
            }
        }
        instance.activate().unwrap();
        assert!(matches!(
            instance.run(TEST_BLOCK_SIZE),
            Err(RunError::UnboundPort { index }) if index == skipped
        ));
        assert_eq!(instance.state(), InstanceState::Activated);
    }
}

#[test]
fn test_short_buffer_leaves_output_untouched() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    let gain = Cell::new(2.0);
    let input = audio_cells(TEST_BLOCK_SIZE);
    let output = audio_cells(TEST_BLOCK_SIZE / 2);
    fill_ramp(&input, 1.0);
    output.iter().for_each(|s| s.set(-1.0));

    let mut instance = host.instantiate(GAIN_URI, TEST_SAMPLE_RATE).unwrap();
    instance.connect_port(0, PortBuffer::control_cell(&gain)).unwrap();
    instance.connect_port(1, PortBuffer::audio_cells(&input)).unwrap();
    instance.connect_port(2, PortBuffer::audio_cells(&output)).unwrap();
    instance.activate().unwrap();

    assert!(matches!(
        instance.run(TEST_BLOCK_SIZE),
        Err(RunError::BufferTooSmall { index: 2, len, frames })
            if len == TEST_BLOCK_SIZE / 2 && frames == TEST_BLOCK_SIZE
    ));
    assert!(read_cells(&output).iter().all(|&s| s == -1.0));

    // A block that fits the shorter buffer is fine.
    instance.run(TEST_BLOCK_SIZE / 2).unwrap();
    assert_relative_eq!(output[3].get(), 6.0, epsilon = FLOAT_EPSILON);
}

#[test]
fn test_connect_out_of_range() {
    let dir = fixture_dir();
    let host = test_host(dir.path());
    let gain = Cell::new(1.0);

    let mut instance = host.instantiate(GAIN_URI, TEST_SAMPLE_RATE).unwrap();
    assert_eq!(
        instance.connect_port(3, PortBuffer::control_cell(&gain)).unwrap_err(),
        ConnectError::IndexOutOfRange { index: 3, count: 3 }
    );
    assert!(!instance.is_bound(3));
}

#[test]
fn test_connect_type_mismatch() {
    let dir = fixture_dir();
    let host = test_host(dir.path());
    let gain = Cell::new(1.0);
    let samples = audio_cells(TEST_BLOCK_SIZE);

    let mut instance = host.instantiate(GAIN_URI, TEST_SAMPLE_RATE).unwrap();
    assert!(matches!(
        instance.connect_port(0, PortBuffer::audio_cells(&samples)),
        Err(ConnectError::TypeMismatch { index: 0, .. })
    ));
    assert!(matches!(
        instance.connect_port(1, PortBuffer::control_cell(&gain)),
        Err(ConnectError::TypeMismatch { index: 1, .. })
    ));
    assert_eq!(instance.bound_count(), 0);
}

#[test]
fn test_rebinding_replaces_buffer() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    let gain = Cell::new(1.0);
    let input = audio_cells(TEST_BLOCK_SIZE);
    let first = audio_cells(TEST_BLOCK_SIZE);
    let second = audio_cells(TEST_BLOCK_SIZE);
    input.iter().for_each(|s| s.set(0.25));

    let mut instance = host.instantiate(GAIN_URI, TEST_SAMPLE_RATE).unwrap();
    instance.connect_port(0, PortBuffer::control_cell(&gain)).unwrap();
    instance.connect_port(1, PortBuffer::audio_cells(&input)).unwrap();
    instance.connect_port(2, PortBuffer::audio_cells(&first)).unwrap();
    instance.activate().unwrap();
    instance.connect_port(2, PortBuffer::audio_cells(&second)).unwrap();
    instance.run(TEST_BLOCK_SIZE).unwrap();

    assert!(read_cells(&first).iter().all(|&s| s == 0.0));
    assert!(read_cells(&second).iter().all(|&s| s == 0.25));
    assert_eq!(instance.bound_count(), 3);
}

#[test]
fn test_caller_updates_between_runs() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    let gain = Cell::new(1.0);
    let input = audio_cells(TEST_BLOCK_SIZE);
    let output = audio_cells(TEST_BLOCK_SIZE);
    input.iter().for_each(|s| s.set(1.0));

    let mut instance = host.instantiate(GAIN_URI, TEST_SAMPLE_RATE).unwrap();
    instance.connect_port(0, PortBuffer::control_cell(&gain)).unwrap();
    instance.connect_port(1, PortBuffer::audio_cells(&input)).unwrap();
    instance.connect_port(2, PortBuffer::audio_cells(&output)).unwrap();
    instance.activate().unwrap();

    for step in 1..=4 {
        gain.set(step as f32 * 0.25);
        instance.run(TEST_BLOCK_SIZE).unwrap();
        assert_relative_eq!(output[0].get(), step as f32 * 0.25, epsilon = FLOAT_EPSILON);
    }
    assert_eq!(instance.state(), InstanceState::Running);
}

#[test]
fn test_connect_while_running_rejected() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    let gain = Cell::new(1.0);
    let input = audio_cells(TEST_BLOCK_SIZE);
    let output = audio_cells(TEST_BLOCK_SIZE);

    let mut instance = host.instantiate(GAIN_URI, TEST_SAMPLE_RATE).unwrap();
    instance.connect_port(0, PortBuffer::control_cell(&gain)).unwrap();
    instance.connect_port(1, PortBuffer::audio_cells(&input)).unwrap();
    instance.connect_port(2, PortBuffer::audio_cells(&output)).unwrap();
    instance.activate().unwrap();
    instance.run(TEST_BLOCK_SIZE).unwrap();

    assert_eq!(
        instance.connect_port(2, PortBuffer::audio_cells(&input)).unwrap_err(),
        ConnectError::InvalidState {
            state: InstanceState::Running
        }
    );
}
