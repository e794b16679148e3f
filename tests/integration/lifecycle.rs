//! Instance lifecycle integration tests
//!
//! Created → Activated → Running → Deactivated → Freed, and the transitions
//! that are refused along the way.

use crate::helpers::*;
use std::cell::Cell;
use tutti_host::plugin::{InstantiateError, RunError, StateError};
use tutti_host::prelude::*;

#[test]
fn test_instantiate_every_featureless_plugin() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    for plugin in host.plugins().filter(|p| p.required_features().is_empty()) {
        for sample_rate in [22050.0, 44100.0, TEST_SAMPLE_RATE, 96000.0] {
            let instance = host.instantiate(plugin.uri(), sample_rate).unwrap();
            assert_eq!(instance.state(), InstanceState::Created);
            assert_eq!(instance.port_count(), plugin.port_count());
            assert_eq!(instance.sample_rate(), sample_rate);
        }
    }
}

#[test]
fn test_invalid_sample_rate() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    for sample_rate in [0.0, -48000.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            host.instantiate(GAIN_URI, sample_rate),
            Err(Error::Instantiate(InstantiateError::InvalidSampleRate(_)))
        ));
    }
}

#[test]
fn test_unsupported_feature_with_default_host() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    match host.instantiate(FEATURE_URI, TEST_SAMPLE_RATE) {
        Err(Error::Instantiate(InstantiateError::UnsupportedFeature { uri, feature })) => {
            assert_eq!(uri, FEATURE_URI);
            assert_eq!(feature, BOUNDED_BLOCK);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("feature-requiring plugin should not instantiate"),
    }
}

#[test]
fn test_supported_feature_allows_instantiation() {
    let dir = fixture_dir();
    let host = Host::builder()
        .search_path(dir.path())
        .feature(BOUNDED_BLOCK)
        .build()
        .unwrap();

    let instance = host.instantiate(FEATURE_URI, TEST_SAMPLE_RATE).unwrap();
    assert_eq!(instance.state(), InstanceState::Created);
}

#[test]
fn test_activate_twice_rejected() {
    let dir = fixture_dir();
    let host = test_host(dir.path());
    let mut instance = host.instantiate(GAIN_URI, TEST_SAMPLE_RATE).unwrap();

    instance.activate().unwrap();
    assert!(matches!(
        instance.activate(),
        Err(StateError::InvalidTransition {
            from: InstanceState::Activated,
            to: InstanceState::Activated
        })
    ));
    assert_eq!(instance.state(), InstanceState::Activated);
}

#[test]
fn test_run_before_activate_rejected() {
    let dir = fixture_dir();
    let host = test_host(dir.path());
    let mut instance = host.instantiate(GAIN_URI, TEST_SAMPLE_RATE).unwrap();

    assert!(matches!(
        instance.run(TEST_BLOCK_SIZE),
        Err(RunError::InvalidState {
            state: InstanceState::Created
        })
    ));
    assert!(instance.deactivate().is_err());
    assert_eq!(instance.state(), InstanceState::Created);
}

#[test]
fn test_deactivate_without_running() {
    let dir = fixture_dir();
    let host = test_host(dir.path());
    let mut instance = host.instantiate(GAIN_URI, TEST_SAMPLE_RATE).unwrap();

    instance.activate().unwrap();
    instance.deactivate().unwrap();
    assert_eq!(instance.state(), InstanceState::Deactivated);
    assert!(instance.activate().is_err());
    assert!(instance.run(TEST_BLOCK_SIZE).is_err());
}

#[test]
fn test_free_is_idempotent() {
    let dir = fixture_dir();
    let host = test_host(dir.path());
    let gain = Cell::new(1.0);

    let mut instance = host.instantiate(GAIN_URI, TEST_SAMPLE_RATE).unwrap();
    instance.connect_port(0, PortBuffer::control_cell(&gain)).unwrap();
    instance.activate().unwrap();

    instance.free();
    assert_eq!(instance.state(), InstanceState::Freed);
    assert_eq!(instance.bound_count(), 0);

    instance.free();
    assert_eq!(instance.state(), InstanceState::Freed);
    assert!(instance.activate().is_err());
}

#[test]
fn test_free_from_created() {
    let dir = fixture_dir();
    let host = test_host(dir.path());
    let mut instance = host.instantiate(GAIN_URI, TEST_SAMPLE_RATE).unwrap();

    instance.free();
    assert_eq!(instance.state(), InstanceState::Freed);
}
