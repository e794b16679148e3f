//! Discovery and registry integration tests
//!
//! Bundles on disk → descriptor store → registry, as seen through `Host`.

use crate::helpers::*;
use tutti_host::descriptor::{LoadError, RegistryError};
use tutti_host::prelude::*;

#[test]
fn test_discovers_every_bundle() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    let mut uris: Vec<&str> = host.plugins().map(|p| p.uri()).collect();
    uris.sort_unstable();
    assert_eq!(uris, vec![GAIN_URI, FEATURE_URI, PASSTHROUGH_URI]);
    assert!(host.failures().is_empty());
}

#[test]
fn test_registry_all_is_restartable() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    let first: Vec<_> = host.registry().all().map(|p| p.uri().to_string()).collect();
    let second: Vec<_> = host.registry().all().map(|p| p.uri().to_string()).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), host.registry().len());
}

#[test]
fn test_find_by_uri() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    let gain = host.find(GAIN_URI).expect("gain should be registered");
    assert_eq!(gain.name(), "Gain");
    assert!(gain.bundle().ends_with("gain.tutti"));
    assert!(host.find("http://example.org/plugins/absent").is_none());
}

#[test]
fn test_port_schema_is_contiguous() {
    let dir = fixture_dir();
    let host = test_host(dir.path());

    for plugin in host.plugins() {
        let indices: Vec<usize> = plugin.ports().iter().map(|p| p.index()).collect();
        let expected: Vec<usize> = (0..plugin.port_count()).collect();
        assert_eq!(indices, expected, "{} ports out of order", plugin.uri());
        assert!(plugin.port_at(plugin.port_count()).is_err());
    }
}

#[test]
fn test_port_capabilities() {
    let dir = fixture_dir();
    let host = test_host(dir.path());
    let gain = host.find(GAIN_URI).unwrap();

    let control = gain.port_at(0).unwrap();
    assert!(control.has_capability(Capability::Input));
    assert!(control.has_capability(Capability::Control));
    assert!(!control.has_capability(Capability::Audio));
    assert_eq!(control.range().map(|r| r.default), Some(1.0));

    let out = gain.port_by_symbol("out").unwrap();
    assert_eq!(out.caps(), PortCaps::OUTPUT | PortCaps::AUDIO);
    assert_eq!(gain.audio_inputs().count(), 1);
    assert_eq!(gain.audio_outputs().count(), 1);
}

#[test]
fn test_malformed_bundle_reported_not_fatal() {
    let dir = fixture_dir();
    write_bundle(dir.path(), "broken.tutti", "[[plugin]]\nname = \"No URI\"\n");

    let host = test_host(dir.path());
    assert_eq!(host.registry().len(), 3);
    assert_eq!(host.failures().len(), 1);

    let (path, error) = &host.failures()[0];
    assert!(path.ends_with("broken.tutti"));
    assert!(matches!(error, LoadError::Malformed { .. }));
}

#[test]
fn test_unknown_port_type_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(
        dir.path(),
        "midi.tutti",
        r#"
[[plugin]]
uri = "urn:midi"
name = "Midi"

[[plugin.port]]
index = 0
symbol = "events"
types = ["input", "midi"]
"#,
    );

    let host = test_host(dir.path());
    assert!(host.registry().is_empty());
    assert!(matches!(host.failures()[0].1, LoadError::Malformed { .. }));
}

#[test]
fn test_duplicate_uri_across_bundles() {
    let dir = fixture_dir();
    write_bundle(dir.path(), "gain-copy.tutti", GAIN_MANIFEST);

    let result = Host::builder().search_path(dir.path()).build();
    assert!(matches!(
        result,
        Err(Error::Registry(RegistryError::DuplicateUri(uri))) if uri == GAIN_URI
    ));
}

#[test]
fn test_explicit_bundle_without_scanning() {
    let dir = fixture_dir();
    let host = Host::builder()
        .no_search_paths()
        .bundle(dir.path().join("gain.tutti").join("manifest.toml"))
        .build()
        .unwrap();

    assert_eq!(host.registry().len(), 1);
    assert!(host.find(GAIN_URI).is_some());
}

#[test]
fn test_missing_explicit_bundle_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let result = Host::builder()
        .no_search_paths()
        .bundle(dir.path().join("nowhere"))
        .build();
    assert!(matches!(result, Err(Error::Load(LoadError::NotFound { .. }))));
}
