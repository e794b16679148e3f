//! Offline rendering through discovered bundles, written out as WAV.

use crate::helpers::*;
use tutti_host::prelude::*;

#[test]
fn test_render_gain_to_wav() {
    let dir = fixture_dir();
    let host = test_host(dir.path());
    let options = RenderOptions {
        sample_rate: TEST_SAMPLE_RATE,
        frames: 300,
        ..Default::default()
    };

    // 300 frames through 128-frame blocks: 128 + 128 + 44.
    let rendered = host.render(GAIN_URI, &options).unwrap();
    assert_eq!(rendered.frames, 300);
    let peaks: Vec<_> = rendered.peaks().collect();
    assert_eq!(peaks.len(), 1);
    assert_eq!(peaks[0].0, "out");
    approx::assert_abs_diff_eq!(peaks[0].1, 0.5, epsilon = 1e-3);

    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("gain.wav");
    rendered.write_wav(&path).unwrap();

    let mut reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 48000);
    assert_eq!(spec.bits_per_sample, 32);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);

    let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    assert_eq!(samples, rendered.channels[0].1);
}

#[test]
fn test_render_interleaves_outputs() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(
        dir.path(),
        "stereo.tutti",
        r#"
[[plugin]]
uri = "urn:test:stereo"
name = "Stereo Thru"
binary = "builtin:passthrough"

[[plugin.port]]
index = 0
symbol = "in_l"
types = ["input", "audio"]

[[plugin.port]]
index = 1
symbol = "in_r"
types = ["input", "audio"]

[[plugin.port]]
index = 2
symbol = "out_l"
types = ["output", "audio"]

[[plugin.port]]
index = 3
symbol = "out_r"
types = ["output", "audio"]
"#,
    );
    let host = test_host(dir.path());
    let options = RenderOptions {
        frames: 64,
        ..Default::default()
    };
    let rendered = host.render("urn:test:stereo", &options).unwrap();
    let symbols: Vec<_> = rendered.channels.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(symbols, vec!["out_l", "out_r"]);

    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("stereo.wav");
    rendered.write_wav(&path).unwrap();

    let mut reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().channels, 2);
    let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), 128);
    for (frame, pair) in samples.chunks(2).enumerate() {
        assert_eq!(pair[0], rendered.channels[0].1[frame]);
        assert_eq!(pair[1], rendered.channels[1].1[frame]);
    }
}

#[test]
fn test_render_zero_frames_is_a_config_error() {
    let dir = fixture_dir();
    let host = test_host(dir.path());
    let options = RenderOptions {
        frames: 0,
        ..Default::default()
    };
    assert!(matches!(
        host.render(PASSTHROUGH_URI, &options),
        Err(Error::InvalidConfig(_))
    ));
}
