use approx::assert_relative_eq;
use songsmith::audio::wav::{read_wav, write_wav};
use songsmith::audio::{analyze, analyze_many, discover_audio_files};
use songsmith::config::{AnalysisConfig, MelodyConfig, VocalsConfig};
use songsmith::lyrics::parse_lyrics;
use songsmith::melody::{generate_melody, MelodyScore};
use songsmith::style::build_backing_prompt;
use songsmith::vocals::{BackendRegistry, VocalRequest};
use songsmith::{aggregate, mix_backing_and_vocal, AudioBuffer, Error, StyleProfile};
use std::f32::consts::PI;
use std::path::Path;
use tempfile::TempDir;

fn write_sine(path: &Path, freq: f32, seconds: f32, sample_rate: u32) {
    let len = (seconds * sample_rate as f32) as usize;
    let samples = (0..len)
        .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
        .collect();
    write_wav(path, &AudioBuffer::mono(samples, sample_rate)).unwrap();
}

/// Short decaying bursts every `60 / bpm` seconds.
fn write_clicks(path: &Path, bpm: f32, seconds: f32, sample_rate: u32) {
    let len = (seconds * sample_rate as f32) as usize;
    let period = (60.0 / bpm * sample_rate as f32) as usize;
    let burst = sample_rate as usize / 100;
    let samples = (0..len)
        .map(|i| {
            let offset = i % period;
            if offset < burst {
                let env = 1.0 - offset as f32 / burst as f32;
                env * (2.0 * PI * 1000.0 * i as f32 / sample_rate as f32).sin()
            } else {
                0.0
            }
        })
        .collect();
    write_wav(path, &AudioBuffer::mono(samples, sample_rate)).unwrap();
}

#[test]
fn sine_file_energy_sits_in_its_band() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a440.wav");
    write_sine(&path, 440.0, 2.0, 22050);

    let features = analyze(&path, &AnalysisConfig::default()).unwrap();
    assert_relative_eq!(features.duration, 2.0, epsilon = 1e-3);
    let keys: Vec<&str> = features.band_energy.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["high", "low", "mid"]);
    let mid = features.band_energy["mid"];
    assert!(mid > features.band_energy["low"]);
    assert!(mid > features.band_energy["high"]);
    assert!(features.band_energy.values().all(|v| *v >= 0.0));
}

#[test]
fn missing_reference_is_not_found() {
    let dir = TempDir::new().unwrap();
    let err = analyze(&dir.path().join("missing.wav"), &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn references_aggregate_into_a_profile() {
    let dir = TempDir::new().unwrap();
    let refs = dir.path().join("refs");
    std::fs::create_dir_all(refs.join("nested")).unwrap();
    write_clicks(&refs.join("clicks.wav"), 120.0, 8.0, 22050);
    write_sine(&refs.join("nested").join("tone.wav"), 100.0, 2.0, 22050);
    std::fs::write(refs.join("notes.txt"), "not audio").unwrap();

    let paths = discover_audio_files(&refs).unwrap();
    assert_eq!(paths.len(), 2);

    let features = analyze_many(&paths, &AnalysisConfig::default()).unwrap();
    assert_eq!(features.len(), 2);
    // discovery is sorted, so the click track comes first
    assert!(features[0].tempo > 0.0);
    assert!(features[1].band_energy["low"] > features[1].band_energy["mid"]);

    let profile = aggregate(&features).unwrap();
    let lo = features[0].tempo.min(features[1].tempo);
    let hi = features[0].tempo.max(features[1].tempo);
    assert_eq!(profile.tempo_range, [lo, hi]);
    assert_relative_eq!(profile.tempo_mean, (features[0].tempo + features[1].tempo) / 2.0);
    for (band, value) in &profile.energy_profile {
        let expected = (features[0].band_energy[band] + features[1].band_energy[band]) / 2.0;
        assert_relative_eq!(*value, expected, epsilon = 1e-12);
    }

    let saved = dir.path().join("profile").join("style.json");
    profile.save(&saved).unwrap();
    assert_eq!(StyleProfile::load(&saved).unwrap(), profile);

    let prompt = build_backing_prompt(&profile, "Sparse percussion with a warm low tone.");
    assert!(prompt.starts_with("Sparse percussion with a warm low tone. Keep the groove around"));
}

#[test]
fn sketch_from_profile_to_mix() {
    let dir = TempDir::new().unwrap();
    let profile = StyleProfile {
        tempo_range: [110.0, 130.0],
        tempo_mean: 120.0,
        energy_profile: [("low", 0.4), ("mid", 0.3), ("high", 0.2)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect(),
    };
    let lyrics = parse_lyrics("first line\nsecond line");

    let score = generate_melody(&profile, &lyrics, None, &MelodyConfig::default()).unwrap();
    assert_eq!(score.tempo_bpm, 120.0);
    assert_eq!(score.notes.len(), 8);
    let melody_path = dir.path().join("melody.json");
    score.save(&melody_path).unwrap();
    assert_eq!(MelodyScore::load(&melody_path).unwrap(), score);

    let vocal_path = dir.path().join("vocals").join("take.wav");
    let registry = BackendRegistry::with_defaults(&VocalsConfig::default());
    let req = VocalRequest {
        melody_path: &melody_path,
        lyrics: &lyrics,
        out_path: &vocal_path,
        voice_ref: None,
        duration: Some(1.0),
    };
    let written = registry.synthesize("placeholder", &req).unwrap();
    assert_eq!(written, vocal_path);
    assert!(vocal_path.with_extension("json").exists());

    let backing = dir.path().join("backing.wav");
    write_sine(&backing, 220.0, 2.0, 48000);
    let out = dir.path().join("final.wav");
    mix_backing_and_vocal(&backing, &vocal_path, &out, -3.0).unwrap();

    let original = read_wav(&backing).unwrap();
    let mix = read_wav(&out).unwrap();
    assert_eq!(mix.sample_rate, 48000);
    assert_eq!(mix.num_channels(), 2);
    assert_eq!(mix.num_samples(), 96000);
    // the placeholder take is silent, so the mix is the backing in both channels
    for ch in &mix.channels {
        for (a, b) in ch.iter().zip(&original.channels[0]) {
            assert!((a - b).abs() < 1e-6);
        }
    }
}
