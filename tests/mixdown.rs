use approx::assert_relative_eq;
use songsmith::audio::wav::read_wav;
use songsmith::mix::backing::HEADROOM_PEAK;
use songsmith::{create_final_mix, mix_backing_and_vocal, mix_stems, Error};
use std::f32::consts::PI;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write interleaved 16-bit PCM, the way most recorders deliver stems.
fn write_pcm16(path: &Path, channels: &[Vec<f32>], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..channels[0].len() {
        for ch in channels {
            writer.write_sample((ch[i] * 32767.0).round() as i16).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn write_float(path: &Path, channels: &[Vec<f32>], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..channels[0].len() {
        for ch in channels {
            writer.write_sample(ch[i]).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn constant(dir: &TempDir, name: &str, value: f32, len: usize, sample_rate: u32) -> PathBuf {
    let path = dir.path().join(name);
    write_float(&path, &[vec![value; len]], sample_rate);
    path
}

fn sine(freq: f32, len: usize, sample_rate: u32) -> Vec<f32> {
    (0..len)
        .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

#[test]
fn stems_are_averaged_with_padding() {
    let dir = TempDir::new().unwrap();
    let a = constant(&dir, "a.wav", 0.5, 1600, 16000);
    let b = constant(&dir, "b.wav", -0.5, 800, 16000);
    let out = dir.path().join("mix.wav");

    let written = mix_stems(&[a, b], &out).unwrap();
    assert_eq!(written, out);

    let mix = read_wav(&out).unwrap();
    assert_eq!(mix.sample_rate, 16000);
    assert_eq!(mix.num_channels(), 1);
    assert_eq!(mix.num_samples(), 1600);
    assert!(mix.channels[0][..800].iter().all(|&s| s.abs() < 1e-6));
    assert!(mix.channels[0][800..].iter().all(|&s| (s - 0.25).abs() < 1e-6));
}

#[test]
fn stems_need_two_inputs() {
    let dir = TempDir::new().unwrap();
    let single = constant(&dir, "single.wav", 0.2, 100, 16000);
    let out = dir.path().join("mix.wav");

    let err = mix_stems(&[single], &out).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(!out.exists());
}

#[test]
fn stems_with_different_rates_are_rejected() {
    let dir = TempDir::new().unwrap();
    let a = constant(&dir, "a.wav", 0.1, 100, 16000);
    let b = constant(&dir, "b.wav", 0.1, 100, 22050);
    let out = dir.path().join("mix.wav");

    let err = mix_stems(&[a, b], &out).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(!out.exists());
}

#[test]
fn stereo_stems_are_reduced_to_mono() {
    let dir = TempDir::new().unwrap();
    let stereo = dir.path().join("stereo.wav");
    write_float(&stereo, &[vec![0.6; 10], vec![0.2; 10]], 8000);
    let mono = constant(&dir, "mono.wav", 0.0, 10, 8000);
    let out = dir.path().join("mix.wav");

    mix_stems(&[stereo, mono], &out).unwrap();
    let mix = read_wav(&out).unwrap();
    assert!(mix.channels[0].iter().all(|&s| (s - 0.2).abs() < 1e-6));
}

#[test]
fn final_mix_averages_accompaniment_and_vocal() {
    let dir = TempDir::new().unwrap();
    let a = constant(&dir, "a.wav", 0.4, 200, 16000);
    let b = constant(&dir, "b.wav", 0.4, 200, 16000);
    let vocals = constant(&dir, "vocals.wav", -0.4, 200, 16000);
    let out = dir.path().join("final.wav");

    create_final_mix(&[a, b], &vocals, &out).unwrap();
    let mix = read_wav(&out).unwrap();
    assert_eq!(mix.sample_rate, 16000);
    for &s in &mix.channels[0] {
        assert_relative_eq!(s, 0.4 / 3.0, epsilon = 1e-3);
    }
}

#[test]
fn vocal_is_resampled_to_backing_rate() {
    let dir = TempDir::new().unwrap();
    let (sr_back, sr_vocal) = (48000, 44100);
    let (len_back, len_vocal) = (sr_back as usize / 2, sr_vocal as usize / 2);

    let backing = dir.path().join("back.wav");
    let tone = sine(100.0, len_back, sr_back);
    write_pcm16(&backing, &[tone.clone(), tone], sr_back);
    let vocal = dir.path().join("voc.wav");
    write_pcm16(&vocal, &[sine(200.0, len_vocal, sr_vocal)], sr_vocal);

    let out = dir.path().join("nested").join("mix.wav");
    mix_backing_and_vocal(&backing, &vocal, &out, -6.0).unwrap();

    let mix = read_wav(&out).unwrap();
    assert_eq!(mix.sample_rate, sr_back);
    assert_eq!(mix.num_channels(), 2);
    assert_eq!(mix.num_samples(), len_back);
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
    // 1.0 + 0.5 exceeds full scale, so the mix is pulled down to the headroom peak
    assert_relative_eq!(mix.peak(), HEADROOM_PEAK, epsilon = 1e-4);
}

#[test]
fn quiet_mix_is_written_unscaled() {
    let dir = TempDir::new().unwrap();
    let backing = constant(&dir, "back.wav", 0.25, 400, 22050);
    let vocal = constant(&dir, "voc.wav", 0.5, 200, 22050);
    let out = dir.path().join("mix.wav");

    mix_backing_and_vocal(&backing, &vocal, &out, 0.0).unwrap();
    let mix = read_wav(&out).unwrap();
    assert_eq!(mix.num_samples(), 400);
    for ch in &mix.channels {
        assert!(ch[..200].iter().all(|&s| (s - 0.75).abs() < 1e-6));
        assert!(ch[200..].iter().all(|&s| (s - 0.25).abs() < 1e-6));
    }
}

#[test]
fn missing_backing_is_not_found() {
    let dir = TempDir::new().unwrap();
    let vocal = constant(&dir, "voc.wav", 0.5, 10, 8000);
    let out = dir.path().join("mix.wav");
    let err = mix_backing_and_vocal(&dir.path().join("nope.wav"), &vocal, &out, -3.0).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(!out.exists());
}
