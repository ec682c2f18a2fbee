use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};
use std::path::{Path, PathBuf};

use super::decode::decode_mono;
use super::features::{BandEnergy, TrackFeatures, FREQUENCY_BANDS};
use crate::config::AnalysisConfig;
use crate::error::{ensure_exists, Error, Result};

/// Magnitude spectrogram, `frames[t][k]` for bins `0..=n_fft/2`.
pub struct Spectrogram {
    pub frames: Vec<Vec<f32>>,
    pub n_fft: usize,
    pub hop_length: usize,
    pub sample_rate: u32,
}

impl Spectrogram {
    pub fn num_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate as f64 / self.n_fft as f64
    }
}

/// Tempo, duration and band energies of one audio file.
pub fn analyze(path: &Path, cfg: &AnalysisConfig) -> Result<TrackFeatures> {
    ensure_exists(path)?;
    let audio = decode_mono(path)?;
    let features = analyze_samples(&audio.samples, audio.sample_rate, cfg)?;
    log::info!(
        "Analyzed {}: tempo={:.1} BPM, duration={:.1}s",
        path.display(),
        features.tempo,
        features.duration
    );
    Ok(features)
}

/// Analyze every path in parallel. Results keep input order; the first failure aborts.
pub fn analyze_many(paths: &[PathBuf], cfg: &AnalysisConfig) -> Result<Vec<TrackFeatures>> {
    paths.par_iter().map(|p| analyze(p, cfg)).collect()
}

pub fn analyze_samples(samples: &[f32], sample_rate: u32, cfg: &AnalysisConfig) -> Result<TrackFeatures> {
    if sample_rate == 0 {
        return Err(Error::InvalidArgument("sample rate must be positive".into()));
    }
    if cfg.n_fft < 2 || cfg.hop_length == 0 {
        return Err(Error::InvalidArgument(format!(
            "invalid STFT parameters: n_fft={}, hop_length={}",
            cfg.n_fft, cfg.hop_length
        )));
    }

    let spec = stft_magnitude(samples, sample_rate, cfg.n_fft, cfg.hop_length);
    let band_energy = band_energies(&spec);
    let tempo = estimate_tempo(&spec, cfg);
    let duration = samples.len() as f64 / sample_rate as f64;

    log::debug!(
        "{} STFT frames, band energy {:?}, tempo {:.1}",
        spec.frames.len(),
        band_energy,
        tempo
    );

    Ok(TrackFeatures {
        tempo,
        duration,
        band_energy,
    })
}

/// Centered STFT: the signal is zero-padded by `n_fft / 2` on both sides so
/// frame `t` is centered on sample `t * hop_length`.
pub fn stft_magnitude(samples: &[f32], sample_rate: u32, n_fft: usize, hop_length: usize) -> Spectrogram {
    let pad = n_fft / 2;
    let n_frames = 1 + samples.len() / hop_length;
    let num_bins = n_fft / 2 + 1;

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let hann = hann_window(n_fft);

    let frames = (0..n_frames)
        .into_par_iter()
        .map(|t| {
            let center = t * hop_length;
            let mut buffer: Vec<Complex<f32>> = (0..n_fft)
                .map(|i| {
                    let s = (center + i)
                        .checked_sub(pad)
                        .and_then(|idx| samples.get(idx))
                        .copied()
                        .unwrap_or(0.0);
                    Complex::new(s * hann[i], 0.0)
                })
                .collect();
            fft.process(&mut buffer);
            buffer[..num_bins].iter().map(|c| c.norm()).collect()
        })
        .collect();

    Spectrogram {
        frames,
        n_fft,
        hop_length,
        sample_rate,
    }
}

/// Mean magnitude over every bin inside each band and every frame. A band
/// without bins (e.g. above Nyquist) is 0.0.
pub fn band_energies(spec: &Spectrogram) -> BandEnergy {
    let mut energies = BandEnergy::new();
    for band in &FREQUENCY_BANDS {
        let bins: Vec<usize> = (0..spec.num_bins())
            .filter(|&k| band.contains(spec.bin_frequency(k)))
            .collect();

        let count = bins.len() * spec.frames.len();
        let energy = if count == 0 {
            0.0
        } else {
            let sum: f64 = spec
                .frames
                .iter()
                .map(|frame| bins.iter().map(|&k| frame[k] as f64).sum::<f64>())
                .sum();
            sum / count as f64
        };
        energies.insert(band.name.to_string(), energy);
    }
    energies
}

/// Positive spectral flux of log-compressed magnitudes, one value per frame.
pub fn onset_envelope(spec: &Spectrogram) -> Vec<f64> {
    let mut envelope = vec![0.0f64; spec.frames.len()];
    for t in 1..spec.frames.len() {
        envelope[t] = spec.frames[t]
            .iter()
            .zip(spec.frames[t - 1].iter())
            .map(|(&cur, &prev)| ((cur as f64).ln_1p() - (prev as f64).ln_1p()).max(0.0))
            .sum();
    }
    envelope
}

/// Autocorrelation of the onset envelope over the lags in `[min_bpm, max_bpm]`,
/// weighted by a log-normal prior around `start_bpm`. Returns 0.0 when there
/// is no periodic onset structure to measure.
pub fn estimate_tempo(spec: &Spectrogram, cfg: &AnalysisConfig) -> f64 {
    let envelope = onset_envelope(spec);
    let n = envelope.len();
    let peak = envelope.iter().copied().fold(0.0f64, f64::max);
    if n < 4 || peak <= 1e-9 {
        return 0.0;
    }

    let mean = envelope.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = envelope.iter().map(|v| v - mean).collect();

    let frame_rate = spec.sample_rate as f64 / spec.hop_length as f64;
    let min_lag = ((frame_rate * 60.0 / cfg.max_bpm).floor() as usize).max(1);
    let max_lag = ((frame_rate * 60.0 / cfg.min_bpm).ceil() as usize).min(n - 2);
    if min_lag > max_lag {
        return 0.0;
    }

    // scores[i] belongs to lag min_lag + i
    let scores: Vec<f64> = (min_lag..=max_lag)
        .map(|lag| {
            let terms = n - lag;
            let ac = (0..terms).map(|i| centered[i] * centered[i + lag]).sum::<f64>() / terms as f64;
            let bpm = 60.0 * frame_rate / lag as f64;
            let octaves = (bpm / cfg.start_bpm).log2();
            ac * (-0.5 * octaves * octaves).exp()
        })
        .collect();

    let Some((best, &best_score)) = scores
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
    else {
        return 0.0;
    };
    if best_score <= 0.0 {
        return 0.0;
    }

    let mut lag = (min_lag + best) as f64;
    if best > 0 && best + 1 < scores.len() {
        let (left, right) = (scores[best - 1], scores[best + 1]);
        let denom = left - 2.0 * best_score + right;
        if denom < 0.0 {
            lag += 0.5 * (left - right) / denom;
        }
    }

    60.0 * frame_rate / lag
}

/// Periodic Hann window (denominator `size`), as used for spectral analysis.
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / size as f32).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, amp: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| amp * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    fn click_track(bpm: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        let period = (60.0 / bpm * sample_rate as f32) as usize;
        let click_len = sample_rate as usize / 50;
        let mut out = vec![0.0f32; n];
        for start in (0..n).step_by(period) {
            for i in 0..click_len.min(n - start) {
                let t = i as f32 / sample_rate as f32;
                let decay = 1.0 - i as f32 / click_len as f32;
                out[start + i] = 0.8 * decay * (2.0 * std::f32::consts::PI * 1000.0 * t).sin();
            }
        }
        out
    }

    #[test]
    fn sine_features_have_fixed_band_keys() {
        let samples = sine(440.0, 0.5, 22050, 1.0);
        let f = analyze_samples(&samples, 22050, &AnalysisConfig::default()).unwrap();

        assert!((f.duration - 1.0).abs() < 0.05);
        assert!(f.tempo >= 0.0);
        let keys: Vec<&str> = f.band_energy.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["high", "low", "mid"]);
        assert!(f.band_energy.values().all(|&v| v >= 0.0));
        assert!(f.band_energy["mid"] > f.band_energy["low"]);
        assert!(f.band_energy["mid"] > f.band_energy["high"]);
    }

    #[test]
    fn bass_tone_lands_in_low_band() {
        let samples = sine(100.0, 0.5, 22050, 1.0);
        let f = analyze_samples(&samples, 22050, &AnalysisConfig::default()).unwrap();
        assert!(f.band_energy["low"] > f.band_energy["mid"]);
        assert!(f.band_energy["low"] > f.band_energy["high"]);
    }

    #[test]
    fn bands_above_nyquist_are_zero() {
        // Nyquist is 50 Hz: only the low band has bins.
        let samples = sine(30.0, 0.5, 100, 2.0);
        let f = analyze_samples(&samples, 100, &AnalysisConfig::default()).unwrap();
        assert_eq!(f.band_energy["mid"], 0.0);
        assert_eq!(f.band_energy["high"], 0.0);
        assert!(f.band_energy["low"] > 0.0);
    }

    #[test]
    fn silence_has_zero_tempo() {
        let samples = vec![0.0f32; 22050];
        let f = analyze_samples(&samples, 22050, &AnalysisConfig::default()).unwrap();
        assert_eq!(f.tempo, 0.0);
        assert!(f.band_energy.values().all(|&v| v == 0.0));
    }

    #[test]
    fn click_track_tempo_is_recovered() {
        let samples = click_track(120.0, 22050, 8.0);
        let f = analyze_samples(&samples, 22050, &AnalysisConfig::default()).unwrap();
        assert!(f.tempo > 110.0 && f.tempo < 130.0, "tempo = {}", f.tempo);
    }

    #[test]
    fn centered_frame_count() {
        let samples = vec![0.0f32; 1000];
        let spec = stft_magnitude(&samples, 8000, 256, 100);
        assert_eq!(spec.frames.len(), 11);
        assert!(spec.frames.iter().all(|f| f.len() == 129));
        assert_eq!(spec.bin_frequency(128), 4000.0);
    }

    #[test]
    fn hann_window_is_periodic() {
        let w = hann_window(8);
        assert_eq!(w.len(), 8);
        assert_eq!(w[0], 0.0);
        assert!((w[4] - 1.0).abs() < 1e-6);
        assert!((w[2] - 0.5).abs() < 1e-6);
        for i in 1..8 {
            assert!((w[i] - w[8 - i]).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let err = analyze_samples(&[0.0; 10], 0, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = analyze(Path::new("/no/such/track.mp3"), &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
