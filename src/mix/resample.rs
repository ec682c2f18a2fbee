use crate::audio::AudioBuffer;

/// Target length when converting `len` samples from `from_rate` to `to_rate`.
/// Half-way values round to even. Falls back to `fallback_len` when the
/// rounded result is not positive.
pub fn target_length(len: usize, from_rate: u32, to_rate: u32, fallback_len: usize) -> usize {
    let target = (len as f64 * to_rate as f64 / from_rate as f64).round_ties_even();
    if target >= 1.0 {
        target as usize
    } else {
        fallback_len.max(1)
    }
}

/// Linear interpolation onto `target_len` points spread uniformly over the
/// input's index range. Not band-limited.
pub fn resample_linear(samples: &[f32], target_len: usize) -> Vec<f32> {
    match (samples.len(), target_len) {
        (_, 0) => Vec::new(),
        (0, n) => vec![0.0; n],
        (1, n) => vec![samples[0]; n],
        (_, 1) => vec![samples[0]],
        (len, n) => {
            let step = (len - 1) as f64 / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    let pos = i as f64 * step;
                    let idx = (pos.floor() as usize).min(len - 1);
                    let frac = (pos - idx as f64) as f32;
                    match samples.get(idx + 1) {
                        Some(&next) => samples[idx] + (next - samples[idx]) * frac,
                        None => samples[idx],
                    }
                })
                .collect()
        }
    }
}

/// Resample every channel of `audio` to `to_rate`, using `fallback_len` when
/// the computed length collapses to zero.
pub fn resample_buffer(audio: &AudioBuffer, to_rate: u32, fallback_len: usize) -> AudioBuffer {
    if audio.sample_rate == to_rate || audio.sample_rate == 0 {
        return AudioBuffer::new(audio.channels.clone(), to_rate);
    }
    let target_len = target_length(audio.num_samples(), audio.sample_rate, to_rate, fallback_len);
    log::debug!(
        "Resampling {} -> {} Hz ({} -> {} samples)",
        audio.sample_rate,
        to_rate,
        audio.num_samples(),
        target_len
    );
    let channels = audio
        .channels
        .iter()
        .map(|ch| resample_linear(ch, target_len))
        .collect();
    AudioBuffer::new(channels, to_rate)
}
