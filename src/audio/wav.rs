use std::path::Path;

use super::buffer::AudioBuffer;
use crate::error::{ensure_exists, Result};

/// Read a WAV file into planar channels. Integer formats are scaled to [-1, 1).
pub fn read_wav(path: &Path) -> Result<AudioBuffer> {
    ensure_exists(path)?;
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let num_channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let num_samples = interleaved.len() / num_channels;
    let mut channels = vec![Vec::with_capacity(num_samples); num_channels];
    for frame in interleaved.chunks_exact(num_channels) {
        for (ch, &sample) in channels.iter_mut().zip(frame) {
            ch.push(sample);
        }
    }

    Ok(AudioBuffer::new(channels, spec.sample_rate))
}

/// Write 32-bit float WAV, creating parent directories as needed.
pub fn write_wav(path: &Path, audio: &AudioBuffer) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let spec = hound::WavSpec {
        channels: audio.num_channels().max(1) as u16,
        sample_rate: audio.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    if audio.channels.is_empty() {
        writer.finalize()?;
        return Ok(());
    }
    for i in 0..audio.num_samples() {
        for ch in &audio.channels {
            writer.write_sample(ch.get(i).copied().unwrap_or(0.0))?;
        }
    }
    writer.finalize()?;

    log::debug!(
        "Wrote {}: {} ch, {} samples @ {}Hz",
        path.display(),
        audio.num_channels(),
        audio.num_samples(),
        audio.sample_rate
    );
    Ok(())
}
