use std::path::{Path, PathBuf};

use super::resample::resample_buffer;
use crate::audio::wav::{read_wav, write_wav};
use crate::audio::AudioBuffer;
use crate::error::Result;

pub const DEFAULT_VOCAL_GAIN_DB: f64 = -3.0;

/// Peak the mix is scaled to when the summed signal would clip.
pub const HEADROOM_PEAK: f32 = 0.99;

pub fn db_to_gain(db: f64) -> f32 {
    10f64.powf(db / 20.0) as f32
}

/// Sum a backing track and a vocal into a stereo mix at the backing's rate.
///
/// The vocal is resampled (linear) when rates differ, the shorter signal is
/// zero-padded, and the result is scaled to [`HEADROOM_PEAK`] only if it
/// would otherwise exceed full scale.
pub fn mix_buffers(backing: &AudioBuffer, vocal: &AudioBuffer, vocal_gain_db: f64) -> AudioBuffer {
    let mut backing = backing.to_stereo();
    let mut vocal = vocal.to_stereo();

    if vocal.sample_rate != backing.sample_rate {
        vocal = resample_buffer(&vocal, backing.sample_rate, backing.num_samples());
    }

    let len = backing.num_samples().max(vocal.num_samples());
    backing.pad_to(len);
    vocal.pad_to(len);

    let gain = db_to_gain(vocal_gain_db);
    let mut mix = backing;
    for (mix_ch, vocal_ch) in mix.channels.iter_mut().zip(&vocal.channels) {
        for (m, v) in mix_ch.iter_mut().zip(vocal_ch) {
            *m += v * gain;
        }
    }

    let peak = mix.peak();
    if peak > 1.0 {
        log::debug!("Mix peak {:.3} exceeds full scale, normalizing to {}", peak, HEADROOM_PEAK);
        mix.scale(HEADROOM_PEAK / peak);
    }
    mix
}

/// Read both files, mix them and write a 32-bit float WAV to `out_path`.
pub fn mix_backing_and_vocal(
    backing_path: &Path,
    vocal_path: &Path,
    out_path: &Path,
    vocal_gain_db: f64,
) -> Result<PathBuf> {
    let backing = read_wav(backing_path)?;
    let vocal = read_wav(vocal_path)?;
    log::info!(
        "Mixing backing {} ({} Hz, {} ch) with vocal {} ({} Hz, {} ch) at {:+.1} dB",
        backing_path.display(),
        backing.sample_rate,
        backing.num_channels(),
        vocal_path.display(),
        vocal.sample_rate,
        vocal.num_channels(),
        vocal_gain_db
    );

    let mix = mix_buffers(&backing, &vocal, vocal_gain_db);
    write_wav(out_path, &mix)?;
    log::info!("Final mix written to {}", out_path.display());
    Ok(out_path.to_path_buf())
}
