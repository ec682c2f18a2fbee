use std::path::{Path, PathBuf};

use crate::audio::wav::{read_wav, write_wav};
use crate::audio::{buffer::peak, AudioBuffer};
use crate::error::{Error, Result};

/// Output rate used when no stem provided one.
const FALLBACK_SAMPLE_RATE: u32 = 44100;

/// Average mono stems sample by sample. Shorter stems are zero-padded at the
/// end; if the average exceeds full scale it is divided by its peak.
pub fn average_stems(stems: &[Vec<f32>]) -> Vec<f32> {
    let max_len = stems.iter().map(Vec::len).max().unwrap_or(0);
    if stems.is_empty() {
        return Vec::new();
    }

    let mut mix = vec![0.0f32; max_len];
    for stem in stems {
        for (m, s) in mix.iter_mut().zip(stem) {
            *m += s;
        }
    }
    let count = stems.len() as f32;
    mix.iter_mut().for_each(|m| *m /= count);

    let p = peak(&mix);
    if p > 1.0 {
        mix.iter_mut().for_each(|m| *m /= p);
    }
    mix
}

/// Mix two or more stems (each reduced to mono) into one mono WAV.
/// All stems must share one sample rate; nothing is resampled here.
pub fn mix_stems<P: AsRef<Path>>(stems: &[P], out_path: &Path) -> Result<PathBuf> {
    if stems.len() < 2 {
        return Err(Error::InvalidArgument("Provide at least two stems to mix.".into()));
    }

    let mut sample_rate: Option<u32> = None;
    let mut mono_stems = Vec::with_capacity(stems.len());
    for stem in stems {
        let path = stem.as_ref();
        let audio = read_wav(path)?;
        match sample_rate {
            None => sample_rate = Some(audio.sample_rate),
            Some(sr) if sr != audio.sample_rate => {
                return Err(Error::InvalidArgument(format!(
                    "All stems must share the same sample rate: {} is {} Hz, expected {} Hz",
                    path.display(),
                    audio.sample_rate,
                    sr
                )));
            }
            Some(_) => {}
        }
        mono_stems.push(audio.to_mono());
    }

    let mix = average_stems(&mono_stems);
    let out = AudioBuffer::mono(mix, sample_rate.unwrap_or(FALLBACK_SAMPLE_RATE));
    write_wav(out_path, &out)?;
    log::info!("Mixed {} stems into {}", stems.len(), out_path.display());
    Ok(out_path.to_path_buf())
}

/// Accompaniment stems plus the vocal, averaged with [`mix_stems`].
pub fn create_final_mix<P: AsRef<Path>>(accompaniment: &[P], vocals: &Path, out_path: &Path) -> Result<PathBuf> {
    let mut stems: Vec<PathBuf> = accompaniment.iter().map(|p| p.as_ref().to_path_buf()).collect();
    stems.push(vocals.to_path_buf());
    mix_stems(&stems, out_path)
}
