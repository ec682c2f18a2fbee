use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{VocalBackend, VocalRequest};
use crate::audio::wav::write_wav;
use crate::audio::AudioBuffer;
use crate::config::VocalsConfig;
use crate::error::{Error, Result};

const MIN_DURATION: f64 = 0.1;

/// Writes silence of the requested length and a JSON manifest next to it.
pub struct PlaceholderBackend {
    pub sample_rate: u32,
}

#[derive(Serialize)]
struct Manifest<'a> {
    backend: &'a str,
    melody_path: &'a Path,
    lyrics_title: &'a str,
    lyrics_theme: Option<&'a str>,
    output_wav: &'a Path,
    reference_voice_dir: Option<&'a Path>,
    sample_rate: u32,
    duration: f64,
}

impl PlaceholderBackend {
    pub fn from_config(cfg: &VocalsConfig) -> Self {
        Self {
            sample_rate: cfg.sample_rate,
        }
    }

    pub fn manifest_path(out_path: &Path) -> PathBuf {
        out_path.with_extension("json")
    }
}

impl VocalBackend for PlaceholderBackend {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn synthesize(&self, req: &VocalRequest) -> Result<PathBuf> {
        let duration = req.duration.ok_or_else(|| {
            Error::InvalidArgument("duration is required for the placeholder vocal backend".into())
        })?;
        let duration = duration.max(MIN_DURATION);
        log::warn!("No singing synthesis engine in use; writing {:.1}s of silence", duration);

        let num_samples = (self.sample_rate as f64 * duration) as usize;
        let silence = AudioBuffer::mono(vec![0.0; num_samples], self.sample_rate);
        write_wav(req.out_path, &silence)?;

        let manifest = Manifest {
            backend: self.name(),
            melody_path: req.melody_path,
            lyrics_title: &req.lyrics.title,
            lyrics_theme: req.lyrics.theme.as_deref(),
            output_wav: req.out_path,
            reference_voice_dir: req.voice_ref,
            sample_rate: self.sample_rate,
            duration,
        };
        std::fs::write(
            Self::manifest_path(req.out_path),
            serde_json::to_string_pretty(&manifest)?,
        )?;
        Ok(req.out_path.to_path_buf())
    }
}
