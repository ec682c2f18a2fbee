use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::MelodyConfig;
use crate::error::{ensure_exists, Error, Result};
use crate::lyrics::LyricsDocument;
use crate::style::StyleProfile;

const ROOT_C: i32 = 60;
const ROOT_A: i32 = 69;
const MAJOR: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR: [i32; 7] = [0, 2, 3, 5, 7, 8, 10];
const DEFAULT_TEMPO: f64 = 90.0;

/// One note event, positioned in beats.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MelodyNote {
    /// MIDI note number
    pub pitch: u8,
    pub start_beat: f64,
    pub duration: f64,
    pub velocity: u8,
}

/// A melody plus the tempo it should be rendered at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MelodyScore {
    pub tempo_bpm: f64,
    pub notes: Vec<MelodyNote>,
}

impl MelodyScore {
    pub fn save(&self, path: &Path) -> Result<()> {
        if self.notes.is_empty() {
            return Err(Error::InvalidArgument("notes must not be empty".into()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        ensure_exists(path)?;
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }
}

/// Major when the material is fast or bright, natural minor otherwise.
fn choose_scale(profile: Option<&StyleProfile>) -> (i32, &'static [i32; 7]) {
    let Some(profile) = profile else {
        return (ROOT_C, &MAJOR);
    };
    let band = |name: &str| profile.energy_profile.get(name).copied().unwrap_or(0.0);
    let energy_bias = band("high") - band("low");
    if profile.tempo_mean >= 112.0 || energy_bias >= 0.0 {
        (ROOT_C, &MAJOR)
    } else {
        (ROOT_A, &MINOR)
    }
}

/// Scale pitches from one octave below the root to two above, sorted.
fn scale_pool(root: i32, intervals: &[i32]) -> Vec<i32> {
    let mut pitches: Vec<i32> = (-1..=2)
        .flat_map(|octave| intervals.iter().map(move |i| root + i + 12 * octave))
        .collect();
    pitches.sort_unstable();
    pitches.dedup();
    pitches
}

/// Quarter-note random walk over the chosen scale. Deterministic for a given
/// profile: the generator is seeded from the integer part of `tempo_mean`.
pub fn generate_placeholder_melody(
    profile: Option<&StyleProfile>,
    bars: usize,
    beats_per_bar: usize,
    line_count: usize,
    max_interval: u8,
) -> Result<Vec<MelodyNote>> {
    let bars = bars.max(line_count);
    if bars == 0 {
        return Err(Error::InvalidArgument("bars must be positive".into()));
    }

    let (root, scale) = choose_scale(profile);
    let pool = scale_pool(root, scale);
    let seed = profile.map_or(0, |p| p.tempo_mean.max(0.0) as u64);
    let mut rng = Pcg32::seed_from_u64(seed);

    let total_steps = bars * beats_per_bar;
    let mut notes = Vec::with_capacity(total_steps);
    let mut last_pitch = root + scale[0];

    for step in 0..total_steps {
        let pitch = if notes.is_empty() {
            last_pitch
        } else {
            let candidates: Vec<i32> = pool
                .iter()
                .copied()
                .filter(|p| (p - last_pitch).abs() <= max_interval as i32)
                .collect();
            if candidates.is_empty() {
                last_pitch
            } else {
                candidates[rng.gen_range(0..candidates.len())]
            }
        };

        notes.push(MelodyNote {
            pitch: pitch.clamp(0, 127) as u8,
            start_beat: step as f64,
            duration: 1.0,
            velocity: 90,
        });
        last_pitch = pitch;

        if beats_per_bar > 0 && (step + 1) % beats_per_bar == 0 {
            last_pitch = root + scale[0];
        }
    }

    Ok(notes)
}

/// Melody sized to the lyrics: one bar per lyric line, or two per section
/// (at least `cfg.bars`) when there are no lines.
pub fn generate_melody(
    profile: &StyleProfile,
    lyrics: &LyricsDocument,
    bpm: Option<f64>,
    cfg: &MelodyConfig,
) -> Result<MelodyScore> {
    let tempo_bpm = bpm
        .filter(|b| *b > 0.0)
        .or_else(|| Some(profile.tempo_mean).filter(|t| *t > 0.0))
        .unwrap_or(DEFAULT_TEMPO);

    let line_count = lyrics.all_lines().len();
    let bars = if line_count > 0 {
        line_count
    } else {
        (lyrics.sections.len() * 2).max(cfg.bars)
    };

    let notes = generate_placeholder_melody(
        Some(profile),
        bars,
        cfg.beats_per_bar,
        line_count,
        cfg.max_interval,
    )?;
    log::info!("Melody: {} notes at {:.1} BPM", notes.len(), tempo_bpm);
    Ok(MelodyScore { tempo_bpm, notes })
}
