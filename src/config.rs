use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub mix: MixConfig,
    #[serde(default)]
    pub vocals: VocalsConfig,
    #[serde(default)]
    pub melody: MelodyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_n_fft")]
    pub n_fft: usize,
    #[serde(default = "default_hop_length")]
    pub hop_length: usize,
    #[serde(default = "default_min_bpm")]
    pub min_bpm: f64,
    #[serde(default = "default_max_bpm")]
    pub max_bpm: f64,
    /// Centre of the tempo prior; ties between octave-related tempi resolve toward it.
    #[serde(default = "default_start_bpm")]
    pub start_bpm: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MixConfig {
    #[serde(default = "default_vocal_gain_db")]
    pub vocal_gain_db: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VocalsConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Shell command template for external singing engines, e.g.
    /// `engine --midi {midi} --lyrics {lyrics_txt} --out {out_wav}`.
    #[serde(default)]
    pub engine_cmd: Option<String>,
    #[serde(default)]
    pub tmp_dir: Option<PathBuf>,
    #[serde(default = "default_recorded_dir")]
    pub recorded_dir: PathBuf,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_duration")]
    pub default_duration: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MelodyConfig {
    #[serde(default = "default_bars")]
    pub bars: usize,
    #[serde(default = "default_beats_per_bar")]
    pub beats_per_bar: usize,
    #[serde(default = "default_max_interval")]
    pub max_interval: u8,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_fft: default_n_fft(),
            hop_length: default_hop_length(),
            min_bpm: default_min_bpm(),
            max_bpm: default_max_bpm(),
            start_bpm: default_start_bpm(),
        }
    }
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            vocal_gain_db: default_vocal_gain_db(),
        }
    }
}

impl Default for VocalsConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            engine_cmd: None,
            tmp_dir: None,
            recorded_dir: default_recorded_dir(),
            sample_rate: default_sample_rate(),
            default_duration: default_duration(),
        }
    }
}

impl Default for MelodyConfig {
    fn default() -> Self {
        Self {
            bars: default_bars(),
            beats_per_bar: default_beats_per_bar(),
            max_interval: default_max_interval(),
        }
    }
}

fn default_n_fft() -> usize { 2048 }
fn default_hop_length() -> usize { 512 }
fn default_min_bpm() -> f64 { 30.0 }
fn default_max_bpm() -> f64 { 300.0 }
fn default_start_bpm() -> f64 { 120.0 }
fn default_vocal_gain_db() -> f64 { -3.0 }
fn default_backend() -> String { "placeholder".into() }
fn default_recorded_dir() -> PathBuf { PathBuf::from("data/recorded") }
fn default_sample_rate() -> u32 { 44100 }
fn default_duration() -> f64 { 5.0 }
fn default_bars() -> usize { 4 }
fn default_beats_per_bar() -> usize { 4 }
fn default_max_interval() -> u8 { 7 }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            log::warn!("Invalid config {}: {}", path.display(), e);
            None
        }
    }
}

/// Explicit path first, then `songsmith.toml` in the working directory,
/// then the per-user config locations.
pub fn find_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("songsmith.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("songsmith").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("songsmith").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
