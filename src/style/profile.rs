use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::audio::features::{band_names, BandEnergy, TrackFeatures};
use crate::error::{ensure_exists, Error, Result};

/// Collection-level summary of a set of reference tracks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    /// `[min, max]` BPM
    pub tempo_range: [f64; 2],
    pub tempo_mean: f64,
    pub energy_profile: BandEnergy,
}

impl StyleProfile {
    /// Energy entries with the known bands first (low, mid, high), then any
    /// others in name order.
    pub fn bands_in_order(&self) -> Vec<(&str, f64)> {
        let mut out: Vec<(&str, f64)> = band_names()
            .filter_map(|name| self.energy_profile.get(name).map(|&v| (name, v)))
            .collect();
        for (name, &value) in &self.energy_profile {
            if !band_names().any(|known| known == name) {
                out.push((name.as_str(), value));
            }
        }
        out
    }

    pub fn load(path: &Path) -> Result<Self> {
        ensure_exists(path)?;
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Aggregate per-track features into a [`StyleProfile`].
///
/// The band set is taken from the first track; every other track must carry
/// each of those bands.
pub fn aggregate(features: &[TrackFeatures]) -> Result<StyleProfile> {
    let first = features
        .first()
        .ok_or_else(|| Error::InvalidArgument("features list must not be empty".into()))?;
    if first.band_energy.is_empty() {
        return Err(Error::InvalidArgument(
            "band_energy information is missing from features".into(),
        ));
    }

    let count = features.len() as f64;
    let min = features.iter().map(|f| f.tempo).fold(f64::INFINITY, f64::min);
    let max = features.iter().map(|f| f.tempo).fold(f64::NEG_INFINITY, f64::max);
    let tempo_mean = features.iter().map(|f| f.tempo).sum::<f64>() / count;

    let mut energy_profile = BandEnergy::new();
    for band in first.band_energy.keys() {
        let mut sum = 0.0;
        for (idx, f) in features.iter().enumerate() {
            let value = f.band_energy.get(band).ok_or_else(|| {
                Error::InconsistentData(format!("track {} has no '{}' band energy", idx, band))
            })?;
            sum += value;
        }
        energy_profile.insert(band.clone(), sum / count);
    }

    log::info!(
        "Style profile from {} tracks: tempo {:.1}-{:.1} BPM (mean {:.1})",
        features.len(),
        min,
        max,
        tempo_mean
    );

    Ok(StyleProfile {
        tempo_range: [min, max],
        tempo_mean,
        energy_profile,
    })
}
