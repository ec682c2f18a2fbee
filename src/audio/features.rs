use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Band name → mean spectral magnitude.
pub type BandEnergy = BTreeMap<String, f64>;

/// Named half-open frequency range `[low_hz, high_hz)`; `None` is unbounded above.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyBand {
    pub name: &'static str,
    pub low_hz: f64,
    pub high_hz: Option<f64>,
}

impl FrequencyBand {
    pub fn contains(&self, freq: f64) -> bool {
        freq >= self.low_hz && self.high_hz.map_or(true, |high| freq < high)
    }
}

pub const FREQUENCY_BANDS: [FrequencyBand; 3] = [
    FrequencyBand { name: "low", low_hz: 20.0, high_hz: Some(250.0) },
    FrequencyBand { name: "mid", low_hz: 250.0, high_hz: Some(2000.0) },
    FrequencyBand { name: "high", low_hz: 2000.0, high_hz: None },
];

/// Band names in table order (low, mid, high).
pub fn band_names() -> impl Iterator<Item = &'static str> {
    FREQUENCY_BANDS.iter().map(|b| b.name)
}

/// Per-track analysis result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackFeatures {
    /// Beats per minute
    pub tempo: f64,
    /// Seconds
    pub duration: f64,
    pub band_energy: BandEnergy,
}
