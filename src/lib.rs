//! Reference-driven song sketching: analyze reference tracks into a style
//! profile, derive prompts, lyrics and a placeholder melody from it, and mix
//! generated backing tracks with vocals.

pub mod audio;
pub mod config;
pub mod error;
pub mod llm;
pub mod lyrics;
pub mod melody;
pub mod mix;
pub mod style;
pub mod vocals;

pub use audio::{analyze, AudioBuffer, TrackFeatures};
pub use config::Config;
pub use error::{Error, Result};
pub use lyrics::{LyricsDocument, Section, SectionKind};
pub use melody::{MelodyNote, MelodyScore};
pub use mix::{create_final_mix, mix_backing_and_vocal, mix_stems};
pub use style::{aggregate, StyleProfile};
pub use vocals::{BackendRegistry, VocalBackend, VocalRequest};
