pub mod analysis;
pub mod buffer;
pub mod decode;
pub mod features;
pub mod wav;

pub use analysis::{analyze, analyze_many, analyze_samples};
pub use buffer::AudioBuffer;
pub use decode::discover_audio_files;
pub use features::{BandEnergy, FrequencyBand, TrackFeatures, FREQUENCY_BANDS};
