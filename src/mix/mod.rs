pub mod backing;
pub mod resample;
pub mod stems;

pub use backing::{mix_backing_and_vocal, mix_buffers, DEFAULT_VOCAL_GAIN_DB};
pub use stems::{create_final_mix, mix_stems};
