use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "songsmith", about = "Reference-driven song sketching: style analysis, prompts and mixdown")]
pub struct Cli {
    /// Config file (defaults to songsmith.toml or ~/.config/songsmith/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze reference tracks (files or directories) into a style profile
    Analyze {
        /// Audio files or directories (WAV, MP3, FLAC, OGG, M4A)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write the style profile JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write per-track features as JSON
        #[arg(long)]
        features: Option<PathBuf>,
    },

    /// Build backing-track prompts from a style profile and a description
    Prompt {
        #[arg(long)]
        profile: PathBuf,

        /// Prose description of the style
        #[arg(long)]
        description: String,
    },

    /// Mix a backing track with a vocal track
    Mix {
        backing: PathBuf,

        /// Vocal WAV; defaults to the newest recording in the recorded directory
        vocal: Option<PathBuf>,

        #[arg(short, long, default_value = "output/final_mix.wav")]
        output: PathBuf,

        /// Vocal gain in dB relative to the backing
        #[arg(long, allow_hyphen_values = true)]
        gain_db: Option<f64>,
    },

    /// Average two or more stems into one mono WAV
    MixStems {
        #[arg(num_args = 2.., required = true)]
        stems: Vec<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate a placeholder melody for a profile and lyrics
    Melody {
        #[arg(long)]
        profile: PathBuf,

        /// Lyrics JSON (structured or plain text)
        #[arg(long)]
        lyrics: Option<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        bpm: Option<f64>,
    },

    /// Render vocals with a named backend
    Vocals {
        #[arg(long)]
        melody: PathBuf,

        #[arg(long)]
        lyrics: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// placeholder, ai, voice_clone or diffsinger
        #[arg(long)]
        backend: Option<String>,

        /// Directory of reference recordings for voice cloning engines
        #[arg(long)]
        voice_ref: Option<PathBuf>,

        /// Seconds of audio to render
        #[arg(long)]
        duration: Option<f64>,
    },
}
