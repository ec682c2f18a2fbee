mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;

use cli::{Cli, Command};
use songsmith::audio::{analyze, discover_audio_files, TrackFeatures};
use songsmith::config::{self, Config};
use songsmith::lyrics::LyricsDocument;
use songsmith::melody::{generate_melody, MelodyScore};
use songsmith::style::{aggregate, build_backing_prompt, prompt_variations, StyleProfile};
use songsmith::vocals::{find_latest_recorded_vocal, BackendRegistry, VocalRequest};
use songsmith::{mix_backing_and_vocal, mix_stems};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let cfg = match config::find_config_path(cli.config.as_deref()) {
        Some(path) => match config::load_config(&path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                Config::default()
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Command::Analyze { inputs, output, features } => run_analyze(&cfg, &inputs, output, features),
        Command::Prompt { profile, description } => {
            let profile = StyleProfile::load(&profile)?;
            let base = build_backing_prompt(&profile, &description);
            println!("{}", base);
            for variation in prompt_variations(&base) {
                println!("{}", variation);
            }
            Ok(())
        }
        Command::Mix { backing, vocal, output, gain_db } => {
            let vocal = match vocal {
                Some(v) => v,
                None => find_latest_recorded_vocal(&cfg.vocals.recorded_dir).with_context(|| {
                    format!("No vocal given and no recordings in {}", cfg.vocals.recorded_dir.display())
                })?,
            };
            let gain_db = gain_db.unwrap_or(cfg.mix.vocal_gain_db);
            let out = mix_backing_and_vocal(&backing, &vocal, &output, gain_db)
                .with_context(|| format!("Failed to mix {} with {}", backing.display(), vocal.display()))?;
            println!("{}", out.display());
            Ok(())
        }
        Command::MixStems { stems, output } => {
            let out = mix_stems(&stems, &output).context("Failed to mix stems")?;
            println!("{}", out.display());
            Ok(())
        }
        Command::Melody { profile, lyrics, output, bpm } => {
            let profile = StyleProfile::load(&profile)?;
            let lyrics = match lyrics {
                Some(path) => LyricsDocument::load(&path)?,
                None => LyricsDocument {
                    title: "Untitled".into(),
                    language: "zh".into(),
                    theme: None,
                    sections: Vec::new(),
                },
            };
            let score = generate_melody(&profile, &lyrics, bpm, &cfg.melody)?;
            score.save(&output)?;
            println!("{}", output.display());
            Ok(())
        }
        Command::Vocals { melody, lyrics, output, backend, voice_ref, duration } => {
            let backend = backend.unwrap_or_else(|| cfg.vocals.backend.clone());
            let score = MelodyScore::load(&melody)?;
            let lyrics = LyricsDocument::load(&lyrics)?;
            // Without an explicit duration, render the whole melody
            let duration = duration.or_else(|| melody_seconds(&score));

            let registry = BackendRegistry::with_defaults(&cfg.vocals);
            let req = VocalRequest {
                melody_path: &melody,
                lyrics: &lyrics,
                out_path: &output,
                voice_ref: voice_ref.as_deref(),
                duration,
            };
            let out = registry.synthesize(&backend, &req)?;
            println!("{}", out.display());
            Ok(())
        }
    }
}

fn melody_seconds(score: &MelodyScore) -> Option<f64> {
    let beats = score
        .notes
        .iter()
        .map(|n| n.start_beat + n.duration)
        .fold(0.0f64, f64::max);
    (beats > 0.0 && score.tempo_bpm > 0.0).then(|| beats * 60.0 / score.tempo_bpm)
}

fn run_analyze(
    cfg: &Config,
    inputs: &[PathBuf],
    output: Option<PathBuf>,
    features_out: Option<PathBuf>,
) -> Result<()> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(discover_audio_files(input)?);
        } else {
            paths.push(input.clone());
        }
    }
    if paths.is_empty() {
        anyhow::bail!("No reference audio files found in {:?}", inputs);
    }
    log::info!("Found {} reference tracks", paths.len());

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tracks ({eta} remaining)")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let features: Vec<TrackFeatures> = paths
        .par_iter()
        .map(|path| {
            let result = analyze(path, &cfg.analysis);
            pb.inc(1);
            result.with_context(|| format!("Failed to analyze {}", path.display()))
        })
        .collect::<Result<_>>()?;
    pb.finish_with_message("Analysis complete");

    if let Some(path) = features_out {
        std::fs::write(&path, serde_json::to_string_pretty(&features)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let profile = aggregate(&features)?;
    match output {
        Some(path) => {
            profile.save(&path)?;
            log::info!("Style profile written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&profile)?),
    }
    Ok(())
}
