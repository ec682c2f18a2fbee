//! Vocal synthesis backends. Every backend turns a melody, lyrics and an
//! output path into a WAV file; the mixer treats all of them alike.

pub mod external;
pub mod placeholder;
pub mod recorded;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::VocalsConfig;
use crate::error::{Error, Result};
use crate::lyrics::LyricsDocument;

pub use external::ExternalEngine;
pub use placeholder::PlaceholderBackend;
pub use recorded::find_latest_recorded_vocal;

pub struct VocalRequest<'a> {
    pub melody_path: &'a Path,
    pub lyrics: &'a LyricsDocument,
    pub out_path: &'a Path,
    pub voice_ref: Option<&'a Path>,
    /// Seconds
    pub duration: Option<f64>,
}

pub trait VocalBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Render vocals for `req` and return the path of the written WAV.
    fn synthesize(&self, req: &VocalRequest) -> Result<PathBuf>;
}

/// Backends keyed by name.
#[derive(Default)]
pub struct BackendRegistry {
    backends: BTreeMap<String, Box<dyn VocalBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `placeholder`, plus `ai`, `voice_clone` and `diffsinger` driving the
    /// configured external engine command.
    pub fn with_defaults(cfg: &VocalsConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PlaceholderBackend::from_config(cfg)));
        for mode in ["ai", "voice_clone"] {
            registry.register(Box::new(ExternalEngine::new(mode, cfg, cfg.tmp_dir.clone())));
        }
        let diffsinger_tmp = cfg
            .tmp_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("outputs/vocals/tmp"));
        registry.register(Box::new(ExternalEngine::new("diffsinger", cfg, Some(diffsinger_tmp))));
        registry
    }

    pub fn register(&mut self, backend: Box<dyn VocalBackend>) {
        self.backends.insert(backend.name().to_string(), backend);
    }

    pub fn get(&self, name: &str) -> Option<&dyn VocalBackend> {
        self.backends.get(name).map(|b| b.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    pub fn synthesize(&self, name: &str, req: &VocalRequest) -> Result<PathBuf> {
        let backend = self.get(name).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "Unknown vocal backend '{}' (available: {})",
                name,
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })?;
        log::info!("Synthesizing vocals with '{}' -> {}", name, req.out_path.display());
        backend.synthesize(req)
    }
}
