use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::placeholder::PlaceholderBackend;
use super::{VocalBackend, VocalRequest};
use crate::config::VocalsConfig;
use crate::error::{Error, Result};

/// Runs a configured singing engine through `sh -c`, falling back to the
/// placeholder when the engine fails or leaves no output.
pub struct ExternalEngine {
    mode: String,
    command: Option<String>,
    tmp_dir: Option<PathBuf>,
    default_duration: f64,
    fallback: PlaceholderBackend,
}

impl ExternalEngine {
    pub fn new(mode: &str, cfg: &VocalsConfig, tmp_dir: Option<PathBuf>) -> Self {
        Self {
            mode: mode.to_string(),
            command: cfg.engine_cmd.clone(),
            tmp_dir,
            default_duration: cfg.default_duration,
            fallback: PlaceholderBackend::from_config(cfg),
        }
    }

    /// Prepare lyric files, run the engine, and report whether it produced output.
    fn run_engine(&self, template: &str, req: &VocalRequest, duration: f64) -> Result<bool> {
        let tmp = match &self.tmp_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                tempfile::Builder::new().prefix("vocals-").tempdir_in(dir)?
            }
            None => tempfile::Builder::new().prefix("vocals-").tempdir()?,
        };

        let lyrics_json = tmp.path().join("lyrics.json");
        let lyrics_txt = tmp.path().join("lyrics.txt");
        std::fs::write(&lyrics_json, serde_json::to_string_pretty(req.lyrics)?)?;
        std::fs::write(&lyrics_txt, req.lyrics.to_plain_lines())?;

        if let Some(parent) = req.out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let melody = req.melody_path.display().to_string();
        let out = req.out_path.display().to_string();
        let reference = req.voice_ref.map(|p| p.display().to_string()).unwrap_or_default();
        let values: HashMap<&str, String> = HashMap::from([
            ("melody_midi", melody.clone()),
            ("midi", melody.clone()),
            ("melody", melody),
            ("lyrics_json", lyrics_json.display().to_string()),
            ("lyrics_txt", lyrics_txt.display().to_string()),
            ("output_wav", out.clone()),
            ("out_wav", out),
            ("reference_voice_dir", reference.clone()),
            ("ref_dir", reference),
            ("duration_seconds", format!("{:?}", duration)),
            ("mode", self.mode.clone()),
        ]);
        let command = render_command(template, &values)?;
        log::debug!("[vocals:{}] running: {}", self.mode, command);

        let status = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .stdin(Stdio::null())
            .status();
        match status {
            Ok(s) if s.success() => {}
            Ok(s) => {
                log::warn!("[vocals:{}] command failed: {}", self.mode, s);
                return Ok(false);
            }
            Err(e) => {
                log::warn!("[vocals:{}] failed to spawn engine: {}", self.mode, e);
                return Ok(false);
            }
        }

        let produced = std::fs::metadata(req.out_path).map(|m| m.len() > 0).unwrap_or(false);
        if !produced {
            log::warn!("[vocals:{}] output file missing or empty", self.mode);
        }
        Ok(produced)
    }
}

impl VocalBackend for ExternalEngine {
    fn name(&self) -> &str {
        &self.mode
    }

    fn synthesize(&self, req: &VocalRequest) -> Result<PathBuf> {
        let template = self.command.as_deref().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "vocal backend '{}' needs vocals.engine_cmd to be configured",
                self.mode
            ))
        })?;
        let duration = req.duration.unwrap_or(self.default_duration);

        if self.run_engine(template, req, duration)? {
            return Ok(req.out_path.to_path_buf());
        }

        log::warn!("[vocals:{}] falling back to placeholder vocals", self.mode);
        let fallback_req = VocalRequest {
            duration: Some(duration),
            ..*req
        };
        self.fallback.synthesize(&fallback_req)
    }
}

/// Substitute `{name}` placeholders; `{{` and `}}` are literal braces.
pub fn render_command(template: &str, values: &HashMap<&str, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => key.push(ch),
                        None => {
                            return Err(Error::InvalidArgument(format!(
                                "unterminated placeholder in engine command: {}",
                                template
                            )))
                        }
                    }
                }
                let value = values.get(key.as_str()).ok_or_else(|| {
                    Error::InvalidArgument(format!("Missing placeholder in engine command template: {}", key))
                })?;
                out.push_str(value);
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::parse_lyrics;
    use std::path::Path;

    fn values() -> HashMap<&'static str, String> {
        HashMap::from([("midi", "/m.mid".to_string()), ("out", "/o.wav".to_string())])
    }

    #[test]
    fn renders_placeholders() {
        let cmd = render_command("echo midi={midi} out={out} {{raw}}", &values()).unwrap();
        assert_eq!(cmd, "echo midi=/m.mid out=/o.wav {raw}");
    }

    #[test]
    fn unknown_placeholder_is_invalid() {
        let err = render_command("run {bogus}", &values()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(render_command("run {midi", &values()).is_err());
    }

    fn config(cmd: &str, dir: &Path) -> VocalsConfig {
        VocalsConfig {
            engine_cmd: Some(cmd.to_string()),
            tmp_dir: Some(dir.join("tmp")),
            sample_rate: 1000,
            ..VocalsConfig::default()
        }
    }

    #[cfg(unix)]
    #[test]
    fn successful_engine_output_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out").join("v.wav");
        let engine = ExternalEngine::new("ai", &config("cp {lyrics_txt} {out_wav}", dir.path()), None);
        let lyrics = parse_lyrics("first line\nsecond line");
        let req = VocalRequest {
            melody_path: Path::new("m.json"),
            lyrics: &lyrics,
            out_path: &out,
            voice_ref: None,
            duration: Some(1.0),
        };

        engine.synthesize(&req).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "first line\nsecond line");
        assert!(!PlaceholderBackend::manifest_path(&out).exists());
    }

    #[cfg(unix)]
    #[test]
    fn whole_second_duration_keeps_decimal_point() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("v.wav");
        let engine = ExternalEngine::new("ai", &config("printf '%s' {duration_seconds} > {out_wav}", dir.path()), None);
        let lyrics = parse_lyrics("la");
        let req = VocalRequest {
            melody_path: Path::new("m.json"),
            lyrics: &lyrics,
            out_path: &out,
            voice_ref: None,
            duration: Some(5.0),
        };

        engine.synthesize(&req).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "5.0");
    }

    #[cfg(unix)]
    #[test]
    fn failing_engine_falls_back_to_silence() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("v.wav");
        let cfg = config("exit 3 # {mode}", dir.path());
        let engine = ExternalEngine::new("diffsinger", &cfg, cfg.tmp_dir.clone());
        let lyrics = parse_lyrics("la");
        let req = VocalRequest {
            melody_path: Path::new("m.json"),
            lyrics: &lyrics,
            out_path: &out,
            voice_ref: None,
            duration: None,
        };

        engine.synthesize(&req).unwrap();
        let audio = crate::audio::wav::read_wav(&out).unwrap();
        assert_eq!(audio.num_samples(), 5000);
        assert!(PlaceholderBackend::manifest_path(&out).exists());
    }

    #[test]
    fn unconfigured_engine_is_invalid() {
        let engine = ExternalEngine::new("ai", &VocalsConfig::default(), None);
        let lyrics = parse_lyrics("la");
        let req = VocalRequest {
            melody_path: Path::new("m.json"),
            lyrics: &lyrics,
            out_path: Path::new("v.wav"),
            voice_ref: None,
            duration: Some(1.0),
        };
        assert!(matches!(engine.synthesize(&req), Err(Error::InvalidArgument(_))));
    }
}
