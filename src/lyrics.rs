use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{ensure_exists, Result};
use crate::llm::{ChatMessage, TextGenerator};
use crate::style::StyleProfile;

const UNTITLED: &str = "Untitled";
const EMPTY_LYRICS: &str = "(no lyrics)";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    #[default]
    Verse,
    PreChorus,
    Chorus,
    Bridge,
    Outro,
}

impl SectionKind {
    /// Lenient parse; anything unrecognised is a verse.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "pre_chorus" | "prechorus" => Self::PreChorus,
            "chorus" => Self::Chorus,
            "bridge" => Self::Bridge,
            "outro" => Self::Outro,
            _ => Self::Verse,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verse => "verse",
            Self::PreChorus => "pre_chorus",
            Self::Chorus => "chorus",
            Self::Bridge => "bridge",
            Self::Outro => "outro",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LyricsDocument {
    pub title: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub theme: Option<String>,
    pub sections: Vec<Section>,
}

fn default_language() -> String {
    "zh".into()
}

impl LyricsDocument {
    /// Every lyric line in section order.
    pub fn all_lines(&self) -> Vec<&str> {
        self.sections
            .iter()
            .flat_map(|s| s.lines.iter().map(String::as_str))
            .collect()
    }

    /// Human-readable rendering: title, meta line, then `[Name (type)]` blocks.
    pub fn to_text(&self) -> String {
        let title = self.title.trim();
        let mut out = vec![if title.is_empty() { UNTITLED.to_string() } else { title.to_string() }];

        let mut meta = Vec::new();
        if let Some(theme) = self.theme.as_deref().filter(|t| !t.is_empty()) {
            meta.push(format!("Theme: {}", theme));
        }
        if !self.language.is_empty() {
            meta.push(format!("Language: {}", self.language));
        }
        if !meta.is_empty() {
            out.push(meta.join(" / "));
            out.push(String::new());
        }

        for section in &self.sections {
            let kind = section.kind.as_str();
            let header = if section.name.to_lowercase().contains(kind) {
                section.name.clone()
            } else {
                format!("{} ({})", section.name, kind)
            };
            out.push(format!("[{}]", header));
            out.extend(
                section
                    .lines
                    .iter()
                    .map(|l| l.trim())
                    .filter(|l| !l.is_empty())
                    .map(str::to_string),
            );
            out.push(String::new());
        }

        out.join("\n").trim().to_string()
    }

    /// Lines only, one per row; the theme when there are no lines.
    pub fn to_plain_lines(&self) -> String {
        let text = self.all_lines().join("\n");
        if text.trim().is_empty() {
            return self.theme.clone().unwrap_or_default();
        }
        text.trim().to_string()
    }

    pub fn load(path: &Path) -> Result<Self> {
        ensure_exists(path)?;
        let content = std::fs::read_to_string(path)?;
        Ok(parse_lyrics(&content))
    }

    /// Single verse holding every non-empty line of `text`.
    fn from_plain_text(text: &str) -> Self {
        let mut lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if lines.is_empty() {
            lines.push(EMPTY_LYRICS.to_string());
        }
        Self {
            title: UNTITLED.to_string(),
            language: default_language(),
            theme: None,
            sections: vec![Section {
                kind: SectionKind::Verse,
                name: "Verse 1".to_string(),
                lines,
            }],
        }
    }
}

pub fn lyrics_messages(profile: &StyleProfile, description: &str, theme: Option<&str>) -> Vec<ChatMessage> {
    let tempo_text = format!(
        "Tempo range about {:.0}-{:.0} BPM.",
        profile.tempo_range[0], profile.tempo_range[1]
    );
    let energy: Vec<String> = ["low", "mid", "high"]
        .iter()
        .filter_map(|b| profile.energy_profile.get(*b).map(|v| format!("{}={:.2}", b, v)))
        .collect();
    let energy_text = if energy.is_empty() {
        "Band energy is evenly balanced.".to_string()
    } else {
        format!("Band energy: {}", energy.join(", "))
    };

    let prompt = format!(
        "Write complete Mandarin Chinese lyrics for the style and theme below, with at least \
         two verses and one chorus, and an optional pre-chorus. Lines should rhyme and be vivid; \
         the body must be Chinese, the title may be short English. Keep the song to 3-5 sections \
         of 4-8 lines each. Answer with JSON using exactly this structure:\n\
         {{\n  \"title\": \"...\",\n  \"language\": \"zh\",\n  \"theme\": \"...\",\n  \"sections\": [\n    \
         {{\"type\": \"verse\", \"name\": \"Verse 1\", \"lines\": [\"...\", \"...\"]}},\n    \
         {{\"type\": \"pre_chorus\", \"name\": \"Pre-Chorus\", \"lines\": [\"...\", \"...\"]}},\n    \
         {{\"type\": \"chorus\", \"name\": \"Chorus\", \"lines\": [\"...\", \"...\"]}}\n  ]\n}}\n\
         Use string arrays for every section's lines and add no extra commentary.\n\n\
         Style summary: {}\nNumeric features: {} {}\nTheme: {}\n",
        description.trim(),
        tempo_text,
        energy_text,
        theme.unwrap_or("a theme of your choosing"),
    );

    vec![
        ChatMessage::system(
            "You write poetic Mandarin lyrics tailored for AI music generation projects. \
             Always respond in Chinese unless explicitly asked otherwise.",
        ),
        ChatMessage::user(prompt),
    ]
}

pub fn generate_lyrics(
    generator: &dyn TextGenerator,
    profile: &StyleProfile,
    description: &str,
    theme: Option<&str>,
) -> Result<LyricsDocument> {
    let text = generator.generate(&lyrics_messages(profile, description, theme))?;
    let mut doc = parse_lyrics(&text);
    if doc.theme.is_none() {
        doc.theme = theme.map(str::to_string);
    }
    log::info!("Lyrics '{}': {} sections", doc.title, doc.sections.len());
    Ok(doc)
}

/// Interpret model output as lyrics. Structured JSON is normalised; a JSON
/// object with only a `lyrics` string, or plain text, becomes a single verse.
pub fn parse_lyrics(text: &str) -> LyricsDocument {
    let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(text) else {
        return LyricsDocument::from_plain_text(text);
    };

    let str_field = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
    let title = str_field("title").filter(|t| !t.trim().is_empty());
    let theme = str_field("theme").filter(|t| !t.trim().is_empty());
    let sections = normalize_sections(obj.get("sections"));

    if !sections.is_empty() {
        return LyricsDocument {
            title: title.unwrap_or_else(|| UNTITLED.to_string()),
            language: str_field("language").unwrap_or_else(default_language),
            theme,
            sections,
        };
    }

    if let Some(lyrics) = str_field("lyrics").filter(|l| !l.trim().is_empty()) {
        let mut doc = LyricsDocument::from_plain_text(&lyrics);
        if let Some(title) = title {
            doc.title = title;
        }
        doc.theme = theme;
        return doc;
    }

    LyricsDocument::from_plain_text(text)
}

fn normalize_sections(value: Option<&Value>) -> Vec<Section> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let entry = entry.as_object()?;
            let kind = entry
                .get("type")
                .and_then(Value::as_str)
                .map(SectionKind::parse)
                .unwrap_or_default();
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Section {}", idx + 1));
            let lines: Vec<String> = match entry.get("lines") {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.trim().to_string(),
                        other => other.to_string().trim().to_string(),
                    })
                    .filter(|l| !l.is_empty())
                    .collect(),
                Some(Value::String(s)) => s
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            };
            if lines.is_empty() {
                return None;
            }
            Some(Section { kind, name, lines })
        })
        .collect()
}
