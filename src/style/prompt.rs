use super::profile::StyleProfile;
use crate::error::Result;
use crate::llm::{ChatMessage, TextGenerator};

const VIBES: [&str; 3] = ["cinematic", "driving", "dreamy"];

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Messages asking a language model for a short prose description of the profile.
pub fn style_description_messages(profile: &StyleProfile) -> Vec<ChatMessage> {
    let energy_text = profile
        .bands_in_order()
        .iter()
        .map(|(band, value)| format!("{} energy: {:.3}", capitalize(band), value))
        .collect::<Vec<_>>()
        .join(", ");

    let prompt = format!(
        "Given the following aggregate statistics from reference tracks, \
         write 2-3 sentences in English describing the musical style for a MusicGen prompt. \
         Explicitly mention mood/energy, likely instrumentation, and fitting usage scenarios \
         (e.g., background scoring, workout mix). \
         Interpret the numbers qualitatively rather than listing them verbatim.\n\n\
         Tempo range: {:.1} - {:.1} BPM\n\
         Average tempo: {:.1} BPM\n\
         Energy profile: {}\n",
        profile.tempo_range[0], profile.tempo_range[1], profile.tempo_mean, energy_text
    );

    vec![
        ChatMessage::system(
            "You are a concise music analyst that summarizes sonic character \
             for AI music generation prompts.",
        ),
        ChatMessage::user(prompt),
    ]
}

pub fn describe_style(generator: &dyn TextGenerator, profile: &StyleProfile) -> Result<String> {
    let messages = style_description_messages(profile);
    let description = generator.generate(&messages)?;
    Ok(description.trim().to_string())
}

/// "rich low frequencies (~45%), present mid frequencies (~30%), ..."
pub fn describe_energy(profile: &StyleProfile) -> String {
    let bands = profile.bands_in_order();
    if bands.is_empty() {
        return "Balanced spectrum".into();
    }

    let total: f64 = profile.energy_profile.values().sum();
    let total = if total == 0.0 { 1.0 } else { total };

    let pieces: Vec<String> = ["low", "mid", "high"]
        .iter()
        .filter_map(|band| profile.energy_profile.get(*band).map(|v| (*band, *v)))
        .map(|(band, value)| {
            let percent = value / total * 100.0;
            let descriptor = if percent > 38.0 {
                "rich"
            } else if percent > 25.0 {
                "present"
            } else {
                "subtle"
            };
            format!("{} {} frequencies (~{:.0}%)", descriptor, band, percent)
        })
        .collect();

    if pieces.is_empty() {
        return "Even frequency distribution".into();
    }
    pieces.join(", ")
}

/// Text prompt for the backing-track generator.
pub fn build_backing_prompt(profile: &StyleProfile, description: &str) -> String {
    let parts = [
        description.trim().to_string(),
        format!(
            "Keep the groove around {:.0}-{:.0} BPM (avg {:.0}).",
            profile.tempo_range[0], profile.tempo_range[1], profile.tempo_mean
        ),
        format!("Focus on {}.", describe_energy(profile)),
        "High fidelity mix ready for creative sampling.".to_string(),
    ];
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn prompt_variations(base: &str) -> Vec<String> {
    VIBES
        .iter()
        .map(|vibe| format!("{} Emphasize a {} vibe.", base, vibe))
        .collect()
}
