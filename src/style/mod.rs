pub mod profile;
pub mod prompt;

pub use profile::{aggregate, StyleProfile};
pub use prompt::{build_backing_prompt, describe_style, prompt_variations};
