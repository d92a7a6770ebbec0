//! Narrative Module - counsellor-facing summaries
//!
//! Formats a student profile into a fixed prompt and hands it to a
//! text-generation backend. Backends are swappable behind [`TextGenerator`].

pub mod profile;
pub mod backend;
pub mod gemini;
pub mod generator;

#[cfg(test)]
mod tests;

pub use profile::{format_grouped, render_prompt, StudentProfile, DEFAULT_THOUSANDS_SEPARATOR};
pub use backend::{NarrativeError, NarrativeResult, TextGenerator};
pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_GEMINI_MODEL};
pub use generator::NarrativeGenerator;
