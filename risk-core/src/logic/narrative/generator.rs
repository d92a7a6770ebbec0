//! Narrative Generator - profile in, counsellor digest out

use std::sync::Arc;

use super::backend::{NarrativeResult, TextGenerator};
use super::profile::{format_grouped, render_prompt, StudentProfile, DEFAULT_THOUSANDS_SEPARATOR};

pub struct NarrativeGenerator {
    backend: Arc<dyn TextGenerator>,
    separator: char,
}

impl NarrativeGenerator {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self {
            backend,
            separator: DEFAULT_THOUSANDS_SEPARATOR,
        }
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_configured()
    }

    /// Allowance in the configured display format
    pub fn format_allowance(&self, allowance: i64) -> String {
        format_grouped(allowance, self.separator)
    }

    /// Backend response text, unmodified
    pub async fn analyze(&self, profile: &StudentProfile) -> NarrativeResult<String> {
        let prompt = render_prompt(profile);
        log::debug!("Requesting narrative for {} from {}", profile.nisn, self.backend.name());
        self.backend.generate(&prompt).await
    }
}
