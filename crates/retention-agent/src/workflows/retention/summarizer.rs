use std::sync::Arc;

use super::backend::{BackendError, GenerativeModel};

pub fn summary_prompt(text: &str) -> String {
    format!("Summarize this complaint in 1 sentence: {text}")
}

/// Condenses arbitrary text, including lookup sentinels, to one sentence.
#[derive(Clone)]
pub struct TextSummarizer {
    model: Arc<dyn GenerativeModel>,
}

impl TextSummarizer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub fn summarize(&self, text: &str) -> Result<String, BackendError> {
        let summary = self.model.generate(&summary_prompt(text))?;
        Ok(summary.trim().to_string())
    }
}
