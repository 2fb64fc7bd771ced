//! Structured summaries from a generative model.
//!
//! Models do not always follow formatting instructions, so the reply goes
//! through a tolerant parse: the whole reply as JSON, then the outermost
//! `{...}` span inside it, and finally a degraded record built from the raw
//! text. Malformed output never becomes an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::extractor::truncate_chars;
use crate::llm::LanguageModel;

/// Longest raw reply kept in a degraded summary.
pub const DEGRADED_BULLET_MAX_CHARS: usize = 2000;

const PING_PROMPT: &str = "Reply with one word: ok";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredSummary {
    pub title: String,
    pub bullets: Vec<String>,
    pub takeaway: String,
    pub tags: Vec<String>,
}

impl StructuredSummary {
    /// Best-effort record for a reply that held no usable JSON.
    pub fn degraded(raw: &str) -> Self {
        let raw = truncate_chars(raw.trim(), DEGRADED_BULLET_MAX_CHARS);
        Self {
            bullets: if raw.is_empty() { Vec::new() } else { vec![raw.to_string()] },
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Parsed(StructuredSummary),
    Degraded(StructuredSummary),
}

impl SummaryOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, SummaryOutcome::Degraded(_))
    }

    pub fn into_summary(self) -> StructuredSummary {
        match self {
            SummaryOutcome::Parsed(summary) | SummaryOutcome::Degraded(summary) => summary,
        }
    }
}

pub fn parse_summary(raw: &str) -> SummaryOutcome {
    let trimmed = raw.trim();

    if let Ok(summary) = serde_json::from_str::<StructuredSummary>(trimmed) {
        return SummaryOutcome::Parsed(summary);
    }

    if let Some(span) = outer_object_span(trimmed) {
        if let Ok(summary) = serde_json::from_str::<StructuredSummary>(span) {
            return SummaryOutcome::Parsed(summary);
        }
    }

    SummaryOutcome::Degraded(StructuredSummary::degraded(trimmed))
}

// From the first '{' to the last '}'
fn outer_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn build_prompt(content: &str, language: &str) -> String {
    let mut result = String::with_capacity(content.len() + 600);
    result.push_str("Summarize the text below. Reply with exactly one JSON object and nothing else: ");
    result.push_str("no explanations before or after it, no Markdown, no code fences.\n");
    result.push_str("Schema:\n");
    result.push_str("{\"title\": string, \"bullets\": [string], \"takeaway\": string, \"tags\": [string]}\n");
    result.push_str("Rules:\n");
    result.push_str("- title: a short headline for the text\n");
    result.push_str("- bullets: 5-7 key points, no filler, no repetition\n");
    result.push_str("- takeaway: one line with the main conclusion\n");
    result.push_str("- tags: 3-8 short topic tags\n");
    result.push_str("- write every value in ");
    result.push_str(language);
    result.push_str("\n\nText:\n");
    result.push_str(content);
    result
}

pub struct Summarizer {
    model: Arc<dyn LanguageModel>,
    model_name: Option<String>,
    max_chars: usize,
    language: String,
}

impl Summarizer {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        model_name: Option<String>,
        max_chars: usize,
        language: impl Into<String>,
    ) -> Self {
        Self {
            model,
            model_name,
            max_chars,
            language: language.into(),
        }
    }

    fn model_name(&self) -> Result<&str> {
        self.model_name.as_deref().ok_or_else(|| {
            AppError::ConfigError("MODEL_NAME is empty. Set it to an existing model from /models".to_string())
        })
    }

    pub async fn summarize(&self, text: &str) -> Result<StructuredSummary> {
        let model = self.model_name()?;
        let text = truncate_chars(text.trim(), self.max_chars);
        let prompt = build_prompt(text, &self.language);

        let raw = self.model.generate(model, &prompt).await?;
        let outcome = parse_summary(&raw);
        if outcome.is_degraded() {
            warn!(model, reply_chars = raw.chars().count(), "model reply was not JSON, using degraded summary");
        } else {
            info!(model, "model reply parsed");
        }
        Ok(outcome.into_summary())
    }

    /// Liveness probe against the configured model.
    pub async fn ping(&self) -> Result<String> {
        let model = self.model_name()?;
        let reply = self.model.generate(model, PING_PROMPT).await?;
        let reply = reply.trim();
        Ok(if reply.is_empty() { "no_text".to_string() } else { reply.to_string() })
    }
}
