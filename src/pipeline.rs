use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::cache::SummaryCache;
use crate::error::{AppError, Result};
use crate::extractor::TextSource;
use crate::summarizer::{StructuredSummary, Summarizer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedResult {
    pub source: String,
    pub chars: usize,
    pub summary: StructuredSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Timing {
    pub total: u64,
    pub parse: u64,
    pub ai: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    #[serde(flatten)]
    pub result: CachedResult,
    pub cache_hit: bool,
    pub timing_ms: Timing,
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Turns a URL into a summary: cache lookup, then extraction and summarization.
pub struct SummaryService {
    source: Arc<dyn TextSource>,
    summarizer: Summarizer,
    cache: SummaryCache,
    max_chars: usize,
}

impl SummaryService {
    pub fn new(
        source: Arc<dyn TextSource>,
        summarizer: Summarizer,
        cache: SummaryCache,
        max_chars: usize,
    ) -> Self {
        Self {
            source,
            summarizer,
            cache,
            max_chars,
        }
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    /// Every failure comes back as `AppError::BadRequest` with the original message.
    pub async fn handle(&self, url: &str) -> Result<ResponseEnvelope> {
        self.run(url).await.map_err(|err| {
            warn!(url, error = %err, "summarize failed");
            match err {
                AppError::BadRequest(msg) => AppError::BadRequest(msg),
                other => AppError::BadRequest(other.to_string()),
            }
        })
    }

    async fn run(&self, url: &str) -> Result<ResponseEnvelope> {
        let started = Instant::now();
        validate_source(url)?;

        if let Some(result) = self.cache.get(url) {
            info!(url, "summary cache hit");
            return Ok(ResponseEnvelope {
                result,
                cache_hit: true,
                timing_ms: Timing {
                    total: millis(started.elapsed()),
                    ..Timing::default()
                },
            });
        }

        let parse_started = Instant::now();
        let text = self.source.extract(url, self.max_chars).await?;
        let parse = millis(parse_started.elapsed());

        let ai_started = Instant::now();
        let summary = self.summarizer.summarize(&text).await?;
        let ai = millis(ai_started.elapsed());

        let result = CachedResult {
            source: url.to_string(),
            chars: text.chars().count(),
            summary,
        };
        self.cache.put(url, result.clone());

        let timing = Timing {
            total: millis(started.elapsed()),
            parse,
            ai,
        };
        info!(url, chars = result.chars, total_ms = timing.total, parse_ms = parse, ai_ms = ai, "summary ready");

        Ok(ResponseEnvelope {
            result,
            cache_hit: false,
            timing_ms: timing,
        })
    }
}

/// Only absolute http(s) URLs are accepted. The string itself is the cache key.
fn validate_source(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|e| AppError::BadRequest(format!("Invalid URL {url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(()),
        scheme => Err(AppError::BadRequest(format!("Unsupported URL scheme: {scheme}"))),
    }
}
