pub mod page;
pub mod youtube;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, redirect};
use tracing::{debug, info};
use url::Url;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::{AppError, Result};

pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; link-tldr/0.1; +tldr-bot)";

/// Produces plain text for a source URL.
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn extract(&self, url: &str, max_chars: usize) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Video { id: String },
    Page,
}

/// Decides how a URL is read. Video links without a recoverable ID are rejected here,
/// before anything touches the network.
pub fn classify(url: &str) -> Result<SourceKind> {
    let parsed = Url::parse(url)
        .map_err(|e| AppError::InvalidReference(format!("{url}: {e}")))?;

    if !youtube::is_video_host(&parsed) {
        return Ok(SourceKind::Page);
    }

    youtube::video_id(&parsed)
        .map(|id| SourceKind::Video { id })
        .ok_or_else(|| AppError::InvalidReference(format!("Invalid YouTube URL: {url}")))
}

/// Prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Trims extracted text and rejects it if nothing is left.
pub fn clean_text(raw: &str) -> Result<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(AppError::EmptyContent);
    }
    Ok(text.to_string())
}

/// HTTP client settings for page and transcript fetches.
pub fn client_builder(timeout: Duration) -> ClientBuilder {
    ClientBuilder::new()
        .timeout(timeout)
        .redirect(redirect::Policy::limited(10))
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(10)
}

/// Fetches article text or video transcripts, memoizing results per URL.
pub struct TextExtractor {
    client: Client,
    cache: TtlCache<String>,
}

impl TextExtractor {
    pub fn new(config: &Config) -> Result<Self> {
        let client = client_builder(config.request_timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, config.cache_capacity, config.cache_ttl))
    }

    pub fn with_client(client: Client, cache_capacity: usize, cache_ttl: Duration) -> Self {
        Self {
            client,
            cache: TtlCache::new(cache_capacity, cache_ttl),
        }
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        match classify(url)? {
            SourceKind::Video { id } => {
                info!(url, video_id = %id, "reading video transcript");
                youtube::fetch_transcript(&self.client, &id).await
            }
            SourceKind::Page => {
                info!(url, "reading page");
                let html = page::fetch_html(&self.client, url).await?;
                Ok(page::extract_main_text(&html, Some(url)))
            }
        }
    }
}

#[async_trait]
impl TextSource for TextExtractor {
    async fn extract(&self, url: &str, max_chars: usize) -> Result<String> {
        // Cached text is stored untruncated so any max_chars gives the same output
        if let Some(text) = self.cache.get(url) {
            debug!(url, "extractor cache hit");
            return Ok(truncate_chars(&text, max_chars).to_string());
        }

        let started = Instant::now();
        let text = clean_text(&self.fetch_text(url).await?)?;
        debug!(url, chars = text.chars().count(), elapsed = ?started.elapsed(), "extracted text");

        let truncated = truncate_chars(&text, max_chars).to_string();
        self.cache.put(url, text);
        Ok(truncated)
    }
}
