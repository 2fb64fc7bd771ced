pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod logger;
pub mod pipeline;
pub mod summarizer;

use std::sync::Arc;
use cache::SummaryCache;
use config::Config;
use error::Result;
use extractor::{TextExtractor, TextSource};
use llm::{LanguageModel, OpenRouterClient};
use pipeline::SummaryService;
use summarizer::Summarizer;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub llm: Arc<dyn LanguageModel>,
    pub service: Arc<SummaryService>,
}

impl AppState {
    /// Wires the real page/transcript extractor and the OpenRouter client.
    pub fn new(config: Config) -> Result<Self> {
        let source = Arc::new(TextExtractor::new(&config)?);
        let llm = Arc::new(OpenRouterClient::new(&config));
        Ok(Self::with_components(config, source, llm))
    }

    pub fn with_components(
        config: Config,
        source: Arc<dyn TextSource>,
        llm: Arc<dyn LanguageModel>,
    ) -> Self {
        let summarizer = Summarizer::new(
            Arc::clone(&llm),
            config.model_name.clone(),
            config.max_input_chars,
            config.summary_language.clone(),
        );
        let cache = SummaryCache::new(config.cache_capacity, config.cache_ttl);
        let service = SummaryService::new(source, summarizer, cache, config.max_input_chars);

        AppState {
            config: Arc::new(config),
            llm,
            service: Arc::new(service),
        }
    }
}
