use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use reqwest::Client;
use tracing::debug;
use crate::config::Config;
use crate::error::{Result, AppError};

/// Text-generation capability the summarizer runs on.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Raw text reply of `model` to a single user prompt.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;

    /// Model identifiers the provider offers, at most `limit` of them.
    async fn list_models(&self, limit: usize) -> Result<Vec<String>>;
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

/// Client for OpenRouter or any other OpenAI-compatible chat-completions API.
pub struct OpenRouterClient {
    http: Client,
    api_key: Option<String>,
    api_base: String,
}

impl OpenRouterClient {
    pub fn new(config: &Config) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: &Config) -> Self {
        Self {
            http,
            api_key: config.openrouter_api_key.clone(),
            api_base: config.api_base.clone(),
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::ConfigError("Missing env var: OPENROUTER_API_KEY".to_string()))
    }

    // A provider `error` object wins over the status; a non-JSON body is
    // reported by its status
    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::LlmError(format!("Failed to read LLM response: {}", e)))?;
        let json = serde_json::from_str::<serde_json::Value>(&body).ok();

        if let Some(message) = json.as_ref().and_then(provider_error) {
            return Err(AppError::LlmError(message));
        }
        if !status.is_success() {
            return Err(AppError::LlmError(format!("LLM API returned status {}", status)));
        }
        json.ok_or_else(|| AppError::LlmError("Invalid response from LLM: body is not JSON".to_string()))
    }
}

#[async_trait]
impl LanguageModel for OpenRouterClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let res = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(self.api_key()?)
            .header("X-Title", "link-tldr")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LlmError(format!("LLM request failed: {}", e)))?;

        let json = Self::read_json(res).await?;
        debug!(model, usage = %json["usage"], "LLM call finished");
        Ok(reply_text(&json))
    }

    async fn list_models(&self, limit: usize) -> Result<Vec<String>> {
        let res = self
            .http
            .get(format!("{}/models", self.api_base))
            .bearer_auth(self.api_key()?)
            .send()
            .await
            .map_err(|e| AppError::LlmError(format!("LLM request failed: {}", e)))?;

        let json = Self::read_json(res).await?;
        let list: ModelList = serde_json::from_value(json)
            .map_err(|e| AppError::LlmError(format!("Invalid model list: {}", e)))?;

        Ok(list.data.into_iter().take(limit).map(|m| m.id).collect())
    }
}

// Missing content counts as an empty reply
fn reply_text(json: &serde_json::Value) -> String {
    json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

fn provider_error(json: &serde_json::Value) -> Option<String> {
    let error = json.get("error").filter(|e| !e.is_null())?;
    let message = error["message"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());
    Some(message)
}
