use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct SummarizeRequest {
    pub url: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: Option<String>,
    pub max_input_chars: usize,
}

#[derive(Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

#[derive(Serialize)]
pub struct AiHealthResponse {
    pub ai: String,
}
