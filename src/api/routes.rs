use axum::{
    routing::{get, post},
    Router,
    extract::{Json, State, rejection::JsonRejection},
    response::IntoResponse,
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::{Result, AppError};
use crate::api::models::{AiHealthResponse, HealthResponse, ModelsResponse, SummarizeRequest};
use crate::api::response;
use crate::AppState;

pub const MODEL_LIST_LIMIT: usize = 30;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/models", get(models_handler))
        .route("/ai-health", get(ai_health_handler))
        .route("/summarize", post(summarize_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    response::success(HealthResponse {
        status: "ok",
        model: state.config.model_name.clone(),
        max_input_chars: state.config.max_input_chars,
    })
}

async fn models_handler(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let models = state
        .llm
        .list_models(MODEL_LIST_LIMIT)
        .await
        .inspect_err(|e| error!(error = %e, "listing models failed"))?;

    Ok(response::success(ModelsResponse { models }))
}

async fn ai_health_handler(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let ai = state
        .service
        .summarizer()
        .ping()
        .await
        .inspect_err(|e| error!(error = %e, "AI ping failed"))?;

    Ok(response::success(AiHealthResponse { ai }))
}

async fn summarize_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(req) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    info!(url = %req.url, "processing summarize request");

    let envelope = state.service.handle(&req.url).await?;
    Ok(response::success(envelope))
}
