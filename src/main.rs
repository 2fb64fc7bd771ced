use tokio::net::TcpListener;
use tracing::{info, warn};
use link_tldr::{
    config::Config,
    api::routes::create_router,
    logger::init_logger,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;
    init_logger(&config)?;

    let server_addr = config.server_addr;
    if config.model_name.is_none() {
        warn!("MODEL_NAME is not set, AI endpoints will fail until it is configured");
    }
    info!(
        %server_addr,
        model = config.model_name.as_deref().unwrap_or("-"),
        max_input_chars = config.max_input_chars,
        "starting server"
    );

    // Create application state
    let app_state = AppState::new(config)?;

    // Build the router with routes
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    info!("listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
