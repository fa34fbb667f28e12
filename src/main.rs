use domain::{gateway, summary_cache::InMemoryStore};
use log::{error, info};
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    info!("Starting meeting minutes service...");

    let chat_provider = match gateway::chat_provider(&config) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Failed to initialize LLM provider: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(config, chat_provider, Arc::new(InMemoryStore::new()));

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
