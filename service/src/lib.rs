use config::Config;
use meeting_ai::traits::{chat, summary_store};
use std::sync::Arc;

pub mod config;
pub mod logging;

// Service-level state shared by every request handler
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub chat_provider: Arc<dyn chat::Provider>,
    pub summary_store: Arc<dyn summary_store::Store>,
}

impl AppState {
    pub fn new(
        app_config: Config,
        chat_provider: Arc<dyn chat::Provider>,
        summary_store: Arc<dyn summary_store::Store>,
    ) -> Self {
        Self {
            config: app_config,
            chat_provider,
            summary_store,
        }
    }

    pub fn summary_store_ref(&self) -> &dyn summary_store::Store {
        self.summary_store.as_ref()
    }
}
