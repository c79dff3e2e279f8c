use crate::config::AppConfig;
use crate::outline::LlmClient;

/// Read-only state shared by all workers. Requests never mutate it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub llm: LlmClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self { config, llm: LlmClient::new() }
    }
}
