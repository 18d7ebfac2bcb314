use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::SupportApi;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub api: Arc<dyn SupportApi>,
}

impl AppContext {
    pub fn new(config: AppConfig, api: Arc<dyn SupportApi>) -> Self {
        Self { config, api }
    }
}
