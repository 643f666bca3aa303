use crate::config::AppConfig;
use crate::core::notifications::NotificationChannel;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub notifier: Option<Arc<dyn NotificationChannel>>,
}

impl AppContext {
    pub fn new(config: AppConfig, notifier: Option<Arc<dyn NotificationChannel>>) -> Self {
        Self {
            config: Arc::new(config),
            notifier,
        }
    }
}
