use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_PATH: &str = "/etc/megadl/config.toml";

/// Resolved application configuration.
///
/// Layered from defaults, the system config file, `MEGADL_*` environment
/// variables, and finally any CLI overrides, in that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory downloads are written into. Folder shares get a
    /// subdirectory named after the resolved folder.
    pub download_directory: PathBuf,
    /// Use the simulated storage backend instead of a real client.
    pub simulation: bool,
    pub verbose: bool,
    pub notifications: NotificationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            download_directory: PathBuf::from("downloads"),
            simulation: false,
            verbose: false,
            notifications: NotificationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannelType {
    #[default]
    None,
    Slack,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotificationConfig {
    pub channel: NotificationChannelType,
    pub slack_webhook: Option<String>,
}

impl AppConfig {
    pub fn new<A: Serialize>(cli: Option<&A>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(CONFIG_PATH))
            .merge(Env::prefixed("MEGADL_").split("__"));

        if let Some(args) = cli {
            figment = figment.merge(Serialized::defaults(args));
        }

        figment.extract().context("Failed to load configuration")
    }
}
