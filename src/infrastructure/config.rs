use std::time::Duration;

use color_eyre::eyre::Result;
use config::ConfigError;
use serde::Deserialize;

use crate::domain::ThreadId;
use crate::utils;

const CONFIG: &str = include_str!("../../.config/config.json5");

/// Application configuration.
///
/// Layered: embedded defaults (`.config/config.json5`), then an optional
/// user config file from the config directory, then CLI flags (applied
/// by the binary after loading). Unlike the backend URL there is no
/// required field, so a missing user config file is not an error.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub backend_url: String,
    pub page_size: u32,
    pub room_poll_interval_secs: u64,
    pub conversation_poll_interval_secs: u64,
    pub max_message_length: usize,
    /// Numeric id of the viewing user, used to derive room membership
    /// from participant lists. Without it the backend's own enforcement
    /// is trusted.
    #[serde(default)]
    pub viewer_id: Option<i64>,
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        let defaults: Config = json5::from_str(CONFIG)
            .map_err(|e| ConfigError::Message(format!("Failed to load default config: {e}")))?;

        let config_dir = utils::get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("backend_url", defaults.backend_url)?
            .set_default("page_size", i64::from(defaults.page_size))?
            .set_default(
                "room_poll_interval_secs",
                defaults.room_poll_interval_secs,
            )?
            .set_default(
                "conversation_poll_interval_secs",
                defaults.conversation_poll_interval_secs,
            )?
            .set_default(
                "max_message_length",
                defaults.max_message_length as u64,
            )?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.json", config::FileFormat::Json),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
        ];
        for (file, format) in &config_files {
            builder = builder.add_source(
                config::File::from(config_dir.join(file))
                    .format(*format)
                    .required(false),
            );
        }

        builder.build()?.try_deserialize()
    }

    /// Refresh cadence for the given thread kind.
    pub fn poll_interval(&self, thread: ThreadId) -> Duration {
        match thread {
            ThreadId::Room(_) => Duration::from_secs(self.room_poll_interval_secs),
            ThreadId::Conversation(_) => {
                Duration::from_secs(self.conversation_poll_interval_secs)
            }
        }
    }
}

impl Default for Config {
    // The embedded defaults are compiled in; failing to parse them is a
    // build defect, not a runtime condition.
    #[allow(clippy::unwrap_used)]
    fn default() -> Self {
        json5::from_str(CONFIG).unwrap()
    }
}
