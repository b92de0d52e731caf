/// CLI configuration
use elementa_catalog::CatalogConfig;
use elementa_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file looked up in the working directory (`elementa.toml`)
pub const DEFAULT_CONFIG_NAME: &str = "elementa";

/// Environment variable prefix (`ELEMENTA_CATALOG__APP_KEY`, ...)
pub const ENV_PREFIX: &str = "ELEMENTA";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_catalog")]
    pub catalog: CatalogSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    #[serde(default = "default_audio")]
    pub audio: AudioSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub app_key: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,

    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    #[serde(default = "default_simulated_duration_ms")]
    pub simulated_duration_ms: u64,

    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AudioSettings {
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
}

impl AppConfig {
    /// Load from `path` (or `elementa.toml` if present) overlaid with the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, environment())
    }

    /// Load with an explicit environment source
    pub fn load_with(path: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        settings = match path {
            // An explicit file must exist
            Some(path) => settings.add_source(config::File::from(path.to_path_buf())),
            None => settings
                .add_source(config::File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };

        let config = settings.add_source(environment).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.catalog.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "catalog base URL is required (set ELEMENTA_CATALOG__BASE_URL)".to_string(),
            ));
        }

        if self.catalog.app_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "catalog app key is required (set ELEMENTA_CATALOG__APP_KEY)".to_string(),
            ));
        }

        let zero = [
            ("catalog.timeout_secs", self.catalog.timeout_secs),
            ("playback.status_interval_ms", self.playback.status_interval_ms),
            ("playback.acquire_timeout_secs", self.playback.acquire_timeout_secs),
            ("playback.simulated_duration_ms", self.playback.simulated_duration_ms),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);
        if let Some((key, _)) = zero {
            return Err(ConfigError::Invalid(format!("{} must be greater than 0", key)));
        }

        if self.playback.history_size == 0 {
            return Err(ConfigError::Invalid(
                "playback.history_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig::new(&self.catalog.base_url, &self.catalog.app_key)
            .with_timeout(Duration::from_secs(self.catalog.timeout_secs))
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            status_interval: Duration::from_millis(self.playback.status_interval_ms),
            acquire_timeout: Duration::from_secs(self.playback.acquire_timeout_secs),
            simulated_duration_ms: self.playback.simulated_duration_ms,
            history_size: self.playback.history_size,
            ..PlaybackConfig::default()
        }
    }

    /// Same config with the app key masked, for display
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.catalog.app_key.is_empty() {
            config.catalog.app_key = "********".to_string();
        }
        config
    }
}

/// Process environment source (`ELEMENTA_<SECTION>__<KEY>`)
pub fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

// Default values
fn default_catalog() -> CatalogSettings {
    CatalogSettings {
        base_url: default_base_url(),
        app_key: String::new(),
        timeout_secs: default_timeout_secs(),
    }
}

fn default_base_url() -> String {
    "https://sarva.cditproject.org".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        status_interval_ms: default_status_interval_ms(),
        acquire_timeout_secs: default_acquire_timeout_secs(),
        simulated_duration_ms: default_simulated_duration_ms(),
        history_size: default_history_size(),
    }
}

fn default_status_interval_ms() -> u64 {
    500
}

fn default_acquire_timeout_secs() -> u64 {
    10
}

fn default_simulated_duration_ms() -> u64 {
    elementa_playback::DEFAULT_SIMULATED_DURATION_MS
}

fn default_history_size() -> usize {
    50
}

fn default_audio() -> AudioSettings {
    AudioSettings {
        assets_dir: default_assets_dir(),
    }
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("./assets/audio")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            playback: default_playback(),
            audio: default_audio(),
        }
    }
}
