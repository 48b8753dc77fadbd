//! Application configuration.
//!
//! Stored as TOML under the platform data directory. A missing file yields
//! defaults; every section and field may be omitted.

use crate::location::TrackingOptions;
use crate::narration::SpeechOptions;
use crate::routing::{ChainSettings, InstructionLocale, InstructionTemplates};
use crate::story::{FallbackStyle, Genre, StorySettings};
use crate::tracking::DEFAULT_TRIGGER_RADIUS_M;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    pub api_keys: ApiKeys,
    pub providers: ProviderSettings,
    pub walking: WalkingSettings,
    pub story: StoryConfig,
    pub narration: SpeechOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            api_keys: ApiKeys::default(),
            providers: ProviderSettings::default(),
            walking: WalkingSettings::default(),
            story: StoryConfig::default(),
            narration: SpeechOptions::default(),
        }
    }
}

impl AppConfig {
    pub fn chain_settings(&self) -> ChainSettings {
        ChainSettings {
            max_retries: self.providers.max_retries,
            backoff_base: Duration::from_millis(self.providers.backoff_base_ms),
        }
    }

    pub fn tracking_options(&self) -> TrackingOptions {
        TrackingOptions {
            interval: Duration::from_secs(self.walking.tracking_interval_secs),
            min_distance_m: self.walking.tracking_min_distance_m,
        }
    }

    pub fn instruction_templates(&self) -> InstructionTemplates {
        InstructionTemplates::new(self.walking.instruction_locale)
    }

    pub fn story_settings(&self) -> StorySettings {
        StorySettings {
            max_tokens: self.story.max_tokens,
            temperature: self.story.temperature,
            fallback: self.story.fallback,
        }
    }
}

/// API keys per provider, tried in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub google_maps: Vec<String>,
    pub openrouteservice: Vec<String>,
    pub groq: Vec<String>,
}

/// Remote provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub google_enabled: bool,
    pub openrouteservice_enabled: bool,
    pub groq_enabled: bool,
    /// Transient failures tolerated per routing provider
    pub max_retries: u32,
    /// Linear backoff step in milliseconds
    pub backoff_base_ms: u64,
    /// Rotate to the next key after this many successful requests
    pub max_requests_per_key: Option<u32>,
    /// Language for provider instructions
    pub language: String,
    /// Region bias for the mapping provider
    pub region: String,
    pub google_base_url: Option<String>,
    pub openrouteservice_base_url: Option<String>,
    pub groq_base_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            google_enabled: true,
            openrouteservice_enabled: true,
            groq_enabled: true,
            max_retries: 3,
            backoff_base_ms: 1000,
            max_requests_per_key: None,
            language: "vi".to_string(),
            region: "VN".to_string(),
            google_base_url: None,
            openrouteservice_base_url: None,
            groq_base_url: None,
        }
    }
}

/// Walk defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkingSettings {
    /// Meters
    pub trigger_radius_m: f64,
    pub walking_speed_mps: f64,
    /// Spacing of synthesized route points (meters)
    pub fallback_point_spacing_m: f64,
    pub tracking_interval_secs: u64,
    pub tracking_min_distance_m: f64,
    pub default_genre: Genre,
    pub instruction_locale: InstructionLocale,
}

impl Default for WalkingSettings {
    fn default() -> Self {
        Self {
            trigger_radius_m: DEFAULT_TRIGGER_RADIUS_M,
            walking_speed_mps: crate::routing::WALKING_SPEED_MPS,
            fallback_point_spacing_m: crate::routing::fallback::DEFAULT_POINT_SPACING_M,
            tracking_interval_secs: 3,
            tracking_min_distance_m: 5.0,
            default_genre: Genre::Adventure,
            instruction_locale: InstructionLocale::Vi,
        }
    }
}

/// Story model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub fallback: FallbackStyle,
}

impl Default for StoryConfig {
    fn default() -> Self {
        let settings = StorySettings::default();
        Self {
            model: crate::story::client::DEFAULT_MODEL.to_string(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            fallback: settings.fallback,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "wanderer", "Wanderer")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load configuration from a file, falling back to defaults if it is absent.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let data_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(get_data_dir);

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig {
            data_dir,
            ..Default::default()
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = data_dir;

    Ok(config)
}

/// Save configuration to the default location.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

/// Save configuration to a file.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content = toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
