use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::services::SourceKind;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub action_plan: ActionPlanSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Where the resource catalog comes from
///
/// The cache TTL is fixed (see `catalog::CATALOG_TTL`) and not configurable.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default)]
    pub source: SourceKind,
    #[serde(default = "default_static_path")]
    pub static_path: String,
    pub remote_url: Option<String>,
    pub remote_api_key: Option<String>,
    pub database_url: Option<String>,
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            static_path: default_static_path(),
            remote_url: None,
            remote_api_key: None,
            database_url: None,
            timeout_secs: default_catalog_timeout(),
        }
    }
}

fn default_static_path() -> String { "data/resources.json".to_string() }
fn default_catalog_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct ActionPlanSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_plan_endpoint")]
    pub endpoint: String,
    pub api_key: Option<String>,
    #[serde(default = "default_plan_model")]
    pub model: String,
    #[serde(default = "default_plan_timeout")]
    pub timeout_secs: u64,
}

impl Default for ActionPlanSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_plan_endpoint(),
            api_key: None,
            model: default_plan_model(),
            timeout_secs: default_plan_timeout(),
        }
    }
}

impl ActionPlanSettings {
    /// API key, if the model generator is enabled and has one
    pub fn active_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|k| self.enabled && !k.is_empty())
    }
}

fn default_plan_endpoint() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_plan_model() -> String { "gpt-4o-mini".to_string() }
fn default_plan_timeout() -> u64 { 15 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with NAVIGATOR__)
    /// 4. Plain environment overrides (DATA_SOURCE, DATABASE_URL, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // e.g., NAVIGATOR__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("NAVIGATOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("NAVIGATOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Plain environment variables and the config keys they override
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DATA_SOURCE", "catalog.source"),
    ("STATIC_CATALOG_PATH", "catalog.static_path"),
    ("REMOTE_CATALOG_URL", "catalog.remote_url"),
    ("REMOTE_CATALOG_API_KEY", "catalog.remote_api_key"),
    ("DATABASE_URL", "catalog.database_url"),
    ("OPENAI_API_KEY", "action_plan.api_key"),
];

/// Apply plain environment overrides on top of the layered config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    for (var, key) in ENV_OVERRIDES {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                builder = builder.set_override(*key, value)?;
            }
        }
    }

    builder.build()
}
