//! Layered configuration.
//!
//! Built-in defaults, then an optional `motopv.toml`, then environment variables
//! prefixed with `MOTOPV__` (nested keys joined with `__`, e.g.
//! `MOTOPV__GATEWAY__MOCK__SUCCESS_RATE=0.5`).

use crate::utils::path_resolver::{self, ConfigLocation};
use config::{Config, Environment, File};
use log::{info, LevelFilter};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

pub const ENV_PREFIX: &str = "MOTOPV";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub company: CompanySettings,
    pub gateway: GatewaySettings,
    pub logging: LoggingSettings,
}

/// Static contact details, shown on screen only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanySettings {
    pub name: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            name: "MotoPV".to_string(),
            full_name: "MotoPV Solar Solutions".to_string(),
            phone: "+(265) 994 108 077".to_string(),
            email: "info@motopvmw.com".to_string(),
            address: "Area 13, Simsol Oil Filling Station Premises, Lilongwe".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    #[default]
    Mock,
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub mode: GatewayMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub retry_attempts: usize,
    pub mock: MockGatewaySettings,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            mode: GatewayMode::Mock,
            endpoint: None,
            timeout_secs: 12,
            retry_attempts: 3,
            mock: MockGatewaySettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockGatewaySettings {
    pub delay_ms: u64,
    pub success_rate: f64,
}

impl Default for MockGatewaySettings {
    fn default() -> Self {
        Self {
            delay_ms: 2000,
            success_rate: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub stdout: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            stdout: true,
        }
    }
}

impl Settings {
    /// Load settings. An explicit `path` (or `$MOTOPV_CONFIG`) must exist; otherwise the
    /// file found by [`path_resolver::resolve_config_file`] is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let location = match path {
            Some(p) => Some(ConfigLocation::Explicit(p.to_path_buf())),
            None => path_resolver::resolve_config_file(),
        };
        Self::load_from(location, Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    // Env values stay strings here; serde types them per field, so a phone keeps its leading zero.
    fn load_from(
        location: Option<ConfigLocation>,
        env: Environment,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();

        if let Some(location) = location {
            info!(
                "[PHASE: initialization] [STEP: config] Loading settings from {:?}",
                location.path()
            );
            let required = matches!(location, ConfigLocation::Explicit(_));
            builder = builder.add_source(File::from(location.path()).required(required));
        }

        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let rate = self.gateway.mock.success_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(SettingsError::Invalid(format!(
                "gateway.mock.success_rate must be between 0 and 1 (got {})",
                rate
            )));
        }

        if self.gateway.timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "gateway.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if LevelFilter::from_str(self.logging.level.trim()).is_err() {
            return Err(SettingsError::Invalid(format!(
                "logging.level '{}' is not a log level",
                self.logging.level
            )));
        }

        if self.gateway.mode == GatewayMode::Http {
            self.endpoint_url()?;
        }

        Ok(())
    }

    /// Parsed HTTP endpoint; only http(s) URLs are accepted.
    pub fn endpoint_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .gateway
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                SettingsError::Invalid("gateway.endpoint is required in http mode".to_string())
            })?;
        let url = Url::parse(raw).map_err(|e| {
            SettingsError::Invalid(format!("gateway.endpoint '{}' is not a URL: {}", raw, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SettingsError::Invalid(format!(
                "gateway.endpoint must use http or https (got '{}')",
                url.scheme()
            )));
        }
        Ok(url)
    }

    pub fn log_level(&self) -> LevelFilter {
        LevelFilter::from_str(self.logging.level.trim()).unwrap_or(LevelFilter::Debug)
    }

    /// Effective settings as TOML, suitable as a starting `motopv.toml`.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
