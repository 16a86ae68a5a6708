use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::platform::AppPaths;

/// Environment variable that overrides the configured base URL.
pub const BASE_URL_ENV: &str = "AGENT_API_URL";

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Transport settings shared by every request the client issues.
///
/// An empty `base_url` means requests target relative paths (same origin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub default_headers: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            base_url: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            default_headers,
        }
    }
}

impl ClientConfig {
    /// Loads defaults, then the TOML file (the given one, or the platform
    /// config file when present), then the `AGENT_API_URL` override.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, std::env::var(BASE_URL_ENV).ok())
    }

    pub fn load_from(path: Option<&Path>, base_url_override: Option<String>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        match path {
            Some(path) => {
                info!("Loading configuration from: {:?}", path);
                builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
            }
            None => {
                if let Ok(paths) = AppPaths::new() {
                    let config_file = paths.config_file();
                    debug!("Looking for configuration at: {:?}", config_file);
                    builder = builder
                        .add_source(File::from(config_file).format(FileFormat::Toml).required(false));
                }
            }
        }

        if base_url_override.is_some() {
            debug!("Base URL overridden by {}", BASE_URL_ENV);
        }
        builder = builder.set_override_option("base_url", base_url_override)?;

        let config: ClientConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        info!("Saving configuration to: {:?}", path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(config::ConfigError::Message(e.to_string())))?;
        fs::write(path, content).await?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.base_url.is_empty() {
            let url = Url::parse(&self.base_url)
                .map_err(|e| Error::validation(format!("Invalid base URL {:?}: {}", self.base_url, e)))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(Error::validation(format!(
                    "Base URL must use http or https, got {}",
                    url.scheme()
                )));
            }
        }

        if self.timeout_ms == 0 {
            return Err(Error::validation("Timeout must be greater than zero"));
        }

        Ok(())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(config::ConfigError::Message(e.to_string())))
    }
}
