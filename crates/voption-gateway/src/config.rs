/*
[INPUT]:  YAML configuration file and credential environment variables
[OUTPUT]: Parsed gateway configuration and the REST client it describes
[POS]:    Configuration layer - gateway setup
[UPDATE]: When adding new configuration options
*/

use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use voption_adapter::{Credentials, RestConfig, Venue, VoptionClient};

pub const API_KEY_ENV: &str = "VOPTION_API_KEY";
pub const API_SECRET_ENV: &str = "VOPTION_API_SECRET";

/// Top-level configuration for the gateway
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Address the HTTP front controller binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Exchange connection settings
    #[serde(default)]
    pub exchange: ExchangeConfig,
    /// Keep the clock drift in sync every N seconds (disabled when absent)
    #[serde(default)]
    pub time_sync_interval_secs: Option<u64>,
}

/// Exchange connection configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct ExchangeConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing)]
    pub api_secret: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub venue: Venue,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub recv_window: Option<u64>,
    #[serde(default)]
    pub handle_drift: bool,
    #[serde(default = "default_normalize")]
    pub normalize: bool,
    #[serde(default)]
    pub proxy: Option<String>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: default_base_url(),
            venue: Venue::default(),
            timeout_ms: default_timeout_ms(),
            recv_window: None,
            handle_drift: false,
            normalize: default_normalize(),
            proxy: None,
        }
    }
}

impl std::fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("venue", &self.venue)
            .field("timeout_ms", &self.timeout_ms)
            .field("recv_window", &self.recv_window)
            .field("handle_drift", &self.handle_drift)
            .field("normalize", &self.normalize)
            .field("proxy", &self.proxy)
            .finish()
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:80".to_string()
}

fn default_base_url() -> String {
    voption_adapter::http::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_normalize() -> bool {
    true
}

impl GatewayConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.exchange.timeout_ms == 0 {
            bail!("exchange.timeout_ms must be positive");
        }
        if self.time_sync_interval_secs == Some(0) {
            bail!("time_sync_interval_secs must be positive");
        }
        Ok(())
    }

    /// Replace file credentials with `VOPTION_API_KEY` / `VOPTION_API_SECRET` when set
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(API_SECRET_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, api_key: Option<String>, api_secret: Option<String>) {
        if let Some(key) = api_key.filter(|key| !key.is_empty()) {
            self.exchange.api_key = key;
        }
        if let Some(secret) = api_secret.filter(|secret| !secret.is_empty()) {
            self.exchange.api_secret = secret;
        }
    }

    pub fn time_sync_interval(&self) -> Option<Duration> {
        self.time_sync_interval_secs.map(Duration::from_secs)
    }
}

impl ExchangeConfig {
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    pub fn rest_config(&self) -> RestConfig {
        RestConfig {
            base_url: self.base_url.clone(),
            venue: self.venue,
            timeout: Duration::from_millis(self.timeout_ms),
            recv_window: self.recv_window,
            handle_drift: self.handle_drift,
            normalize: self.normalize,
            proxy: self.proxy.clone(),
        }
    }

    /// Build the REST client, attaching credentials when both are present
    pub fn build_client(&self) -> anyhow::Result<VoptionClient> {
        let client = VoptionClient::with_config(self.rest_config()).context("build REST client")?;
        if self.has_credentials() {
            Ok(client.with_credentials(Credentials::new(&self.api_key, &self.api_secret)))
        } else {
            Ok(client)
        }
    }
}
