use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::errors::CoreError;
use crate::models::chart::HistoricalPeriod;

/// Environment variable that supplies the Alpha Vantage key.
pub const ALPHA_VANTAGE_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

/// Provider name under which the Alpha Vantage key is stored in `api_keys`.
pub const ALPHA_VANTAGE_KEY_NAME: &str = "alphavantage";

/// User-configurable settings, read from an optional TOML file.
///
/// ```toml
/// currency_symbol = "$"
/// request_timeout_secs = 20
/// default_period = "6m"
/// prefer_market_prices = true
///
/// [api_keys]
/// alphavantage = "demo"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Prefix used when formatting money (display only, no conversion).
    pub currency_symbol: String,

    /// HTTP timeout for market-data requests, in seconds.
    pub request_timeout_secs: u64,

    /// Period used by historical charts unless the caller picks one.
    pub default_period: HistoricalPeriod,

    /// Fetch market quotes even for holdings that carry a manual price.
    pub prefer_market_prices: bool,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "alphavantage").
    pub api_keys: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            request_timeout_secs: 30,
            default_period: HistoricalPeriod::OneYear,
            prefer_market_prices: false,
            api_keys: HashMap::new(),
        }
    }
}

impl Settings {
    /// Defaults, overlaid with `path` when given, then with environment keys.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let settings = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    CoreError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        let settings = settings.with_env_api_keys();
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text. Missing fields keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, CoreError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Pick up API keys from the environment. Environment wins over the file.
    pub fn with_env_api_keys(mut self) -> Self {
        if let Ok(key) = std::env::var(ALPHA_VANTAGE_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api_keys
                    .insert(ALPHA_VANTAGE_KEY_NAME.to_string(), key.trim().to_string());
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.currency_symbol.trim().is_empty() {
            return Err(CoreError::Config(
                "currency_symbol must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    pub fn api_key(&self, provider: &str) -> Option<&str> {
        self.api_keys.get(provider).map(String::as_str)
    }
}
