//! Configuration module for loading and parsing TOML configuration files.

use crate::strategy::PayoffSettings;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Analytics engine configuration.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Analytics engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Steps across the payoff sweep.
    pub price_steps: usize,
    /// Half-width of the payoff sweep as a fraction of spot.
    pub range_fraction: f64,
    /// Shares per option contract.
    pub contract_multiplier: f64,
    /// Premium used for template legs with no quote.
    pub default_premium: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        let payoff = PayoffSettings::default();
        Self {
            price_steps: payoff.steps,
            range_fraction: payoff.range_fraction,
            contract_multiplier: payoff.contract_multiplier,
            default_premium: 0.0,
        }
    }
}

impl AnalyticsConfig {
    /// Payoff settings for the engine.
    #[must_use]
    pub fn payoff_settings(&self) -> PayoffSettings {
        PayoffSettings {
            steps: self.price_steps,
            range_fraction: self.range_fraction,
            contract_multiplier: self.contract_multiplier,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Loads configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read, parsed or validated.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Arguments
    /// * `content` - TOML content as string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        let analytics = &self.analytics;

        if analytics.price_steps < 2 {
            return Err(ConfigError::InvalidValue(
                "analytics price_steps must be at least 2".to_string(),
            ));
        }
        if !(analytics.range_fraction > 0.0 && analytics.range_fraction < 1.0) {
            return Err(ConfigError::InvalidValue(
                "analytics range_fraction must be between 0 and 1".to_string(),
            ));
        }
        if !(analytics.contract_multiplier.is_finite() && analytics.contract_multiplier > 0.0) {
            return Err(ConfigError::InvalidValue(
                "analytics contract_multiplier must be positive".to_string(),
            ));
        }
        if !(analytics.default_premium.is_finite() && analytics.default_premium >= 0.0) {
            return Err(ConfigError::InvalidValue(
                "analytics default_premium must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 3000

[analytics]
price_steps = 200
range_fraction = 0.5
contract_multiplier = 10.0
default_premium = 0.05
"#;

        let config = Config::parse(toml_content).expect("should parse");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.analytics.price_steps, 200);
        assert_eq!(config.analytics.range_fraction, 0.5);
        assert_eq!(config.analytics.contract_multiplier, 10.0);
        assert_eq!(config.analytics.default_premium, 0.05);

        let settings = config.analytics.payoff_settings();
        assert_eq!(settings.steps, 200);
        assert_eq!(settings.contract_multiplier, 10.0);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::parse("[analytics]\nprice_steps = 50\n").expect("should parse");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.analytics.price_steps, 50);
        assert_eq!(config.analytics.range_fraction, 0.30);
        assert_eq!(config.analytics.contract_multiplier, 100.0);
    }

    #[test]
    fn test_default_matches_engine_defaults() {
        let config = Config::default();
        assert_eq!(config.analytics.payoff_settings(), PayoffSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_analytics() {
        for body in [
            "[analytics]\nprice_steps = 1\n",
            "[analytics]\nrange_fraction = 1.5\n",
            "[analytics]\ncontract_multiplier = 0.0\n",
            "[analytics]\ndefault_premium = -1.0\n",
        ] {
            assert!(
                matches!(Config::parse(body), Err(ConfigError::InvalidValue(_))),
                "{body}"
            );
        }
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/strategy-analytics.toml")
            .expect("missing file should fall back");
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Config::parse("[server\nport = 1"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
