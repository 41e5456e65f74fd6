//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `PAINTSHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `PAINTSHOP_PORT` - Listen port (default: 3000)
//! - `PAINTSHOP_BASE_URL` - Public URL (default: `http://{host}:{port}`)
//! - `PAINTSHOP_TAX_RATE` - Sales tax rate as a fraction (default: 0.08)
//! - `PAINTSHOP_MOCK_SEED` - Fixed RNG seed for the mock backend
//! - `PAINTSHOP_MOCK_MIN_LATENCY_MS` - Minimum simulated latency (default: 200)
//! - `PAINTSHOP_MOCK_MAX_LATENCY_MS` - Maximum simulated latency (default: 800)
//! - `PAINTSHOP_ORDER_FAILURE_RATE` - Order submission failure rate (default: 0.10)
//! - `PAINTSHOP_RETURN_FAILURE_RATE` - Return request failure rate (default: 0.05)
//! - `PAINTSHOP_ADDRESS_FAILURE_RATE` - Address validation failure rate (default: 0.05)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::backend::{FailureRates, LatencyProfile, MockBackendConfig};
use crate::pricing::DEFAULT_TAX_RATE;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Flat sales tax rate
    pub tax_rate: Decimal,
    /// Mock backend behavior
    pub backend: MockBackendConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host: IpAddr = parse_env_or_default(&lookup, "PAINTSHOP_HOST", "127.0.0.1")?;
        let port: u16 = parse_env_or_default(&lookup, "PAINTSHOP_PORT", "3000")?;
        let base_url = get_optional_env(&lookup, "PAINTSHOP_BASE_URL")
            .map_or_else(
                || format!("http://{host}:{port}"),
                |url| url.trim_end_matches('/').to_string(),
            );
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("PAINTSHOP_BASE_URL".to_string(), e.to_string())
        })?;

        let tax_rate: Decimal =
            parse_env_or_default(&lookup, "PAINTSHOP_TAX_RATE", &DEFAULT_TAX_RATE.to_string())?;
        if tax_rate.is_sign_negative() || tax_rate >= Decimal::ONE {
            return Err(ConfigError::InvalidEnvVar(
                "PAINTSHOP_TAX_RATE".to_string(),
                "must be in [0, 1)".to_string(),
            ));
        }

        let latency = LatencyProfile {
            min_ms: parse_env_or_default(&lookup, "PAINTSHOP_MOCK_MIN_LATENCY_MS", "200")?,
            max_ms: parse_env_or_default(&lookup, "PAINTSHOP_MOCK_MAX_LATENCY_MS", "800")?,
        };
        if latency.min_ms > latency.max_ms {
            return Err(ConfigError::InvalidEnvVar(
                "PAINTSHOP_MOCK_MIN_LATENCY_MS".to_string(),
                "must not exceed PAINTSHOP_MOCK_MAX_LATENCY_MS".to_string(),
            ));
        }

        let failure_rates = FailureRates {
            address_validation: get_rate(&lookup, "PAINTSHOP_ADDRESS_FAILURE_RATE", "0.05")?,
            order_submission: get_rate(&lookup, "PAINTSHOP_ORDER_FAILURE_RATE", "0.10")?,
            return_request: get_rate(&lookup, "PAINTSHOP_RETURN_FAILURE_RATE", "0.05")?,
        };

        let seed = get_optional_env(&lookup, "PAINTSHOP_MOCK_SEED")
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("PAINTSHOP_MOCK_SEED".to_string(), e.to_string())
                })
            })
            .transpose()?;

        #[allow(clippy::cast_possible_truncation)] // rates are in [0, 1]
        let sentry_sample_rate = get_rate(&lookup, "SENTRY_SAMPLE_RATE", "1.0")? as f32;
        #[allow(clippy::cast_possible_truncation)]
        let sentry_traces_sample_rate =
            get_rate(&lookup, "SENTRY_TRACES_SAMPLE_RATE", "0.0")? as f32;

        Ok(Self {
            host,
            port,
            backend: MockBackendConfig {
                latency,
                failure_rates,
                seed,
                base_url: base_url.clone(),
            },
            base_url,
            tax_rate,
            sentry_dsn: get_optional_env(&lookup, "SENTRY_DSN"),
            sentry_environment: get_optional_env(&lookup, "SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Configuration for tests: instant, failure-free backend.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://127.0.0.1:3000".to_string(),
            tax_rate: DEFAULT_TAX_RATE,
            backend: MockBackendConfig::instant(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse an environment variable, falling back to a default.
fn parse_env_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(lookup, key)
        .unwrap_or_else(|| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a probability in `[0, 1]`.
fn get_rate(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<f64, ConfigError> {
    let rate: f64 = parse_env_or_default(lookup, key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0 and 1 (got {rate})"),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal_macros::dec;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.tax_rate, dec!(0.08));
        assert_eq!(config.backend.latency, LatencyProfile::default());
        assert_eq!(config.backend.failure_rates, FailureRates::default());
        assert_eq!(config.backend.seed, None);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PAINTSHOP_PORT", "8080"),
            ("PAINTSHOP_BASE_URL", "https://paint.example.com/"),
            ("PAINTSHOP_MOCK_SEED", "7"),
            ("PAINTSHOP_ORDER_FAILURE_RATE", "0"),
            ("PAINTSHOP_TAX_RATE", "0.0725"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url, "https://paint.example.com");
        assert_eq!(config.backend.base_url, "https://paint.example.com");
        assert_eq!(config.backend.seed, Some(7));
        assert!(config.backend.failure_rates.order_submission.abs() < f64::EPSILON);
        assert_eq!(config.tax_rate, dec!(0.0725));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("PAINTSHOP_PORT", "  "), ("SENTRY_DSN", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("PAINTSHOP_PORT", "http")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "PAINTSHOP_PORT"
        ));
        assert!(matches!(
            load(&[("PAINTSHOP_ORDER_FAILURE_RATE", "1.5")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "PAINTSHOP_ORDER_FAILURE_RATE"
        ));
        assert!(matches!(
            load(&[("PAINTSHOP_ORDER_FAILURE_RATE", "NaN")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(load(&[("PAINTSHOP_TAX_RATE", "-0.01")]).is_err());
        assert!(load(&[("PAINTSHOP_BASE_URL", "not a url")]).is_err());
        assert!(
            load(&[
                ("PAINTSHOP_MOCK_MIN_LATENCY_MS", "900"),
                ("PAINTSHOP_MOCK_MAX_LATENCY_MS", "100"),
            ])
            .is_err()
        );
    }
}
