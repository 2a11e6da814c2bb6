use std::env;
use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::app_system::session::MAX_SESSION_TTL_MINUTES;
use crate::domain::ReliabilityPolicy;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid { key: String, value: String, reason: String },
}

/// Runtime settings, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub channel_buffer: usize,
    pub default_delivery_price: Decimal,
    pub country_code: String,
    pub reliability: ReliabilityPolicy,
    /// Bcrypt hash of the admin console password. `None` disables admin login.
    pub admin_password_hash: Option<String>,
    pub session_ttl_minutes: i64,
    pub shop_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel_buffer: 32,
            default_delivery_price: Decimal::from(500),
            country_code: "213".to_string(),
            reliability: ReliabilityPolicy::default(),
            admin_password_hash: None,
            session_ttl_minutes: 480,
            shop_name: "Kitchen Corner".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `load` passes the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let country_code: String = try_load(&lookup, "LEDGER_COUNTRY_CODE", defaults.country_code)?;
        if country_code.is_empty() || !country_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Invalid {
                key: "LEDGER_COUNTRY_CODE".into(),
                value: country_code,
                reason: "expected digits only".into(),
            });
        }

        let default_delivery_price: Decimal =
            try_load(&lookup, "LEDGER_DEFAULT_DELIVERY_PRICE", defaults.default_delivery_price)?;
        if default_delivery_price.is_sign_negative() && !default_delivery_price.is_zero() {
            return Err(ConfigError::Invalid {
                key: "LEDGER_DEFAULT_DELIVERY_PRICE".into(),
                value: default_delivery_price.to_string(),
                reason: "must not be negative".into(),
            });
        }

        let admin_password_hash = lookup("LEDGER_ADMIN_PASSWORD_HASH")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());
        match admin_password_hash.as_deref() {
            None => warn!("LEDGER_ADMIN_PASSWORD_HASH not set, admin login disabled"),
            Some(hash) => {
                if let Err(e) = bcrypt::verify("", hash) {
                    return Err(ConfigError::Invalid {
                        key: "LEDGER_ADMIN_PASSWORD_HASH".into(),
                        value: "<redacted>".into(),
                        reason: format!("not a bcrypt hash: {e}"),
                    });
                }
            }
        }

        let session_ttl_minutes: i64 =
            try_load(&lookup, "LEDGER_SESSION_TTL_MINUTES", defaults.session_ttl_minutes)?;
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&session_ttl_minutes) {
            return Err(ConfigError::Invalid {
                key: "LEDGER_SESSION_TTL_MINUTES".into(),
                value: session_ttl_minutes.to_string(),
                reason: format!("expected 1..={MAX_SESSION_TTL_MINUTES}"),
            });
        }

        Ok(Self {
            channel_buffer: try_load(&lookup, "LEDGER_CHANNEL_BUFFER", defaults.channel_buffer)?.max(1),
            default_delivery_price,
            country_code,
            reliability: ReliabilityPolicy {
                reliable_after: try_load(&lookup, "LEDGER_RELIABLE_AFTER", defaults.reliability.reliable_after)?,
                warning_limit: try_load(&lookup, "LEDGER_WARNING_LIMIT", defaults.reliability.warning_limit)?,
            },
            admin_password_hash,
            session_ttl_minutes,
            shop_name: try_load(&lookup, "LEDGER_SHOP_NAME", defaults.shop_name)?,
        })
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = from(&[]).unwrap();
        assert_eq!(config.channel_buffer, 32);
        assert_eq!(config.default_delivery_price, Decimal::from(500));
        assert_eq!(config.country_code, "213");
        assert_eq!(config.reliability, ReliabilityPolicy { reliable_after: 3, warning_limit: 3 });
        assert!(config.admin_password_hash.is_none());
        assert_eq!(config.session_ttl_minutes, 480);
    }

    #[test]
    fn test_overrides_are_parsed() {
        let hash = bcrypt::hash("s3cret", 4).unwrap();
        let config = from(&[
            ("LEDGER_DEFAULT_DELIVERY_PRICE", "650"),
            ("LEDGER_WARNING_LIMIT", "5"),
            ("LEDGER_ADMIN_PASSWORD_HASH", &hash),
            ("LEDGER_CHANNEL_BUFFER", "0"),
        ])
        .unwrap();
        assert_eq!(config.default_delivery_price, Decimal::from(650));
        assert_eq!(config.reliability.warning_limit, 5);
        assert_eq!(config.admin_password_hash.as_deref(), Some(hash.as_str()));
        assert_eq!(config.channel_buffer, 1);
    }

    #[test]
    fn test_malformed_values_fail() {
        assert!(matches!(from(&[("LEDGER_WARNING_LIMIT", "three")]), Err(ConfigError::Invalid { .. })));
        assert!(matches!(from(&[("LEDGER_COUNTRY_CODE", "+213")]), Err(ConfigError::Invalid { .. })));
        assert!(matches!(from(&[("LEDGER_DEFAULT_DELIVERY_PRICE", "-5")]), Err(ConfigError::Invalid { .. })));
        assert!(matches!(from(&[("LEDGER_ADMIN_PASSWORD_HASH", "s3cret")]), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_session_ttl_is_bounded() {
        for raw in ["0", "-5", "1000000000000", "9223372036854775807"] {
            let err = from(&[("LEDGER_SESSION_TTL_MINUTES", raw)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "LEDGER_SESSION_TTL_MINUTES"));
        }
        let max = MAX_SESSION_TTL_MINUTES.to_string();
        assert_eq!(from(&[("LEDGER_SESSION_TTL_MINUTES", &max)]).unwrap().session_ttl_minutes, MAX_SESSION_TTL_MINUTES);
    }
}
