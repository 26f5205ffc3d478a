//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `DOKO_STATE_DIR` - Directory for file-backed snapshots (default: `.doko`)
//! - `DOKO_CART_KEY` - Storage key for the cart (default: `doko_cart`)
//! - `DOKO_WISHLIST_KEY` - Storage key for the wishlist (default: `doko_wishlist`)
//! - `DOKO_NOTIFICATION_MS` - Toast display time in milliseconds (default: 3000)
//! - `DOKO_FREE_SHIPPING_THRESHOLD` - Subtotal for free delivery (default: 5000)
//! - `DOKO_SHIPPING_FEE` - Delivery fee below the threshold (default: 150)

use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::checkout::ShippingPolicy;
use crate::persistence::is_valid_key;
use crate::store::StoreOptions;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// State engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory holding snapshot files
    pub state_dir: PathBuf,
    /// Storage key for the cart snapshot
    pub cart_key: String,
    /// Storage key for the wishlist snapshot
    pub wishlist_key: String,
    /// How long "added" notifications are shown
    pub notification_duration: Duration,
    /// Delivery pricing for the checkout summary
    pub shipping: ShippingPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(".doko"),
            cart_key: "doko_cart".to_string(),
            wishlist_key: "doko_wishlist".to_string(),
            notification_duration: crate::notify::DEFAULT_DURATION,
            shipping: ShippingPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let state_dir = lookup("DOKO_STATE_DIR").map_or(defaults.state_dir, PathBuf::from);
        let cart_key = storage_key(&lookup, "DOKO_CART_KEY")?.unwrap_or(defaults.cart_key);
        let wishlist_key =
            storage_key(&lookup, "DOKO_WISHLIST_KEY")?.unwrap_or(defaults.wishlist_key);
        if cart_key == wishlist_key {
            return Err(ConfigError::InvalidEnvVar(
                "DOKO_WISHLIST_KEY".to_string(),
                "must differ from DOKO_CART_KEY".to_string(),
            ));
        }

        let notification_duration = lookup("DOKO_NOTIFICATION_MS")
            .map(|raw| parse_var::<u64>("DOKO_NOTIFICATION_MS", &raw))
            .transpose()?
            .map_or(defaults.notification_duration, Duration::from_millis);

        let free_threshold = decimal_var(&lookup, "DOKO_FREE_SHIPPING_THRESHOLD")?
            .unwrap_or(defaults.shipping.free_threshold);
        let flat_fee =
            decimal_var(&lookup, "DOKO_SHIPPING_FEE")?.unwrap_or(defaults.shipping.flat_fee);

        Ok(Self {
            state_dir,
            cart_key,
            wishlist_key,
            notification_duration,
            shipping: ShippingPolicy {
                free_threshold,
                flat_fee,
            },
        })
    }

    /// Store options for the cart.
    #[must_use]
    pub fn cart_options(&self) -> StoreOptions {
        StoreOptions {
            key: self.cart_key.clone(),
            notification_duration: self.notification_duration,
        }
    }

    /// Store options for the wishlist.
    #[must_use]
    pub fn wishlist_options(&self) -> StoreOptions {
        StoreOptions {
            key: self.wishlist_key.clone(),
            notification_duration: self.notification_duration,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn storage_key(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<String>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let value = raw.trim();
    if value.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "cannot be empty".to_string(),
        ));
    }
    if !is_valid_key(value) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{value:?} may only use letters, digits, '_', '-' and '.', and cannot start with '.'"),
        ));
    }
    Ok(Some(value.to_string()))
}

fn decimal_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Decimal>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let value = parse_var::<Decimal>(key, &raw)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "cannot be negative".to_string(),
        ));
    }
    Ok(Some(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.cart_options().key, "doko_cart");
        assert_eq!(config.wishlist_options().key, "doko_wishlist");
        assert_eq!(config.notification_duration, Duration::from_millis(3000));
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("DOKO_STATE_DIR", "/tmp/doko"),
            ("DOKO_CART_KEY", "cart_v2"),
            ("DOKO_NOTIFICATION_MS", "1500"),
            ("DOKO_FREE_SHIPPING_THRESHOLD", "2999.99"),
            ("DOKO_SHIPPING_FEE", "0"),
        ]))
        .unwrap();

        assert_eq!(config.state_dir, PathBuf::from("/tmp/doko"));
        assert_eq!(config.cart_key, "cart_v2");
        assert_eq!(config.notification_duration, Duration::from_millis(1500));
        assert_eq!(config.shipping.free_threshold, Decimal::new(299_999, 2));
        assert!(config.shipping.flat_fee.is_zero());
    }

    #[test]
    fn test_invalid_number() {
        let result = EngineConfig::from_lookup(lookup(&[("DOKO_NOTIFICATION_MS", "soon")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "DOKO_NOTIFICATION_MS"));
    }

    #[test]
    fn test_negative_fee() {
        let result = EngineConfig::from_lookup(lookup(&[("DOKO_SHIPPING_FEE", "-10")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_keys_must_differ() {
        let result = EngineConfig::from_lookup(lookup(&[
            ("DOKO_CART_KEY", "shared"),
            ("DOKO_WISHLIST_KEY", "shared"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_key_must_be_usable_as_file_name() {
        for bad in ["my cart", "carts/main", ".hidden", "kart!"] {
            let result = EngineConfig::from_lookup(lookup(&[("DOKO_CART_KEY", bad)]));
            assert!(
                matches!(&result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "DOKO_CART_KEY"),
                "{bad:?} was accepted"
            );
        }
        let result = EngineConfig::from_lookup(lookup(&[("DOKO_WISHLIST_KEY", "wish/list")]));
        assert!(result.is_err());

        let config = EngineConfig::from_lookup(lookup(&[("DOKO_CART_KEY", " cart.v2-main ")])).unwrap();
        assert_eq!(config.cart_key, "cart.v2-main");
    }

    #[test]
    fn test_empty_key() {
        let result = EngineConfig::from_lookup(lookup(&[("DOKO_CART_KEY", "  ")]));
        assert!(result.is_err());
    }
}
