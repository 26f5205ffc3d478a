//! Error types for the state engine.
//!
//! None of these are fatal. Reducer errors reject a single action and leave
//! state untouched; persistence errors degrade to an empty or unsaved state.

use thiserror::Error;

use doko_core::CurrencyCode;

/// Errors raised by the cart reducer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Quantity is negative, zero where a positive value is required,
    /// not a whole number, or out of range.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// The product's price snapshot is negative.
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// The product is priced in a different currency from the rest of the cart.
    #[error("Currency mismatch: cart is in {expected:?}, product is in {found:?}")]
    CurrencyMismatch {
        expected: CurrencyCode,
        found: CurrencyCode,
    },
}

/// Errors raised while reading or writing snapshots.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The stored record could not be read or parsed.
    #[error("Failed to read snapshot {key}: {reason}")]
    Read { key: String, reason: String },

    /// The stored record parsed but breaks a state invariant.
    #[error("Snapshot {key} is invalid: {reason}")]
    Invalid { key: String, reason: String },

    /// The durable store rejected a write.
    #[error("Failed to write snapshot {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// State could not be encoded.
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The storage key is not usable by the backend.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::InvalidQuantity("-2".to_string());
        assert_eq!(err.to_string(), "Invalid quantity: -2");
    }

    #[test]
    fn test_persistence_error_display() {
        let err = PersistenceError::Invalid {
            key: "doko_cart".to_string(),
            reason: "zero quantity".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Snapshot doko_cart is invalid: zero quantity"
        );
    }
}
