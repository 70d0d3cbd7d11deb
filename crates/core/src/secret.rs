//! Secret values with automatic memory zeroing
//!
//! - [`SecretValue`]: a wrapper around `secrecy::SecretString` that auto-zeros
//!   on drop and redacts `Debug`/`Display` output
//! - [`SecretWrite`]: a destination name paired with the value to store there

use secrecy::{ExposeSecret, SecretString};

/// A secret value with automatic memory zeroing on drop.
///
/// Debug and Display output show `[REDACTED]` instead of the actual value;
/// an explicit [`expose`](SecretValue::expose) call is required to read it.
#[derive(Clone)]
pub struct SecretValue {
    inner: SecretString,
}

impl SecretValue {
    /// Create a new secret value from a string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: SecretString::from(value.into()),
        }
    }

    /// Expose the secret value for use.
    ///
    /// The caller must ensure the exposed value is not logged, printed, or
    /// persisted anywhere other than the vault.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }

    /// Get the length of the secret value without exposing it.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    /// Check if the secret value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A single pending secret write: destination name plus value.
///
/// Produced by a key source, consumed by a sink. Ephemeral; the vault and
/// the cloud resources remain the systems of record.
#[derive(Debug, Clone)]
pub struct SecretWrite {
    /// Destination secret name in the vault
    pub name: String,
    /// The value to store
    pub value: SecretValue,
}

impl SecretWrite {
    /// Create a new pending write.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: SecretValue::new(value),
        }
    }
}
