//! Error types for the keyfan-core crate

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for keyfan operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {message}")]
    #[diagnostic(code(keyfan_core::config::invalid))]
    Configuration {
        /// The error message describing the configuration issue
        message: String,
    },

    /// I/O error with path context
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(keyfan_core::io::error))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The path where the I/O error occurred, if applicable
        path: Option<Box<std::path::Path>>,
        /// Description of the operation that failed
        operation: String,
    },

    /// Manifest parse error
    #[error("Failed to parse manifest {path}: {message}")]
    #[diagnostic(code(keyfan_core::manifest::parse))]
    Manifest {
        /// Path of the manifest file that failed to parse
        path: String,
        /// The underlying parse error message
        message: String,
    },

    /// Token acquisition error
    #[error("Failed to acquire token for scope '{scope}': {message}")]
    #[diagnostic(code(keyfan_core::auth::token))]
    Auth {
        /// The token scope that was requested
        scope: String,
        /// The error message from the credential provider
        message: String,
    },

    /// A resource "list keys" call failed
    #[error("Listing keys failed for {kind} '{resource}': {message}")]
    #[diagnostic(code(keyfan_core::source::list_keys))]
    ListKeys {
        /// The resource kind whose keys were requested
        kind: &'static str,
        /// The resource name
        resource: String,
        /// The error message from the management API
        message: String,
    },

    /// A vault operation failed
    #[error("Vault {operation} failed for secret '{name}': {message}")]
    #[diagnostic(code(keyfan_core::vault::operation))]
    Vault {
        /// The vault operation that failed (set, get, delete, list)
        operation: &'static str,
        /// The secret name involved
        name: String,
        /// The error message from the vault API
        message: String,
    },
}

impl Error {
    /// Create a configuration error with a message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(source: std::io::Error, path: Option<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.map(|p| p.into_boxed_path()),
            operation: operation.into(),
        }
    }

    /// Create a manifest parse error
    pub fn manifest(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a token acquisition error
    pub fn auth(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Auth {
            scope: scope.into(),
            message: message.into(),
        }
    }

    /// Create a list-keys error
    pub fn list_keys(
        kind: &'static str,
        resource: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ListKeys {
            kind,
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Create a vault operation error
    pub fn vault(
        operation: &'static str,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Vault {
            operation,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Whether this error stems from user configuration rather than a
    /// runtime call to an external service.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Manifest { .. })
    }
}

/// Result type for keyfan operations
pub type Result<T> = std::result::Result<T, Error>;
