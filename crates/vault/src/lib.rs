//! Azure Key Vault integration for keyfan
//!
//! This crate provides the vault side of the propagation pipeline:
//! [`VaultWriter`] implements `keyfan_core::SecretSink` over the Key Vault
//! secrets API and additionally exposes get, delete, and list operations.

pub mod secrets;

// Re-export main types for convenience
pub use secrets::{VaultWriter, vault_url};
