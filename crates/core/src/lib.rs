//! Core types for keyfan
//!
//! Provides the building blocks shared by the vault writer, the resource key
//! sources, and the CLI:
//!
//! - [`Error`] / [`Result`]: the crate-wide error type
//! - [`manifest`]: per-resource-kind YAML manifest loading
//! - [`SecretValue`] / [`SecretWrite`]: secret values with redaction on
//!   `Debug`/`Display` and zeroing on drop
//! - [`KeySource`] / [`SecretSink`]: the seams between "list keys somewhere"
//!   and "store a secret somewhere"
//! - [`propagate`] / [`push_all`]: the bounded fetch-then-write fan-out
//!
//! Provider implementations live in separate crates:
//! - `keyfan-sources`: ARM-backed [`KeySource`] implementations
//! - `keyfan-vault`: the Azure Key Vault [`SecretSink`]

mod error;
pub mod manifest;
mod pipeline;
mod secret;

pub use error::{Error, Result};
pub use pipeline::{
    DEFAULT_CONCURRENCY, Failure, KeySource, RunReport, SecretSink, propagate, push_all,
};
pub use secret::{SecretValue, SecretWrite};
