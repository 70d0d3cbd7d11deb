//! CLI definition, error rendering, and exit codes

use clap::{Parser, ValueEnum};
use keyfan_core::{DEFAULT_CONCURRENCY, SecretWrite};
use miette::{Diagnostic, Report};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for a fully successful run
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Runtime failure exit code (any fetch or write error)
pub const EXIT_RUN: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(keyfan::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Runtime failure (exit code 3)
    #[error("{message}")]
    #[diagnostic(code(keyfan::cli::run))]
    Run {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new runtime error
    #[must_use]
    pub fn run(message: impl Into<String>) -> Self {
        Self::Run {
            message: message.into(),
            help: None,
        }
    }

    /// Add help text to an existing error
    #[must_use]
    pub fn with_help(self, help_text: impl Into<String>) -> Self {
        let help = Some(help_text.into());
        match self {
            Self::Config { message, .. } => Self::Config { message, help },
            Self::Run { message, .. } => Self::Run { message, help },
        }
    }
}

/// Map `keyfan_core` errors to CLI categories: configuration problems get
/// exit code 2, everything that happened while talking to Azure gets 3.
impl From<keyfan_core::Error> for CliError {
    fn from(err: keyfan_core::Error) -> Self {
        if err.is_configuration() {
            Self::config(err.to_string())
        } else {
            Self::run(err.to_string())
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Run { .. } => EXIT_RUN,
    }
}

/// Render error appropriately based on JSON flag
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let envelope = ErrorEnvelope::new(serde_json::json!({
            "code": match err {
                CliError::Config { .. } => "config",
                CliError::Run { .. } => "run",
            },
            "message": err.to_string()
        }));
        match serde_json::to_string(&envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Logging verbosity levels accepted by `--level`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum LogLevel {
    /// Most verbose
    Trace,
    /// Debug information
    Debug,
    /// Informational messages (each stored secret is logged at this level)
    Info,
    /// Warnings only
    Warn,
    /// Errors only
    Error,
}

impl LogLevel {
    /// The level as an env-filter directive.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Main CLI entry point for keyfan.
///
/// Copies access keys from Azure resources (function apps, Cosmos DB
/// accounts, Event Grid domains, Data Factory integration runtimes, storage
/// accounts) into an Azure Key Vault, driven by flags and small YAML
/// manifests.
#[derive(Parser, Debug)]
#[command(name = "keyfan")]
#[command(about = "Copy Azure resource access keys and secrets into Azure Key Vault")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The name of the keyvault where to store secrets.
    #[arg(long, value_name = "NAME")]
    pub vault: String,

    /// Inline secrets to store, as name:=value (repeatable).
    #[arg(
        long = "secret",
        action = clap::ArgAction::Append,
        value_name = "NAME:=VALUE"
    )]
    pub secrets: Vec<String>,

    /// The subscription holding the resources to read keys from.
    #[arg(long, value_name = "ID")]
    pub subscription: Option<String>,

    /// The resource group holding the resources to read keys from.
    #[arg(long = "resource-group", value_name = "NAME")]
    pub resource_group: Option<String>,

    /// Store function app host keys in the keyvault.
    #[arg(long)]
    pub storefunckeys: bool,

    /// Store Cosmos DB account keys in the keyvault.
    #[arg(long)]
    pub storecosmoskeys: bool,

    /// Store Event Grid domain keys in the keyvault.
    #[arg(long = "storeeventskeys")]
    pub storeeventskeys: bool,

    /// Store Data Factory integration runtime auth keys in the keyvault.
    #[arg(long)]
    pub storeadfirkeys: bool,

    /// Store storage account keys in the keyvault.
    #[arg(long)]
    pub storestoragekeys: bool,

    /// Manifest listing the function apps to read host keys from.
    #[arg(long, value_name = "FILE")]
    pub funcsecfile: Option<PathBuf>,

    /// Print the value of a single secret.
    #[arg(long = "getsecret", value_name = "NAME")]
    pub get_secret: Option<String>,

    /// Delete a single secret from the keyvault.
    #[arg(long = "deletesecret", value_name = "NAME")]
    pub delete_secret: Option<String>,

    /// List the names of all secrets in the keyvault.
    #[arg(long = "listsecrets")]
    pub list_secrets: bool,

    /// Bound on concurrent fetch+write tasks within a batch.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Set logging level.
    #[arg(short = 'L', long, default_value = "warn", value_enum)]
    pub level: LogLevel,

    /// Emit JSON envelopes instead of human-readable output.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Whether any resource-kind propagation was requested.
    #[must_use]
    pub const fn wants_resource_keys(&self) -> bool {
        self.storefunckeys
            || self.storecosmoskeys
            || self.storeeventskeys
            || self.storeadfirkeys
            || self.storestoragekeys
    }
}

/// Parse repeated `--secret name:=value` arguments into pending writes.
///
/// # Errors
///
/// Returns a configuration error for any argument missing the `:=` separator
/// or with an empty name.
pub fn parse_secret_pairs(pairs: &[String]) -> Result<Vec<SecretWrite>, CliError> {
    pairs
        .iter()
        .map(|pair| {
            let (name, value) = pair.split_once(":=").ok_or_else(|| {
                CliError::config_with_help(
                    format!("Invalid secret argument '{pair}'"),
                    "Use --secret name:=value",
                )
            })?;
            if name.is_empty() {
                return Err(CliError::config_with_help(
                    format!("Invalid secret argument '{pair}': empty name"),
                    "Use --secret name:=value",
                ));
            }
            Ok(SecretWrite::new(name, value))
        })
        .collect()
}
