//! Run orchestration: credential setup, standalone vault operations, and the
//! per-kind propagation batches.

use crate::cli::{Cli, CliError, OkEnvelope, parse_secret_pairs};
use azure_identity::{DefaultAzureCredential, TokenCredentialOptions};
use keyfan_core::manifest::{
    CosmosAccount, EventGridDomain, FunctionApp, IntegrationRuntime, StorageAccount, load_manifest,
};
use keyfan_core::{RunReport, propagate, push_all};
use keyfan_sources::{
    ArmClient, CosmosKeySource, EventGridKeySource, FunctionKeySource,
    IntegrationRuntimeKeySource, StorageKeySource,
};
use keyfan_vault::VaultWriter;
use std::path::Path;
use std::sync::Arc;

/// Default manifest file names for the resource kinds that do not take a
/// file flag. The function app manifest has no default; `--funcsecfile` is
/// required with `--storefunckeys`.
const COSMOS_MANIFEST: &str = "cosmos-secrets.yaml";
const EVENTGRID_MANIFEST: &str = "eventgrid-secrets.yaml";
const ADF_MANIFEST: &str = "adf-integration-runtime-secrets.yaml";
const STORAGE_MANIFEST: &str = "storage-secrets.yaml";

/// Execute the requested operations in order: standalone vault operations,
/// inline secrets, then one propagation batch per enabled resource kind.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let credential = Arc::new(
        DefaultAzureCredential::create(TokenCredentialOptions::default())
            .map_err(|e| CliError::run(format!("failed to create Azure credential: {e}")))?,
    );
    let vault = VaultWriter::new(&cli.vault, credential.clone())?;

    if cli.list_secrets {
        for name in vault.list().await? {
            println!("{name}");
        }
    }
    if let Some(name) = &cli.get_secret {
        println!("{}", vault.get(name).await?);
    }
    if let Some(name) = &cli.delete_secret {
        vault.delete(name).await?;
    }

    let mut report = RunReport::new();

    let inline = parse_secret_pairs(&cli.secrets)?;
    if !inline.is_empty() {
        report.merge(push_all(&vault, &inline, cli.concurrency).await);
    }

    if cli.wants_resource_keys() {
        let subscription = cli.subscription.clone().ok_or_else(|| {
            CliError::config_with_help(
                "Please provide a subscription for your azure account",
                "Add --subscription <ID>",
            )
        })?;
        let resource_group = cli.resource_group.clone().ok_or_else(|| {
            CliError::config_with_help(
                "Please provide a resource group for your azure account",
                "Add --resource-group <NAME>",
            )
        })?;
        let arm = Arc::new(ArmClient::new(credential, subscription, resource_group));

        if cli.storefunckeys {
            let file = cli.funcsecfile.as_deref().ok_or_else(|| {
                CliError::config_with_help(
                    "Please provide the function apps manifest",
                    "Add --funcsecfile <FILE>",
                )
            })?;
            let entries: Vec<FunctionApp> = load_manifest(file)?;
            let source = FunctionKeySource::new(arm.clone());
            report.merge(propagate(&source, &vault, &entries, cli.concurrency).await);
        }

        if cli.storecosmoskeys {
            let entries: Vec<CosmosAccount> = load_manifest(Path::new(COSMOS_MANIFEST))?;
            let source = CosmosKeySource::new(arm.clone());
            report.merge(propagate(&source, &vault, &entries, cli.concurrency).await);
        }

        if cli.storeeventskeys {
            let entries: Vec<EventGridDomain> = load_manifest(Path::new(EVENTGRID_MANIFEST))?;
            let source = EventGridKeySource::new(arm.clone());
            report.merge(propagate(&source, &vault, &entries, cli.concurrency).await);
        }

        if cli.storeadfirkeys {
            let entries: Vec<IntegrationRuntime> = load_manifest(Path::new(ADF_MANIFEST))?;
            let source = IntegrationRuntimeKeySource::new(arm.clone());
            report.merge(propagate(&source, &vault, &entries, cli.concurrency).await);
        }

        if cli.storestoragekeys {
            let entries: Vec<StorageAccount> = load_manifest(Path::new(STORAGE_MANIFEST))?;
            let source = StorageKeySource::new(arm.clone());
            report.merge(propagate(&source, &vault, &entries, cli.concurrency).await);
        }
    }

    finish(&report, cli.json)
}

/// Print the run summary and map collected failures to the exit status.
fn finish(report: &RunReport, json_mode: bool) -> Result<(), CliError> {
    for failure in report.failures() {
        tracing::error!(resource = %failure.resource, error = %failure.error, "propagation failed");
    }

    if report.is_clean() {
        if json_mode {
            let envelope = OkEnvelope::new(serde_json::json!({
                "written": report.written(),
            }));
            match serde_json::to_string(&envelope) {
                Ok(json) => println!("{json}"),
                Err(e) => return Err(CliError::run(format!("JSON serialization failed: {e}"))),
            }
        } else if !report.written().is_empty() {
            println!("stored {} secrets", report.written().len());
        }
        Ok(())
    } else {
        let total = report.written().len() + report.failures().len();
        Err(CliError::run(format!(
            "{} of {total} secret operations failed",
            report.failures().len()
        ))
        .with_help("Failures are logged above; rerun after fixing them"))
    }
}
