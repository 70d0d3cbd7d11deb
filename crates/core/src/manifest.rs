//! Per-resource-kind manifest loading
//!
//! Each resource kind is configured by a YAML file holding a top-level list
//! of entries. Field names follow the established manifest format:
//!
//! ```yaml
//! # functions manifest
//! - funcName: orders-api
//!   secretkeyname: orders-api-host-key
//! ```
//!
//! Manifests are loaded once at startup and immutable for the run.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A function app whose host master key is copied into the vault.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionApp {
    /// Name of the function app
    #[serde(rename = "funcName")]
    pub name: String,

    /// Destination secret name for the host master key
    #[serde(rename = "secretkeyname")]
    pub secret_key_name: String,
}

/// A Cosmos DB database account with a logical-key-to-secret-name mapping.
///
/// Logical key names are `primaryMasterKey`, `primaryReadonlyKey`,
/// `secondaryMasterKey`, and `secondaryReadonlyKey`; any other name is a
/// configuration error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CosmosAccount {
    /// Name of the database account
    #[serde(rename = "accountName")]
    pub account_name: String,

    /// Mapping from logical key name to destination secret name
    #[serde(rename = "cosmosdbKeys")]
    pub keys: BTreeMap<String, String>,
}

/// An Event Grid domain with a logical-key-to-secret-name mapping.
///
/// Logical key names are `Key1` and `Key2`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventGridDomain {
    /// Name of the event domain
    #[serde(rename = "domainName")]
    pub domain_name: String,

    /// Mapping from logical key name to destination secret name
    #[serde(rename = "eventgridKeys")]
    pub keys: BTreeMap<String, String>,
}

/// A Data Factory integration runtime whose two auth keys are copied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntegrationRuntime {
    /// Name of the data factory
    #[serde(rename = "factoryName")]
    pub factory_name: String,

    /// Name of the integration runtime within the factory
    #[serde(rename = "integrationRuntimeName")]
    pub integration_runtime_name: String,

    /// Destination secret name for the first auth key
    #[serde(rename = "integrationRuntimeKey1")]
    pub key1_secret_name: String,

    /// Destination secret name for the second auth key
    #[serde(rename = "integrationRuntimeKey2")]
    pub key2_secret_name: String,
}

/// A storage account whose first access key (and optionally a full
/// connection string) is copied into the vault.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageAccount {
    /// Name of the storage account
    #[serde(rename = "storageName")]
    pub storage_name: String,

    /// Destination secret name for the first access key
    #[serde(rename = "accessKey1")]
    pub access_key_secret_name: String,

    /// Destination secret name for the connection string, if one should be
    /// written as well
    #[serde(rename = "connString1", default)]
    pub conn_string_secret_name: Option<String>,
}

/// Load a manifest file holding a YAML list of entries.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Manifest`]
/// if its contents do not parse as a list of the expected entry type.
pub fn load_manifest<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::io(e, Some(path.to_path_buf()), "read manifest"))?;
    serde_yaml::from_str(&raw).map_err(|e| Error::manifest(path.display().to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_function_manifest() {
        let yaml = r"
- funcName: orders-api
  secretkeyname: orders-api-host-key
- funcName: billing-api
  secretkeyname: billing-api-host-key
";
        let entries: Vec<FunctionApp> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "orders-api");
        assert_eq!(entries[1].secret_key_name, "billing-api-host-key");
    }

    #[test]
    fn parse_cosmos_manifest() {
        let yaml = r"
- accountName: orders-db
  cosmosdbKeys:
    primaryMasterKey: orders-db-primary
    primaryReadonlyKey: orders-db-readonly
";
        let entries: Vec<CosmosAccount> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].account_name, "orders-db");
        assert_eq!(
            entries[0].keys.get("primaryMasterKey"),
            Some(&"orders-db-primary".to_string())
        );
    }

    #[test]
    fn parse_eventgrid_manifest() {
        let yaml = r"
- domainName: shipping-events
  eventgridKeys:
    Key1: shipping-events-key1
";
        let entries: Vec<EventGridDomain> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entries[0].domain_name, "shipping-events");
        assert_eq!(
            entries[0].keys.get("Key1"),
            Some(&"shipping-events-key1".to_string())
        );
    }

    #[test]
    fn parse_integration_runtime_manifest() {
        let yaml = r"
- factoryName: etl-factory
  integrationRuntimeName: onprem-ir
  integrationRuntimeKey1: onprem-ir-key1
  integrationRuntimeKey2: onprem-ir-key2
";
        let entries: Vec<IntegrationRuntime> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entries[0].factory_name, "etl-factory");
        assert_eq!(entries[0].integration_runtime_name, "onprem-ir");
        assert_eq!(entries[0].key2_secret_name, "onprem-ir-key2");
    }

    #[test]
    fn parse_storage_manifest_without_conn_string() {
        let yaml = r"
- storageName: ordersblob
  accessKey1: ordersblob-key1
";
        let entries: Vec<StorageAccount> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entries[0].storage_name, "ordersblob");
        assert_eq!(entries[0].conn_string_secret_name, None);
    }

    #[test]
    fn parse_storage_manifest_with_conn_string() {
        let yaml = r"
- storageName: ordersblob
  accessKey1: ordersblob-key1
  connString1: ordersblob-conn
";
        let entries: Vec<StorageAccount> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            entries[0].conn_string_secret_name.as_deref(),
            Some("ordersblob-conn")
        );
    }

    #[test]
    fn load_manifest_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "- funcName: orders-api").unwrap();
        writeln!(file, "  secretkeyname: orders-api-host-key").unwrap();

        let entries: Vec<FunctionApp> = load_manifest(file.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "orders-api");
    }

    #[test]
    fn load_manifest_missing_file_is_io_error() {
        let result: Result<Vec<FunctionApp>> =
            load_manifest(Path::new("/nonexistent/funcs.yaml"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn load_manifest_bad_shape_is_manifest_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "funcName: not-a-list").unwrap();

        let result: Result<Vec<FunctionApp>> = load_manifest(file.path());
        assert!(matches!(result, Err(Error::Manifest { .. })));
    }
}
