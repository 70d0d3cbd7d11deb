//! Storage account key source

use crate::arm::ArmClient;
use async_trait::async_trait;
use keyfan_core::manifest::StorageAccount;
use keyfan_core::{Error, KeySource, Result, SecretWrite};
use serde::Deserialize;
use std::sync::Arc;

const API_VERSION: &str = "2021-04-01";
const KIND: &str = "storage account";

/// `Microsoft.Storage/storageAccounts/{account}/listKeys` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageAccountKeys {
    keys: Vec<StorageKey>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageKey {
    value: String,
}

/// Copies the first access key of each configured storage account, plus a
/// full connection string when the manifest asks for one.
#[derive(Debug)]
pub struct StorageKeySource {
    arm: Arc<ArmClient>,
}

impl StorageKeySource {
    /// Create a source backed by the given ARM client.
    #[must_use]
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

fn connection_string(account_name: &str, key: &str) -> String {
    format!(
        "DefaultEndpointsProtocol=https;AccountName={account_name};AccountKey={key};EndpointSuffix=core.windows.net"
    )
}

fn map_keys(entry: &StorageAccount, keys: &StorageAccountKeys) -> Result<Vec<SecretWrite>> {
    let first = keys.keys.first().ok_or_else(|| {
        Error::list_keys(KIND, entry.storage_name.clone(), "response contained no keys")
    })?;

    let mut writes = vec![SecretWrite::new(
        entry.access_key_secret_name.clone(),
        first.value.clone(),
    )];
    if let Some(conn_name) = &entry.conn_string_secret_name {
        writes.push(SecretWrite::new(
            conn_name.clone(),
            connection_string(&entry.storage_name, &first.value),
        ));
    }
    Ok(writes)
}

#[async_trait]
impl KeySource for StorageKeySource {
    type Entry = StorageAccount;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn resource(entry: &StorageAccount) -> &str {
        &entry.storage_name
    }

    async fn collect(&self, entry: &StorageAccount) -> Result<Vec<SecretWrite>> {
        let path = format!(
            "Microsoft.Storage/storageAccounts/{}/listKeys",
            entry.storage_name
        );
        let keys: StorageAccountKeys = self
            .arm
            .post_list_keys(
                KIND,
                &entry.storage_name,
                &path,
                API_VERSION,
                &[("$expand", "kerb")],
            )
            .await?;
        map_keys(entry, &keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(conn: Option<&str>) -> StorageAccount {
        StorageAccount {
            storage_name: "ordersblob".to_string(),
            access_key_secret_name: "ordersblob-key1".to_string(),
            conn_string_secret_name: conn.map(ToString::to_string),
        }
    }

    #[test]
    fn storage_keys_deserialize() {
        let json = r#"{"keys": [
            {"keyName": "key1", "value": "v1", "permissions": "FULL"},
            {"keyName": "key2", "value": "v2", "permissions": "FULL"}
        ]}"#;
        let parsed: StorageAccountKeys = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.keys.len(), 2);
        assert_eq!(parsed.keys[0].value, "v1");
    }

    #[test]
    fn first_key_maps_to_configured_name() {
        let keys = StorageAccountKeys {
            keys: vec![
                StorageKey {
                    value: "v1".to_string(),
                },
                StorageKey {
                    value: "v2".to_string(),
                },
            ],
        };
        let writes = map_keys(&entry(None), &keys).unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].name, "ordersblob-key1");
        assert_eq!(writes[0].value.expose(), "v1");
    }

    #[test]
    fn conn_string_written_when_configured() {
        let keys = StorageAccountKeys {
            keys: vec![StorageKey {
                value: "v1".to_string(),
            }],
        };
        let writes = map_keys(&entry(Some("ordersblob-conn")), &keys).unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[1].name, "ordersblob-conn");
        assert_eq!(
            writes[1].value.expose(),
            "DefaultEndpointsProtocol=https;AccountName=ordersblob;AccountKey=v1;EndpointSuffix=core.windows.net"
        );
    }

    #[test]
    fn empty_key_list_is_an_error() {
        let keys = StorageAccountKeys { keys: vec![] };
        let result = map_keys(&entry(None), &keys);
        assert!(matches!(result, Err(Error::ListKeys { .. })));
    }
}
