//! Cosmos DB account key source

use crate::arm::ArmClient;
use async_trait::async_trait;
use keyfan_core::manifest::CosmosAccount;
use keyfan_core::{Error, KeySource, Result, SecretWrite};
use serde::Deserialize;
use std::sync::Arc;

const API_VERSION: &str = "2020-04-01";
const KIND: &str = "cosmos account";

/// `Microsoft.DocumentDB/databaseAccounts/{account}/listKeys` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatabaseAccountKeys {
    primary_master_key: String,
    secondary_master_key: String,
    primary_readonly_master_key: String,
    secondary_readonly_master_key: String,
}

/// Copies the configured keys of each Cosmos DB account.
///
/// For `primaryMasterKey`, a ready-to-use connection string is written
/// alongside the key under `{destination}-conn-string`.
#[derive(Debug)]
pub struct CosmosKeySource {
    arm: Arc<ArmClient>,
}

impl CosmosKeySource {
    /// Create a source backed by the given ARM client.
    #[must_use]
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

fn connection_string(account_name: &str, key: &str) -> String {
    format!("AccountEndpoint=https://{account_name}.documents.azure.com:443/;AccountKey={key};")
}

fn map_keys(entry: &CosmosAccount, keys: &DatabaseAccountKeys) -> Result<Vec<SecretWrite>> {
    let mut writes = Vec::new();
    for (logical, destination) in &entry.keys {
        match logical.as_str() {
            "primaryMasterKey" => {
                writes.push(SecretWrite::new(
                    destination.clone(),
                    keys.primary_master_key.clone(),
                ));
                writes.push(SecretWrite::new(
                    format!("{destination}-conn-string"),
                    connection_string(&entry.account_name, &keys.primary_master_key),
                ));
            }
            "primaryReadonlyKey" => writes.push(SecretWrite::new(
                destination.clone(),
                keys.primary_readonly_master_key.clone(),
            )),
            "secondaryMasterKey" => writes.push(SecretWrite::new(
                destination.clone(),
                keys.secondary_master_key.clone(),
            )),
            "secondaryReadonlyKey" => writes.push(SecretWrite::new(
                destination.clone(),
                keys.secondary_readonly_master_key.clone(),
            )),
            other => {
                return Err(Error::configuration(format!(
                    "Unknown Cosmos DB key '{other}' for account '{}'; expected one of \
                     primaryMasterKey, primaryReadonlyKey, secondaryMasterKey, secondaryReadonlyKey",
                    entry.account_name
                )));
            }
        }
    }
    Ok(writes)
}

#[async_trait]
impl KeySource for CosmosKeySource {
    type Entry = CosmosAccount;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn resource(entry: &CosmosAccount) -> &str {
        &entry.account_name
    }

    async fn collect(&self, entry: &CosmosAccount) -> Result<Vec<SecretWrite>> {
        let path = format!(
            "Microsoft.DocumentDB/databaseAccounts/{}/listKeys",
            entry.account_name
        );
        let keys: DatabaseAccountKeys = self
            .arm
            .post_list_keys(KIND, &entry.account_name, &path, API_VERSION, &[])
            .await?;
        map_keys(entry, &keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn keys() -> DatabaseAccountKeys {
        DatabaseAccountKeys {
            primary_master_key: "pm".to_string(),
            secondary_master_key: "sm".to_string(),
            primary_readonly_master_key: "pr".to_string(),
            secondary_readonly_master_key: "sr".to_string(),
        }
    }

    fn entry(mapping: &[(&str, &str)]) -> CosmosAccount {
        CosmosAccount {
            account_name: "orders-db".to_string(),
            keys: mapping
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn account_keys_deserialize() {
        let json = r#"{
            "primaryMasterKey": "pm",
            "secondaryMasterKey": "sm",
            "primaryReadonlyMasterKey": "pr",
            "secondaryReadonlyMasterKey": "sr"
        }"#;
        let parsed: DatabaseAccountKeys = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.primary_master_key, "pm");
        assert_eq!(parsed.secondary_readonly_master_key, "sr");
    }

    #[test]
    fn primary_master_key_also_writes_conn_string() {
        let writes = map_keys(&entry(&[("primaryMasterKey", "orders-primary")]), &keys()).unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].name, "orders-primary");
        assert_eq!(writes[0].value.expose(), "pm");
        assert_eq!(writes[1].name, "orders-primary-conn-string");
        assert_eq!(
            writes[1].value.expose(),
            "AccountEndpoint=https://orders-db.documents.azure.com:443/;AccountKey=pm;"
        );
    }

    #[test]
    fn each_logical_key_maps_to_its_field() {
        let writes = map_keys(
            &entry(&[
                ("primaryReadonlyKey", "ro"),
                ("secondaryMasterKey", "sm-dest"),
                ("secondaryReadonlyKey", "sr-dest"),
            ]),
            &keys(),
        )
        .unwrap();
        // BTreeMap iteration order: primaryReadonlyKey, secondaryMasterKey, secondaryReadonlyKey
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0].name, "ro");
        assert_eq!(writes[0].value.expose(), "pr");
        assert_eq!(writes[1].name, "sm-dest");
        assert_eq!(writes[1].value.expose(), "sm");
        assert_eq!(writes[2].name, "sr-dest");
        assert_eq!(writes[2].value.expose(), "sr");
    }

    #[test]
    fn unknown_logical_key_is_configuration_error() {
        let result = map_keys(&entry(&[("tertiaryKey", "nope")]), &keys());
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }
}
