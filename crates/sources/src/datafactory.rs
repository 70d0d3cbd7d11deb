//! Data Factory integration runtime key source

use crate::arm::ArmClient;
use async_trait::async_trait;
use keyfan_core::manifest::IntegrationRuntime;
use keyfan_core::{KeySource, Result, SecretWrite};
use serde::Deserialize;
use std::sync::Arc;

const API_VERSION: &str = "2018-06-01";
const KIND: &str = "integration runtime";

/// `.../integrationRuntimes/{runtime}/listAuthKeys` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntegrationRuntimeAuthKeys {
    auth_key1: String,
    auth_key2: String,
}

/// Copies both auth keys of each configured integration runtime.
#[derive(Debug)]
pub struct IntegrationRuntimeKeySource {
    arm: Arc<ArmClient>,
}

impl IntegrationRuntimeKeySource {
    /// Create a source backed by the given ARM client.
    #[must_use]
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

fn map_keys(entry: &IntegrationRuntime, keys: &IntegrationRuntimeAuthKeys) -> Vec<SecretWrite> {
    vec![
        SecretWrite::new(entry.key1_secret_name.clone(), keys.auth_key1.clone()),
        SecretWrite::new(entry.key2_secret_name.clone(), keys.auth_key2.clone()),
    ]
}

#[async_trait]
impl KeySource for IntegrationRuntimeKeySource {
    type Entry = IntegrationRuntime;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn resource(entry: &IntegrationRuntime) -> &str {
        &entry.integration_runtime_name
    }

    async fn collect(&self, entry: &IntegrationRuntime) -> Result<Vec<SecretWrite>> {
        let path = format!(
            "Microsoft.DataFactory/factories/{}/integrationRuntimes/{}/listAuthKeys",
            entry.factory_name, entry.integration_runtime_name
        );
        let keys: IntegrationRuntimeAuthKeys = self
            .arm
            .post_list_keys(
                KIND,
                &entry.integration_runtime_name,
                &path,
                API_VERSION,
                &[],
            )
            .await?;
        Ok(map_keys(entry, &keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> IntegrationRuntime {
        IntegrationRuntime {
            factory_name: "etl-factory".to_string(),
            integration_runtime_name: "onprem-ir".to_string(),
            key1_secret_name: "onprem-ir-key1".to_string(),
            key2_secret_name: "onprem-ir-key2".to_string(),
        }
    }

    #[test]
    fn auth_keys_deserialize() {
        let json = r#"{"authKey1": "a1", "authKey2": "a2"}"#;
        let parsed: IntegrationRuntimeAuthKeys = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.auth_key1, "a1");
        assert_eq!(parsed.auth_key2, "a2");
    }

    #[test]
    fn both_auth_keys_map_to_configured_names() {
        let keys = IntegrationRuntimeAuthKeys {
            auth_key1: "a1".to_string(),
            auth_key2: "a2".to_string(),
        };
        let writes = map_keys(&entry(), &keys);
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].name, "onprem-ir-key1");
        assert_eq!(writes[0].value.expose(), "a1");
        assert_eq!(writes[1].name, "onprem-ir-key2");
        assert_eq!(writes[1].value.expose(), "a2");
    }
}
