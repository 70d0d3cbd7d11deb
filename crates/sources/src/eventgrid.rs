//! Event Grid domain key source

use crate::arm::ArmClient;
use async_trait::async_trait;
use keyfan_core::manifest::EventGridDomain;
use keyfan_core::{Error, KeySource, Result, SecretWrite};
use serde::Deserialize;
use std::sync::Arc;

const API_VERSION: &str = "2020-06-01";
const KIND: &str = "event grid domain";

/// `Microsoft.EventGrid/domains/{domain}/listKeys` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SharedAccessKeys {
    key1: String,
    key2: String,
}

/// Copies the configured shared access keys of each Event Grid domain.
#[derive(Debug)]
pub struct EventGridKeySource {
    arm: Arc<ArmClient>,
}

impl EventGridKeySource {
    /// Create a source backed by the given ARM client.
    #[must_use]
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

fn map_keys(entry: &EventGridDomain, keys: &SharedAccessKeys) -> Result<Vec<SecretWrite>> {
    let mut writes = Vec::new();
    for (logical, destination) in &entry.keys {
        match logical.as_str() {
            "Key1" => writes.push(SecretWrite::new(destination.clone(), keys.key1.clone())),
            "Key2" => writes.push(SecretWrite::new(destination.clone(), keys.key2.clone())),
            other => {
                return Err(Error::configuration(format!(
                    "Unknown Event Grid key '{other}' for domain '{}'; expected Key1 or Key2",
                    entry.domain_name
                )));
            }
        }
    }
    Ok(writes)
}

#[async_trait]
impl KeySource for EventGridKeySource {
    type Entry = EventGridDomain;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn resource(entry: &EventGridDomain) -> &str {
        &entry.domain_name
    }

    async fn collect(&self, entry: &EventGridDomain) -> Result<Vec<SecretWrite>> {
        let path = format!("Microsoft.EventGrid/domains/{}/listKeys", entry.domain_name);
        let keys: SharedAccessKeys = self
            .arm
            .post_list_keys(KIND, &entry.domain_name, &path, API_VERSION, &[])
            .await?;
        map_keys(entry, &keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn entry(mapping: &[(&str, &str)]) -> EventGridDomain {
        EventGridDomain {
            domain_name: "shipping-events".to_string(),
            keys: mapping
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn shared_access_keys_deserialize() {
        let json = r#"{"key1": "k1", "key2": "k2"}"#;
        let parsed: SharedAccessKeys = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.key1, "k1");
        assert_eq!(parsed.key2, "k2");
    }

    #[test]
    fn both_keys_map_to_configured_names() {
        let keys = SharedAccessKeys {
            key1: "k1".to_string(),
            key2: "k2".to_string(),
        };
        let writes = map_keys(
            &entry(&[("Key1", "shipping-key1"), ("Key2", "shipping-key2")]),
            &keys,
        )
        .unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].name, "shipping-key1");
        assert_eq!(writes[0].value.expose(), "k1");
        assert_eq!(writes[1].name, "shipping-key2");
        assert_eq!(writes[1].value.expose(), "k2");
    }

    #[test]
    fn unknown_logical_key_is_configuration_error() {
        let keys = SharedAccessKeys {
            key1: "k1".to_string(),
            key2: "k2".to_string(),
        };
        let result = map_keys(&entry(&[("Key3", "nope")]), &keys);
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }
}
