//! Function app host key source

use crate::arm::ArmClient;
use async_trait::async_trait;
use keyfan_core::manifest::FunctionApp;
use keyfan_core::{KeySource, Result, SecretWrite};
use serde::Deserialize;
use std::sync::Arc;

const API_VERSION: &str = "2020-06-01";
const KIND: &str = "function app";

/// `Microsoft.Web/sites/{site}/host/default/listkeys` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostKeys {
    master_key: String,
}

/// Copies the host master key of each configured function app.
#[derive(Debug)]
pub struct FunctionKeySource {
    arm: Arc<ArmClient>,
}

impl FunctionKeySource {
    /// Create a source backed by the given ARM client.
    #[must_use]
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

fn map_keys(entry: &FunctionApp, keys: &HostKeys) -> Vec<SecretWrite> {
    vec![SecretWrite::new(
        entry.secret_key_name.clone(),
        keys.master_key.clone(),
    )]
}

#[async_trait]
impl KeySource for FunctionKeySource {
    type Entry = FunctionApp;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn resource(entry: &FunctionApp) -> &str {
        &entry.name
    }

    async fn collect(&self, entry: &FunctionApp) -> Result<Vec<SecretWrite>> {
        let path = format!("Microsoft.Web/sites/{}/host/default/listkeys", entry.name);
        let keys: HostKeys = self
            .arm
            .post_list_keys(KIND, &entry.name, &path, API_VERSION, &[])
            .await?;
        Ok(map_keys(entry, &keys))
    }
}
