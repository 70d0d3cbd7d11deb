//! Minimal Azure Resource Manager client
//!
//! Covers exactly what the key sources need: authenticated `POST` calls to
//! per-resource `listKeys`-style operations, scoped to one subscription and
//! resource group. Tokens come from the caller-supplied credential chain.

use azure_core::auth::TokenCredential;
use keyfan_core::{Error, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;

const ARM_BASE: &str = "https://management.azure.com";
const ARM_SCOPE: &str = "https://management.azure.com/.default";

/// The full request URL for a provider operation under a resource group.
fn provider_url(subscription: &str, resource_group: &str, provider_path: &str) -> String {
    format!(
        "{ARM_BASE}/subscriptions/{subscription}/resourceGroups/{resource_group}/providers/{provider_path}"
    )
}

/// Issues management-plane calls for one subscription and resource group.
pub struct ArmClient {
    http: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
    subscription: String,
    resource_group: String,
}

impl std::fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClient")
            .field("subscription", &self.subscription)
            .field("resource_group", &self.resource_group)
            .finish()
    }
}

impl ArmClient {
    /// Create a client scoped to one subscription and resource group.
    #[must_use]
    pub fn new(
        credential: Arc<dyn TokenCredential>,
        subscription: impl Into<String>,
        resource_group: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            credential,
            subscription: subscription.into(),
            resource_group: resource_group.into(),
        }
    }

    async fn bearer(&self) -> Result<String> {
        let token = self
            .credential
            .get_token(&[ARM_SCOPE])
            .await
            .map_err(|e| Error::auth(ARM_SCOPE, e.to_string()))?;
        Ok(token.token.secret().to_string())
    }

    /// `POST` a list-keys style operation and deserialize the response body.
    ///
    /// `provider_path` is the path below `providers/`, e.g.
    /// `Microsoft.EventGrid/domains/my-domain/listKeys`. Extra query pairs
    /// are appended alongside the `api-version`.
    pub(crate) async fn post_list_keys<T: DeserializeOwned>(
        &self,
        kind: &'static str,
        resource: &str,
        provider_path: &str,
        api_version: &str,
        extra_query: &[(&str, &str)],
    ) -> Result<T> {
        let url = provider_url(&self.subscription, &self.resource_group, provider_path);
        let token = self.bearer().await?;
        tracing::debug!(kind, resource, "listing keys");

        let response = self
            .http
            .post(&url)
            .query(&[("api-version", api_version)])
            .query(extra_query)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(|e| Error::list_keys(kind, resource, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::list_keys(kind, resource, format!("{status}: {body}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::list_keys(kind, resource, format!("invalid response body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_url_layout() {
        let url = provider_url(
            "0000-sub",
            "team-rg",
            "Microsoft.EventGrid/domains/shipping/listKeys",
        );
        assert_eq!(
            url,
            "https://management.azure.com/subscriptions/0000-sub/resourceGroups/team-rg/providers/Microsoft.EventGrid/domains/shipping/listKeys"
        );
    }
}
