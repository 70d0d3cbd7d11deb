//! Key Vault secret writer
//!
//! Authentication is delegated to the caller-supplied credential; the
//! default credential chain covers environment variables, managed identity,
//! and Azure CLI logins.

use async_trait::async_trait;
use azure_core::auth::TokenCredential;
use azure_security_keyvault::SecretClient;
use futures::StreamExt;
use keyfan_core::{Error, Result, SecretSink, SecretWrite};
use std::sync::Arc;

/// The data-plane URL of a vault, from its bare name.
#[must_use]
pub fn vault_url(vault_name: &str) -> String {
    format!("https://{vault_name}.vault.azure.net")
}

/// The bare secret name from a full Key Vault secret identifier.
///
/// Identifiers look like `https://{vault}.vault.azure.net/secrets/{name}`
/// (optionally with a trailing version segment).
#[must_use]
pub fn secret_name_from_id(id: &str) -> &str {
    id.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(id)
}

/// Upserts, reads, deletes, and lists secrets in one Azure Key Vault.
pub struct VaultWriter {
    client: SecretClient,
    vault_name: String,
}

impl std::fmt::Debug for VaultWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultWriter")
            .field("vault", &self.vault_name)
            .finish()
    }
}

impl VaultWriter {
    /// Create a writer for the named vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the Key Vault client cannot be constructed.
    pub fn new(
        vault_name: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self> {
        let vault_name = vault_name.into();
        let client = SecretClient::new(&vault_url(&vault_name), credential)
            .map_err(|e| Error::vault("connect", vault_name.clone(), e.to_string()))?;
        Ok(Self { client, vault_name })
    }

    /// The name of the vault this writer targets.
    #[must_use]
    pub fn vault_name(&self) -> &str {
        &self.vault_name
    }

    /// Fetch the current value of a secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret does not exist or the call fails.
    pub async fn get(&self, name: &str) -> Result<String> {
        let response = self
            .client
            .get(name)
            .await
            .map_err(|e| Error::vault("get", name, e.to_string()))?;
        Ok(response.value)
    }

    /// Delete a secret.
    ///
    /// With soft delete enabled on the vault, the secret remains recoverable
    /// until its retention period elapses.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion call fails.
    pub async fn delete(&self, name: &str) -> Result<()> {
        self.client
            .delete(name)
            .await
            .map_err(|e| Error::vault("delete", name, e.to_string()))?;
        tracing::info!(secret = name, vault = %self.vault_name, "deleted secret");
        Ok(())
    }

    /// List the names of all secrets in the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if any page of the listing fails.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut pages = self.client.list_secrets().into_stream();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| Error::vault("list", "*", e.to_string()))?;
            for item in page.value {
                names.push(secret_name_from_id(&item.id).to_string());
            }
        }
        Ok(names)
    }
}

#[async_trait]
impl SecretSink for VaultWriter {
    async fn put(&self, write: &SecretWrite) -> Result<()> {
        self.client
            .set(&write.name, write.value.expose())
            .await
            .map_err(|e| Error::vault("set", write.name.clone(), e.to_string()))?;
        tracing::debug!(secret = %write.name, vault = %self.vault_name, "upserted secret");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_url_format() {
        assert_eq!(vault_url("team-vault"), "https://team-vault.vault.azure.net");
    }

    #[test]
    fn secret_name_from_full_id() {
        assert_eq!(
            secret_name_from_id("https://team-vault.vault.azure.net/secrets/db-password"),
            "db-password"
        );
    }

    #[test]
    fn secret_name_from_versioned_id() {
        assert_eq!(
            secret_name_from_id(
                "https://team-vault.vault.azure.net/secrets/db-password/9f8e7d6c"
            ),
            "9f8e7d6c"
        );
    }

    #[test]
    fn secret_name_ignores_trailing_slash() {
        assert_eq!(
            secret_name_from_id("https://team-vault.vault.azure.net/secrets/db-password/"),
            "db-password"
        );
    }

    #[test]
    fn secret_name_from_bare_name() {
        assert_eq!(secret_name_from_id("db-password"), "db-password");
    }
}
