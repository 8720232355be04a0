//! Vault locator: display name + resource group -> data-plane URL.
//!
//! A single management-plane lookup with a management-scoped authorizer.
//! Any failure — transport, rejection, or a record with no URI — is
//! terminal for the invocation; the data plane is never guessed at.

use std::sync::LazyLock;

use kvmount_auth::BearerAuthorizer;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::VaultError;

const API_VERSION: &str = "2016-10-01";

/// Vault names per the service's object-identifier rules.
static VAULT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[-a-zA-Z0-9]{3,24}$").expect("vault name pattern is valid"));

#[derive(Debug, Deserialize)]
struct VaultRecord {
    #[serde(default)]
    properties: Option<VaultProperties>,
}

#[derive(Debug, Deserialize)]
struct VaultProperties {
    #[serde(default, rename = "vaultUri")]
    vault_uri: Option<String>,
}

/// Resolves vault display names through the resource manager.
#[derive(Debug, Clone)]
pub struct VaultLocator {
    http: reqwest::Client,
    resource_manager_endpoint: String,
}

impl VaultLocator {
    /// Locator against a cloud's resource-manager endpoint.
    pub fn new(http: reqwest::Client, resource_manager_endpoint: impl Into<String>) -> Self {
        Self {
            http,
            resource_manager_endpoint: resource_manager_endpoint.into(),
        }
    }

    /// Resolve a vault's data-plane URL.
    pub async fn resolve(
        &self,
        subscription_id: &str,
        resource_group: &str,
        vault_name: &str,
        authorizer: &BearerAuthorizer,
    ) -> Result<Url, VaultError> {
        if !VAULT_NAME.is_match(vault_name) {
            return Err(VaultError::InvalidVaultName {
                name: vault_name.to_string(),
            });
        }

        let url = format!(
            "{}/subscriptions/{subscription_id}/resourceGroups/{resource_group}/providers/Microsoft.KeyVault/vaults/{vault_name}",
            self.resource_manager_endpoint.trim_end_matches('/')
        );
        debug!(vault = vault_name, resource_group, "looking up vault");

        let response = authorizer
            .apply(self.http.get(&url).query(&[("api-version", API_VERSION)]))
            .send()
            .await
            .map_err(|source| VaultError::LookupFailed {
                vault: vault_name.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(VaultError::LookupRejected {
                vault: vault_name.to_string(),
                status,
            });
        }

        let record: VaultRecord =
            response
                .json()
                .await
                .map_err(|err| VaultError::MalformedVaultRecord {
                    vault: vault_name.to_string(),
                    reason: err.to_string(),
                })?;

        // A record without a populated URI is a failure, not an empty success.
        let vault_uri = record
            .properties
            .and_then(|properties| properties.vault_uri)
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| VaultError::EmptyVaultUri {
                vault: vault_name.to_string(),
            })?;

        let vault_url = Url::parse(&vault_uri).map_err(|err| VaultError::MalformedVaultRecord {
            vault: vault_name.to_string(),
            reason: format!("vault URI does not parse: {err}"),
        })?;

        info!(vault = vault_name, url = %vault_url, "resolved vault");
        Ok(vault_url)
    }
}
