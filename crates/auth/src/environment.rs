//! Cloud environment lookup.
//!
//! Maps a cloud-name string to the set of service endpoints a run needs for
//! token scoping. Resolution is a pure table lookup done once per
//! invocation; the empty name always resolves to the public cloud.

use crate::error::AuthError;

/// Service endpoints for one Azure cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloudEnvironment {
    /// Canonical environment name.
    pub name: &'static str,
    /// Active Directory (login) endpoint, trailing slash included.
    pub active_directory_endpoint: &'static str,
    /// Resource-manager endpoint, used as the management token scope.
    pub resource_manager_endpoint: &'static str,
    /// Key Vault endpoint, used as the data-plane token scope.
    pub key_vault_endpoint: &'static str,
    /// DNS suffix for vault hostnames in this cloud.
    pub key_vault_dns_suffix: &'static str,
}

/// Azure public cloud (the default).
pub const AZURE_PUBLIC_CLOUD: CloudEnvironment = CloudEnvironment {
    name: "AzurePublicCloud",
    active_directory_endpoint: "https://login.microsoftonline.com/",
    resource_manager_endpoint: "https://management.azure.com/",
    key_vault_endpoint: "https://vault.azure.net",
    key_vault_dns_suffix: "vault.azure.net",
};

/// Azure operated by 21Vianet (China).
pub const AZURE_CHINA_CLOUD: CloudEnvironment = CloudEnvironment {
    name: "AzureChinaCloud",
    active_directory_endpoint: "https://login.chinacloudapi.cn/",
    resource_manager_endpoint: "https://management.chinacloudapi.cn/",
    key_vault_endpoint: "https://vault.azure.cn",
    key_vault_dns_suffix: "vault.azure.cn",
};

/// Azure US Government cloud.
pub const AZURE_US_GOVERNMENT_CLOUD: CloudEnvironment = CloudEnvironment {
    name: "AzureUSGovernmentCloud",
    active_directory_endpoint: "https://login.microsoftonline.us/",
    resource_manager_endpoint: "https://management.usgovcloudapi.net/",
    key_vault_endpoint: "https://vault.usgovcloudapi.net",
    key_vault_dns_suffix: "vault.usgovcloudapi.net",
};

/// Azure German cloud.
pub const AZURE_GERMAN_CLOUD: CloudEnvironment = CloudEnvironment {
    name: "AzureGermanCloud",
    active_directory_endpoint: "https://login.microsoftonline.de/",
    resource_manager_endpoint: "https://management.microsoftazure.de/",
    key_vault_endpoint: "https://vault.microsoftazure.de",
    key_vault_dns_suffix: "vault.microsoftazure.de",
};

impl CloudEnvironment {
    /// Resolve an environment by cloud name.
    ///
    /// The empty string yields [`AZURE_PUBLIC_CLOUD`]; any other name is
    /// matched case-insensitively against the known environments and fails
    /// with [`AuthError::UnknownEnvironment`] when nothing matches.
    pub fn from_name(name: &str) -> Result<&'static Self, AuthError> {
        if name.is_empty() {
            return Ok(&AZURE_PUBLIC_CLOUD);
        }
        match name.to_uppercase().as_str() {
            "AZUREPUBLICCLOUD" => Ok(&AZURE_PUBLIC_CLOUD),
            "AZURECHINACLOUD" => Ok(&AZURE_CHINA_CLOUD),
            "AZUREUSGOVERNMENTCLOUD" => Ok(&AZURE_US_GOVERNMENT_CLOUD),
            "AZUREGERMANCLOUD" => Ok(&AZURE_GERMAN_CLOUD),
            _ => Err(AuthError::UnknownEnvironment {
                name: name.to_string(),
            }),
        }
    }
}
