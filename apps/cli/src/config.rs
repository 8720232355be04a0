//! Flag parsing and configuration validation.
//!
//! Flag spellings match the host's historical invocation (`--vaultName`,
//! `--usePodIdentity`, …) so the node agent needs no changes. All
//! validation happens here, before any network call, and every failure
//! names the offending flag. The validated result is an immutable
//! [`Config`] value handed by reference to the rest of the run; the
//! identity mode is folded into the [`Credentials`] sum type so a run can
//! never carry both a service principal and a pod identity.

use std::path::PathBuf;

use clap::Parser;
use kvmount_auth::{Credentials, SecureString};
use thiserror::Error;

/// Raw command-line flags as the host passes them.
#[derive(Debug, Parser)]
#[command(
    name = "kvmount",
    disable_version_flag = true,
    about = "Fetches Azure Key Vault objects and writes them as files for a workload"
)]
pub struct Flags {
    /// Name of the Azure Key Vault instance
    #[arg(long = "vaultName", default_value = "", hide_default_value = true)]
    pub vault_name: String,

    /// Semicolon-separated names of the vault objects to fetch
    #[arg(long = "vaultObjectNames", default_value = "", hide_default_value = true)]
    pub vault_object_names: String,

    /// Semicolon-separated object types (secret, key, or cert)
    #[arg(long = "vaultObjectTypes", default_value = "", hide_default_value = true)]
    pub vault_object_types: String,

    /// Semicolon-separated object versions (optional, empty means latest)
    #[arg(long = "vaultObjectVersions", default_value = "", hide_default_value = true)]
    pub vault_object_versions: String,

    /// Semicolon-separated output filenames (optional, defaults to names)
    #[arg(long = "vaultObjectAliases", default_value = "", hide_default_value = true)]
    pub vault_object_aliases: String,

    /// Resource group the vault lives in
    #[arg(long = "resourceGroup", default_value = "", hide_default_value = true)]
    pub resource_group: String,

    /// Azure subscription id
    #[arg(long = "subscriptionId", default_value = "", hide_default_value = true)]
    pub subscription_id: String,

    /// Directory to write the fetched objects into (must exist)
    #[arg(long = "dir", default_value = "", hide_default_value = true)]
    pub dir: String,

    /// Type of Azure cloud (empty means the public cloud)
    #[arg(long = "cloudName", default_value = "", hide_default_value = true)]
    pub cloud_name: String,

    /// AAD tenant id
    #[arg(long = "tenantId", default_value = "", hide_default_value = true)]
    pub tenant_id: String,

    /// AAD client id (service-principal mode)
    #[arg(long = "aADClientID", default_value = "", hide_default_value = true)]
    pub aad_client_id: String,

    /// AAD client secret (service-principal mode)
    #[arg(long = "aADClientSecret", default_value = "", hide_default_value = true)]
    pub aad_client_secret: String,

    /// Resolve the workload's identity through the node-local broker
    #[arg(long = "usePodIdentity")]
    pub use_pod_identity: bool,

    /// Name of the pod (pod-identity mode)
    #[arg(long = "podName", default_value = "", hide_default_value = true)]
    pub pod_name: String,

    /// Namespace of the pod (pod-identity mode)
    #[arg(long = "podNamespace", default_value = "", hide_default_value = true)]
    pub pod_namespace: String,

    /// Print the program version before running
    #[arg(long = "version")]
    pub show_version: bool,
}

/// Configuration validation failures. Always terminal, reported before any
/// I/O.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required flag is empty
    #[error("--{flag} is not set")]
    MissingFlag {
        /// The flag that must be provided
        flag: &'static str,
    },

    /// Both identity modes were configured at once
    #[error("--usePodIdentity conflicts with --aADClientID/--aADClientSecret")]
    ConflictingIdentity,
}

/// Immutable per-invocation configuration.
#[derive(Debug)]
pub struct Config {
    pub vault_name: String,
    pub resource_group: String,
    pub subscription_id: String,
    pub target_dir: PathBuf,
    pub cloud_name: String,
    pub object_names: String,
    pub object_types: String,
    pub object_versions: String,
    pub object_aliases: String,
    pub credentials: Credentials,
    pub show_version: bool,
}

impl Config {
    /// Validate the raw flags into a configuration value.
    pub fn from_flags(flags: Flags) -> Result<Self, ConfigError> {
        require(&flags.vault_name, "vaultName")?;
        require(&flags.resource_group, "resourceGroup")?;
        require(&flags.subscription_id, "subscriptionId")?;
        require(&flags.dir, "dir")?;

        let credentials = if flags.use_pod_identity {
            if !flags.aad_client_id.is_empty() || !flags.aad_client_secret.is_empty() {
                return Err(ConfigError::ConflictingIdentity);
            }
            require(&flags.pod_name, "podName")?;
            require(&flags.pod_namespace, "podNamespace")?;
            Credentials::PodIdentity {
                pod_name: flags.pod_name,
                pod_namespace: flags.pod_namespace,
                tenant_id: flags.tenant_id,
            }
        } else {
            require(&flags.aad_client_id, "aADClientID")?;
            require(&flags.aad_client_secret, "aADClientSecret")?;
            require(&flags.tenant_id, "tenantId")?;
            Credentials::ServicePrincipal {
                client_id: flags.aad_client_id,
                client_secret: SecureString::new(flags.aad_client_secret),
                tenant_id: flags.tenant_id,
            }
        };

        Ok(Self {
            vault_name: flags.vault_name,
            resource_group: flags.resource_group,
            subscription_id: flags.subscription_id,
            target_dir: PathBuf::from(flags.dir),
            cloud_name: flags.cloud_name,
            object_names: flags.vault_object_names,
            object_types: flags.vault_object_types,
            object_versions: flags.vault_object_versions,
            object_aliases: flags.vault_object_aliases,
            credentials,
            show_version: flags.show_version,
        })
    }
}

fn require(value: &str, flag: &'static str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::MissingFlag { flag });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_flags() -> Flags {
        Flags::parse_from([
            "kvmount",
            "--vaultName",
            "myvault",
            "--vaultObjectNames",
            "a",
            "--vaultObjectTypes",
            "secret",
            "--resourceGroup",
            "rg",
            "--subscriptionId",
            "sub",
            "--dir",
            "/tmp/out",
            "--tenantId",
            "tenant",
            "--aADClientID",
            "app",
            "--aADClientSecret",
            "hush",
        ])
    }

    #[test]
    fn service_principal_flags_build_that_variant() {
        let config = Config::from_flags(base_flags()).unwrap();
        assert!(matches!(
            config.credentials,
            Credentials::ServicePrincipal { ref client_id, .. } if client_id == "app"
        ));
    }

    #[test]
    fn missing_required_flag_is_named() {
        let mut flags = base_flags();
        flags.subscription_id = String::new();
        let err = Config::from_flags(flags).unwrap_err();
        assert_eq!(err, ConfigError::MissingFlag { flag: "subscriptionId" });
        assert_eq!(err.to_string(), "--subscriptionId is not set");
    }

    #[test]
    fn pod_identity_requires_pod_coordinates() {
        let mut flags = base_flags();
        flags.use_pod_identity = true;
        flags.aad_client_id = String::new();
        flags.aad_client_secret = String::new();
        let err = Config::from_flags(flags).unwrap_err();
        assert_eq!(err, ConfigError::MissingFlag { flag: "podName" });
    }

    #[test]
    fn pod_identity_builds_that_variant() {
        let mut flags = base_flags();
        flags.use_pod_identity = true;
        flags.aad_client_id = String::new();
        flags.aad_client_secret = String::new();
        flags.pod_name = "nginx-0".to_string();
        flags.pod_namespace = "default".to_string();
        let config = Config::from_flags(flags).unwrap();
        assert!(matches!(
            config.credentials,
            Credentials::PodIdentity { ref pod_name, .. } if pod_name == "nginx-0"
        ));
    }

    #[test]
    fn mixing_identity_modes_is_rejected() {
        let mut flags = base_flags();
        flags.use_pod_identity = true;
        flags.pod_name = "nginx-0".to_string();
        flags.pod_namespace = "default".to_string();
        let err = Config::from_flags(flags).unwrap_err();
        assert_eq!(err, ConfigError::ConflictingIdentity);
    }
}
