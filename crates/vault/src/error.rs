//! Error types for vault lookup, descriptor validation, and retrieval.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::client::FetchError;
use crate::objects::ObjectKind;

/// Descriptor-list validation errors.
///
/// All of these are configuration errors: they are reported before any
/// network access and fail the whole batch, never a partial one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    /// No object names were given
    #[error("vaultObjectNames is empty")]
    EmptyNames,

    /// Names and types lists differ in length
    #[error("vaultObjectNames lists {names} objects but vaultObjectTypes lists {types}")]
    CountMismatch {
        /// Number of name entries
        names: usize,
        /// Number of type entries
        types: usize,
    },

    /// An alias list was given but does not line up with the names
    #[error("vaultObjectAliases lists {aliases} entries but vaultObjectNames lists {names}")]
    AliasCountMismatch {
        /// Number of alias entries
        aliases: usize,
        /// Number of name entries
        names: usize,
    },

    /// A type token is not one of secret/key/cert
    #[error("invalid object type '{value}': must be secret, key, or cert")]
    UnknownKind {
        /// The offending type token
        value: String,
    },
}

/// Errors from vault resolution and the retrieval/write pipeline.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Vault display name fails the service's shape rules
    #[error("invalid vault name '{name}': must match [-a-zA-Z0-9]{{3,24}}")]
    InvalidVaultName {
        /// The offending name
        name: String,
    },

    /// Transport failure during the management-plane lookup
    #[error("failed to look up vault '{vault}'")]
    LookupFailed {
        /// Vault display name
        vault: String,
        /// Underlying HTTP error
        #[source]
        source: reqwest::Error,
    },

    /// Management plane rejected the lookup
    #[error("vault lookup for '{vault}' returned HTTP {status}")]
    LookupRejected {
        /// Vault display name
        vault: String,
        /// Status the resource manager answered with
        status: StatusCode,
    },

    /// Lookup succeeded but the record carries no usable vault URI
    #[error("vault record for '{vault}' has no vault URI")]
    EmptyVaultUri {
        /// Vault display name
        vault: String,
    },

    /// Lookup body could not be decoded
    #[error("malformed vault record for '{vault}': {reason}")]
    MalformedVaultRecord {
        /// Vault display name
        vault: String,
        /// What was wrong with the record
        reason: String,
    },

    /// Fetching one object failed; aborts the remaining descriptors
    #[error("failed to get {kind} '{name}' (version: {version})")]
    Retrieval {
        /// Object kind
        kind: ObjectKind,
        /// Object name
        name: String,
        /// Requested version, or "latest"
        version: String,
        /// Underlying fetch error
        #[source]
        source: FetchError,
    },

    /// Writing one object's content failed; likewise terminal
    #[error("failed to write {kind} '{name}' to {}", path.display())]
    Write {
        /// Object kind
        kind: ObjectKind,
        /// Object name
        name: String,
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
