//! Key Vault data-plane client.
//!
//! Three fetch operations against the vault's REST surface, all returning
//! the raw bytes the pipeline writes to disk: a secret's UTF-8 value, the
//! base64url-decoded RSA public modulus of a key (private material is not
//! retrievable from the service), and a certificate's DER encoding. No
//! retries here — vault-side failures surface immediately.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD as B64, URL_SAFE_NO_PAD as B64_URL};
use kvmount_auth::BearerAuthorizer;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::objects::{ObjectDescriptor, ObjectKind};

const API_VERSION: &str = "2016-10-01";

/// Failure fetching a single object. Wrapped with the object's identity by
/// the pipeline.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure
    #[error("request failed")]
    Transport(#[from] reqwest::Error),

    /// Vault rejected the request
    #[error("vault returned HTTP {status}")]
    Rejected {
        /// Status the vault answered with
        status: StatusCode,
    },

    /// Body decoded but did not carry what we asked for
    #[error("malformed object bundle: {reason}")]
    Malformed {
        /// What was wrong with the bundle
        reason: String,
    },

    /// Bundle present but its payload field is missing or empty
    #[error("object payload is empty")]
    EmptyPayload,
}

#[derive(Debug, Deserialize)]
struct SecretBundle {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeyBundle {
    #[serde(default)]
    key: Option<JsonWebKey>,
}

#[derive(Debug, Deserialize)]
struct JsonWebKey {
    #[serde(default)]
    n: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CertificateBundle {
    #[serde(default)]
    cer: Option<String>,
}

/// Client bound to one vault URL and one vault-scoped authorizer.
#[derive(Debug, Clone)]
pub struct VaultClient {
    http: reqwest::Client,
    vault_url: Url,
    authorizer: BearerAuthorizer,
}

impl VaultClient {
    /// Client for the given vault endpoint.
    #[must_use]
    pub const fn new(http: reqwest::Client, vault_url: Url, authorizer: BearerAuthorizer) -> Self {
        Self {
            http,
            vault_url,
            authorizer,
        }
    }

    /// Fetch the object a descriptor names, dispatching on its kind.
    pub async fn fetch(&self, descriptor: &ObjectDescriptor) -> Result<Vec<u8>, FetchError> {
        let version = descriptor.version.as_deref();
        match descriptor.kind {
            ObjectKind::Secret => self.get_secret(&descriptor.name, version).await,
            ObjectKind::Key => self.get_key(&descriptor.name, version).await,
            ObjectKind::Certificate => self.get_certificate(&descriptor.name, version).await,
        }
    }

    /// Secret value as UTF-8 bytes.
    pub async fn get_secret(&self, name: &str, version: Option<&str>) -> Result<Vec<u8>, FetchError> {
        let bundle: SecretBundle = self.get_bundle("secrets", name, version).await?;
        match bundle.value {
            Some(value) if !value.is_empty() => Ok(value.into_bytes()),
            _ => Err(FetchError::EmptyPayload),
        }
    }

    /// Raw RSA public-modulus bytes of a key (base64url-decoded JWK `n`).
    pub async fn get_key(&self, name: &str, version: Option<&str>) -> Result<Vec<u8>, FetchError> {
        let bundle: KeyBundle = self.get_bundle("keys", name, version).await?;
        let modulus = bundle
            .key
            .and_then(|key| key.n)
            .filter(|n| !n.is_empty())
            .ok_or(FetchError::EmptyPayload)?;
        B64_URL.decode(modulus).map_err(|err| FetchError::Malformed {
            reason: format!("key modulus is not base64url: {err}"),
        })
    }

    /// DER-encoded certificate bytes (base64-decoded `cer`).
    pub async fn get_certificate(&self, name: &str, version: Option<&str>) -> Result<Vec<u8>, FetchError> {
        let bundle: CertificateBundle = self.get_bundle("certificates", name, version).await?;
        let cer = bundle.cer.filter(|cer| !cer.is_empty()).ok_or(FetchError::EmptyPayload)?;
        B64.decode(cer).map_err(|err| FetchError::Malformed {
            reason: format!("certificate is not base64: {err}"),
        })
    }

    async fn get_bundle<T: DeserializeOwned>(
        &self,
        collection: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<T, FetchError> {
        let path = match version {
            Some(version) => format!("{collection}/{name}/{version}"),
            None => format!("{collection}/{name}"),
        };
        let url = self.vault_url.join(&path).map_err(|err| FetchError::Malformed {
            reason: format!("invalid object URL: {err}"),
        })?;

        let response = self
            .authorizer
            .apply(self.http.get(url).query(&[("api-version", API_VERSION)]))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Rejected { status });
        }

        response.json::<T>().await.map_err(|err| FetchError::Malformed {
            reason: err.to_string(),
        })
    }
}
