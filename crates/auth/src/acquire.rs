//! Token acquisition strategies.
//!
//! [`Credentials`] is a genuine sum type: an invocation is either a static
//! service principal or a delegated pod identity, never a mix of both. The
//! [`TokenAcquirer`] turns either variant into the same
//! [`BearerAuthorizer`], parameterized by the target resource scope. A run
//! acquires two tokens — one scoped to the resource manager for the vault
//! lookup, one scoped to the vault data plane for object retrieval.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::broker::{BrokerClient, de_unix_seconds};
use crate::environment::CloudEnvironment;
use crate::error::AuthError;
use crate::redact::{redact, sanitize_body};
use crate::secure::SecureString;
use crate::token::{AccessToken, BearerAuthorizer};

/// How this invocation identifies itself to the cloud.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Static AAD application credentials (client-credentials grant).
    ServicePrincipal {
        /// AAD application (client) id
        client_id: String,
        /// AAD application secret
        client_secret: SecureString,
        /// AAD tenant the application lives in
        tenant_id: String,
    },
    /// Delegated identity resolved by the node-local broker.
    PodIdentity {
        /// Name of the pod the volume is mounted for
        pod_name: String,
        /// Namespace of the pod
        pod_namespace: String,
        /// AAD tenant the resolved identity lives in
        tenant_id: String,
    },
}

/// OAuth2 token response from the Active Directory endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default, deserialize_with = "de_unix_seconds")]
    expires_in: Option<u64>,
    #[serde(default, deserialize_with = "de_unix_seconds")]
    expires_on: Option<u64>,
}

/// Produces bearer authorizers for a resource scope from either credential
/// variant.
#[derive(Debug, Clone)]
pub struct TokenAcquirer {
    http: reqwest::Client,
    broker: BrokerClient,
}

impl TokenAcquirer {
    /// Acquirer with the default node-local broker endpoint.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        let broker = BrokerClient::new(http.clone());
        Self { http, broker }
    }

    /// Acquirer with an explicit broker client (tests point this at a mock
    /// server).
    #[must_use]
    pub const fn with_broker(http: reqwest::Client, broker: BrokerClient) -> Self {
        Self { http, broker }
    }

    /// Token scoped to the resource-manager endpoint, for the vault lookup.
    pub async fn management_token(
        &self,
        credentials: &Credentials,
        environment: &CloudEnvironment,
        cancel: &CancellationToken,
    ) -> Result<BearerAuthorizer, AuthError> {
        let token = self
            .acquire(credentials, environment, environment.resource_manager_endpoint, cancel)
            .await?;
        Ok(token.into_authorizer())
    }

    /// Token scoped to the vault data plane, for object retrieval. Any
    /// trailing path separator is stripped from the scope first.
    pub async fn vault_token(
        &self,
        credentials: &Credentials,
        environment: &CloudEnvironment,
        cancel: &CancellationToken,
    ) -> Result<BearerAuthorizer, AuthError> {
        let resource = environment.key_vault_endpoint.trim_end_matches('/');
        let token = self.acquire(credentials, environment, resource, cancel).await?;
        Ok(token.into_authorizer())
    }

    /// Acquire a token for an arbitrary resource scope.
    pub async fn acquire(
        &self,
        credentials: &Credentials,
        environment: &CloudEnvironment,
        resource: &str,
        cancel: &CancellationToken,
    ) -> Result<AccessToken, AuthError> {
        match credentials {
            Credentials::ServicePrincipal {
                client_id,
                client_secret,
                tenant_id,
            } => {
                debug!(%client_id, resource, "using client_id+client_secret to retrieve access token");
                self.client_credentials_grant(client_id, client_secret, tenant_id, environment, resource)
                    .await
            }
            Credentials::PodIdentity {
                pod_name,
                pod_namespace,
                ..
            } => {
                debug!(%pod_name, %pod_namespace, resource, "using pod identity to retrieve token");
                let response = self
                    .broker
                    .fetch_token(resource, pod_name, pod_namespace, cancel)
                    .await?;
                Ok(AccessToken::new(
                    response.token.access_token,
                    response.token.expires_on,
                    resource,
                ))
            }
        }
    }

    async fn client_credentials_grant(
        &self,
        client_id: &str,
        client_secret: &SecureString,
        tenant_id: &str,
        environment: &CloudEnvironment,
        resource: &str,
    ) -> Result<AccessToken, AuthError> {
        if client_secret.is_empty() {
            return Err(AuthError::MissingCredential {
                client_id: client_id.to_string(),
            });
        }

        let token_endpoint = format!(
            "{}/{tenant_id}/oauth2/token",
            environment.active_directory_endpoint.trim_end_matches('/')
        );

        let response = self
            .http
            .post(&token_endpoint)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret.expose()),
                ("resource", resource),
            ])
            .send()
            .await
            .map_err(|source| AuthError::Transport {
                resource: resource.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| AuthError::Transport {
            resource: resource.to_string(),
            source,
        })?;

        if !status.is_success() {
            error!(
                %status,
                body = %sanitize_body(&body),
                "token request rejected"
            );
            return Err(AuthError::TokenRejected {
                resource: resource.to_string(),
                status,
            });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|err| AuthError::MalformedToken {
                reason: err.to_string(),
            })?;
        if token.access_token.is_empty() {
            return Err(AuthError::MalformedToken {
                reason: "token endpoint returned an empty access_token".to_string(),
            });
        }

        let expires_on = token
            .expires_on
            .or_else(|| token.expires_in.map(|ttl| unix_now() + ttl));

        info!(
            access_token = %redact(&token.access_token),
            resource,
            "acquired service principal token"
        );

        Ok(AccessToken::new(token.access_token, expires_on, resource))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
