//! Identity broker (NMI) client for pod-identity delegation.
//!
//! The broker is a sidecar on the node that resolves a pod's identity to a
//! token: `GET {endpoint}?resource={scope}` with the pod name and namespace
//! in `podname`/`podns` headers. Identity assignment behind the broker has
//! a roughly constant multi-second latency, so retries use a fixed delay
//! rather than exponential backoff — backoff would only slow convergence.

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::AuthError;
use crate::redact::redact;

/// Default NMI endpoint on the node.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:2579/host/token/";

const POD_NAME_HEADER: &str = "podname";
const POD_NAMESPACE_HEADER: &str = "podns";

const MAX_ATTEMPTS: u32 = 5;
const RETRY_DELAY: Duration = Duration::from_secs(7);

/// Token object nested in a broker response.
#[derive(Debug, Deserialize)]
pub struct BrokerToken {
    /// Raw access token. Converted to an [`crate::AccessToken`] by the
    /// acquirer; log only through [`redact`].
    pub access_token: String,
    /// Unix expiry; the broker serializes this as a string or a number.
    #[serde(default, deserialize_with = "de_unix_seconds")]
    pub expires_on: Option<u64>,
}

/// Broker response body: the token plus the client id of the resolved
/// identity.
#[derive(Debug, Deserialize)]
pub struct BrokerResponse {
    /// The delegated token.
    pub token: BrokerToken,
    /// Client id of the identity the broker resolved the pod to.
    #[serde(rename = "clientid")]
    pub client_id: String,
}

/// Outcome of a single broker attempt. Non-200 and transport failures are
/// retried; a 200 with an unusable body is not.
enum AttemptError {
    Retry(String),
    Fatal(AuthError),
}

/// Client for the pod-identity delegation protocol.
#[derive(Debug, Clone)]
pub struct BrokerClient {
    http: reqwest::Client,
    endpoint: Url,
    max_attempts: u32,
    retry_delay: Duration,
}

impl BrokerClient {
    /// Broker client against the default node-local endpoint.
    ///
    /// # Panics
    ///
    /// Never — the default endpoint is a valid URL.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_endpoint(
            http,
            Url::parse(DEFAULT_ENDPOINT).expect("default broker endpoint is a valid URL"),
        )
    }

    /// Broker client against a specific endpoint.
    #[must_use]
    pub fn with_endpoint(http: reqwest::Client, endpoint: Url) -> Self {
        Self {
            http,
            endpoint,
            max_attempts: MAX_ATTEMPTS,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Override the retry schedule. Tests run with millisecond delays.
    #[must_use]
    pub const fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.retry_delay = retry_delay;
        self
    }

    /// Fetch a token for `resource` on behalf of the given pod.
    ///
    /// Up to `max_attempts` requests separated by a fixed delay; any
    /// non-200 answer or transport error is retried. The inter-attempt wait
    /// races against `cancel` and returns [`AuthError::Cancelled`]
    /// immediately when the caller gives up.
    pub async fn fetch_token(
        &self,
        resource: &str,
        pod_name: &str,
        pod_namespace: &str,
        cancel: &CancellationToken,
    ) -> Result<BrokerResponse, AuthError> {
        let mut last = String::from("no attempt made");

        for attempt in 1..=self.max_attempts {
            debug!(attempt, resource, "querying identity broker");
            match self.attempt(resource, pod_name, pod_namespace).await {
                Ok(response) => {
                    info!(
                        access_token = %redact(&response.token.access_token),
                        client_id = %redact(&response.client_id),
                        "identity broker returned a token"
                    );
                    return Ok(response);
                }
                Err(AttemptError::Fatal(err)) => return Err(err),
                Err(AttemptError::Retry(reason)) => {
                    warn!(attempt, reason = %reason, "identity broker attempt failed");
                    last = reason;
                }
            }

            if attempt < self.max_attempts {
                tokio::select! {
                    () = tokio::time::sleep(self.retry_delay) => {}
                    () = cancel.cancelled() => return Err(AuthError::Cancelled),
                }
            }
        }

        Err(AuthError::BrokerExhausted {
            attempts: self.max_attempts,
            last,
        })
    }

    async fn attempt(
        &self,
        resource: &str,
        pod_name: &str,
        pod_namespace: &str,
    ) -> Result<BrokerResponse, AttemptError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[("resource", resource)])
            .header(POD_NAME_HEADER, pod_name)
            .header(POD_NAMESPACE_HEADER, pod_namespace)
            .send()
            .await
            .map_err(|err| AttemptError::Retry(err.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AttemptError::Retry(format!("HTTP {status}")));
        }

        let body: BrokerResponse = response.json().await.map_err(|err| {
            AttemptError::Fatal(AuthError::MalformedToken {
                reason: err.to_string(),
            })
        })?;

        if body.token.access_token.is_empty() || body.client_id.is_empty() {
            return Err(AttemptError::Fatal(AuthError::MalformedToken {
                reason: "broker response missing token or clientid".to_string(),
            }));
        }

        Ok(body)
    }
}

/// Accept a unix timestamp serialized as either a JSON number or a string
/// of digits (the broker emits both across versions).
pub(crate) fn de_unix_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}
