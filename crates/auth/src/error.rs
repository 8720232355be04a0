//! Error types for token acquisition.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced while resolving an environment or acquiring a token.
///
/// Every variant is terminal for the invocation; only the identity-broker
/// call retries internally, and it surfaces [`AuthError::BrokerExhausted`]
/// once its attempts are spent.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Cloud name did not match any known environment
    #[error("unknown cloud environment '{name}'")]
    UnknownEnvironment {
        /// The name that failed to resolve
        name: String,
    },

    /// Service-principal mode selected but no client secret was supplied
    #[error("no client secret provided for AAD application '{client_id}'")]
    MissingCredential {
        /// Client ID the secret was expected for
        client_id: String,
    },

    /// Transport-level failure talking to a token endpoint
    #[error("token request for resource '{resource}' failed")]
    Transport {
        /// Resource scope the token was requested for
        resource: String,
        /// Underlying HTTP error
        #[source]
        source: reqwest::Error,
    },

    /// Token endpoint answered with a non-success status
    #[error("token endpoint returned HTTP {status} for resource '{resource}'")]
    TokenRejected {
        /// Resource scope the token was requested for
        resource: String,
        /// Status the endpoint answered with
        status: StatusCode,
    },

    /// Token endpoint or broker returned a body we could not use
    #[error("malformed token response: {reason}")]
    MalformedToken {
        /// What was wrong with the body
        reason: String,
    },

    /// Identity broker never returned a usable token
    #[error("identity broker gave no token after {attempts} attempts: {last}")]
    BrokerExhausted {
        /// Attempts made before giving up
        attempts: u32,
        /// Outcome of the final attempt
        last: String,
    },

    /// The caller cancelled the invocation during a broker retry wait
    #[error("token acquisition cancelled")]
    Cancelled,
}
