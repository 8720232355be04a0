//! Bearer tokens and the authorizer that applies them.

use crate::secure::SecureString;

/// Access token with metadata.
///
/// The token value itself is held in a [`SecureString`] and never appears
/// in `Debug` output.
#[derive(Clone)]
pub struct AccessToken {
    token: SecureString,
    /// Unix timestamp the token expires at, when the issuer reported one.
    expires_on: Option<u64>,
    /// Resource scope the token was issued for.
    resource: String,
}

impl AccessToken {
    /// Wrap a raw token value.
    pub fn new(token: impl Into<String>, expires_on: Option<u64>, resource: impl Into<String>) -> Self {
        Self {
            token: SecureString::new(token),
            expires_on,
            resource: resource.into(),
        }
    }

    /// Resource scope the token was issued for.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Unix timestamp the token expires at, if known.
    #[must_use]
    pub const fn expires_on(&self) -> Option<u64> {
        self.expires_on
    }

    /// Turn the token into an authorizer for outgoing requests.
    #[must_use]
    pub fn into_authorizer(self) -> BearerAuthorizer {
        BearerAuthorizer { token: self.token }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("expires_on", &self.expires_on)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

/// Opaque capability that attaches a bearer token to outgoing requests.
#[derive(Clone)]
pub struct BearerAuthorizer {
    token: SecureString,
}

impl BearerAuthorizer {
    /// Attach `Authorization: Bearer …` to a request.
    #[must_use]
    pub fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(self.token.expose())
    }
}

impl std::fmt::Debug for BearerAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BearerAuthorizer[REDACTED]")
    }
}
