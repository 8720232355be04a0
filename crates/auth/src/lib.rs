//! Token acquisition for the kvmount adapter.
//!
//! Two ways to obtain a bearer token for an Azure resource scope:
//!
//! - **Service principal** — OAuth2 client-credentials exchange against the
//!   cloud's Active Directory endpoint ([`acquire`]).
//! - **Pod identity** — delegation to the NMI sidecar on the node, which
//!   resolves the pod's identity to a token on its behalf ([`broker`]).
//!
//! Both paths end in the same [`BearerAuthorizer`], so callers are
//! indifferent to which one produced the token. Token values only ever
//! appear in logs through [`redact::redact`].

pub mod acquire;
pub mod broker;
pub mod environment;
pub mod error;
pub mod redact;
mod secure;
pub mod token;

pub use acquire::{Credentials, TokenAcquirer};
pub use broker::BrokerClient;
pub use environment::CloudEnvironment;
pub use error::AuthError;
pub use secure::SecureString;
pub use token::{AccessToken, BearerAuthorizer};
