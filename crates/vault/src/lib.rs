//! Vault access for the kvmount adapter.
//!
//! Three stages, run in order by the CLI:
//!
//! 1. [`locator`] resolves a vault display name + resource group to the
//!    vault's data-plane URL through the resource manager.
//! 2. [`objects`] correlates the four parallel `;`-separated descriptor
//!    lists into per-object fetch requests, failing fast on any
//!    configuration mismatch before a single network call is made.
//! 3. [`pipeline`] fetches each object through [`client`] and writes it to
//!    the target directory, aborting on the first failure.

pub mod client;
pub mod error;
pub mod locator;
pub mod objects;
pub mod pipeline;

pub use client::VaultClient;
pub use error::{DescriptorError, VaultError};
pub use locator::VaultLocator;
pub use objects::{ObjectDescriptor, ObjectKind, parse_descriptors};
