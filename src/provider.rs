//! Static Xbox Live provider configuration.
//!
//! `descriptor` exposes a validated [`ProviderDescriptor`] holding every endpoint, the OAuth
//! client identity, and the per-call timeout. Flows never read module-level constants; they
//! receive a descriptor, so tests can point the whole chain at a mock server.

pub mod descriptor;

pub use descriptor::*;
