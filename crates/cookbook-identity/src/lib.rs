//! Identity types shared across the cookbook services.
//!
//! Provides the `Identity` and `MaybeIdentity` extractors for the
//! gateway-injected user header.

pub mod identity;

pub use identity::{Identity, MaybeIdentity};
