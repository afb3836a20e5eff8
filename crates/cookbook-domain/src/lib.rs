//! Domain primitives shared across the cookbook services.
//!
//! This crate contains only pure types with no framework dependencies.

pub mod pagination;
