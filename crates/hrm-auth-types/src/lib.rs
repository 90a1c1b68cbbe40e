//! Auth types shared across HRM crates.
//!
//! Provides JWT issuing (feature `issuer`) and validation, and the bearer-token
//! `Identity` extractor with its per-operation permission check.

pub mod identity;
pub mod token;
