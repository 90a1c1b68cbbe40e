//! Domain types shared across HRM crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers as well as at the HTTP boundary.

#[macro_use]
mod wire;

pub mod attendance;
pub mod employee;
pub mod leave;
pub mod pagination;
pub mod role;

pub use wire::ParseWireError;
