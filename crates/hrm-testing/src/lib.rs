//! Test utilities for HRM services.
//!
//! Dev-dependency only.

pub mod auth;
