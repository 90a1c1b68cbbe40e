//! Service plumbing shared by HRM binaries: tracing, request ids, health
//! probes, env configuration and serde helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
