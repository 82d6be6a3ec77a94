//! Shared HTTP plumbing for cakeorder services: health probes, request ids,
//! tracing setup and serialization helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
