//! Service plumbing shared by Airlytics binaries: tracing setup, request ids,
//! health checks and serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
