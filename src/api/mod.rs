//! Read-only HTTP API.

pub mod health;
pub mod latency;
pub mod routes;
