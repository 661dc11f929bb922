//! Shared in-memory state.

pub mod store;

pub use store::ReportHub;
