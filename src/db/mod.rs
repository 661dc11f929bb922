//! Sqlite persistence for game records and season aggregates.

pub mod games;
pub mod models;
