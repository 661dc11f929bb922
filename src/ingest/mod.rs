//! Slate ingestion from provider exports.

pub mod csv;
pub mod normalize;
