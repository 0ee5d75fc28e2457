//! The reporting pipeline: raw spreadsheet rows in, ranked summaries out.
//!
//! Every stage is a pure function over owned collections, so concurrent
//! callers need no coordination and the presentation layer owns any caching.

pub mod ingestion;
pub mod processing;
