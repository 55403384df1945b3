//! Analysis modules.
//!
//! Aggregation of trial records, descriptive and inferential statistics,
//! and the percentile bootstrap, plus the two pipelines that tie them
//! together for the reports.

pub mod aggregator;
pub mod anchoring;
pub mod bootstrap;
pub mod stats;

pub use aggregator::*;
pub use anchoring::*;
