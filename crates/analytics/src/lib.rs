//! # Fundscope Analytics
//!
//! The numeric toolbox for the aggregation engine: summary statistics over
//! ordered integer sequences, the half-up rounding used everywhere a float
//! becomes a reported number, and the bucket parser/aggregator that turns
//! human-readable range labels into histograms.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   external systems and depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every function here maps inputs to outputs
//!   with no shared state, which keeps the statistical policy decisions
//!   (tie-breaks, empty-sequence defaults, bucket boundaries) easy to test
//!   in isolation.

// Declare the modules that constitute this crate.
pub mod buckets;
pub mod error;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use buckets::{ValueBucket, ValueBuckets};
pub use error::AnalyticsError;
pub use stats::{first, last, mean, median, round_float, round_int, sum};
