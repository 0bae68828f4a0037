//! Benchmark support crate for shoal.
//!
//! Provides seeded synthetic inputs and parameter types used by the Criterion
//! benchmarks for graph clustering and ranked-list pruning.

pub mod error;
pub mod params;
pub mod source;
