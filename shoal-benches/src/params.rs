//! Benchmark parameter types.
//!
//! Groups related benchmark parameters into structs so that each Criterion
//! input renders as a stable `BenchmarkId`.

use std::fmt;

/// Parameters for a clustering benchmark run.
#[derive(Clone, Debug)]
pub struct GraphBenchParams {
    /// Number of id sets in the index.
    pub set_count: usize,
    /// Worker threads used by the graph builder.
    pub threads: usize,
}

impl fmt::Display for GraphBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},t={}", self.set_count, self.threads)
    }
}

/// Parameters for a pruning benchmark run.
#[derive(Clone, Debug)]
pub struct PruneBenchParams {
    /// Number of ranked elements.
    pub element_count: usize,
    /// Number of score tiers separated by steep drops.
    pub tiers: u32,
}

impl fmt::Display for PruneBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},tiers={}", self.element_count, self.tiers)
    }
}
