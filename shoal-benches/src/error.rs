//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` instead of panicking
//! mid-measurement.

use shoal_core::{ShoalError, ThresholdError};

use crate::source::SyntheticError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic input generation failed.
    #[error("synthetic input generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// A threshold literal failed to parse.
    #[error("threshold parsing failed: {0}")]
    Threshold(#[from] ThresholdError),
    /// Building a clustering or running it failed.
    #[error("clustering failed: {0}")]
    Clustering(#[from] ShoalError),
}
