//! Shared test utilities for `shoal-core`.

use std::{
    collections::BTreeSet,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use proptest::test_runner::Config as ProptestConfig;
use shoal_test_support::ci::property_test_profile::ProptestRunProfile;

use crate::{
    condition::{ConditionError, EdgeCondition},
    error::GraphError,
    graph::EdgeSink,
};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `PROPTEST_CASES` and
/// `SHOAL_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// [`EdgeCondition`] backed by a closure that records every probe.
pub(crate) struct CountingCondition<F> {
    predicate: F,
    symmetric: bool,
    calls: AtomicUsize,
}

impl<F> CountingCondition<F>
where
    F: Fn(u64, u64) -> Result<bool, ConditionError> + Send + Sync,
{
    pub(crate) fn new(symmetric: bool, predicate: F) -> Self {
        Self {
            predicate,
            symmetric,
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns the number of probes seen so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<F> EdgeCondition for CountingCondition<F>
where
    F: Fn(u64, u64) -> Result<bool, ConditionError> + Send + Sync,
{
    fn has_edge(&self, source: u64, target: u64) -> Result<bool, ConditionError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        (self.predicate)(source, target)
    }

    fn is_symmetric(&self) -> bool {
        self.symmetric
    }
}

/// [`EdgeSink`] that keeps every emitted edge for later inspection.
pub(crate) struct RecordingSink {
    directed: bool,
    edges: Mutex<Vec<(u64, u64)>>,
}

impl RecordingSink {
    pub(crate) fn new(directed: bool) -> Self {
        Self {
            directed,
            edges: Mutex::new(Vec::new()),
        }
    }

    /// Returns the emitted edges in emission order.
    pub(crate) fn edges(&self) -> Vec<(u64, u64)> {
        self.edges
            .lock()
            .expect("recording sink lock must not be poisoned")
            .clone()
    }

    /// Returns the distinct emitted edges.
    pub(crate) fn edge_set(&self) -> BTreeSet<(u64, u64)> {
        self.edges().into_iter().collect()
    }
}

impl EdgeSink for RecordingSink {
    fn add_edge(&self, source: u64, target: u64) -> Result<(), GraphError> {
        self.edges
            .lock()
            .map_err(|_| GraphError::LockPoisoned {
                resource: "recording sink",
            })?
            .push((source, target));
        Ok(())
    }

    fn is_directed(&self) -> bool {
        self.directed
    }
}
