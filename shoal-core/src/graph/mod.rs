//! Parallel all-pairs graph construction.
//!
//! [`build_graph`] evaluates an [`EdgeCondition`] over every unordered pair
//! of an ordered node list and feeds the resulting directed edges into an
//! [`EdgeSink`]. Node position `i` belongs to worker `i mod T`; each worker
//! pairs its positions with every later position, so every unordered pair
//! is visited exactly once.
//!
//! Per visited pair `(s, t)` the forward probe always runs. The reverse
//! direction is then decided without a second probe whenever the condition
//! is symmetric; otherwise it is probed when the sink is directed or the
//! forward probe failed.

use std::{
    num::NonZeroUsize,
    sync::atomic::{AtomicBool, Ordering},
};

use rayon::{
    ThreadPoolBuilder,
    iter::{IntoParallelIterator, ParallelIterator},
};
use tracing::{debug, instrument};

use crate::{condition::EdgeCondition, error::GraphError, idset::Identifiable};

/// Thread-safe accumulator of directed edges.
///
/// Sinks are fed concurrently by every worker of a run and must tolerate
/// arbitrary interleavings and duplicate edges.
pub trait EdgeSink: Sync {
    /// Records the directed edge `source -> target`.
    ///
    /// # Errors
    /// Returns [`GraphError`] when an endpoint is unknown to the sink or its
    /// internal state is unusable.
    fn add_edge(&self, source: u64, target: u64) -> Result<(), GraphError>;

    /// Returns whether edge direction matters to this sink.
    fn is_directed(&self) -> bool;
}

impl<S: EdgeSink + ?Sized> EdgeSink for &S {
    fn add_edge(&self, source: u64, target: u64) -> Result<(), GraphError> {
        (**self).add_edge(source, target)
    }

    fn is_directed(&self) -> bool {
        (**self).is_directed()
    }
}

/// Work performed by one [`build_graph`] run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphBuildStats {
    pairs_evaluated: u64,
    edges_emitted: u64,
}

impl GraphBuildStats {
    /// Returns the number of condition probes, reverse probes included.
    #[rustfmt::skip]
    #[must_use]
    pub const fn pairs_evaluated(&self) -> u64 { self.pairs_evaluated }

    /// Returns the number of edges handed to the sink.
    #[rustfmt::skip]
    #[must_use]
    pub const fn edges_emitted(&self) -> u64 { self.edges_emitted }

    /// Combines the counters of two partial runs.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            pairs_evaluated: self.pairs_evaluated.saturating_add(other.pairs_evaluated),
            edges_emitted: self.edges_emitted.saturating_add(other.edges_emitted),
        }
    }
}

/// Decides which directions of a visited pair reach the sink.
#[derive(Clone, Copy, Debug)]
struct EmissionPlan {
    symmetric: bool,
    directed: bool,
}

impl EmissionPlan {
    fn visit<C, S>(
        self,
        condition: &C,
        sink: &S,
        source: u64,
        target: u64,
        stats: &mut GraphBuildStats,
    ) -> Result<(), GraphError>
    where
        C: EdgeCondition + ?Sized,
        S: EdgeSink + ?Sized,
    {
        let forward = probe(condition, source, target, stats)?;
        if forward {
            emit(sink, source, target, stats)?;
        }
        let backward = if self.symmetric {
            forward
        } else if self.directed || !forward {
            probe(condition, target, source, stats)?
        } else {
            false
        };
        if backward {
            emit(sink, target, source, stats)?;
        }
        Ok(())
    }
}

fn probe<C: EdgeCondition + ?Sized>(
    condition: &C,
    source: u64,
    target: u64,
    stats: &mut GraphBuildStats,
) -> Result<bool, GraphError> {
    stats.pairs_evaluated += 1;
    condition
        .has_edge(source, target)
        .map_err(|error| GraphError::Condition {
            source_id: source,
            target_id: target,
            error,
        })
}

fn emit<S: EdgeSink + ?Sized>(
    sink: &S,
    source: u64,
    target: u64,
    stats: &mut GraphBuildStats,
) -> Result<(), GraphError> {
    sink.add_edge(source, target)?;
    stats.edges_emitted += 1;
    Ok(())
}

/// Shared, read-only inputs of every worker.
struct Workload<'a, N, C: ?Sized, S: ?Sized> {
    nodes: &'a [N],
    condition: &'a C,
    sink: &'a S,
    plan: EmissionPlan,
    stride: usize,
    aborted: &'a AtomicBool,
}

impl<N, C, S> Workload<'_, N, C, S>
where
    N: Identifiable + Sync,
    C: EdgeCondition + ?Sized,
    S: EdgeSink + ?Sized,
{
    fn run_worker(&self, worker: usize) -> Result<GraphBuildStats, GraphError> {
        let mut stats = GraphBuildStats::default();
        let last = self.nodes.len().saturating_sub(1);
        let positions = self.nodes.iter().enumerate().take(last).skip(worker);
        for (position, node) in positions.step_by(self.stride) {
            let source = node.id();
            let later = self.nodes.get(position + 1..).unwrap_or_default();
            for other in later {
                if self.aborted.load(Ordering::Relaxed) {
                    return Ok(stats);
                }
                let visited = self
                    .plan
                    .visit(self.condition, self.sink, source, other.id(), &mut stats);
                if let Err(error) = visited {
                    self.aborted.store(true, Ordering::Relaxed);
                    return Err(error);
                }
            }
        }
        Ok(stats)
    }
}

/// Evaluates `condition` over every unordered pair of `nodes` and feeds the
/// emitted edges into `sink`.
///
/// With one thread the single worker runs inline. Otherwise `threads`
/// workers run on a dedicated rayon pool and the call blocks until all of
/// them finish. The first failure aborts the run; edges already emitted are
/// left in the sink, which must then be discarded.
///
/// # Errors
/// Returns [`GraphError::Condition`] when the condition fails,
/// [`GraphError::ThreadPool`] when the worker pool cannot be created, and
/// any error reported by the sink.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
///
/// use shoal_core::{
///     ComponentSink, IdSetIndex, IdenticalSet, IdentifiableIdSet, UndirectedComponents,
///     build_graph,
/// };
///
/// let index: IdSetIndex = [
///     IdentifiableIdSet::new(1, [7, 8]),
///     IdentifiableIdSet::new(2, [7, 8]),
///     IdentifiableIdSet::new(3, [9]),
/// ]
/// .into_iter()
/// .collect();
/// let sink = UndirectedComponents::new([1, 2, 3]);
/// let condition = IdenticalSet::new(&index);
/// let stats = build_graph(index.as_slice(), &condition, &sink, NonZeroUsize::MIN)?;
/// assert_eq!(stats.pairs_evaluated(), 3);
/// let partition = sink.components()?;
/// assert_eq!(partition.len(), 2);
/// # Ok::<(), shoal_core::GraphError>(())
/// ```
#[instrument(
    name = "graph.build",
    err,
    skip(nodes, condition, sink),
    fields(
        nodes = nodes.len(),
        threads = threads.get(),
        symmetric = condition.is_symmetric(),
        directed = sink.is_directed(),
    ),
)]
pub fn build_graph<N, C, S>(
    nodes: &[N],
    condition: &C,
    sink: &S,
    threads: NonZeroUsize,
) -> Result<GraphBuildStats, GraphError>
where
    N: Identifiable + Sync,
    C: EdgeCondition + ?Sized,
    S: EdgeSink + ?Sized,
{
    let stride = threads.get();
    let aborted = AtomicBool::new(false);
    let workload = Workload {
        nodes,
        condition,
        sink,
        plan: EmissionPlan {
            symmetric: condition.is_symmetric(),
            directed: sink.is_directed(),
        },
        stride,
        aborted: &aborted,
    };

    let stats = if stride == 1 {
        workload.run_worker(0)?
    } else {
        let pool = ThreadPoolBuilder::new()
            .num_threads(stride)
            .thread_name(|index| format!("shoal-graph-{index}"))
            .build()
            .map_err(|error| GraphError::ThreadPool {
                threads: stride,
                message: error.to_string(),
            })?;
        debug!(threads = stride, "graph worker pool ready");
        pool.install(|| {
            (0..stride)
                .into_par_iter()
                .map(|worker| workload.run_worker(worker))
                .try_reduce(GraphBuildStats::default, |left, right| Ok(left.merge(right)))
        })?
    };

    record_stats(&stats);
    debug!(
        pairs_evaluated = stats.pairs_evaluated,
        edges_emitted = stats.edges_emitted,
        "graph build complete"
    );
    Ok(stats)
}

#[cfg(feature = "metrics")]
fn record_stats(stats: &GraphBuildStats) {
    metrics::counter!("graph_pairs_evaluated").increment(stats.pairs_evaluated);
    metrics::counter!("graph_edges_emitted").increment(stats.edges_emitted);
}

#[cfg(not(feature = "metrics"))]
fn record_stats(_stats: &GraphBuildStats) {}
