//! Clustering orchestration for the shoal library.
//!
//! Provides the [`Clustering`] runtime entry point, which pairs the parallel
//! graph builder with the component sink matching the configured mode.

use std::num::NonZeroUsize;

use tracing::{info, instrument, warn};

use crate::{
    Result,
    builder::ComponentMode,
    components::{
        ComponentPartition, ComponentSink, StronglyConnectedComponents, UndirectedComponents,
    },
    condition::EdgeCondition,
    graph::build_graph,
    idset::Identifiable,
};

/// Entry point for clustering a node list under an edge condition.
///
/// # Examples
/// ```
/// use shoal_core::{ClusteringBuilder, IdSetIndex, IdentifiableIdSet, JaccardOverlap, Overlap};
///
/// let index: IdSetIndex = [
///     IdentifiableIdSet::new(1, [1, 2, 3]),
///     IdentifiableIdSet::new(2, [2, 3, 4]),
///     IdentifiableIdSet::new(3, [8, 9]),
/// ]
/// .into_iter()
/// .collect();
/// let condition = Overlap::new(&index, JaccardOverlap::new("GEQ0.5".parse()?));
/// let clustering = ClusteringBuilder::new().with_threads(2).build()?;
/// let partition = clustering.run(index.as_slice(), &condition)?;
/// assert_eq!(partition.into_groups(), vec![vec![1, 2], vec![3]]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Clustering {
    threads: NonZeroUsize,
    mode: ComponentMode,
}

impl Clustering {
    pub(crate) fn new(threads: NonZeroUsize, mode: ComponentMode) -> Self {
        Self { threads, mode }
    }

    /// Returns the number of graph-building worker threads.
    #[must_use]
    pub fn threads(&self) -> NonZeroUsize {
        self.threads
    }

    /// Returns the component mode.
    #[must_use]
    pub fn mode(&self) -> ComponentMode {
        self.mode
    }

    /// Builds the graph of `nodes` under `condition` and partitions it.
    ///
    /// An empty node list yields an empty partition.
    ///
    /// # Errors
    /// Returns [`crate::ShoalError::Graph`] when a probe, the worker pool or
    /// component extraction fails.
    #[instrument(
        name = "clustering.run",
        err,
        skip(self, nodes, condition),
        fields(nodes = nodes.len(), threads = self.threads.get(), mode = ?self.mode),
    )]
    pub fn run<N, C>(&self, nodes: &[N], condition: &C) -> Result<ComponentPartition>
    where
        N: Identifiable + Sync,
        C: EdgeCondition + ?Sized,
    {
        if nodes.is_empty() {
            warn!("node list is empty, returning an empty partition");
            return Ok(ComponentPartition::default());
        }
        let ids = nodes.iter().map(Identifiable::id);
        match self.mode {
            ComponentMode::Undirected => {
                self.run_into(UndirectedComponents::new(ids), nodes, condition)
            }
            ComponentMode::StronglyConnected => {
                self.run_into(StronglyConnectedComponents::new(ids), nodes, condition)
            }
        }
    }

    fn run_into<S, N, C>(&self, sink: S, nodes: &[N], condition: &C) -> Result<ComponentPartition>
    where
        S: ComponentSink,
        N: Identifiable + Sync,
        C: EdgeCondition + ?Sized,
    {
        let stats = build_graph(nodes, condition, &sink, self.threads)?;
        let partition = sink.components()?;
        info!(
            components = partition.len(),
            non_singletons = partition.non_singletons().count(),
            pairs_evaluated = stats.pairs_evaluated(),
            edges_emitted = stats.edges_emitted(),
            "clustering completed"
        );
        Ok(partition)
    }
}
