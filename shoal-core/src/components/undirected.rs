//! Connected components of an undirected graph.

use tracing::{debug, instrument};

use crate::{error::GraphError, graph::EdgeSink};

use super::{ComponentPartition, ComponentSink, NodeUniverse, union_find::DisjointSets};

/// Folds edges into concurrent disjoint sets as they arrive.
///
/// Edge direction is ignored, so the builder never has to emit mirrors.
///
/// # Examples
/// ```
/// use shoal_core::{ComponentSink, EdgeSink, UndirectedComponents};
///
/// let sink = UndirectedComponents::new([10, 20, 30]);
/// sink.add_edge(30, 10)?;
/// let partition = sink.components()?;
/// assert_eq!(partition.component_of(10).map(|set| set.members()), Some(&[10, 30][..]));
/// assert_eq!(partition.len(), 2);
/// # Ok::<(), shoal_core::GraphError>(())
/// ```
pub struct UndirectedComponents {
    universe: NodeUniverse,
    sets: DisjointSets,
}

impl UndirectedComponents {
    /// Creates a sink accepting edges between the given node ids.
    pub fn new(nodes: impl IntoIterator<Item = u64>) -> Self {
        let universe = NodeUniverse::new(nodes);
        let sets = DisjointSets::new(universe.len());
        Self { universe, sets }
    }

    /// Returns the number of components formed so far.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.sets.set_count()
    }
}

impl std::fmt::Debug for UndirectedComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndirectedComponents")
            .field("nodes", &self.universe.len())
            .field("components", &self.component_count())
            .finish()
    }
}

impl EdgeSink for UndirectedComponents {
    fn add_edge(&self, source: u64, target: u64) -> Result<(), GraphError> {
        let left = self.universe.position(source)?;
        let right = self.universe.position(target)?;
        self.sets.merge(left, right)?;
        Ok(())
    }

    fn is_directed(&self) -> bool {
        false
    }
}

impl ComponentSink for UndirectedComponents {
    #[instrument(
        name = "components.extract",
        err,
        skip(self),
        fields(mode = "undirected", nodes = self.universe.len()),
    )]
    fn components(self) -> Result<ComponentPartition, GraphError> {
        let groups = self.sets.groups()?;
        let partition = self.universe.resolve(groups)?;
        debug!(components = partition.len(), "connected components extracted");
        Ok(partition)
    }
}
