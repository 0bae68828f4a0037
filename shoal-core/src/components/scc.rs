//! Strongly connected components via Kosaraju's two-pass algorithm.
//!
//! Both depth-first passes run over an index arena with explicit stacks, so
//! long chains cannot overflow the call stack.

use std::sync::Mutex;

use tracing::{debug, instrument};

use crate::{error::GraphError, graph::EdgeSink};

use super::{ComponentPartition, ComponentSink, NodeUniverse};

/// Accumulates directed edges in per-node locked adjacency lists.
///
/// # Examples
/// ```
/// use shoal_core::{ComponentSink, EdgeSink, StronglyConnectedComponents};
///
/// let sink = StronglyConnectedComponents::new([0, 1, 2, 3]);
/// for (source, target) in [(0, 1), (1, 2), (2, 0)] {
///     sink.add_edge(source, target)?;
/// }
/// let groups = sink.components()?.into_groups();
/// assert_eq!(groups, vec![vec![0, 1, 2], vec![3]]);
/// # Ok::<(), shoal_core::GraphError>(())
/// ```
pub struct StronglyConnectedComponents {
    universe: NodeUniverse,
    successors: Vec<Mutex<Vec<usize>>>,
}

impl StronglyConnectedComponents {
    /// Creates a sink accepting edges between the given node ids.
    pub fn new(nodes: impl IntoIterator<Item = u64>) -> Self {
        let universe = NodeUniverse::new(nodes);
        let successors = (0..universe.len()).map(|_| Mutex::new(Vec::new())).collect();
        Self {
            universe,
            successors,
        }
    }

    fn into_adjacency(self) -> Result<(NodeUniverse, Vec<Vec<usize>>), GraphError> {
        let adjacency = self
            .successors
            .into_iter()
            .map(|list| {
                let mut list = list.into_inner().map_err(|_| GraphError::LockPoisoned {
                    resource: "scc adjacency list",
                })?;
                list.sort_unstable();
                list.dedup();
                Ok(list)
            })
            .collect::<Result<Vec<_>, GraphError>>()?;
        Ok((self.universe, adjacency))
    }
}

impl std::fmt::Debug for StronglyConnectedComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StronglyConnectedComponents")
            .field("nodes", &self.universe.len())
            .finish_non_exhaustive()
    }
}

impl EdgeSink for StronglyConnectedComponents {
    fn add_edge(&self, source: u64, target: u64) -> Result<(), GraphError> {
        let from = self.universe.position(source)?;
        let to = self.universe.position(target)?;
        let list = self
            .successors
            .get(from)
            .ok_or(GraphError::InvariantViolation {
                invariant: "adjacency index must be within the node universe",
                index: from,
                lock_count: self.successors.len(),
            })?;
        list.lock()
            .map_err(|_| GraphError::LockPoisoned {
                resource: "scc adjacency list",
            })?
            .push(to);
        Ok(())
    }

    fn is_directed(&self) -> bool {
        true
    }
}

impl ComponentSink for StronglyConnectedComponents {
    #[instrument(
        name = "components.extract",
        err,
        skip(self),
        fields(mode = "strongly_connected", nodes = self.universe.len()),
    )]
    fn components(self) -> Result<ComponentPartition, GraphError> {
        let (universe, forward) = self.into_adjacency()?;
        let groups = kosaraju(&forward);
        let partition = universe.resolve(groups)?;
        debug!(components = partition.len(), "strongly connected components extracted");
        Ok(partition)
    }
}

fn reverse(forward: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut backward = vec![Vec::new(); forward.len()];
    for (source, targets) in forward.iter().enumerate() {
        for &target in targets {
            if let Some(list) = backward.get_mut(target) {
                list.push(source);
            }
        }
    }
    backward
}

/// Returns the nodes of `graph` in depth-first finishing order.
fn finish_order(graph: &[Vec<usize>]) -> Vec<usize> {
    let mut visited = vec![false; graph.len()];
    let mut order = Vec::with_capacity(graph.len());
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for root in 0..graph.len() {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        stack.push((root, 0));
        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            match graph[node].get(cursor) {
                Some(&next) => {
                    frame.1 += 1;
                    if !visited[next] {
                        visited[next] = true;
                        stack.push((next, 0));
                    }
                }
                None => {
                    stack.pop();
                    order.push(node);
                }
            }
        }
    }
    order
}

/// Finishing order on the reversed graph, then one forward sweep per
/// unvisited node taken in reverse finishing order.
fn kosaraju(forward: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let order = finish_order(&reverse(forward));
    let mut assigned = vec![false; forward.len()];
    let mut components = Vec::new();
    let mut stack = Vec::new();
    for &root in order.iter().rev() {
        if assigned[root] {
            continue;
        }
        assigned[root] = true;
        stack.push(root);
        let mut members = Vec::new();
        while let Some(node) = stack.pop() {
            members.push(node);
            for &next in &forward[node] {
                if !assigned[next] {
                    assigned[next] = true;
                    stack.push(next);
                }
            }
        }
        components.push(members);
    }
    components
}
