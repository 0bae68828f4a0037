//! Component extraction from concurrently built graphs.
//!
//! Sinks are created over a fixed node universe, fed by the graph builder,
//! and drained exactly once into a [`ComponentPartition`]. Extraction is
//! deterministic given the set of edges: members are sorted and components
//! are ordered by their smallest member.

mod scc;
mod undirected;
mod union_find;

use std::collections::HashMap;

use crate::{error::GraphError, graph::EdgeSink, idset::IdentifiableIdSet};

pub use self::{scc::StronglyConnectedComponents, undirected::UndirectedComponents};

/// An [`EdgeSink`] that can be drained into a partition of its nodes.
pub trait ComponentSink: EdgeSink {
    /// Consumes the sink and returns its components.
    ///
    /// Nodes that never received an edge form singleton components.
    ///
    /// # Errors
    /// Returns [`GraphError::LockPoisoned`] when a writer panicked while
    /// holding one of the sink's locks.
    fn components(self) -> Result<ComponentPartition, GraphError>;
}

/// Disjoint components covering every node of a run exactly once.
///
/// # Examples
/// ```
/// use shoal_core::ComponentPartition;
///
/// let partition = ComponentPartition::from_groups(vec![vec![9, 4], vec![2]]);
/// assert_eq!(partition.len(), 2);
/// assert_eq!(partition.node_count(), 3);
/// assert_eq!(partition.component_of(9).map(|set| set.members()), Some(&[4, 9][..]));
/// assert_eq!(partition.component_of(2).map(|set| set.id()), Some(0));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentPartition {
    components: Vec<IdentifiableIdSet>,
    owners: HashMap<u64, usize>,
}

impl ComponentPartition {
    /// Builds a partition from groups of node ids.
    ///
    /// Groups are normalised and ordered by their smallest member; empty
    /// groups are dropped. Component ids are assigned in that order.
    #[must_use]
    pub fn from_groups(groups: impl IntoIterator<Item = Vec<u64>>) -> Self {
        let mut groups: Vec<Vec<u64>> = groups
            .into_iter()
            .filter(|group| !group.is_empty())
            .map(|mut group| {
                group.sort_unstable();
                group.dedup();
                group
            })
            .collect();
        groups.sort_unstable_by_key(|group| group.first().copied());

        let mut owners = HashMap::new();
        let components = groups
            .into_iter()
            .enumerate()
            .map(|(position, members)| {
                for &member in &members {
                    owners.insert(member, position);
                }
                IdentifiableIdSet::new(position as u64, members)
            })
            .collect();
        Self { components, owners }
    }

    /// Returns the number of components.
    #[rustfmt::skip]
    #[must_use]
    pub fn len(&self) -> usize { self.components.len() }

    /// Returns whether the partition has no components.
    #[rustfmt::skip]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.components.is_empty() }

    /// Returns the number of partitioned nodes.
    #[rustfmt::skip]
    #[must_use]
    pub fn node_count(&self) -> usize { self.owners.len() }

    /// Iterates components in order of their smallest member.
    pub fn iter(&self) -> std::slice::Iter<'_, IdentifiableIdSet> {
        self.components.iter()
    }

    /// Returns the components in order of their smallest member.
    #[rustfmt::skip]
    #[must_use]
    pub fn as_slice(&self) -> &[IdentifiableIdSet] { &self.components }

    /// Returns the component containing `node`.
    #[must_use]
    pub fn component_of(&self, node: u64) -> Option<&IdentifiableIdSet> {
        self.owners
            .get(&node)
            .and_then(|&position| self.components.get(position))
    }

    /// Iterates the components with more than one member.
    pub fn non_singletons(&self) -> impl Iterator<Item = &IdentifiableIdSet> {
        self.components.iter().filter(|component| component.len() > 1)
    }

    /// Returns the member lists in component order.
    #[must_use]
    pub fn into_groups(self) -> Vec<Vec<u64>> {
        self.components
            .into_iter()
            .map(IdentifiableIdSet::into_members)
            .collect()
    }
}

impl<'a> IntoIterator for &'a ComponentPartition {
    type Item = &'a IdentifiableIdSet;
    type IntoIter = std::slice::Iter<'a, IdentifiableIdSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Dense numbering of the node ids a sink accepts.
#[derive(Clone, Debug, Default)]
struct NodeUniverse {
    ids: Vec<u64>,
    positions: HashMap<u64, usize>,
}

impl NodeUniverse {
    fn new(ids: impl IntoIterator<Item = u64>) -> Self {
        let mut universe = Self::default();
        for id in ids {
            if let std::collections::hash_map::Entry::Vacant(entry) = universe.positions.entry(id) {
                entry.insert(universe.ids.len());
                universe.ids.push(id);
            }
        }
        universe
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn position(&self, id: u64) -> Result<usize, GraphError> {
        self.positions
            .get(&id)
            .copied()
            .ok_or(GraphError::UnknownNode { id })
    }

    fn id_at(&self, position: usize) -> Result<u64, GraphError> {
        self.ids
            .get(position)
            .copied()
            .ok_or(GraphError::InvariantViolation {
                invariant: "dense node position must be within the universe",
                index: position,
                lock_count: self.ids.len(),
            })
    }

    /// Translates groups of dense positions back into node ids.
    fn resolve(&self, groups: Vec<Vec<usize>>) -> Result<ComponentPartition, GraphError> {
        let groups = groups
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|position| self.id_at(position))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ComponentPartition::from_groups(groups))
    }
}
