//! Identifiable sets of member ids and an id-addressed index over them.

use std::{cmp::Ordering, collections::HashMap};

use crate::condition::ConditionError;

/// Anything the graph builder can place in its node list.
pub trait Identifiable {
    /// Returns the stable node identifier.
    fn id(&self) -> u64;
}

impl Identifiable for u64 {
    fn id(&self) -> u64 {
        *self
    }
}

impl<T: Identifiable + ?Sized> Identifiable for &T {
    fn id(&self) -> u64 {
        (**self).id()
    }
}

/// An id paired with a sorted, deduplicated set of member ids.
///
/// # Examples
/// ```
/// use shoal_core::IdentifiableIdSet;
///
/// let set = IdentifiableIdSet::new(4, [9, 2, 9, 5]);
/// assert_eq!(set.members(), &[2, 5, 9]);
/// assert!(set.contains(5));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdentifiableIdSet {
    id: u64,
    members: Vec<u64>,
}

impl IdentifiableIdSet {
    /// Creates a set, normalising `members` by sorting and deduplicating.
    pub fn new(id: u64, members: impl IntoIterator<Item = u64>) -> Self {
        let mut members: Vec<u64> = members.into_iter().collect();
        members.sort_unstable();
        members.dedup();
        Self { id, members }
    }

    /// Returns the set identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn id(&self) -> u64 { self.id }

    /// Returns the members in ascending order.
    #[rustfmt::skip]
    #[must_use]
    pub fn members(&self) -> &[u64] { &self.members }

    /// Returns the number of members.
    #[rustfmt::skip]
    #[must_use]
    pub fn len(&self) -> usize { self.members.len() }

    /// Returns whether the set has no members.
    #[rustfmt::skip]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.members.is_empty() }

    /// Returns whether `member` belongs to the set.
    #[must_use]
    pub fn contains(&self, member: u64) -> bool {
        self.members.binary_search(&member).is_ok()
    }

    /// Counts the members shared with `other`.
    #[must_use]
    pub fn overlap(&self, other: &Self) -> usize {
        let (mut left, mut right) = (self.members.iter(), other.members.iter());
        let (mut a, mut b) = (left.next(), right.next());
        let mut shared = 0;
        while let (Some(x), Some(y)) = (a, b) {
            match x.cmp(y) {
                Ordering::Less => a = left.next(),
                Ordering::Greater => b = right.next(),
                Ordering::Equal => {
                    shared += 1;
                    a = left.next();
                    b = right.next();
                }
            }
        }
        shared
    }

    /// Returns whether every member of `self` also belongs to `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.overlap(other) == self.len()
    }

    pub(crate) fn into_members(self) -> Vec<u64> {
        self.members
    }
}

impl Identifiable for IdentifiableIdSet {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Id-addressed collection of [`IdentifiableIdSet`]s.
///
/// Edge conditions resolve node ids through this index. Inserting a set
/// whose id is already present replaces the earlier set in place.
#[derive(Clone, Debug, Default)]
pub struct IdSetIndex {
    sets: Vec<IdentifiableIdSet>,
    positions: HashMap<u64, usize>,
}

impl IdSetIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `set`, returning the set it replaced, if any.
    pub fn insert(&mut self, set: IdentifiableIdSet) -> Option<IdentifiableIdSet> {
        if let Some(&position) = self.positions.get(&set.id())
            && let Some(slot) = self.sets.get_mut(position)
        {
            return Some(std::mem::replace(slot, set));
        }
        self.positions.insert(set.id(), self.sets.len());
        self.sets.push(set);
        None
    }

    /// Looks up the set with identifier `id`.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&IdentifiableIdSet> {
        self.positions
            .get(&id)
            .and_then(|&position| self.sets.get(position))
    }

    /// Looks up the set with identifier `id`, failing when it is unknown.
    ///
    /// # Errors
    /// Returns [`ConditionError::UnknownNode`] when no set has that id.
    pub fn require(&self, id: u64) -> Result<&IdentifiableIdSet, ConditionError> {
        self.get(id).ok_or(ConditionError::UnknownNode { id })
    }

    /// Iterates the sets in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, IdentifiableIdSet> {
        self.sets.iter()
    }

    /// Returns the sets in insertion order.
    #[rustfmt::skip]
    #[must_use]
    pub fn as_slice(&self) -> &[IdentifiableIdSet] { &self.sets }

    /// Returns the number of indexed sets.
    #[rustfmt::skip]
    #[must_use]
    pub fn len(&self) -> usize { self.sets.len() }

    /// Returns whether the index holds no sets.
    #[rustfmt::skip]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.sets.is_empty() }
}

impl FromIterator<IdentifiableIdSet> for IdSetIndex {
    fn from_iter<I: IntoIterator<Item = IdentifiableIdSet>>(iter: I) -> Self {
        let mut index = Self::new();
        for set in iter {
            index.insert(set);
        }
        index
    }
}

impl<'a> IntoIterator for &'a IdSetIndex {
    type Item = &'a IdentifiableIdSet;
    type IntoIter = std::slice::Iter<'a, IdentifiableIdSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
