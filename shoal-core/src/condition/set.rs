//! Conditions comparing the member sets of two nodes.

use crate::idset::IdSetIndex;

use super::{ConditionError, EdgeCondition};

/// Holds when the set indexed by `source` contains the id `target`.
#[derive(Clone, Copy, Debug)]
pub struct Containment<'a> {
    index: &'a IdSetIndex,
}

impl<'a> Containment<'a> {
    /// Creates the condition over `index`.
    #[must_use]
    pub const fn new(index: &'a IdSetIndex) -> Self {
        Self { index }
    }
}

impl EdgeCondition for Containment<'_> {
    fn has_edge(&self, source: u64, target: u64) -> Result<bool, ConditionError> {
        Ok(self.index.require(source)?.contains(target))
    }

    fn is_symmetric(&self) -> bool {
        false
    }
}

/// Holds when both sets have exactly the same members.
#[derive(Clone, Copy, Debug)]
pub struct IdenticalSet<'a> {
    index: &'a IdSetIndex,
}

impl<'a> IdenticalSet<'a> {
    /// Creates the condition over `index`.
    #[must_use]
    pub const fn new(index: &'a IdSetIndex) -> Self {
        Self { index }
    }
}

impl EdgeCondition for IdenticalSet<'_> {
    fn has_edge(&self, source: u64, target: u64) -> Result<bool, ConditionError> {
        let left = self.index.require(source)?;
        let right = self.index.require(target)?;
        Ok(left.members() == right.members())
    }

    fn is_symmetric(&self) -> bool {
        true
    }
}

/// Holds when neither set is a subset of the other.
#[derive(Clone, Copy, Debug)]
pub struct NonSubset<'a> {
    index: &'a IdSetIndex,
}

impl<'a> NonSubset<'a> {
    /// Creates the condition over `index`.
    #[must_use]
    pub const fn new(index: &'a IdSetIndex) -> Self {
        Self { index }
    }
}

impl EdgeCondition for NonSubset<'_> {
    fn has_edge(&self, source: u64, target: u64) -> Result<bool, ConditionError> {
        let left = self.index.require(source)?;
        let right = self.index.require(target)?;
        let shared = left.overlap(right);
        Ok(shared != left.len() && shared != right.len())
    }

    fn is_symmetric(&self) -> bool {
        true
    }
}
