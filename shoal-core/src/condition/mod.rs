//! Pairwise edge conditions evaluated by the graph builder.
//!
//! An [`EdgeCondition`] answers whether a directed edge `source -> target`
//! exists and reports whether its answer is symmetric. The builder uses the
//! symmetry flag to skip reverse probes, so a condition claiming symmetry
//! must return the same answer for `(s, t)` and `(t, s)`.
//!
//! Conditions over id sets resolve node ids through an [`IdSetIndex`]
//! borrowed for the duration of a run.
//!
//! [`IdSetIndex`]: crate::IdSetIndex

mod overlap;
mod set;

use thiserror::Error;

use crate::error::define_error_codes;

pub use self::{
    overlap::{ContainmentOverlap, JaccardOverlap, Overlap, OverlapPredicate},
    set::{Containment, IdenticalSet, NonSubset},
};

/// Errors raised while evaluating an edge condition.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ConditionError {
    /// The condition was asked about a node the index does not know.
    #[error("no id set is indexed under node {id}")]
    UnknownNode {
        /// Identifier that could not be resolved.
        id: u64,
    },
}

define_error_codes! {
    /// Stable codes describing [`ConditionError`] variants.
    enum ConditionErrorCode for ConditionError {
        /// The condition was asked about a node the index does not know.
        UnknownNode => UnknownNode { .. } => "CONDITION_UNKNOWN_NODE",
    }
}

/// Pairwise predicate deciding whether the edge `source -> target` exists.
pub trait EdgeCondition: Send + Sync {
    /// Evaluates the directed pair `(source, target)`.
    ///
    /// # Errors
    /// Returns [`ConditionError`] when either node cannot be resolved.
    fn has_edge(&self, source: u64, target: u64) -> Result<bool, ConditionError>;

    /// Returns whether `has_edge(s, t) == has_edge(t, s)` for every pair.
    fn is_symmetric(&self) -> bool;
}

impl<C: EdgeCondition + ?Sized> EdgeCondition for &C {
    fn has_edge(&self, source: u64, target: u64) -> Result<bool, ConditionError> {
        (**self).has_edge(source, target)
    }

    fn is_symmetric(&self) -> bool {
        (**self).is_symmetric()
    }
}

impl<C: EdgeCondition + ?Sized> EdgeCondition for Box<C> {
    fn has_edge(&self, source: u64, target: u64) -> Result<bool, ConditionError> {
        (**self).has_edge(source, target)
    }

    fn is_symmetric(&self) -> bool {
        (**self).is_symmetric()
    }
}

/// Logical AND over a growable list of conditions.
///
/// Evaluation short-circuits on the first failing member. An empty
/// conjunction always holds and is symmetric.
///
/// # Examples
/// ```
/// use shoal_core::{
///     Conjunction, EdgeCondition, IdSetIndex, IdenticalSet, IdentifiableIdSet, NonSubset,
/// };
///
/// let index: IdSetIndex = [
///     IdentifiableIdSet::new(1, [1, 2]),
///     IdentifiableIdSet::new(2, [1, 2]),
/// ]
/// .into_iter()
/// .collect();
/// let both = Conjunction::new()
///     .with(IdenticalSet::new(&index))
///     .with(NonSubset::new(&index));
/// assert!(both.is_symmetric());
/// assert!(!both.has_edge(1, 2)?);
/// # Ok::<(), shoal_core::ConditionError>(())
/// ```
#[derive(Default)]
pub struct Conjunction<'a> {
    conditions: Vec<Box<dyn EdgeCondition + 'a>>,
}

impl<'a> Conjunction<'a> {
    /// Creates an empty conjunction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `condition` to the conjunction.
    pub fn push(&mut self, condition: impl EdgeCondition + 'a) {
        self.conditions.push(Box::new(condition));
    }

    /// Appends `condition` and returns the extended conjunction.
    #[must_use]
    pub fn with(mut self, condition: impl EdgeCondition + 'a) -> Self {
        self.push(condition);
        self
    }

    /// Returns the number of member conditions.
    #[rustfmt::skip]
    #[must_use]
    pub fn len(&self) -> usize { self.conditions.len() }

    /// Returns whether the conjunction has no members.
    #[rustfmt::skip]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.conditions.is_empty() }
}

impl std::fmt::Debug for Conjunction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conjunction")
            .field("len", &self.conditions.len())
            .field("is_symmetric", &self.is_symmetric())
            .finish()
    }
}

impl EdgeCondition for Conjunction<'_> {
    fn has_edge(&self, source: u64, target: u64) -> Result<bool, ConditionError> {
        for condition in &self.conditions {
            if !condition.has_edge(source, target)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn is_symmetric(&self) -> bool {
        self.conditions.iter().all(|condition| condition.is_symmetric())
    }
}

/// Forces the builder to probe both directions of every pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Directed<C> {
    inner: C,
}

impl<C: EdgeCondition> Directed<C> {
    /// Wraps `inner`, hiding its symmetry.
    pub const fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Returns the wrapped condition.
    pub const fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwraps the condition.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: EdgeCondition> EdgeCondition for Directed<C> {
    fn has_edge(&self, source: u64, target: u64) -> Result<bool, ConditionError> {
        self.inner.has_edge(source, target)
    }

    fn is_symmetric(&self) -> bool {
        false
    }
}

/// Holds only when the wrapped condition holds in both directions.
///
/// # Examples
/// ```
/// use shoal_core::{Containment, EdgeCondition, IdSetIndex, IdentifiableIdSet, Mutual};
///
/// let index: IdSetIndex = [
///     IdentifiableIdSet::new(1, [2]),
///     IdentifiableIdSet::new(2, [1]),
///     IdentifiableIdSet::new(3, [1]),
/// ]
/// .into_iter()
/// .collect();
/// let mutual = Mutual::new(Containment::new(&index));
/// assert!(mutual.is_symmetric());
/// assert!(mutual.has_edge(1, 2)?);
/// assert!(!mutual.has_edge(3, 1)?);
/// # Ok::<(), shoal_core::ConditionError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mutual<C> {
    inner: C,
}

impl<C: EdgeCondition> Mutual<C> {
    /// Wraps `inner`.
    pub const fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Returns the wrapped condition.
    pub const fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwraps the condition.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: EdgeCondition> EdgeCondition for Mutual<C> {
    fn has_edge(&self, source: u64, target: u64) -> Result<bool, ConditionError> {
        if self.inner.is_symmetric() {
            return self.inner.has_edge(source, target);
        }
        Ok(self.inner.has_edge(source, target)? && self.inner.has_edge(target, source)?)
    }

    fn is_symmetric(&self) -> bool {
        true
    }
}
