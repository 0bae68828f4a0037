//! Overlap-similarity conditions.
//!
//! [`Overlap`] resolves both nodes and hands their sets to an injected
//! [`OverlapPredicate`]. Ratios are computed as exact decimals before being
//! tested against a [`Threshold`].

use rust_decimal::Decimal;

use crate::{
    idset::{IdSetIndex, IdentifiableIdSet},
    threshold::Threshold,
};

use super::{ConditionError, EdgeCondition};

/// Similarity test over two id sets.
pub trait OverlapPredicate: Send + Sync {
    /// Returns whether `left` and `right` overlap enough.
    fn holds(&self, left: &IdentifiableIdSet, right: &IdentifiableIdSet) -> bool;

    /// Returns whether swapping the arguments never changes the answer.
    fn is_symmetric(&self) -> bool;
}

fn ratio(numerator: usize, denominator: usize) -> Option<Decimal> {
    if denominator == 0 {
        return None;
    }
    Decimal::from(numerator).checked_div(Decimal::from(denominator))
}

/// Jaccard similarity `|A ∩ B| / |A ∪ B|` tested against a threshold.
///
/// Two empty sets never overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JaccardOverlap {
    threshold: Threshold,
}

impl JaccardOverlap {
    /// Creates the predicate.
    #[must_use]
    pub const fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    /// Returns the exact Jaccard similarity, or `None` for two empty sets.
    #[must_use]
    pub fn similarity(left: &IdentifiableIdSet, right: &IdentifiableIdSet) -> Option<Decimal> {
        let shared = left.overlap(right);
        ratio(shared, left.len() + right.len() - shared)
    }
}

impl OverlapPredicate for JaccardOverlap {
    fn holds(&self, left: &IdentifiableIdSet, right: &IdentifiableIdSet) -> bool {
        Self::similarity(left, right).is_some_and(|value| self.threshold.is_satisfied_decimal(value))
    }

    fn is_symmetric(&self) -> bool {
        true
    }
}

/// Fraction of the left set covered by the right set, `|A ∩ B| / |A|`.
///
/// An empty left set is never contained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainmentOverlap {
    threshold: Threshold,
}

impl ContainmentOverlap {
    /// Creates the predicate.
    #[must_use]
    pub const fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    /// Returns the exact containment of `left` in `right`, or `None` when
    /// `left` is empty.
    #[must_use]
    pub fn containment(left: &IdentifiableIdSet, right: &IdentifiableIdSet) -> Option<Decimal> {
        ratio(left.overlap(right), left.len())
    }
}

impl OverlapPredicate for ContainmentOverlap {
    fn holds(&self, left: &IdentifiableIdSet, right: &IdentifiableIdSet) -> bool {
        Self::containment(left, right).is_some_and(|value| self.threshold.is_satisfied_decimal(value))
    }

    fn is_symmetric(&self) -> bool {
        false
    }
}

/// Delegates the edge decision to an [`OverlapPredicate`].
///
/// # Examples
/// ```
/// use shoal_core::{
///     EdgeCondition, IdSetIndex, IdentifiableIdSet, JaccardOverlap, Overlap,
/// };
///
/// let index: IdSetIndex = [
///     IdentifiableIdSet::new(1, [1, 2, 3]),
///     IdentifiableIdSet::new(2, [2, 3, 4]),
/// ]
/// .into_iter()
/// .collect();
/// let condition = Overlap::new(&index, JaccardOverlap::new("GEQ0.5".parse()?));
/// assert!(condition.is_symmetric());
/// assert!(condition.has_edge(1, 2)?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Overlap<'a, P> {
    index: &'a IdSetIndex,
    predicate: P,
}

impl<'a, P: OverlapPredicate> Overlap<'a, P> {
    /// Creates the condition over `index`.
    pub const fn new(index: &'a IdSetIndex, predicate: P) -> Self {
        Self { index, predicate }
    }

    /// Returns the injected predicate.
    pub const fn predicate(&self) -> &P {
        &self.predicate
    }
}

impl<P: OverlapPredicate> EdgeCondition for Overlap<'_, P> {
    fn has_edge(&self, source: u64, target: u64) -> Result<bool, ConditionError> {
        let left = self.index.require(source)?;
        let right = self.index.require(target)?;
        Ok(self.predicate.holds(left, right))
    }

    fn is_symmetric(&self) -> bool {
        self.predicate.is_symmetric()
    }
}
