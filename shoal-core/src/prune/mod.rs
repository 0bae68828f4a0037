//! Adaptive cut-off selection over ranked candidate lists.
//!
//! Every finder consumes a list of [`ScoredElement`]s sorted by descending
//! score and returns a cut index `k`: the elements in `[0, k)` are kept. The
//! `start` argument resumes a scan part-way down the list, which is how
//! [`signature_blocks`] slices one ranked list into consecutive blocks.
//!
//! Sortedness is a caller precondition. Finders do not re-validate it in
//! release builds; debug builds assert it.

mod otsu;
mod steepest_drop;

use std::{num::NonZeroUsize, ops::Range};

use tracing::{debug, instrument};

use crate::threshold::Threshold;

pub use self::{
    otsu::{MAX_OTSU_SCALE, OtsuThresholdFinder},
    steepest_drop::{SteepestDrop, SteepestDropFinder, ThresholdAwareSteepestDropFinder},
};

/// A candidate identifier paired with its score.
///
/// # Examples
/// ```
/// use shoal_core::ScoredElement;
///
/// let element = ScoredElement::new(7, 0.5);
/// assert_eq!(element.id(), 7);
/// assert_eq!(element.value(), 0.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredElement {
    id: u64,
    value: f64,
}

impl ScoredElement {
    /// Creates a scored element.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64, value: f64) -> Self { Self { id, value } }

    /// Returns the candidate identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn id(&self) -> u64 { self.id }

    /// Returns the candidate score.
    #[rustfmt::skip]
    #[must_use]
    pub const fn value(&self) -> f64 { self.value }
}

/// Sorts `elements` by descending score, breaking ties by ascending id.
///
/// This establishes the precondition every [`CandidateSetFinder`] relies on.
pub fn sort_descending(elements: &mut [ScoredElement]) {
    elements.sort_by(|left, right| {
        right
            .value
            .total_cmp(&left.value)
            .then_with(|| left.id.cmp(&right.id))
    });
}

pub(crate) fn is_sorted_descending(elements: &[ScoredElement]) -> bool {
    elements
        .windows(2)
        .all(|pair| matches!(pair, [left, right] if left.value >= right.value))
}

/// Chooses how much of a ranked candidate list to keep.
pub trait CandidateSetFinder {
    /// Returns the cut index for `elements`, scanning from `start`.
    ///
    /// `elements` must be sorted by descending score. A `start` at or past
    /// the end of the list yields 0.
    fn prune_index(&self, elements: &[ScoredElement], start: usize) -> usize;
}

impl<F: CandidateSetFinder + ?Sized> CandidateSetFinder for &F {
    fn prune_index(&self, elements: &[ScoredElement], start: usize) -> usize {
        (**self).prune_index(elements, start)
    }
}

impl<F: CandidateSetFinder + ?Sized> CandidateSetFinder for Box<F> {
    fn prune_index(&self, elements: &[ScoredElement], start: usize) -> usize {
        (**self).prune_index(elements, start)
    }
}

/// Keeps the leading run of elements that satisfy a fixed [`Threshold`].
///
/// # Examples
/// ```
/// use shoal_core::{CandidateSetFinder, ScoredElement, Threshold, ThresholdFinder};
///
/// let finder = ThresholdFinder::new("GEQ0.5".parse()?);
/// let elements = [
///     ScoredElement::new(1, 0.9),
///     ScoredElement::new(2, 0.5),
///     ScoredElement::new(3, 0.2),
/// ];
/// assert_eq!(finder.prune_index(&elements, 0), 2);
/// # Ok::<(), shoal_core::ThresholdError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdFinder {
    threshold: Threshold,
}

impl ThresholdFinder {
    /// Creates a finder that cuts at the first element failing `threshold`.
    #[must_use]
    pub const fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    /// Returns the configured threshold.
    #[must_use]
    pub const fn threshold(&self) -> Threshold {
        self.threshold
    }
}

impl CandidateSetFinder for ThresholdFinder {
    fn prune_index(&self, elements: &[ScoredElement], start: usize) -> usize {
        debug_assert!(is_sorted_descending(elements), "elements must be sorted");
        if start >= elements.len() {
            return 0;
        }
        elements
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, element)| !self.threshold.is_satisfied(element.value()))
            .map_or(elements.len(), |(index, _)| index)
    }
}

/// Slices a ranked list into consecutive signature blocks.
///
/// The finder is applied repeatedly, each time resuming from the previous
/// cut, until it stops advancing or the list is exhausted. At most
/// `max_blocks` blocks are produced when a limit is given.
///
/// # Examples
/// ```
/// use shoal_core::{ScoredElement, SteepestDropFinder, signature_blocks};
///
/// let finder = SteepestDropFinder::new("GT0".parse()?).with_ignore_last_drop(true);
/// let elements = [
///     ScoredElement::new(1, 0.9),
///     ScoredElement::new(2, 0.8),
///     ScoredElement::new(3, 0.2),
///     ScoredElement::new(4, 0.1),
/// ];
/// let blocks = signature_blocks(&finder, &elements, None);
/// assert_eq!(blocks.first(), Some(&(0..2)));
/// # Ok::<(), shoal_core::ThresholdError>(())
/// ```
#[instrument(
    name = "prune.blocks",
    skip(finder, elements),
    fields(elements = elements.len(), max_blocks = ?max_blocks),
)]
pub fn signature_blocks<F: CandidateSetFinder + ?Sized>(
    finder: &F,
    elements: &[ScoredElement],
    max_blocks: Option<NonZeroUsize>,
) -> Vec<Range<usize>> {
    let limit = max_blocks.map_or(usize::MAX, NonZeroUsize::get);
    let mut blocks = Vec::new();
    let mut start = 0;
    while start < elements.len() && blocks.len() < limit {
        let end = finder.prune_index(elements, start).min(elements.len());
        if end <= start {
            break;
        }
        blocks.push(start..end);
        start = end;
    }
    debug!(blocks = blocks.len(), covered = start, "signature blocks computed");
    blocks
}
