//! Steepest-drop cut-off heuristics.
//!
//! Both finders look for the largest decrease between adjacent scores and
//! cut right after it. They differ in how they seed the search and in how
//! they treat the absolute threshold:
//!
//! - [`SteepestDropFinder`] seeds the maximum drop with zero, compares the
//!   implicit drop after the last element afterwards, and uses a strict
//!   comparison for the full-signature shortcut.
//! - [`ThresholdAwareSteepestDropFinder`] seeds the maximum drop with the
//!   last score (unless the last drop is ignored), uses a non-strict
//!   comparison for the full-signature shortcut, and never cuts away an
//!   element that independently clears the threshold.
//!
//! The two heuristics are tuned separately and their asymmetries are kept
//! as-is.

use crate::threshold::Threshold;

use super::{CandidateSetFinder, ScoredElement, is_sorted_descending};

/// Location and size of the steepest score decrease in a ranked list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteepestDrop {
    index: usize,
    magnitude: f64,
    is_full_signature: bool,
}

impl SteepestDrop {
    /// Returns the cut index: elements before it are kept.
    #[rustfmt::skip]
    #[must_use]
    pub const fn index(&self) -> usize { self.index }

    /// Returns the size of the decrease at the cut.
    #[rustfmt::skip]
    #[must_use]
    pub const fn magnitude(&self) -> f64 { self.magnitude }

    /// Returns whether the full-signature shortcut retained the whole tail.
    #[rustfmt::skip]
    #[must_use]
    pub const fn is_full_signature(&self) -> bool { self.is_full_signature }
}

/// Shared configuration of both steepest-drop variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DropConfig {
    non_empty_threshold: Threshold,
    full_signature_constraint: bool,
    ignore_last_drop: bool,
}

/// Outcome of the checks every steepest-drop scan starts with.
enum Preflight {
    Empty,
    Done(SteepestDrop),
    Scan { first: f64, last: f64 },
}

impl DropConfig {
    fn preflight(&self, elements: &[ScoredElement], start: usize) -> Preflight {
        debug_assert!(is_sorted_descending(elements), "elements must be sorted");
        let len = elements.len();
        if start >= len {
            return Preflight::Empty;
        }
        let (Some(top), Some(first), Some(last)) =
            (elements.first(), elements.get(start), elements.last())
        else {
            return Preflight::Empty;
        };
        if !self.non_empty_threshold.is_satisfied(top.value()) {
            return Preflight::Empty;
        }
        if start == len - 1 {
            return Preflight::Done(SteepestDrop {
                index: start + 1,
                magnitude: first.value(),
                is_full_signature: false,
            });
        }
        Preflight::Scan {
            first: first.value(),
            last: last.value(),
        }
    }
}

/// Scans adjacent pairs from `start`, returning the steepest drop found.
///
/// Only drops strictly larger than `seed` are taken, so ties keep the
/// earliest position and the seed itself stands for the drop after the last
/// element (index `len`).
fn scan_drops(elements: &[ScoredElement], start: usize, seed: f64) -> (usize, f64) {
    let mut index = elements.len();
    let mut max_diff = seed;
    for (offset, pair) in elements.get(start..).unwrap_or_default().windows(2).enumerate() {
        if let [upper, lower] = pair {
            let diff = upper.value() - lower.value();
            if diff > max_diff {
                max_diff = diff;
                index = start + offset + 1;
            }
        }
    }
    (index, max_diff)
}

const fn full_signature(len: usize, magnitude: f64) -> SteepestDrop {
    SteepestDrop {
        index: len,
        magnitude,
        is_full_signature: true,
    }
}

/// Cuts a ranked list right after its steepest drop.
///
/// # Examples
/// ```
/// use shoal_core::{CandidateSetFinder, ScoredElement, SteepestDropFinder};
///
/// let elements: Vec<_> = [0.8, 0.7, 0.5, 0.45]
///     .into_iter()
///     .enumerate()
///     .map(|(id, value)| ScoredElement::new(id as u64, value))
///     .collect();
/// let finder = SteepestDropFinder::new("GT0".parse()?).with_ignore_last_drop(true);
/// assert_eq!(finder.prune_index(&elements, 0), 2);
/// let finder = finder.with_full_signature_constraint(true);
/// assert_eq!(finder.prune_index(&elements, 0), 4);
/// # Ok::<(), shoal_core::ThresholdError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SteepestDropFinder {
    config: DropConfig,
}

impl SteepestDropFinder {
    /// Creates a finder that treats the list as empty when its top score
    /// fails `non_empty_threshold`.
    ///
    /// The full-signature shortcut and the last-drop exclusion start
    /// disabled.
    #[must_use]
    pub const fn new(non_empty_threshold: Threshold) -> Self {
        Self {
            config: DropConfig {
                non_empty_threshold,
                full_signature_constraint: false,
                ignore_last_drop: false,
            },
        }
    }

    /// Keeps the whole tail when its spread is smaller than its last score.
    #[must_use]
    pub const fn with_full_signature_constraint(mut self, enabled: bool) -> Self {
        self.config.full_signature_constraint = enabled;
        self
    }

    /// Stops the implicit drop after the last element from winning.
    #[must_use]
    pub const fn with_ignore_last_drop(mut self, enabled: bool) -> Self {
        self.config.ignore_last_drop = enabled;
        self
    }

    /// Returns the threshold the top score must clear.
    #[must_use]
    pub const fn non_empty_threshold(&self) -> Threshold {
        self.config.non_empty_threshold
    }

    /// Describes the drop this finder cuts at, or `None` when nothing is kept.
    #[must_use]
    pub fn steepest_drop(&self, elements: &[ScoredElement], start: usize) -> Option<SteepestDrop> {
        let (first, last) = match self.config.preflight(elements, start) {
            Preflight::Empty => return None,
            Preflight::Done(found) => return Some(found),
            Preflight::Scan { first, last } => (first, last),
        };
        let len = elements.len();
        if self.config.full_signature_constraint && (first - last) < last {
            return Some(full_signature(len, last));
        }
        let (mut index, mut magnitude) = scan_drops(elements, start, 0.0);
        if !self.config.ignore_last_drop && last > magnitude {
            index = len;
            magnitude = last;
        }
        Some(SteepestDrop {
            index,
            magnitude,
            is_full_signature: false,
        })
    }
}

impl CandidateSetFinder for SteepestDropFinder {
    fn prune_index(&self, elements: &[ScoredElement], start: usize) -> usize {
        self.steepest_drop(elements, start)
            .map_or(0, |found| found.index())
    }
}

/// Steepest-drop variant that never cuts away an element clearing the
/// threshold on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdAwareSteepestDropFinder {
    config: DropConfig,
}

impl ThresholdAwareSteepestDropFinder {
    /// Creates a finder anchored on `threshold`.
    #[must_use]
    pub const fn new(threshold: Threshold) -> Self {
        Self {
            config: DropConfig {
                non_empty_threshold: threshold,
                full_signature_constraint: false,
                ignore_last_drop: false,
            },
        }
    }

    /// Keeps the whole tail when its spread is at most its last score.
    #[must_use]
    pub const fn with_full_signature_constraint(mut self, enabled: bool) -> Self {
        self.config.full_signature_constraint = enabled;
        self
    }

    /// Seeds the search with zero instead of the last score.
    #[must_use]
    pub const fn with_ignore_last_drop(mut self, enabled: bool) -> Self {
        self.config.ignore_last_drop = enabled;
        self
    }

    /// Returns the anchoring threshold.
    #[must_use]
    pub const fn threshold(&self) -> Threshold {
        self.config.non_empty_threshold
    }

    /// Describes the drop this finder cuts at, or `None` when nothing is kept.
    ///
    /// The reported index already accounts for elements kept because they
    /// clear the threshold.
    #[must_use]
    pub fn steepest_drop(&self, elements: &[ScoredElement], start: usize) -> Option<SteepestDrop> {
        let (first, last) = match self.config.preflight(elements, start) {
            Preflight::Empty => return None,
            Preflight::Done(found) => return Some(found),
            Preflight::Scan { first, last } => (first, last),
        };
        let len = elements.len();
        if self.config.full_signature_constraint && (first - last) <= last {
            return Some(full_signature(len, last));
        }
        let seed = if self.config.ignore_last_drop { 0.0 } else { last };
        let (index, magnitude) = scan_drops(elements, start, seed);
        let above = elements
            .iter()
            .enumerate()
            .skip(start)
            .filter(|(_, element)| self.config.non_empty_threshold.is_satisfied(element.value()))
            .map(|(position, _)| position + 1)
            .last()
            .unwrap_or(start);
        Some(SteepestDrop {
            index: index.max(above),
            magnitude,
            is_full_signature: false,
        })
    }
}

impl CandidateSetFinder for ThresholdAwareSteepestDropFinder {
    fn prune_index(&self, elements: &[ScoredElement], start: usize) -> usize {
        self.steepest_drop(elements, start)
            .map_or(0, |found| found.index())
    }
}
