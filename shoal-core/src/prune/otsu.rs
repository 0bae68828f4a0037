//! Histogram-based cut-off selection using Otsu's method.
//!
//! Scores in `[0, 1]` are bucketed by truncating them to `scale` fractional
//! digits, giving `10^scale + 1` buckets. Each element contributes the weight
//! reported by the size function. The bucket maximising the between-class
//! variance becomes the threshold; its left edge is the smallest score kept.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::threshold::Threshold;

use super::{CandidateSetFinder, ScoredElement, is_sorted_descending};

/// Largest supported bucket scale (fractional digits).
pub const MAX_OTSU_SCALE: u32 = 6;

/// Chooses a cut by splitting the weighted score histogram in two.
///
/// # Examples
/// ```
/// use shoal_core::{CandidateSetFinder, OtsuThresholdFinder, ScoredElement};
///
/// let finder = OtsuThresholdFinder::new(|_id| 1, 1);
/// let elements = [
///     ScoredElement::new(1, 0.9),
///     ScoredElement::new(2, 0.85),
///     ScoredElement::new(3, 0.2),
///     ScoredElement::new(4, 0.1),
/// ];
/// assert_eq!(finder.prune_index(&elements, 0), 3);
/// ```
#[derive(Clone, Debug)]
pub struct OtsuThresholdFinder<F> {
    size_function: F,
    scale: u32,
}

impl<F> OtsuThresholdFinder<F>
where
    F: Fn(u64) -> u64,
{
    /// Creates a finder weighting each id by `size_function`.
    ///
    /// `scale` is clamped to [`MAX_OTSU_SCALE`].
    pub fn new(size_function: F, scale: u32) -> Self {
        Self {
            size_function,
            scale: scale.min(MAX_OTSU_SCALE),
        }
    }

    /// Returns the number of fractional digits used for bucketing.
    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.scale
    }

    /// Computes the Otsu threshold over `elements`.
    ///
    /// Returns `None` when the elements carry no weight.
    #[must_use]
    pub fn threshold(&self, elements: &[ScoredElement]) -> Option<Decimal> {
        let histogram = self.histogram(elements);
        best_bucket(&histogram).map(|bucket| Decimal::new(bucket, self.scale))
    }

    fn bucket_count(&self) -> usize {
        10_usize.pow(self.scale) + 1
    }

    fn bucket_of(&self, value: f64) -> Option<usize> {
        let clamped = Decimal::from_f64(value)?.clamp(Decimal::ZERO, Decimal::ONE);
        let truncated = clamped.round_dp_with_strategy(self.scale, RoundingStrategy::ToZero);
        let factor = Decimal::from_u64(10_u64.pow(self.scale))?;
        (truncated * factor).to_usize()
    }

    fn histogram(&self, elements: &[ScoredElement]) -> Vec<u64> {
        let mut histogram = vec![0_u64; self.bucket_count()];
        for element in elements {
            let Some(slot) = self
                .bucket_of(element.value())
                .and_then(|bucket| histogram.get_mut(bucket))
            else {
                continue;
            };
            *slot = slot.saturating_add((self.size_function)(element.id()));
        }
        histogram
    }
}

/// Maximises the between-class variance over cumulative bucket weights.
///
/// Returns the index of the last bucket of the lower class.
fn best_bucket(histogram: &[u64]) -> Option<i64> {
    let total: f64 = histogram.iter().map(|&weight| weight as f64).sum();
    if total <= 0.0 {
        return None;
    }
    let sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(bucket, &weight)| bucket as f64 * weight as f64)
        .sum();

    let mut sum_b = 0.0_f64;
    let mut w_b = 0.0_f64;
    let mut var_max = 0.0_f64;
    let mut threshold = 0_usize;
    for (bucket, &weight) in histogram.iter().enumerate() {
        w_b += weight as f64;
        if w_b == 0.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f == 0.0 {
            break;
        }
        sum_b += bucket as f64 * weight as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum - sum_b) / w_f;
        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > var_max {
            var_max = var_between;
            threshold = bucket;
        }
    }
    i64::try_from(threshold).ok()
}

impl<F> CandidateSetFinder for OtsuThresholdFinder<F>
where
    F: Fn(u64) -> u64,
{
    fn prune_index(&self, elements: &[ScoredElement], start: usize) -> usize {
        debug_assert!(is_sorted_descending(elements), "elements must be sorted");
        let Some(tail) = elements.get(start..).filter(|tail| !tail.is_empty()) else {
            return 0;
        };
        let Some(bound) = self.threshold(tail) else {
            return start;
        };
        let keep = Threshold::greater_or_equal(bound);
        start
            + tail
                .iter()
                .take_while(|element| keep.is_satisfied(element.value()))
                .count()
    }
}
