//! Threshold constraints over similarity scores.
//!
//! A [`Threshold`] decides whether a score is "good enough" to keep. Bounds
//! are held as exact decimals so that thresholds written with many fractional
//! digits compare without binary rounding artefacts. Thresholds have a
//! canonical textual form (`GT0.5`, `GEQ0.25`) used on command lines and in
//! configuration files.

use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, prelude::FromPrimitive};
use thiserror::Error;

use crate::error::define_error_codes;

/// Prefix of the canonical `>=` form.
const GREATER_OR_EQUAL_PREFIX: &str = "GEQ";
/// Prefix of the canonical `>` form.
const GREATER_THAN_PREFIX: &str = "GT";

/// Errors raised while constructing or transforming a [`Threshold`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum ThresholdError {
    /// The textual form did not contain a valid decimal bound.
    #[error("invalid constraint `{raw}`: expected an optional GT/GEQ prefix and a decimal")]
    InvalidConstraint {
        /// Raw text supplied by the caller.
        raw: String,
    },
    /// The operation is not defined for this kind of constraint.
    #[error("operation `{operation}` is not supported by the {constraint} constraint")]
    UnsupportedOperation {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Constraint kind that rejected it.
        constraint: &'static str,
    },
}

define_error_codes! {
    /// Machine-readable error codes for [`ThresholdError`].
    enum ThresholdErrorCode for ThresholdError {
        /// The textual form did not contain a valid decimal bound.
        InvalidConstraint => InvalidConstraint { .. } => "THRESHOLD_INVALID_CONSTRAINT",
        /// The operation is not defined for this kind of constraint.
        UnsupportedOperation => UnsupportedOperation { .. } => "THRESHOLD_UNSUPPORTED_OPERATION",
    }
}

/// A boolean predicate over a score.
///
/// # Examples
/// ```
/// use shoal_core::Threshold;
///
/// let threshold: Threshold = "GEQ0.5".parse()?;
/// assert!(threshold.is_satisfied(0.5));
/// assert!(!threshold.is_satisfied(0.49));
/// assert_eq!(threshold.to_canonical_string(), "GEQ0.5");
/// # Ok::<(), shoal_core::ThresholdError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Threshold {
    /// Satisfied by scores strictly greater than the bound.
    GreaterThan(Decimal),
    /// Satisfied by scores greater than or equal to the bound.
    GreaterOrEqual(Decimal),
    /// Satisfied only by a score of exactly one.
    EqualsOne,
}

impl Threshold {
    /// Creates a `> bound` threshold.
    ///
    /// A bound of exactly one collapses into [`Threshold::EqualsOne`]:
    /// similarity scores never exceed one, and the only meaningful reading of
    /// "greater than one" for a ranked similarity list is a perfect match.
    ///
    /// # Examples
    /// ```
    /// use rust_decimal::Decimal;
    /// use shoal_core::Threshold;
    ///
    /// assert_eq!(Threshold::greater_than(Decimal::ONE), Threshold::EqualsOne);
    /// assert!(Threshold::greater_than(Decimal::new(5, 1)).is_satisfied(0.6));
    /// ```
    #[must_use]
    pub fn greater_than(bound: Decimal) -> Self {
        if bound == Decimal::ONE {
            Self::EqualsOne
        } else {
            Self::GreaterThan(bound)
        }
    }

    /// Creates a `>= bound` threshold.
    #[must_use]
    pub const fn greater_or_equal(bound: Decimal) -> Self {
        Self::GreaterOrEqual(bound)
    }

    /// Parses the canonical textual form.
    ///
    /// Accepts `GEQ<decimal>`, `GT<decimal>`, or a bare decimal which is read
    /// as a `GT` bound.
    ///
    /// # Errors
    /// Returns [`ThresholdError::InvalidConstraint`] when the decimal part is
    /// missing or malformed.
    pub fn parse(raw: &str) -> Result<Self, ThresholdError> {
        let trimmed = raw.trim();
        let invalid = || ThresholdError::InvalidConstraint {
            raw: raw.to_owned(),
        };
        if let Some(rest) = trimmed.strip_prefix(GREATER_OR_EQUAL_PREFIX) {
            let bound = Decimal::from_str(rest.trim()).map_err(|_| invalid())?;
            return Ok(Self::greater_or_equal(bound));
        }
        let rest = trimmed
            .strip_prefix(GREATER_THAN_PREFIX)
            .unwrap_or(trimmed);
        let bound = Decimal::from_str(rest.trim()).map_err(|_| invalid())?;
        Ok(Self::greater_than(bound))
    }

    /// Returns whether `value` satisfies the constraint.
    ///
    /// Non-finite values and values outside the decimal range never satisfy
    /// a threshold.
    #[must_use]
    pub fn is_satisfied(&self, value: f64) -> bool {
        Decimal::from_f64(value).is_some_and(|decimal| self.is_satisfied_decimal(decimal))
    }

    /// Returns whether the exact decimal `value` satisfies the constraint.
    #[must_use]
    pub fn is_satisfied_decimal(&self, value: Decimal) -> bool {
        match self {
            Self::GreaterThan(bound) => value > *bound,
            Self::GreaterOrEqual(bound) => value >= *bound,
            Self::EqualsOne => value == Decimal::ONE,
        }
    }

    /// Returns a threshold whose bound is lowered by `delta`.
    ///
    /// # Errors
    /// Returns [`ThresholdError::UnsupportedOperation`] for
    /// [`Threshold::EqualsOne`], which has no bound to shift.
    ///
    /// # Examples
    /// ```
    /// use rust_decimal::Decimal;
    /// use shoal_core::Threshold;
    ///
    /// let lowered = Threshold::greater_or_equal(Decimal::new(8, 1))
    ///     .decrease_by(Decimal::new(1, 1))?;
    /// assert_eq!(lowered, Threshold::greater_or_equal(Decimal::new(7, 1)));
    /// assert!(Threshold::EqualsOne.decrease_by(Decimal::new(1, 1)).is_err());
    /// # Ok::<(), shoal_core::ThresholdError>(())
    /// ```
    pub fn decrease_by(&self, delta: Decimal) -> Result<Self, ThresholdError> {
        match self {
            Self::GreaterThan(bound) => Ok(Self::GreaterThan(*bound - delta)),
            Self::GreaterOrEqual(bound) => Ok(Self::GreaterOrEqual(*bound - delta)),
            Self::EqualsOne => Err(ThresholdError::UnsupportedOperation {
                operation: "decrease_by",
                constraint: "EqualsOne",
            }),
        }
    }

    /// Renders the canonical textual form accepted by [`Threshold::parse`].
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GreaterThan(bound) => write!(f, "{GREATER_THAN_PREFIX}{}", bound.normalize()),
            Self::GreaterOrEqual(bound) => {
                write!(f, "{GREATER_OR_EQUAL_PREFIX}{}", bound.normalize())
            }
            Self::EqualsOne => write!(f, "{GREATER_THAN_PREFIX}1"),
        }
    }
}

impl FromStr for Threshold {
    type Err = ThresholdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}
