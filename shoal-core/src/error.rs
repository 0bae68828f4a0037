//! Error types for the shoal core library.
//!
//! Defines the error enums raised while building graphs and extracting
//! components, together with stable machine-readable codes and a convenient
//! result alias.

use thiserror::Error;

use crate::condition::ConditionError;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl ::core::fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

pub(crate) use define_error_codes;

/// An error raised while materialising a graph or extracting its components.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    /// A sink received an edge endpoint outside its node universe.
    #[error("node {id} is not part of the graph")]
    UnknownNode {
        /// Identifier that could not be resolved.
        id: u64,
    },
    /// The edge condition failed while evaluating a node pair.
    #[error("edge condition failed for ({source_id}, {target_id}): {error}")]
    Condition {
        /// Source node of the failing probe.
        source_id: u64,
        /// Target node of the failing probe.
        target_id: u64,
        #[source]
        /// Underlying condition failure.
        error: ConditionError,
    },
    /// The worker pool could not be created.
    #[error("failed to build a worker pool with {threads} threads: {message}")]
    ThreadPool {
        /// Number of worker threads requested.
        threads: usize,
        /// Message reported by the pool builder.
        message: String,
    },
    /// A synchronisation primitive became poisoned after a panic.
    #[error("lock for {resource} is poisoned")]
    LockPoisoned {
        /// Name of the locked resource that was poisoned.
        resource: &'static str,
    },
    /// An internal invariant was violated, indicating a logic error.
    #[error("graph invariant violated: {invariant} (index {index}, lock_count {lock_count})")]
    InvariantViolation {
        /// Name of the violated invariant.
        invariant: &'static str,
        /// Index that violated the invariant.
        index: usize,
        /// Number of locks available.
        lock_count: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// A sink received an edge endpoint outside its node universe.
        UnknownNode => UnknownNode { .. } => "GRAPH_UNKNOWN_NODE",
        /// The edge condition failed while evaluating a node pair.
        Condition => Condition { .. } => "GRAPH_CONDITION_FAILURE",
        /// The worker pool could not be created.
        ThreadPool => ThreadPool { .. } => "GRAPH_THREAD_POOL",
        /// A synchronisation primitive became poisoned after a panic.
        LockPoisoned => LockPoisoned { .. } => "GRAPH_LOCK_POISONED",
        /// An internal invariant was violated.
        InvariantViolation => InvariantViolation { .. } => "GRAPH_INVARIANT_VIOLATION",
    }
}

/// Error type produced when configuring or running [`crate::Clustering`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ShoalError {
    /// The worker thread count must be greater than zero.
    #[error("threads must be at least 1 (got {got})")]
    InvalidThreadCount {
        /// The invalid thread count supplied by the caller.
        got: usize,
    },
    /// Graph construction or component extraction failed.
    #[error("clustering run failed: {error}")]
    Graph {
        #[source]
        /// Underlying graph failure.
        error: GraphError,
    },
}

define_error_codes! {
    /// Stable codes describing [`ShoalError`] variants.
    enum ShoalErrorCode for ShoalError {
        /// The worker thread count must be greater than zero.
        InvalidThreadCount => InvalidThreadCount { .. } => "SHOAL_INVALID_THREAD_COUNT",
        /// Graph construction or component extraction failed.
        GraphFailure => Graph { .. } => "SHOAL_GRAPH_FAILURE",
    }
}

impl ShoalError {
    /// Retrieve the inner [`GraphErrorCode`] when the error originated in the
    /// graph stage.
    pub const fn graph_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::Graph { error } => Some(error.code()),
            Self::InvalidThreadCount { .. } => None,
        }
    }
}

impl From<GraphError> for ShoalError {
    fn from(error: GraphError) -> Self {
        Self::Graph { error }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, ShoalError>;
