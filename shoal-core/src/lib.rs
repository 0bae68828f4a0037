//! Shoal core library.
//!
//! Adaptive cut-off selection over ranked candidate lists and parallel
//! all-pairs graph clustering over pluggable edge conditions.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod clustering;
pub mod components;
pub mod condition;
mod error;
pub mod graph;
mod idset;
pub mod prune;
mod threshold;

#[cfg(test)]
mod test_utils;

pub use rust_decimal::Decimal;

pub use crate::{
    builder::{ClusteringBuilder, ComponentMode},
    clustering::Clustering,
    components::{
        ComponentPartition, ComponentSink, StronglyConnectedComponents, UndirectedComponents,
    },
    condition::{
        ConditionError, ConditionErrorCode, Conjunction, Containment, ContainmentOverlap,
        Directed, EdgeCondition, IdenticalSet, JaccardOverlap, Mutual, NonSubset, Overlap,
        OverlapPredicate,
    },
    error::{GraphError, GraphErrorCode, Result, ShoalError, ShoalErrorCode},
    graph::{EdgeSink, GraphBuildStats, build_graph},
    idset::{IdSetIndex, Identifiable, IdentifiableIdSet},
    prune::{
        CandidateSetFinder, MAX_OTSU_SCALE, OtsuThresholdFinder, ScoredElement, SteepestDrop,
        SteepestDropFinder, ThresholdAwareSteepestDropFinder, ThresholdFinder, signature_blocks,
        sort_descending,
    },
    threshold::{Threshold, ThresholdError, ThresholdErrorCode},
};
