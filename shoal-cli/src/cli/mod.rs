//! Command-line interface for shoal.
//!
//! `prune` cuts a ranked score list with one of the adaptive finders and
//! `cluster` partitions a collection of id sets under an edge condition.

mod commands;
mod input;

pub use commands::{
    Cli, CliError, ClusterCommand, ClusterSummary, Command, ConditionKind, FinderKind, Outcome,
    PruneCommand, PruneSummary, render_outcome, run_cli,
};
pub use input::{InputError, ScoredInput, read_id_sets, read_scored_elements};

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;
