//! Helpers shared by the CLI unit tests.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use clap::Parser;
use tempfile::TempDir;

use super::{Cli, CliError, ClusterSummary, Outcome, PruneSummary, run_cli};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn write_input(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

/// Parses `args` after the binary name, with `path` substituted for `{}`.
pub(super) fn parse(path: &Path, args: &[&str]) -> Cli {
    let rendered = path.display().to_string();
    let argv = std::iter::once("shoal").chain(
        args.iter()
            .map(|arg| if *arg == "{}" { rendered.as_str() } else { *arg }),
    );
    match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) => panic!("arguments must parse: {err}"),
    }
}

pub(super) fn expect_prune(cli: Cli) -> PruneSummary {
    match run_cli(cli) {
        Ok(Outcome::Prune(summary)) => summary,
        other => panic!("expected a prune summary, got {other:?}"),
    }
}

pub(super) fn expect_cluster(cli: Cli) -> ClusterSummary {
    match run_cli(cli) {
        Ok(Outcome::Cluster(summary)) => summary,
        other => panic!("expected a cluster summary, got {other:?}"),
    }
}

pub(super) fn expect_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
