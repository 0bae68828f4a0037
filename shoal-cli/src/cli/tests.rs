//! Unit tests for the CLI commands.

use super::test_helpers::{
    expect_cluster, expect_error, expect_prune, parse, temp_dir, write_input,
};
use super::{
    Cli, CliError, ClusterSummary, ConditionKind, FinderKind, InputError, Outcome, PruneSummary,
    render_outcome,
};

use std::path::Path;

use clap::{CommandFactory, Parser};
use rstest::{fixture, rstest};
use shoal_core::{ComponentMode, ComponentPartition, ScoredElement, ShoalError};
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

use shoal_test_support::tracing::RecordingLayer;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const FAMILIES: &str = "\
# id members
1 1 2 3
2 1 2 3
3 1 2
4 7 8
5 7 8 9
6 1
";

#[fixture]
fn dir() -> TempDir {
    temp_dir()
}

fn kept_ids(summary: &PruneSummary) -> Vec<u64> {
    summary
        .elements
        .iter()
        .take(summary.cut)
        .map(ScoredElement::id)
        .collect()
}

#[rstest]
#[case::steepest(&["prune", "{}", "--ignore-last-drop"], 2)]
#[case::full_signature(&["prune", "{}", "--ignore-last-drop", "--full-signature"], 4)]
#[case::threshold(&["prune", "{}", "--finder", "threshold", "--threshold", "GEQ0.5"], 3)]
#[case::threshold_above(&["prune", "{}", "--finder", "threshold", "--threshold", "GT0.5"], 2)]
#[case::strict_threshold(&["prune", "{}", "--finder", "threshold", "--threshold", "GT0.7"], 1)]
fn prune_sorts_before_cutting(
    dir: TempDir,
    #[case] args: &[&str],
    #[case] expected: usize,
) -> TestResult {
    let path = write_input(&dir, "ranked.txt", "3 0.5\n1 0.8\n4 0.45\n2 0.7\n")?;
    let summary = expect_prune(parse(&path, args));
    let sorted: Vec<u64> = summary.elements.iter().map(ScoredElement::id).collect();
    assert_eq!(sorted, vec![1, 2, 3, 4]);
    assert_eq!(summary.cut, expected);
    assert_eq!(summary.blocks, None);
    Ok(())
}

#[rstest]
#[case::plain(FinderKind::Steepest, 1)]
#[case::threshold_aware(FinderKind::ThresholdAware, 4)]
fn threshold_aware_finder_keeps_satisfying_scores(
    dir: TempDir,
    #[case] finder: FinderKind,
    #[case] expected: usize,
) -> TestResult {
    let path = write_input(&dir, "ranked.txt", "1 0.95\n2 0.6\n3 0.55\n4 0.5\n5 0.3\n")?;
    let name = match finder {
        FinderKind::ThresholdAware => "threshold-aware",
        _ => "steepest",
    };
    let cli = parse(
        &path,
        &["prune", "{}", "--finder", name, "--threshold", "GEQ0.5", "--ignore-last-drop"],
    );
    let summary = expect_prune(cli);
    assert_eq!(summary.finder, finder);
    assert_eq!(summary.cut, expected);
    Ok(())
}

#[rstest]
#[case::unweighted("1 0.9\n2 0.85\n3 0.2\n4 0.1\n", vec![1, 2, 3])]
#[case::weightless_row("1 0.9\n2 0.85\n3 0.2 0\n4 0.1\n", vec![1, 2, 3, 4])]
fn otsu_finder_reads_weights(
    dir: TempDir,
    #[case] contents: &str,
    #[case] expected: Vec<u64>,
) -> TestResult {
    let path = write_input(&dir, "weighted.txt", contents)?;
    let summary = expect_prune(parse(
        &path,
        &["prune", "{}", "--finder", "otsu", "--scale", "1"],
    ));
    assert_eq!(kept_ids(&summary), expected);
    Ok(())
}

#[rstest]
#[case::all(&["prune", "{}", "--ignore-last-drop", "--blocks"], vec![0..2, 2..3, 3..4, 4..5])]
#[case::limited(
    &["prune", "{}", "--ignore-last-drop", "--blocks", "--max-blocks", "2"],
    vec![0..2, 2..3],
)]
fn prune_can_emit_signature_blocks(
    dir: TempDir,
    #[case] args: &[&str],
    #[case] expected: Vec<std::ops::Range<usize>>,
) -> TestResult {
    let path = write_input(&dir, "ranked.txt", "1 0.9\n2 0.8\n3 0.4\n4 0.35\n5 0.3\n")?;
    let summary = expect_prune(parse(&path, args));
    assert_eq!(summary.cut, 2);
    assert_eq!(summary.blocks, Some(expected));
    Ok(())
}

#[rstest]
#[case::identical(
    &["cluster", "{}", "--condition", "identical"],
    vec![vec![1, 2], vec![3], vec![4], vec![5], vec![6]],
)]
#[case::jaccard(
    &["cluster", "{}", "--condition", "jaccard", "--threshold", "GT0.5"],
    vec![vec![1, 2, 3], vec![4, 5], vec![6]],
)]
#[case::non_subset(
    &["cluster", "{}", "--condition", "non-subset"],
    vec![vec![1, 2, 3, 4, 5, 6]],
)]
#[case::containment(
    &["cluster", "{}", "--condition", "containment"],
    vec![vec![1, 2, 3, 6], vec![4], vec![5]],
)]
#[case::mutual_containment(
    &["cluster", "{}", "--condition", "containment", "--mutual"],
    vec![vec![1, 2, 3], vec![4], vec![5], vec![6]],
)]
#[case::directed_containment(
    &["cluster", "{}", "--condition", "containment", "--directed", "--threads", "2"],
    vec![vec![1, 2, 3], vec![4], vec![5], vec![6]],
)]
#[case::containment_ratio(
    &["cluster", "{}", "--condition", "containment-ratio", "--threshold", "GEQ1"],
    vec![vec![1, 2, 3, 6], vec![4, 5]],
)]
#[case::directed_containment_ratio(
    &["cluster", "{}", "--condition", "containment-ratio", "--threshold", "GEQ1", "--directed"],
    vec![vec![1, 2], vec![3], vec![4], vec![5], vec![6]],
)]
fn cluster_partitions_the_families(
    dir: TempDir,
    #[case] args: &[&str],
    #[case] expected: Vec<Vec<u64>>,
) -> TestResult {
    let path = write_input(&dir, "sets.txt", FAMILIES)?;
    let directed = args.contains(&"--directed");
    let summary = expect_cluster(parse(&path, args));
    let mode = if directed {
        ComponentMode::StronglyConnected
    } else {
        ComponentMode::Undirected
    };
    assert_eq!(summary.mode, mode);
    assert_eq!(summary.partition.into_groups(), expected);
    Ok(())
}

#[rstest]
#[case::jaccard("jaccard")]
#[case::containment_ratio("containment-ratio")]
fn overlap_conditions_require_a_threshold(dir: TempDir, #[case] condition: &str) -> TestResult {
    let path = write_input(&dir, "sets.txt", FAMILIES)?;
    let err = expect_error(
        parse(&path, &["cluster", "{}", "--condition", condition]),
        "missing threshold must fail",
    );
    assert!(matches!(err, CliError::MissingThreshold { condition: name } if name == condition));
    assert_eq!(
        err.to_string(),
        format!("condition `{condition}` requires --threshold")
    );
    Ok(())
}

#[rstest]
fn zero_threads_are_rejected(dir: TempDir) -> TestResult {
    let path = write_input(&dir, "sets.txt", FAMILIES)?;
    let err = expect_error(
        parse(
            &path,
            &["cluster", "{}", "--condition", "identical", "--threads", "0"],
        ),
        "zero threads must fail",
    );
    assert!(matches!(
        err,
        CliError::Core(ShoalError::InvalidThreadCount { got: 0 })
    ));
    Ok(())
}

#[rstest]
fn missing_files_report_their_path(dir: TempDir) {
    let path = dir.path().join("absent.txt");
    let err = expect_error(parse(&path, &["prune", "{}"]), "missing file must fail");
    assert!(matches!(&err, CliError::Io { path: reported, .. } if reported == &path));
}

#[rstest]
fn malformed_files_report_the_line(dir: TempDir) -> TestResult {
    let path = write_input(&dir, "sets.txt", "1 2 3\n2 3\n1 4\n")?;
    let err = expect_error(
        parse(&path, &["cluster", "{}", "--condition", "identical"]),
        "duplicate id must fail",
    );
    assert!(matches!(
        err,
        CliError::Input {
            source: InputError::DuplicateId { line: 3, id: 1 },
            ..
        }
    ));
    Ok(())
}

#[rstest]
#[case::unknown_finder(&["shoal", "prune", "x.txt", "--finder", "median"])]
#[case::bad_threshold(&["shoal", "prune", "x.txt", "--threshold", "LT0.5"])]
#[case::blocks_limit_needs_blocks(&["shoal", "prune", "x.txt", "--max-blocks", "2"])]
#[case::zero_blocks(&["shoal", "prune", "x.txt", "--blocks", "--max-blocks", "0"])]
#[case::missing_condition(&["shoal", "cluster", "x.txt"])]
#[case::unknown_condition(&["shoal", "cluster", "x.txt", "--condition", "equal"])]
fn clap_rejects_invalid_arguments(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn clap_defaults_match_the_steepest_finder() {
    let cli = parse(Path::new("ranked.txt"), &["prune", "{}"]);
    let super::Command::Prune(command) = cli.command else {
        panic!("expected the prune command");
    };
    assert_eq!(command.finder, FinderKind::Steepest);
    assert_eq!(command.threshold.to_canonical_string(), "GT0");
    assert_eq!(command.scale, 2);
    assert!(!command.blocks);
}

#[test]
fn full_signature_help_describes_the_spread_rule() {
    let mut command = Cli::command();
    let Some(prune) = command.find_subcommand_mut("prune") else {
        panic!("prune subcommand must exist");
    };
    let help = prune
        .get_arguments()
        .find(|arg| arg.get_id() == "full_signature")
        .and_then(|arg| arg.get_help())
        .map(ToString::to_string)
        .unwrap_or_default();
    assert!(help.contains("spread from first to last score"), "help was: {help}");
    assert!(!help.contains("above the threshold"), "help was: {help}");
}

#[rstest]
fn render_prune_lists_kept_rows() -> TestResult {
    let outcome = Outcome::Prune(PruneSummary {
        finder: FinderKind::Steepest,
        elements: vec![
            ScoredElement::new(1, 0.8),
            ScoredElement::new(2, 0.7),
            ScoredElement::new(3, 0.5),
        ],
        cut: 2,
        blocks: None,
    });
    let mut buffer = Vec::new();
    render_outcome(&outcome, &mut buffer)?;
    assert_eq!(String::from_utf8(buffer)?, "cut: 2\n1\t0.8\n2\t0.7\n");
    Ok(())
}

#[rstest]
fn render_prune_lists_block_ids() -> TestResult {
    let outcome = Outcome::Prune(PruneSummary {
        finder: FinderKind::Steepest,
        elements: vec![
            ScoredElement::new(4, 0.9),
            ScoredElement::new(9, 0.8),
            ScoredElement::new(2, 0.4),
        ],
        cut: 2,
        blocks: Some(vec![0..2, 2..3]),
    });
    let mut buffer = Vec::new();
    render_outcome(&outcome, &mut buffer)?;
    assert_eq!(String::from_utf8(buffer)?, "blocks: 2\n4 9\n2\n");
    Ok(())
}

#[rstest]
fn render_cluster_lists_components() -> TestResult {
    let outcome = Outcome::Cluster(ClusterSummary {
        condition: ConditionKind::Containment,
        mode: ComponentMode::Undirected,
        partition: ComponentPartition::from_groups([vec![5, 4], vec![1, 2, 3, 6]]),
    });
    let mut buffer = Vec::new();
    render_outcome(&outcome, &mut buffer)?;
    assert_eq!(String::from_utf8(buffer)?, "components: 2\n1 2 3 6\n4 5\n");
    Ok(())
}

#[rstest]
fn cluster_records_command_spans(dir: TempDir) -> TestResult {
    let path = write_input(&dir, "sets.txt", FAMILIES)?;
    let cli = parse(&path, &["cluster", "{}", "--condition", "containment"]);

    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let outcome = tracing::subscriber::with_default(subscriber, || super::run_cli(cli))?;
    assert!(matches!(outcome, Outcome::Cluster(_)));

    let run = layer.span("cli.run").ok_or("cli.run span missing")?;
    assert_eq!(run.field("command"), Some("cluster"));
    let cluster = layer.span("cli.cluster").ok_or("cli.cluster span missing")?;
    assert_eq!(cluster.field("condition"), Some("containment"));
    assert_eq!(cluster.field("sets"), Some("6"));
    assert_eq!(cluster.field("mutual"), Some("false"));
    assert!(layer.span("clustering.run").is_some());
    assert!(layer.has_event(Level::INFO, "cluster completed"));
    Ok(())
}

#[rstest]
fn prune_records_command_spans(dir: TempDir) -> TestResult {
    let path = write_input(&dir, "ranked.txt", "1 0.9\n2 0.8\n3 0.4\n")?;
    let cli = parse(&path, &["prune", "{}", "--finder", "otsu"]);

    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    tracing::subscriber::with_default(subscriber, || super::run_cli(cli))?;

    let prune = layer.span("cli.prune").ok_or("cli.prune span missing")?;
    assert_eq!(prune.field("finder"), Some("otsu"));
    assert_eq!(prune.field("elements"), Some("3"));
    assert!(layer.has_event(Level::INFO, "prune completed"));
    Ok(())
}
