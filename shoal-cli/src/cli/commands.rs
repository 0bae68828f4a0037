//! Command implementations and argument parsing for the shoal CLI.

use std::{
    fs::File,
    io::{self, BufReader, Write},
    num::NonZeroUsize,
    ops::Range,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use shoal_core::{
    CandidateSetFinder, ClusteringBuilder, ComponentMode, ComponentPartition, Containment,
    ContainmentOverlap, Directed, EdgeCondition, IdSetIndex, IdenticalSet, JaccardOverlap,
    Mutual, NonSubset, OtsuThresholdFinder, Overlap, ScoredElement, ShoalError,
    SteepestDropFinder, Threshold, ThresholdAwareSteepestDropFinder, ThresholdFinder,
    signature_blocks, sort_descending,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use super::input::{InputError, ScoredInput, read_id_sets, read_scored_elements};

const DEFAULT_NON_EMPTY_THRESHOLD: &str = "GT0";
const DEFAULT_OTSU_SCALE: u32 = 2;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "shoal",
    about = "Prune ranked candidate lists and cluster id sets."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cut a ranked `id score [weight]` list.
    Prune(PruneCommand),
    /// Partition `id member...` sets under an edge condition.
    Cluster(ClusterCommand),
}

/// Options accepted by the `prune` command.
#[derive(Debug, Args, Clone)]
pub struct PruneCommand {
    /// File with one `id score [weight]` row per candidate.
    pub path: PathBuf,

    /// Finder used to choose the cut.
    #[arg(long, value_enum, default_value_t = FinderKind::Steepest)]
    pub finder: FinderKind,

    /// Threshold in canonical form, for example `GEQ0.5`.
    #[arg(long, default_value = DEFAULT_NON_EMPTY_THRESHOLD, value_parser = parse_threshold)]
    pub threshold: Threshold,

    /// Keep the whole list when the spread from first to last score is
    /// smaller than the last score (steepest-drop finders only).
    #[arg(long)]
    pub full_signature: bool,

    /// Never cut at the drop onto the last element.
    #[arg(long)]
    pub ignore_last_drop: bool,

    /// Fractional digits used to bucket scores for the Otsu finder.
    #[arg(long, default_value_t = DEFAULT_OTSU_SCALE)]
    pub scale: u32,

    /// Print consecutive signature blocks instead of a single cut.
    #[arg(long)]
    pub blocks: bool,

    /// Upper bound on the number of blocks printed with `--blocks`.
    #[arg(long, requires = "blocks")]
    pub max_blocks: Option<NonZeroUsize>,
}

/// Cut selection strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FinderKind {
    /// Cut at the steepest score drop.
    Steepest,
    /// Cut at the steepest drop, extending past threshold-satisfying scores.
    ThresholdAware,
    /// Cut at the Otsu split of the weighted score histogram.
    Otsu,
    /// Keep the leading run satisfying the threshold.
    Threshold,
}

impl FinderKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Steepest => "steepest",
            Self::ThresholdAware => "threshold-aware",
            Self::Otsu => "otsu",
            Self::Threshold => "threshold",
        }
    }
}

/// Options accepted by the `cluster` command.
#[derive(Debug, Args, Clone)]
pub struct ClusterCommand {
    /// File with one `id member...` row per set.
    pub path: PathBuf,

    /// Edge condition linking two sets.
    #[arg(long, value_enum)]
    pub condition: ConditionKind,

    /// Threshold for the overlap conditions, for example `GT0.5`.
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<Threshold>,

    /// Require the condition to hold in both directions.
    #[arg(long)]
    pub mutual: bool,

    /// Extract strongly connected components of the directed graph.
    #[arg(long)]
    pub directed: bool,

    /// Worker threads used to build the graph.
    #[arg(long)]
    pub threads: Option<usize>,
}

/// Edge conditions selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConditionKind {
    /// Both sets have exactly the same members.
    Identical,
    /// Neither set is a subset of the other.
    NonSubset,
    /// The source set lists the target id as a member.
    Containment,
    /// Jaccard similarity satisfies the threshold.
    Jaccard,
    /// The share of the source covered by the target satisfies the threshold.
    ContainmentRatio,
}

impl ConditionKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Identical => "identical",
            Self::NonSubset => "non-subset",
            Self::Containment => "containment",
            Self::Jaccard => "jaccard",
            Self::ContainmentRatio => "containment-ratio",
        }
    }
}

fn parse_threshold(raw: &str) -> Result<Threshold, String> {
    raw.parse().map_err(|error: shoal_core::ThresholdError| error.to_string())
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file could not be opened.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// An input file was malformed.
    #[error("failed to parse `{path}`: {source}")]
    Input {
        /// Path of the malformed file.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: InputError,
    },
    /// An overlap condition was requested without a threshold.
    #[error("condition `{condition}` requires --threshold")]
    MissingThreshold {
        /// Condition that needs the threshold.
        condition: &'static str,
    },
    /// Core clustering failed.
    #[error(transparent)]
    Core(#[from] ShoalError),
}

/// Result of the `prune` command.
#[derive(Debug, Clone, PartialEq)]
pub struct PruneSummary {
    /// Finder that chose the cut.
    pub finder: FinderKind,
    /// Elements sorted by descending score.
    pub elements: Vec<ScoredElement>,
    /// Number of leading elements kept.
    pub cut: usize,
    /// Signature blocks, when requested.
    pub blocks: Option<Vec<Range<usize>>>,
}

/// Result of the `cluster` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSummary {
    /// Condition used to link sets.
    pub condition: ConditionKind,
    /// Component mode used for extraction.
    pub mode: ComponentMode,
    /// Extracted components.
    pub partition: ComponentPartition,
}

/// Outcome of any CLI command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Output of `prune`.
    Prune(PruneSummary),
    /// Output of `cluster`.
    Cluster(ClusterSummary),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when reading input or clustering fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use shoal_cli::cli::{Cli, Outcome, run_cli};
/// # use clap::Parser;
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "1 0.9\n2 0.85\n3 0.2\n")?;
/// let path = file.path().to_str().ok_or("temporary path must be UTF-8")?;
/// let cli = Cli::try_parse_from(["shoal", "prune", path])?;
/// let Outcome::Prune(summary) = run_cli(cli)? else {
///     return Err("prune must produce a prune summary".into());
/// };
/// assert_eq!(summary.cut, 2);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<Outcome, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Prune(command) => {
            span.record("command", field::display("prune"));
            run_prune(command).map(Outcome::Prune)
        }
        Command::Cluster(command) => {
            span.record("command", field::display("cluster"));
            run_cluster(command).map(Outcome::Cluster)
        }
    }
}

#[instrument(
    name = "cli.prune",
    err,
    skip(command),
    fields(
        path = %command.path.display(),
        finder = command.finder.label(),
        elements = field::Empty,
    ),
)]
pub(super) fn run_prune(command: PruneCommand) -> Result<PruneSummary, CliError> {
    let mut input = read_file(&command.path, read_scored_elements)?;
    sort_descending(&mut input.elements);
    Span::current().record("elements", input.elements.len());

    let (cut, blocks) = select(&command, &input);
    info!(
        cut,
        blocks = blocks.as_ref().map(Vec::len),
        "prune completed"
    );
    Ok(PruneSummary {
        finder: command.finder,
        elements: input.elements,
        cut,
        blocks,
    })
}

/// Applies the configured finder to the sorted `input`.
fn select(command: &PruneCommand, input: &ScoredInput) -> (usize, Option<Vec<Range<usize>>>) {
    let finder: Box<dyn CandidateSetFinder + '_> = match command.finder {
        FinderKind::Steepest => Box::new(
            SteepestDropFinder::new(command.threshold)
                .with_full_signature_constraint(command.full_signature)
                .with_ignore_last_drop(command.ignore_last_drop),
        ),
        FinderKind::ThresholdAware => Box::new(
            ThresholdAwareSteepestDropFinder::new(command.threshold)
                .with_full_signature_constraint(command.full_signature)
                .with_ignore_last_drop(command.ignore_last_drop),
        ),
        FinderKind::Otsu => Box::new(OtsuThresholdFinder::new(
            |id| input.weight(id),
            command.scale,
        )),
        FinderKind::Threshold => Box::new(ThresholdFinder::new(command.threshold)),
    };
    let cut = finder.prune_index(&input.elements, 0);
    let blocks = command
        .blocks
        .then(|| signature_blocks(&finder, &input.elements, command.max_blocks));
    (cut, blocks)
}

#[instrument(
    name = "cli.cluster",
    err,
    skip(command),
    fields(
        path = %command.path.display(),
        condition = command.condition.label(),
        mutual = command.mutual,
        directed = command.directed,
        sets = field::Empty,
    ),
)]
pub(super) fn run_cluster(command: ClusterCommand) -> Result<ClusterSummary, CliError> {
    let index = read_file(&command.path, read_id_sets)?;
    Span::current().record("sets", index.len());

    let mode = if command.directed {
        ComponentMode::StronglyConnected
    } else {
        ComponentMode::Undirected
    };
    let mut builder = ClusteringBuilder::new().with_mode(mode);
    if let Some(threads) = command.threads {
        builder = builder.with_threads(threads);
    }
    let clustering = builder.build()?;

    let mut condition = base_condition(&index, command.condition, command.threshold)?;
    if command.mutual {
        condition = Box::new(Mutual::new(condition));
    }
    if command.directed {
        condition = Box::new(Directed::new(condition));
    }
    let partition = clustering.run(index.as_slice(), &condition)?;
    info!(
        components = partition.len(),
        non_singletons = partition.non_singletons().count(),
        "cluster completed"
    );
    Ok(ClusterSummary {
        condition: command.condition,
        mode,
        partition,
    })
}

fn base_condition(
    index: &IdSetIndex,
    kind: ConditionKind,
    threshold: Option<Threshold>,
) -> Result<Box<dyn EdgeCondition + '_>, CliError> {
    let required = || {
        threshold.ok_or(CliError::MissingThreshold {
            condition: kind.label(),
        })
    };
    let condition: Box<dyn EdgeCondition + '_> = match kind {
        ConditionKind::Identical => Box::new(IdenticalSet::new(index)),
        ConditionKind::NonSubset => Box::new(NonSubset::new(index)),
        ConditionKind::Containment => Box::new(Containment::new(index)),
        ConditionKind::Jaccard => Box::new(Overlap::new(index, JaccardOverlap::new(required()?))),
        ConditionKind::ContainmentRatio => {
            Box::new(Overlap::new(index, ContainmentOverlap::new(required()?)))
        }
    };
    Ok(condition)
}

#[instrument(name = "cli.read_file", err, skip(parse), fields(path = %path.display()))]
fn read_file<T>(
    path: &Path,
    parse: impl FnOnce(BufReader<File>) -> Result<T, InputError>,
) -> Result<T, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(BufReader::new(file)).map_err(|source| CliError::Input {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders `outcome` to `writer` in a plain text format.
///
/// `prune` prints the kept `id score` rows after a `cut:` header, or one
/// `block` line of ids per signature block. `cluster` prints one component
/// per line after a `components:` header.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use shoal_cli::cli::{ClusterSummary, ConditionKind, Outcome, render_outcome};
/// # use shoal_core::{ComponentMode, ComponentPartition};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let outcome = Outcome::Cluster(ClusterSummary {
///     condition: ConditionKind::Identical,
///     mode: ComponentMode::Undirected,
///     partition: ComponentPartition::from_groups([vec![3], vec![1, 2]]),
/// });
/// let mut buffer = Vec::new();
/// render_outcome(&outcome, &mut buffer)?;
/// assert_eq!(String::from_utf8(buffer)?, "components: 2\n1 2\n3\n");
/// # Ok(())
/// # }
/// ```
pub fn render_outcome(outcome: &Outcome, mut writer: impl Write) -> io::Result<()> {
    match outcome {
        Outcome::Prune(summary) => render_prune(summary, &mut writer),
        Outcome::Cluster(summary) => render_cluster(summary, &mut writer),
    }
}

fn render_prune(summary: &PruneSummary, writer: &mut impl Write) -> io::Result<()> {
    if let Some(blocks) = &summary.blocks {
        writeln!(writer, "blocks: {}", blocks.len())?;
        for block in blocks {
            let ids = summary
                .elements
                .get(block.clone())
                .unwrap_or_default()
                .iter()
                .map(|element| element.id().to_string())
                .collect::<Vec<_>>();
            writeln!(writer, "{}", ids.join(" "))?;
        }
        return Ok(());
    }
    writeln!(writer, "cut: {}", summary.cut)?;
    for element in summary.elements.iter().take(summary.cut) {
        writeln!(writer, "{}\t{}", element.id(), element.value())?;
    }
    Ok(())
}

fn render_cluster(summary: &ClusterSummary, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "components: {}", summary.partition.len())?;
    for component in &summary.partition {
        let ids = component
            .members()
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>();
        writeln!(writer, "{}", ids.join(" "))?;
    }
    Ok(())
}
