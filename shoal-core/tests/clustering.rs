//! End-to-end tests for the `Clustering` orchestration API.

mod common;

use common::families;
use rstest::{fixture, rstest};
use shoal_core::{
    Clustering, ClusteringBuilder, ComponentMode, ConditionError, Conjunction, Containment,
    EdgeCondition, GraphError, IdSetIndex, IdenticalSet, JaccardOverlap, Mutual, NonSubset,
    Overlap, ShoalError, ShoalErrorCode, Threshold,
};
use shoal_test_support::tracing::RecordingLayer;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

#[fixture]
fn index() -> IdSetIndex {
    families()
}

fn clustering(mode: ComponentMode, threads: usize) -> Clustering {
    ClusteringBuilder::new()
        .with_mode(mode)
        .with_threads(threads)
        .build()
        .expect("configuration must be valid")
}

fn threshold(raw: &str) -> Threshold {
    raw.parse().expect("threshold must parse")
}

fn groups<C: EdgeCondition>(
    index: &IdSetIndex,
    condition: &C,
    mode: ComponentMode,
    threads: usize,
) -> Vec<Vec<u64>> {
    clustering(mode, threads)
        .run(index.as_slice(), condition)
        .expect("run must succeed")
        .into_groups()
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
fn identical_sets_group_exact_duplicates(index: IdSetIndex, #[case] threads: usize) {
    let condition = IdenticalSet::new(&index);
    assert_eq!(
        groups(&index, &condition, ComponentMode::Undirected, threads),
        vec![vec![1, 2], vec![3], vec![4], vec![5], vec![6]]
    );
}

#[rstest]
fn jaccard_threshold_is_strict(index: IdSetIndex) {
    // Sets 3 and 6 have a similarity of exactly one half.
    let strict = Overlap::new(&index, JaccardOverlap::new(threshold("GT0.5")));
    assert_eq!(
        groups(&index, &strict, ComponentMode::Undirected, 3),
        vec![vec![1, 2, 3], vec![4, 5], vec![6]]
    );

    let inclusive = Overlap::new(&index, JaccardOverlap::new(threshold("GEQ0.5")));
    assert_eq!(
        groups(&index, &inclusive, ComponentMode::Undirected, 3),
        vec![vec![1, 2, 3, 6], vec![4, 5]]
    );
}

#[rstest]
#[case::undirected(ComponentMode::Undirected, vec![vec![1, 2, 3, 6], vec![4], vec![5]])]
#[case::strongly_connected(
    ComponentMode::StronglyConnected,
    vec![vec![1, 2, 3], vec![4], vec![5], vec![6]],
)]
fn containment_depends_on_the_component_mode(
    index: IdSetIndex,
    #[case] mode: ComponentMode,
    #[case] expected: Vec<Vec<u64>>,
) {
    // Only set 6 points at set 1; nothing points back at 6.
    let condition = Containment::new(&index);
    assert_eq!(groups(&index, &condition, mode, 2), expected);
}

#[rstest]
fn mutual_containment_drops_one_way_links(index: IdSetIndex) {
    let condition = Mutual::new(Containment::new(&index));
    assert_eq!(
        groups(&index, &condition, ComponentMode::Undirected, 2),
        vec![vec![1, 2, 3], vec![4], vec![5], vec![6]]
    );
}

#[rstest]
fn disjoint_sets_are_non_subsets(index: IdSetIndex) {
    let condition = NonSubset::new(&index);
    assert_eq!(
        groups(&index, &condition, ComponentMode::Undirected, 2),
        vec![vec![1, 2, 3, 4, 5, 6]]
    );
}

#[rstest]
fn conjunctions_require_every_member(index: IdSetIndex) {
    let condition = Conjunction::new()
        .with(Overlap::new(&index, JaccardOverlap::new(threshold("GEQ0.5"))))
        .with(Containment::new(&index));
    assert!(!condition.is_symmetric());
    assert_eq!(
        groups(&index, &condition, ComponentMode::Undirected, 2),
        vec![vec![1, 2, 3], vec![4], vec![5], vec![6]]
    );
}

#[rstest]
fn partitions_cover_every_node_once(index: IdSetIndex) {
    let condition = Overlap::new(&index, JaccardOverlap::new(threshold("GT0.5")));
    let partition = clustering(ComponentMode::Undirected, 2)
        .run(index.as_slice(), &condition)
        .expect("run must succeed");

    assert_eq!(partition.len(), 3);
    assert_eq!(partition.node_count(), index.len());
    assert_eq!(partition.non_singletons().count(), 2);
    for set in &index {
        let owner = partition
            .component_of(set.id())
            .expect("every node must be owned");
        assert!(owner.contains(set.id()));
    }
    let sizes: usize = partition.iter().map(|component| component.len()).sum();
    assert_eq!(sizes, index.len());
}

#[rstest]
fn unknown_nodes_surface_as_graph_failures(index: IdSetIndex) {
    let nodes = [1_u64, 2, 99];
    let condition = IdenticalSet::new(&index);
    let error = clustering(ComponentMode::Undirected, 1)
        .run(&nodes, &condition)
        .expect_err("node 99 is not indexed");

    assert_eq!(
        error,
        ShoalError::Graph {
            error: GraphError::Condition {
                source_id: 1,
                target_id: 99,
                error: ConditionError::UnknownNode { id: 99 },
            },
        }
    );
    assert_eq!(error.code(), ShoalErrorCode::GraphFailure);
}

#[rstest]
fn run_records_nested_spans(index: IdSetIndex) {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let condition = IdenticalSet::new(&index);
    let partition = tracing::subscriber::with_default(subscriber, || {
        clustering(ComponentMode::StronglyConnected, 2).run(index.as_slice(), &condition)
    })
    .expect("run must succeed");
    assert_eq!(partition.len(), 5);

    let run = layer.span("clustering.run").expect("run span must be recorded");
    assert_eq!(run.field("nodes"), Some("6"));
    assert_eq!(run.field("threads"), Some("2"));
    assert_eq!(run.field("mode"), Some("StronglyConnected"));

    let build = layer.span("graph.build").expect("build span must be recorded");
    assert_eq!(build.field("nodes"), Some("6"));
    assert_eq!(build.field("symmetric"), Some("true"));
    assert_eq!(build.field("directed"), Some("true"));

    let extract = layer
        .span("components.extract")
        .expect("extraction span must be recorded");
    assert_eq!(extract.field("mode"), Some("strongly_connected"));

    let completed = layer
        .events()
        .into_iter()
        .find(|event| event.message() == Some("clustering completed"))
        .expect("completion event must be emitted");
    assert_eq!(completed.level, Level::INFO);
    assert_eq!(completed.field("components"), Some("5"));
    assert_eq!(completed.field("non_singletons"), Some("1"));
}

#[rstest]
fn empty_input_warns_and_returns_an_empty_partition(index: IdSetIndex) {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let condition = IdenticalSet::new(&index);
    let nodes: [u64; 0] = [];
    let partition = tracing::subscriber::with_default(subscriber, || {
        clustering(ComponentMode::Undirected, 2).run(&nodes, &condition)
    })
    .expect("empty input is valid");

    assert!(partition.is_empty());
    assert!(layer.has_event(
        Level::WARN,
        "node list is empty, returning an empty partition"
    ));
    assert!(layer.span("graph.build").is_none());
}

#[rstest]
fn failures_are_logged_at_error_level(index: IdSetIndex) {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let condition = IdenticalSet::new(&index);
    let nodes = [1_u64, 99];
    let result = tracing::subscriber::with_default(subscriber, || {
        clustering(ComponentMode::Undirected, 1).run(&nodes, &condition)
    });

    assert!(result.is_err());
    let errors: Vec<_> = layer
        .events()
        .into_iter()
        .filter(|event| event.level == Level::ERROR)
        .collect();
    assert!(!errors.is_empty());
    assert!(errors.iter().all(|event| {
        event
            .field("error")
            .is_some_and(|message| message.contains("edge condition failed for (1, 99)"))
    }));
}
