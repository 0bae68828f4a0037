//! All-pairs graph clustering benchmarks.
//!
//! Measures end-to-end clustering of synthetic near-duplicate id sets under
//! a Jaccard overlap condition, once per worker count so the scaling of the
//! strided pair partitioning is visible. A second group isolates strongly
//! connected extraction under a directed containment condition.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use shoal_benches::{
    error::BenchSetupError,
    params::GraphBenchParams,
    source::{SyntheticSetConfig, SyntheticSets},
};
use shoal_core::{
    ClusteringBuilder, ComponentMode, ContainmentOverlap, JaccardOverlap, Overlap,
};

/// Seed used for all synthetic data generation in this benchmark.
const SEED: u64 = 42;

/// Index sizes to benchmark.
const SET_COUNTS: &[usize] = &[250, 1_000];

/// Worker counts to benchmark.
const THREAD_COUNTS: &[usize] = &[1, 2, 4];

fn generate_sets(set_count: usize) -> Result<SyntheticSets, BenchSetupError> {
    Ok(SyntheticSets::generate(&SyntheticSetConfig {
        set_count,
        family_count: set_count.div_ceil(10),
        members_per_set: 24,
        universe: 4_096,
        mutation_rate: 0.15,
        seed: SEED,
    })?)
}

fn jaccard_clustering_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("jaccard_clustering");
    group.sample_size(20);

    for &set_count in SET_COUNTS {
        let sets = generate_sets(set_count)?;
        let condition = Overlap::new(sets.index(), JaccardOverlap::new("GEQ0.6".parse()?));
        for &threads in THREAD_COUNTS {
            let clustering = ClusteringBuilder::new().with_threads(threads).build()?;
            let bench_params = GraphBenchParams { set_count, threads };
            group.bench_with_input(
                BenchmarkId::from_parameter(&bench_params),
                &(&clustering, &condition),
                |b, &(clustering, condition)| {
                    b.iter(|| clustering.run(sets.index().as_slice(), condition));
                },
            );
        }
    }

    group.finish();
    Ok(())
}

fn containment_scc_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("containment_scc");
    group.sample_size(20);

    for &set_count in SET_COUNTS {
        let sets = generate_sets(set_count)?;
        let condition = Overlap::new(sets.index(), ContainmentOverlap::new("GEQ0.8".parse()?));
        let threads = 4;
        let clustering = ClusteringBuilder::new()
            .with_threads(threads)
            .with_mode(ComponentMode::StronglyConnected)
            .build()?;
        let bench_params = GraphBenchParams { set_count, threads };
        group.bench_with_input(
            BenchmarkId::from_parameter(&bench_params),
            &(&clustering, &condition),
            |b, &(clustering, condition)| {
                b.iter(|| clustering.run(sets.index().as_slice(), condition));
            },
        );
    }

    group.finish();
    Ok(())
}

fn jaccard_clustering(c: &mut Criterion) {
    if let Err(err) = jaccard_clustering_impl(c) {
        panic!("jaccard_clustering benchmark setup failed: {err}");
    }
}

fn containment_scc(c: &mut Criterion) {
    if let Err(err) = containment_scc_impl(c) {
        panic!("containment_scc benchmark setup failed: {err}");
    }
}

criterion_group!(benches, jaccard_clustering, containment_scc);
criterion_main!(benches);
