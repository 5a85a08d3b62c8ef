//! Partition invariance: the final sorted result list must be byte-identical
//! across execution modes, batch sizes, and worker counts. Only completion
//! order during a run is allowed to vary.

use masksieve::{
    run_filter, ExecutionMode, FilterConfig, NullSink, RawCandidate, RunOptions,
    VecCandidateSource, VecReferenceSource,
};

/// Deterministic pseudo-random `size`-of-`universe` combination per seed.
fn combination(seed: u64, size: usize, universe: u8) -> Vec<u8> {
    let mut numbers = Vec::with_capacity(size);
    let mut x = seed.wrapping_mul(0x9e3779b97f4a7c15).wrapping_add(0xd1b5);
    while numbers.len() < size {
        x = x
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let n = ((x >> 33) % u64::from(universe) + 1) as u8;
        if !numbers.contains(&n) {
            numbers.push(n);
        }
    }
    numbers
}

fn candidates(n: u64) -> Vec<RawCandidate> {
    (0..n)
        .map(|id| RawCandidate {
            id,
            numbers: combination(id, 15, 25),
        })
        .collect()
}

fn references(n: u64) -> Vec<Vec<u8>> {
    (0..n).map(|seed| combination(seed ^ 0xabcd, 20, 25)).collect()
}

fn run_with(config: &FilterConfig, n_candidates: u64) -> Vec<(u64, u32)> {
    let report = run_filter(
        config,
        &mut VecCandidateSource::new(candidates(n_candidates)),
        &mut VecReferenceSource::new(references(64)),
        &NullSink,
        RunOptions::default(),
    )
    .unwrap();
    report
        .results
        .iter()
        .map(|r| (r.candidate_id, r.intersection_size))
        .collect()
}

#[test]
fn scenario_d_batch_sizes_100_and_333_yield_identical_sorted_lists() {
    let base = FilterConfig {
        execution_mode: ExecutionMode::Sequential,
        ..FilterConfig::default()
    };

    let with_100 = run_with(
        &FilterConfig {
            batch_size: 100,
            ..base.clone()
        },
        1_000,
    );
    let with_333 = run_with(
        &FilterConfig {
            batch_size: 333,
            ..base
        },
        1_000,
    );

    assert!(!with_100.is_empty(), "test data should produce matches");
    assert_eq!(with_100, with_333);
}

#[test]
fn sequential_and_parallel_agree_for_every_batch_size() {
    let sequential = run_with(
        &FilterConfig {
            execution_mode: ExecutionMode::Sequential,
            batch_size: 10_000,
            ..FilterConfig::default()
        },
        2_000,
    );

    for batch_size in [1, 7, 100, 333, 2_000, 10_000] {
        for workers in [1, 2, 4] {
            let parallel = run_with(
                &FilterConfig {
                    execution_mode: ExecutionMode::Parallel,
                    batch_size,
                    parallelism_degree: workers,
                    ..FilterConfig::default()
                },
                2_000,
            );
            assert_eq!(
                parallel, sequential,
                "batch_size = {batch_size}, workers = {workers}"
            );
        }
    }
}

#[test]
fn results_are_sorted_by_candidate_id() {
    let results = run_with(
        &FilterConfig {
            execution_mode: ExecutionMode::Parallel,
            batch_size: 50,
            parallelism_degree: 4,
            ..FilterConfig::default()
        },
        3_000,
    );
    assert!(results.windows(2).all(|w| w[0].0 < w[1].0));
}
