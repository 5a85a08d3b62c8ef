//! End-to-end scenarios pinning the engine's observable behavior: inclusive
//! bounds, first-qualifying-match semantics, and fail-fast on empty or
//! malformed reference data.

use masksieve::{
    run_filter, ExecutionMode, FilterConfig, NullSink, RawCandidate, RunError, RunOptions,
    RunStatus, VecCandidateSource, VecReferenceSource,
};

fn range(lo: u8, hi: u8) -> Vec<u8> {
    (lo..=hi).collect()
}

fn sequential_config() -> FilterConfig {
    FilterConfig {
        execution_mode: ExecutionMode::Sequential,
        batch_size: 100,
        ..FilterConfig::default()
    }
}

fn run(
    config: &FilterConfig,
    candidates: Vec<RawCandidate>,
    references: Vec<Vec<u8>>,
) -> Result<masksieve::RunReport, RunError> {
    run_filter(
        config,
        &mut VecCandidateSource::new(candidates),
        &mut VecReferenceSource::new(references),
        &NullSink,
        RunOptions::default(),
    )
}

#[test]
fn scenario_a_full_overlap_matches_at_fifteen() {
    // Candidate {1..15} vs reference {1..20}: intersection 15, within [11, 15].
    let report = run(
        &sequential_config(),
        vec![RawCandidate {
            id: 1,
            numbers: range(1, 15),
        }],
        vec![range(1, 20)],
    )
    .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].candidate_id, 1);
    assert_eq!(report.results[0].intersection_size, 15);
}

#[test]
fn scenario_b_ten_element_overlap_misses_min_eleven() {
    // Candidate {11..25} vs reference {1..20}: intersection {11..20} = 10.
    let report = run(
        &sequential_config(),
        vec![RawCandidate {
            id: 1,
            numbers: range(11, 25),
        }],
        vec![range(1, 20)],
    )
    .unwrap();

    assert!(report.results.is_empty());
    assert_eq!(report.summary.total_processed, 1);
}

#[test]
fn scenario_c_first_qualifying_reference_is_reported() {
    // First reference intersects the candidate in 5 (below min); the second
    // in 13. The recorded size is 13 — from the first reference to qualify,
    // not the best across all references.
    let r1 = vec![16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 1, 2, 3, 4, 5];
    let mut r2 = range(1, 13);
    r2.extend([21, 22]);

    let report = run(
        &sequential_config(),
        vec![RawCandidate {
            id: 1,
            numbers: range(1, 15),
        }],
        vec![r1, r2],
    )
    .unwrap();

    assert_eq!(report.results[0].intersection_size, 13);
}

#[test]
fn scenario_e_empty_reference_collection_fails_up_front() {
    let err = run(
        &sequential_config(),
        vec![RawCandidate {
            id: 1,
            numbers: range(1, 15),
        }],
        vec![],
    )
    .unwrap_err();

    assert!(matches!(err, RunError::EmptyReferenceSet));
}

#[test]
fn boundary_min_and_max_are_inclusive_their_neighbors_are_not() {
    // Candidate/reference pair with intersection exactly 12.
    let candidate = range(1, 15);
    let reference: Vec<u8> = (4..=23).collect(); // ∩ {1..15} = {4..15} = 12

    let at = |min: u8, max: u8| {
        let config = FilterConfig {
            min_intersection: min,
            max_intersection: max,
            ..sequential_config()
        };
        run(
            &config,
            vec![RawCandidate {
                id: 1,
                numbers: candidate.clone(),
            }],
            vec![reference.clone()],
        )
        .unwrap()
        .results
        .len()
    };

    assert_eq!(at(12, 15), 1); // min == intersection: included
    assert_eq!(at(11, 12), 1); // max == intersection: included
    assert_eq!(at(13, 15), 0); // min == intersection + 1: excluded
    assert_eq!(at(5, 11), 0); // max == intersection - 1: excluded
}

#[test]
fn completed_run_reports_skip_counts_alongside_matches() {
    let report = run(
        &sequential_config(),
        vec![
            RawCandidate {
                id: 1,
                numbers: range(1, 15),
            },
            RawCandidate {
                id: 2,
                numbers: vec![1, 1, 2], // duplicate element, skipped
            },
        ],
        vec![range(1, 20)],
    )
    .unwrap();

    assert_eq!(report.summary.status, RunStatus::Completed);
    assert_eq!(report.summary.total_candidates, 2);
    assert_eq!(report.summary.skipped_malformed, 1);
    assert_eq!(report.summary.total_matched, 1);
}

#[test]
fn report_serializes_for_sink_consumers() {
    let report = run(
        &sequential_config(),
        vec![RawCandidate {
            id: 1,
            numbers: range(1, 15),
        }],
        vec![range(1, 20)],
    )
    .unwrap();

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"candidate_id\":1"), "{json}");
    assert!(json.contains("\"intersection_size\":15"), "{json}");
    assert!(json.contains("\"status\":\"Completed\""), "{json}");
}

#[test]
fn summary_throughput_is_derived_from_processed_candidates() {
    let candidates: Vec<RawCandidate> = (0..500)
        .map(|id| RawCandidate {
            id,
            numbers: range(1, 15),
        })
        .collect();

    let report = run(&sequential_config(), candidates, vec![range(1, 20)]).unwrap();
    assert_eq!(report.summary.total_processed, 500);
    assert!(report.summary.throughput > 0.0);
    assert!(report.summary.elapsed.as_nanos() > 0);
}
