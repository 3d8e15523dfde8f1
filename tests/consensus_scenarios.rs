// ==============================================================================
// consensus_scenarios.rs - End-to-end consensus scenarios
// ==============================================================================
// Description: Voter + Refiner over full eight-predictor matrices
// Author: Matt Barham
// Created: 2026-10-06
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================

use disorder_consensus::morphology::{close, dilate};
use disorder_consensus::{
    ConsensusPipeline, ConsensusSettings, ConsensusTrack, DisorderState, PredictionMatrix,
    Predictor, PredictorColumn, Region, ResidueCall,
};

/// 8 predictors over `length` residues; `agree` of them call the spans
/// disordered, all of them call everything else ordered
fn matrix(length: usize, spans: &[std::ops::RangeInclusive<usize>], agree: usize) -> PredictionMatrix {
    let columns = Predictor::ALL
        .iter()
        .enumerate()
        .map(|(idx, &p)| {
            let states: Vec<bool> = (0..length)
                .map(|i| idx < agree && spans.iter().any(|s| s.contains(&i)))
                .collect();
            PredictorColumn::from_states(p, &states)
        })
        .collect();
    PredictionMatrix::new(length, columns).unwrap()
}

fn pipeline(radius: i64, min_region_length: i64) -> ConsensusPipeline {
    let settings = ConsensusSettings {
        radius,
        min_region_length,
        ..Default::default()
    };
    ConsensusPipeline::from_settings(&settings).unwrap()
}

#[test]
fn test_contiguous_span_reported_one_based() {
    // 6 of 8 agree on 0-based 5..=14; threshold 5/8, r=1, m=8
    let result = pipeline(1, 8).run(&matrix(20, &[5..=14], 6)).unwrap();

    assert_eq!(result.regions, vec![Region::new(6, 15)]);
    assert_eq!(result.content_count, 10);
    assert_eq!(result.votes[10].disordered, 6);
}

#[test]
fn test_short_span_filtered_out() {
    let result = pipeline(1, 8).run(&matrix(20, &[5..=9], 6)).unwrap();

    assert!(result.regions.is_empty());
    assert!(result.track.states().iter().all(|s| *s == DisorderState::Ordered));
}

#[test]
fn test_nearby_spans_merge_into_one_region() {
    let result = pipeline(2, 8).run(&matrix(20, &[5..=9, 11..=14], 6)).unwrap();

    assert_eq!(result.regions.len(), 1);
    assert_eq!(result.regions[0], Region::new(6, 15));
    assert!(result.regions[0].len() >= 8);
}

#[test]
fn test_below_quorum_is_ordered() {
    let result = pipeline(1, 1).run(&matrix(20, &[5..=14], 4)).unwrap();
    assert!(result.regions.is_empty());
}

#[test]
fn test_pipeline_is_deterministic() {
    let m = matrix(60, &[2..=20, 23..=24, 27..=50], 5);
    let p = pipeline(2, 10);

    let first = p.run(&m).unwrap();
    for _ in 0..5 {
        assert_eq!(p.run(&m).unwrap(), first);
    }
}

#[test]
fn test_regions_sorted_disjoint_and_at_least_m() {
    let m = 7;
    let result = pipeline(1, m as i64)
        .run(&matrix(100, &[0..=3, 6..=20, 24..=24, 30..=31, 40..=60, 63..=64, 90..=99], 8))
        .unwrap();

    assert!(!result.regions.is_empty());
    for region in &result.regions {
        assert!(region.len() >= m);
        assert!(region.start >= 1 && region.end <= 100);
    }
    for pair in result.regions.windows(2) {
        assert!(pair[0].end < pair[1].start);
    }
}

#[test]
fn test_boundary_dilation_stays_in_range() {
    let mut states = vec![false; 10];
    states[0] = true;
    let dilated = dilate(&ConsensusTrack::from_bools(&states), 2);

    assert_eq!(dilated.len(), 10);
    assert_eq!(dilated.regions(), vec![Region::new(1, 3)]);
}

#[test]
fn test_closing_twice_matches_once() {
    let raw = ConsensusTrack::from_bools(
        &(0..50).map(|i| i % 7 < 3 || i % 11 == 0).collect::<Vec<_>>(),
    );
    for r in 1..4 {
        let once = close(&raw, r);
        assert_eq!(close(&once, r).regions(), once.regions());
    }
}

#[test]
fn test_abstaining_predictors_do_not_block_consensus() {
    // Three predictors abstain everywhere; 5 of the remaining 5 call 4..=23
    let length = 30;
    let columns = Predictor::ALL
        .iter()
        .enumerate()
        .map(|(idx, &p)| {
            let calls = (0..length)
                .map(|i| {
                    (idx < 5).then(|| ResidueCall {
                        disordered: (4..=23).contains(&i),
                        score: None,
                    })
                })
                .collect();
            PredictorColumn::new(p, calls)
        })
        .collect();
    let m = PredictionMatrix::new(length, columns).unwrap();

    let result = pipeline(2, 10).run(&m).unwrap();
    assert_eq!(result.regions, vec![Region::new(5, 24)]);
    assert!(result.diagnostics.is_empty());
}
