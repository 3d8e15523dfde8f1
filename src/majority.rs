// ==============================================================================
// majority.rs - Simple Majority Consensus
// ==============================================================================
// Description: Unsmoothed per-residue agreement between predictors
// Author: Matt Barham
// Created: 2026-10-01
// Modified: 2026-10-01
// Version: 1.0.0
// ==============================================================================

use serde::Serialize;

use crate::config::{Quorum, ThresholdTable};
use crate::models::{ConsensusTrack, DisorderState, PredictionMatrix, PredictorGroup, ResidueVotes};

/// Raw agreement at one residue
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResidueAgreement {
    pub votes: ResidueVotes,
    /// v / n, None when every predictor abstained
    pub fraction: Option<f64>,
    pub majority: bool,
}

/// Per-residue agreement with no morphology or region filtering applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MajorityConsensus {
    pub residues: Vec<ResidueAgreement>,
}

impl MajorityConsensus {
    /// Tally every residue against the majority quorum
    pub fn compute(matrix: &PredictionMatrix, quorum: Quorum) -> Self {
        let residues = (0..matrix.len())
            .map(|position| {
                let votes = matrix.tally(position);
                ResidueAgreement {
                    votes,
                    fraction: votes.fraction(),
                    majority: quorum.is_met(votes.disordered, votes.called),
                }
            })
            .collect();

        Self { residues }
    }

    /// Uses the `Majority` group quorum from a threshold table
    pub fn from_table(matrix: &PredictionMatrix, table: &ThresholdTable) -> Self {
        Self::compute(matrix, table.quorum(PredictorGroup::Majority))
    }

    pub fn fractions(&self) -> Vec<Option<f64>> {
        self.residues.iter().map(|r| r.fraction).collect()
    }

    /// Majority calls as a track (unsmoothed)
    pub fn track(&self) -> ConsensusTrack {
        ConsensusTrack::new(
            self.residues
                .iter()
                .map(|r| DisorderState::from(r.majority))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Predictor, PredictorColumn, Region, ResidueCall};

    fn matrix(rows: &[&[Option<bool>]]) -> PredictionMatrix {
        let length = rows.len();
        let width = rows[0].len();
        let columns = (0..width)
            .map(|c| {
                PredictorColumn::new(
                    Predictor::ALL[c],
                    rows.iter()
                        .map(|row| row[c].map(|d| ResidueCall { disordered: d, score: None }))
                        .collect(),
                )
            })
            .collect();
        PredictionMatrix::new(length, columns).unwrap()
    }

    #[test]
    fn test_fractions_and_majority() {
        let m = matrix(&[
            &[Some(true), Some(true), Some(false), Some(false)],
            &[Some(true), Some(true), Some(true), Some(false)],
            &[Some(false), Some(false), Some(false), Some(true)],
            &[None, None, None, None],
        ]);

        let consensus = MajorityConsensus::from_table(&m, &ThresholdTable::default());

        assert_eq!(consensus.fractions(), vec![Some(0.5), Some(0.75), Some(0.25), None]);
        // 2 of 4 reaches ceil(0.5 * 4) = 2
        assert!(consensus.residues[0].majority);
        assert!(consensus.residues[1].majority);
        assert!(!consensus.residues[2].majority);
        assert!(!consensus.residues[3].majority);
        assert_eq!(consensus.residues[3].votes, ResidueVotes { disordered: 0, called: 0 });
    }

    #[test]
    fn test_majority_track_is_not_smoothed() {
        let d = Some(true);
        let o = Some(false);
        let m = matrix(&[&[d, d], &[o, o], &[d, d], &[o, o], &[d, d]]);

        let track = MajorityConsensus::from_table(&m, &ThresholdTable::default()).track();
        // Isolated single residues survive; no gap bridging, no length filter
        assert_eq!(
            track.regions(),
            vec![Region::new(1, 1), Region::new(3, 3), Region::new(5, 5)]
        );
    }
}
