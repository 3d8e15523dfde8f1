// ==============================================================================
// voter.rs - Per-Residue Quorum Voting
// ==============================================================================
// Description: Turns a prediction matrix into a raw binary consensus track
// Author: Matt Barham
// Created: 2026-09-29
// Modified: 2026-10-08
// Version: 1.0.0
// ==============================================================================
// Algorithm:
//   For each residue i:
//   - v[i] = predictors calling i disordered, n[i] = predictors with a call
//   - disordered iff v[i] >= ceil(q * n[i])
//   - n[i] == 0 -> ordered, diagnostic recorded
// ==============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Quorum, ThresholdTable};
use crate::models::{ConsensusTrack, DisorderState, PredictionMatrix, PredictorGroup, ResidueVotes};

/// Non-fatal condition found while voting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Every predictor abstained; residue defaulted to ordered (1-based)
    AllAbstained { position: usize },
}

/// Raw track plus the tallies it was derived from
#[derive(Debug, Clone, PartialEq)]
pub struct VoteOutcome {
    pub track: ConsensusTrack,
    pub votes: Vec<ResidueVotes>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Quorum voter for one predictor group
#[derive(Debug, Clone, Copy)]
pub struct Voter {
    quorum: Quorum,
}

impl Voter {
    pub fn new(quorum: Quorum) -> Self {
        Self { quorum }
    }

    /// Voter for a group looked up in a validated threshold table
    pub fn for_group(table: &ThresholdTable, group: PredictorGroup) -> Self {
        Self::new(table.quorum(group))
    }

    pub fn quorum(&self) -> Quorum {
        self.quorum
    }

    /// Vote every residue of the matrix
    ///
    /// # Arguments
    /// * `matrix` - Validated L x N prediction matrix
    ///
    /// # Returns
    /// * `VoteOutcome` - Raw track, per-residue tallies, abstention diagnostics
    pub fn vote(&self, matrix: &PredictionMatrix) -> VoteOutcome {
        let length = matrix.len();
        let mut states = Vec::with_capacity(length);
        let mut votes = Vec::with_capacity(length);
        let mut diagnostics = Vec::new();

        for position in 0..length {
            let tally = matrix.tally(position);

            if tally.called == 0 {
                warn!("All predictors abstained at residue {}, defaulting to ordered", position + 1);
                diagnostics.push(Diagnostic::AllAbstained { position: position + 1 });
            }

            states.push(DisorderState::from(self.quorum.is_met(tally.disordered, tally.called)));
            votes.push(tally);
        }

        let track = ConsensusTrack::new(states);
        debug!(
            "Voted {} residues over {} predictors: {} disordered (quorum {:.3})",
            length,
            matrix.predictor_count(),
            track.disordered_count(),
            self.quorum.fraction()
        );

        VoteOutcome { track, votes, diagnostics }
    }
}
