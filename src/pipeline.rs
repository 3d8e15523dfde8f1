// ==============================================================================
// pipeline.rs - Consensus Pipeline
// ==============================================================================
// Description: Voter -> Refiner (-> Majority) over one protein's predictions
// Author: Matt Barham
// Created: 2026-10-02
// Modified: 2026-10-14
// Version: 1.2.0
// ==============================================================================

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, ConsensusConfig, ConsensusSettings};
use crate::majority::MajorityConsensus;
use crate::models::{ConsensusTrack, InputError, PredictionMatrix, PredictorGroup, Region, ResidueVotes};
use crate::refiner::Refiner;
use crate::voter::{Diagnostic, Voter};

/// Errors surfaced by the consensus engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsensusError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Only {found} predictors produced output, {required} required (use force to override)")]
    InsufficientPredictors { found: usize, required: usize },
}

/// Everything the formatting layer needs for one protein
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusResult {
    /// Final per-residue states after closing and filtering
    pub track: ConsensusTrack,
    /// Disordered regions, 1-based inclusive
    pub regions: Vec<Region>,
    /// Voter tallies per residue
    pub votes: Vec<ResidueVotes>,
    /// Disordered residues in the final track
    pub content_count: usize,
    /// content_count / L (0 for an empty sequence)
    pub content_fraction: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub majority: Option<MajorityConsensus>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Validated, reusable consensus pipeline
///
/// Holds no per-protein state; one instance can serve any number of proteins,
/// from any number of threads.
#[derive(Debug, Clone)]
pub struct ConsensusPipeline {
    config: ConsensusConfig,
    voter: Voter,
    refiner: Refiner,
}

impl ConsensusPipeline {
    pub fn new(config: ConsensusConfig) -> Self {
        let voter = Voter::for_group(&config.thresholds, PredictorGroup::MobidbLite);
        let refiner = Refiner::new(config.radius, config.min_region_length);
        Self { config, voter, refiner }
    }

    /// Validate raw settings and build the pipeline
    ///
    /// # Returns
    /// * `Ok(ConsensusPipeline)` - Settings are usable
    /// * `Err(ConsensusError::Configuration)` - Bad quorum, radius, length or count
    pub fn from_settings(settings: &ConsensusSettings) -> Result<Self, ConsensusError> {
        Ok(Self::new(settings.validate()?))
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Run the full consensus over one protein
    ///
    /// # Arguments
    /// * `matrix` - Validated prediction matrix for the protein
    ///
    /// # Returns
    /// * `Ok(ConsensusResult)` - Final track, regions, tallies
    /// * `Err(ConsensusError::InsufficientPredictors)` - Too few predictors and not forced
    pub fn run(&self, matrix: &PredictionMatrix) -> Result<ConsensusResult, ConsensusError> {
        let found = matrix.predictor_count();
        if found < self.config.min_predictors {
            if !self.config.force {
                return Err(ConsensusError::InsufficientPredictors {
                    found,
                    required: self.config.min_predictors,
                });
            }
            info!(
                "Forcing consensus with {} of {} predictors",
                found, self.config.min_predictors
            );
        }

        let outcome = self.voter.vote(matrix);
        let refined = self.refiner.refine(&outcome.track);

        let majority = self
            .config
            .majority
            .then(|| MajorityConsensus::from_table(matrix, &self.config.thresholds));

        let content_count = refined.track.disordered_count();
        let content_fraction = if matrix.is_empty() {
            0.0
        } else {
            content_count as f64 / matrix.len() as f64
        };

        debug!(
            "Consensus over {} residues: {} regions, {} disordered ({:.3})",
            matrix.len(),
            refined.regions.len(),
            content_count,
            content_fraction
        );

        Ok(ConsensusResult {
            track: refined.track,
            regions: refined.regions,
            votes: outcome.votes,
            content_count,
            content_fraction,
            majority,
            diagnostics: outcome.diagnostics,
        })
    }
}

impl Default for ConsensusPipeline {
    fn default() -> Self {
        Self::new(ConsensusConfig::default())
    }
}
