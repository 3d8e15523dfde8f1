// ==============================================================================
// lib.rs - Disorder Consensus Library
// ==============================================================================
// Description: Library interface for the disorder consensus engine
// Author: Matt Barham
// Created: 2026-09-28
// Modified: 2026-10-14
// Version: 1.2.0
// ==============================================================================

pub mod models;
pub mod config;
pub mod voter;
pub mod morphology;
pub mod refiner;
pub mod majority;
pub mod pipeline;
pub mod parsers;
pub mod output;
pub mod processor;

pub use config::{ConfigError, ConsensusConfig, ConsensusSettings, Quorum, ThresholdTable};
pub use majority::MajorityConsensus;
pub use models::{
    ConsensusTrack, DisorderState, InputError, PredictionMatrix, Predictor, PredictorColumn,
    PredictorGroup, Region, ResidueCall, ResidueVotes,
};
pub use pipeline::{ConsensusError, ConsensusPipeline, ConsensusResult};
pub use refiner::{RefinedTrack, Refiner};
pub use voter::{Diagnostic, VoteOutcome, Voter};
