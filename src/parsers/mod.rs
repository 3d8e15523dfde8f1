// ==============================================================================
// parsers/mod.rs - Input parser modules
// ==============================================================================
// Description: Parsers for predictor output handed to the consensus engine
// Author: Matt Barham
// Created: 2026-10-03
// Modified: 2026-10-03
// Version: 1.0.0
// ==============================================================================

pub mod predictions;

pub use predictions::{PredictionParseError, PredictionParser, ProteinPredictions};
