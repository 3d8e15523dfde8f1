// ==============================================================================
// processor.rs - Batch Consensus Processing
// ==============================================================================
// Description: Runs the consensus pipeline over every protein in a hand-off file
// Author: Matt Barham
// Created: 2026-10-05
// Modified: 2026-10-14
// Version: 1.1.0
// ==============================================================================
// Proteins are independent: each one is computed on a blocking task and the
// results are written back in input order.
// ==============================================================================

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::output::{OutputWriter, ProteinConsensus, RunSummary};
use crate::parsers::{PredictionParser, ProteinPredictions};
use crate::pipeline::{ConsensusError, ConsensusPipeline};

/// Outcome for a single protein
#[derive(Debug, Clone, PartialEq)]
pub enum ProteinOutcome {
    Computed(ProteinConsensus),
    /// No predictor produced output for this protein
    NoPredictions,
    /// Fewer predictors than required and consensus not forced
    Insufficient { found: usize, required: usize },
}

/// Run the pipeline for one protein
pub fn process_protein(
    pipeline: &ConsensusPipeline,
    protein: &ProteinPredictions,
) -> Result<ProteinOutcome, ConsensusError> {
    let Some(matrix) = &protein.matrix else {
        return Ok(ProteinOutcome::NoPredictions);
    };

    match pipeline.run(matrix) {
        Ok(result) => Ok(ProteinOutcome::Computed(ProteinConsensus::new(&protein.accession, result))),
        Err(ConsensusError::InsufficientPredictors { found, required }) => {
            Ok(ProteinOutcome::Insufficient { found, required })
        }
        Err(e) => Err(e),
    }
}

pub struct ConsensusProcessor {
    pipeline: Arc<ConsensusPipeline>,
    max_concurrency: usize,
}

impl ConsensusProcessor {
    pub fn new(pipeline: ConsensusPipeline, max_concurrency: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Parse a hand-off file and write one consensus line per protein
    pub async fn process_file(&self, input: &Path, writer: &mut OutputWriter) -> Result<RunSummary> {
        let proteins = PredictionParser::parse(input)
            .with_context(|| format!("Failed to parse predictions from {:?}", input))?;
        self.process(proteins, writer).await
    }

    /// Main processing loop
    ///
    /// # Arguments
    /// * `proteins` - Parsed hand-off records, in input order
    /// * `writer` - Destination for computed consensus lines
    ///
    /// # Returns
    /// * `RunSummary` - Input, output and skipped counts for the run
    pub async fn process(
        &self,
        proteins: Vec<ProteinPredictions>,
        writer: &mut OutputWriter,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::start();
        summary.input_count = proteins.len();

        info!(
            "Starting consensus run {} over {} proteins (concurrency {})",
            summary.run_id, summary.input_count, self.max_concurrency
        );

        let mut remaining = proteins.into_iter().peekable();
        while remaining.peek().is_some() {
            // Fan one batch out, then collect in order
            let handles: Vec<_> = remaining
                .by_ref()
                .take(self.max_concurrency)
                .map(|protein| {
                    let pipeline = Arc::clone(&self.pipeline);
                    tokio::task::spawn_blocking(move || {
                        let outcome = process_protein(&pipeline, &protein);
                        (protein.accession, outcome)
                    })
                })
                .collect();

            for handle in handles {
                let (accession, outcome) = handle.await.context("Consensus task panicked")?;
                let outcome = outcome.with_context(|| format!("Consensus failed for {}", accession))?;

                match outcome {
                    ProteinOutcome::Computed(record) => {
                        debug!("{}: {} regions", accession, record.regions.len());
                        writer.write(&record)?;
                        summary.output_count += 1;
                    }
                    ProteinOutcome::NoPredictions => {
                        debug!("{}: no predictions, skipped", accession);
                        summary.skipped_count += 1;
                    }
                    ProteinOutcome::Insufficient { found, required } => {
                        warn!(
                            "{}: only {} of {} predictors available, skipped",
                            accession, found, required
                        );
                        summary.skipped_count += 1;
                    }
                }
            }
        }

        summary.finish();
        Ok(summary)
    }
}
