// ==============================================================================
// output.rs - Consensus Result Output
// ==============================================================================
// Description: Serializes per-protein consensus results as JSON lines
// Author: Matt Barham
// Created: 2026-10-04
// Modified: 2026-10-14
// Version: 1.1.0
// ==============================================================================
// Text formats (InterPro TSV, MobiDB, ...) are rendered downstream from these
// records; this module only carries the consensus values.
// ==============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::models::{DisorderState, Region};
use crate::pipeline::ConsensusResult;
use crate::voter::Diagnostic;

/// Consensus output for one protein
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinConsensus {
    pub accession: String,
    pub length: usize,
    /// Disordered regions, 1-based inclusive
    pub regions: Vec<Region>,
    pub content_count: usize,
    pub content_fraction: f64,
    /// Final per-residue states
    pub states: Vec<DisorderState>,
    /// Raw per-residue agreement, present when majority consensus was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl ProteinConsensus {
    pub fn new(accession: impl Into<String>, result: ConsensusResult) -> Self {
        Self {
            accession: accession.into(),
            length: result.track.len(),
            regions: result.regions,
            content_count: result.content_count,
            content_fraction: result.content_fraction,
            agreement: result.majority.map(|m| m.fractions()),
            states: result.track.into_states(),
            diagnostics: result.diagnostics,
        }
    }
}

/// Per-run counters, logged when the run finishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Proteins read from the input
    pub input_count: usize,
    /// Proteins with a consensus written out
    pub output_count: usize,
    /// Proteins skipped (no predictions, or too few predictors)
    pub skipped_count: usize,
}

impl RunSummary {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            input_count: 0,
            output_count: 0,
            skipped_count: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
        info!(
            "Run {} complete. Input seqs: {} Output count: {} Skipped: {}",
            self.run_id, self.input_count, self.output_count, self.skipped_count
        );
    }
}

enum Sink {
    Plain(BufWriter<Box<dyn Write + Send>>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Sink {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Sink::Plain(w) => w,
            Sink::Gzip(w) => w,
        }
    }
}

/// JSON-lines writer (stdout, plain file, or gzip when the path ends in .gz)
pub struct OutputWriter {
    sink: Sink,
    written: usize,
}

impl OutputWriter {
    /// Open `path`, or stdout when `path` is None
    pub fn create(path: Option<&Path>) -> Result<Self> {
        let sink = match path {
            None => Self::boxed(Box::new(std::io::stdout())),
            Some(p) => {
                let file = File::create(p)
                    .with_context(|| format!("Failed to create output file {:?}", p))?;
                if p.extension().is_some_and(|ext| ext == "gz") {
                    info!("Writing gzip-compressed output: {:?}", p);
                    Sink::Gzip(GzEncoder::new(BufWriter::new(file), Compression::default()))
                } else {
                    info!("Writing output: {:?}", p);
                    Self::boxed(Box::new(file))
                }
            }
        };

        Ok(Self { sink, written: 0 })
    }

    /// Write into any sink (uncompressed)
    pub fn from_writer(inner: Box<dyn Write + Send>) -> Self {
        Self { sink: Self::boxed(inner), written: 0 }
    }

    fn boxed(inner: Box<dyn Write + Send>) -> Sink {
        Sink::Plain(BufWriter::new(inner))
    }

    /// Append one protein as a single JSON line
    pub fn write(&mut self, record: &ProteinConsensus) -> Result<()> {
        let out = self.sink.writer();
        serde_json::to_writer(&mut *out, record)
            .with_context(|| format!("Failed to serialize consensus for {}", record.accession))?;
        out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered output and close the gzip stream
    pub fn finish(self) -> Result<usize> {
        match self.sink {
            Sink::Plain(mut w) => w.flush().context("Failed to flush consensus output")?,
            Sink::Gzip(w) => {
                w.finish()
                    .context("Failed to finish gzip output")?
                    .flush()
                    .context("Failed to flush consensus output")?;
            }
        }
        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PredictionMatrix, Predictor, PredictorColumn};
    use crate::pipeline::ConsensusPipeline;
    use crate::config::ConsensusSettings;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn sample_result(majority: bool) -> ConsensusResult {
        let states: Vec<bool> = (0..20).map(|i| (5..=14).contains(&i)).collect();
        let columns = Predictor::ALL
            .iter()
            .map(|&p| PredictorColumn::from_states(p, &states))
            .collect();
        let matrix = PredictionMatrix::new(20, columns).unwrap();

        let settings = ConsensusSettings { radius: 1, min_region_length: 8, majority, ..Default::default() };
        ConsensusPipeline::from_settings(&settings).unwrap().run(&matrix).unwrap()
    }

    #[test]
    fn test_protein_consensus_from_result() {
        let record = ProteinConsensus::new("P1", sample_result(true));

        assert_eq!(record.length, 20);
        assert_eq!(record.regions, vec![Region::new(6, 15)]);
        assert_eq!(record.content_count, 10);
        assert_eq!(record.states[5], DisorderState::Disordered);
        assert_eq!(record.agreement.as_ref().unwrap()[0], Some(0.0));
    }

    #[test]
    fn test_json_line_shape() {
        let record = ProteinConsensus::new("P1", sample_result(false));
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();

        assert_eq!(json["regions"][0]["start"], 6);
        assert_eq!(json["regions"][0]["end"], 15);
        assert_eq!(json["states"][0], "ordered");
        // Optional sections are omitted when empty
        assert!(json.get("agreement").is_none());
        assert!(json.get("diagnostics").is_none());
    }

    #[test]
    fn test_gzip_output() {
        let file = tempfile::Builder::new().suffix(".jsonl.gz").tempfile().unwrap();

        let mut writer = OutputWriter::create(Some(file.path())).unwrap();
        writer.write(&ProteinConsensus::new("P1", sample_result(false))).unwrap();
        writer.write(&ProteinConsensus::new("P2", sample_result(false))).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let mut text = String::new();
        GzDecoder::new(File::open(file.path()).unwrap())
            .read_to_string(&mut text)
            .unwrap();

        let lines: Vec<ProteinConsensus> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].accession, "P2");
    }

    #[test]
    fn test_run_summary_finish() {
        let mut summary = RunSummary::start();
        summary.input_count = 3;
        summary.output_count = 2;
        summary.skipped_count = 1;
        summary.finish();

        assert!(summary.finished_at.unwrap() >= summary.started_at);
    }
}
