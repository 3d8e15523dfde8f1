// ==============================================================================
// parsers/predictions.rs - Predictor Output Hand-off Parser
// ==============================================================================
// Description: Reads per-residue predictor calls handed over as JSON lines
// Author: Matt Barham
// Created: 2026-10-03
// Modified: 2026-10-14
// Version: 1.1.0
// ==============================================================================
// Format: one protein per line (plain or gzip-compressed)
// Example:
//   {"accession": "P04637", "sequence": "MEEPQ",
//    "predictions": {"iupl": [1, 1, 0, null, 0], "glo": [1, 0, 0, 0, 0]},
//    "scores": {"iupl": [0.71, 0.64, 0.32, null, 0.12]}}
// Calls: 1 = disordered, 0 = ordered, null = no call. true/false also accepted.
// ==============================================================================

use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{InputError, PredictionMatrix, Predictor, PredictorColumn, ResidueCall};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One protein's hand-off record
#[derive(Debug, Clone, PartialEq)]
pub struct ProteinPredictions {
    pub accession: String,
    pub sequence: String,
    /// None when no predictor produced output for this protein
    pub matrix: Option<PredictionMatrix>,
}

/// Errors that can occur while reading predictor hand-off files
#[derive(Error, Debug)]
pub enum PredictionParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON at line {line}: {source}")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid predictions for '{accession}' at line {line}: {source}")]
    InvalidInput {
        line: usize,
        accession: String,
        #[source]
        source: InputError,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProtein {
    accession: String,
    sequence: String,
    #[serde(default)]
    predictions: BTreeMap<Predictor, Vec<Value>>,
    #[serde(default)]
    scores: BTreeMap<Predictor, Vec<Option<f64>>>,
}

/// Parser for JSON-lines predictor hand-off files
pub struct PredictionParser;

impl PredictionParser {
    /// Parse a hand-off file, decompressing gzip input transparently
    ///
    /// # Arguments
    /// * `path` - Path to the JSON-lines file (`.jsonl` or `.jsonl.gz`)
    ///
    /// # Returns
    /// * `Ok(Vec<ProteinPredictions>)` - Records in file order
    /// * `Err(PredictionParseError)` - First malformed line
    pub fn parse(path: impl AsRef<Path>) -> Result<Vec<ProteinPredictions>, PredictionParseError> {
        let path = path.as_ref();
        info!("Parsing predictor hand-off file: {:?}", path);

        let reader = Self::open(File::open(path)?)?;
        Self::parse_reader(reader)
    }

    /// Wrap a raw stream, adding a gzip decoder when the magic number matches
    pub fn open<R: Read + 'static>(inner: R) -> Result<Box<dyn BufRead>, PredictionParseError> {
        let mut buffered = BufReader::new(inner);
        let is_gzip = buffered.fill_buf()?.starts_with(&GZIP_MAGIC);

        if is_gzip {
            debug!("Detected gzip-compressed input");
            Ok(Box::new(BufReader::new(GzDecoder::new(buffered))))
        } else {
            Ok(Box::new(buffered))
        }
    }

    /// Parse every non-blank line of an already-open stream
    pub fn parse_reader(reader: impl BufRead) -> Result<Vec<ProteinPredictions>, PredictionParseError> {
        let mut records = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(Self::parse_line(&line, idx + 1)?);
        }

        debug!("Parsed {} protein records", records.len());
        Ok(records)
    }

    /// Parse one JSON line into a validated record
    pub fn parse_line(line: &str, line_number: usize) -> Result<ProteinPredictions, PredictionParseError> {
        let raw: RawProtein = serde_json::from_str(line).map_err(|source| {
            PredictionParseError::InvalidJson { line: line_number, source }
        })?;

        let length = raw.sequence.chars().count();
        let matrix = Self::build_matrix(length, &raw.predictions, &raw.scores).map_err(|source| {
            PredictionParseError::InvalidInput {
                line: line_number,
                accession: raw.accession.clone(),
                source,
            }
        })?;

        Ok(ProteinPredictions {
            accession: raw.accession,
            sequence: raw.sequence,
            matrix,
        })
    }

    fn build_matrix(
        length: usize,
        predictions: &BTreeMap<Predictor, Vec<Value>>,
        scores: &BTreeMap<Predictor, Vec<Option<f64>>>,
    ) -> Result<Option<PredictionMatrix>, InputError> {
        if predictions.is_empty() {
            return Ok(None);
        }

        let mut columns = Vec::with_capacity(predictions.len());
        for (&predictor, values) in predictions {
            let mut calls = values
                .iter()
                .enumerate()
                .map(|(idx, value)| parse_call(predictor, idx + 1, value))
                .collect::<Result<Vec<_>, _>>()?;

            if let Some(column_scores) = scores.get(&predictor) {
                if column_scores.len() != calls.len() {
                    return Err(InputError::ColumnLengthMismatch {
                        predictor,
                        expected: calls.len(),
                        found: column_scores.len(),
                    });
                }
                for (call, score) in calls.iter_mut().zip(column_scores) {
                    if let Some(call) = call {
                        call.score = *score;
                    }
                }
            }

            columns.push(PredictorColumn::new(predictor, calls));
        }

        PredictionMatrix::new(length, columns).map(Some)
    }
}

/// 0/1/true/false/null -> call; anything else is rejected
fn parse_call(predictor: Predictor, position: usize, value: &Value) -> Result<Option<ResidueCall>, InputError> {
    let disordered = match value {
        Value::Null => return Ok(None),
        Value::Bool(b) => *b,
        Value::Number(n) => match n.as_u64() {
            Some(0) => false,
            Some(1) => true,
            _ => {
                return Err(InputError::NonBinaryCall {
                    predictor,
                    position,
                    value: n.to_string(),
                })
            }
        },
        other => {
            return Err(InputError::NonBinaryCall {
                predictor,
                position,
                value: other.to_string(),
            })
        }
    };

    Ok(Some(ResidueCall { disordered, score: None }))
}
