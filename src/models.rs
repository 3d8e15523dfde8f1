// ==============================================================================
// models.rs - Consensus Data Models
// ==============================================================================
// Description: Per-residue predictor calls, prediction matrix, tracks, regions
// Author: Matt Barham
// Created: 2026-09-28
// Modified: 2026-10-12
// Version: 1.1.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Maximum number of predictor columns in a single matrix
pub const MAX_PREDICTORS: usize = 8;

/// Disorder predictors combined by the consensus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Predictor {
    /// IUPred, long disorder mode
    #[serde(rename = "iupl")]
    IupredLong,
    /// IUPred, short disorder mode
    #[serde(rename = "iups")]
    IupredShort,
    /// ESpritz trained on DisProt
    #[serde(rename = "espD")]
    EspritzDisprot,
    /// ESpritz trained on NMR structures
    #[serde(rename = "espN")]
    EspritzNmr,
    /// ESpritz trained on X-ray structures
    #[serde(rename = "espX")]
    EspritzXray,
    /// GlobPlot
    #[serde(rename = "glo")]
    GlobPlot,
    /// DisEMBL, REMARK-465 definition
    #[serde(rename = "dis465")]
    Disembl465,
    /// DisEMBL, hot-loops definition
    #[serde(rename = "disHL")]
    DisemblHotLoops,
}

impl Predictor {
    /// The full MobiDB-lite predictor set, in canonical column order
    pub const ALL: [Predictor; MAX_PREDICTORS] = [
        Predictor::IupredLong,
        Predictor::IupredShort,
        Predictor::EspritzDisprot,
        Predictor::EspritzNmr,
        Predictor::EspritzXray,
        Predictor::GlobPlot,
        Predictor::Disembl465,
        Predictor::DisemblHotLoops,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Predictor::IupredLong => "iupl",
            Predictor::IupredShort => "iups",
            Predictor::EspritzDisprot => "espD",
            Predictor::EspritzNmr => "espN",
            Predictor::EspritzXray => "espX",
            Predictor::GlobPlot => "glo",
            Predictor::Disembl465 => "dis465",
            Predictor::DisemblHotLoops => "disHL",
        }
    }
}

impl fmt::Display for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group of predictors sharing one agreement threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorGroup {
    /// Full Voter + Refiner consensus (5 of 8 by default)
    MobidbLite,
    /// Unsmoothed simple majority
    Majority,
}

impl PredictorGroup {
    pub const ALL: [PredictorGroup; 2] = [PredictorGroup::MobidbLite, PredictorGroup::Majority];

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictorGroup::MobidbLite => "mobidb_lite",
            PredictorGroup::Majority => "majority",
        }
    }
}

/// Binary per-residue disorder state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisorderState {
    #[default]
    Ordered,
    Disordered,
}

impl DisorderState {
    pub fn is_disordered(&self) -> bool {
        matches!(self, DisorderState::Disordered)
    }
}

impl From<bool> for DisorderState {
    fn from(disordered: bool) -> Self {
        if disordered {
            DisorderState::Disordered
        } else {
            DisorderState::Ordered
        }
    }
}

/// One predictor's verdict at one residue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidueCall {
    pub disordered: bool,
    /// Raw predictor score, when the predictor reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl ResidueCall {
    pub fn disordered() -> Self {
        Self { disordered: true, score: None }
    }

    pub fn ordered() -> Self {
        Self { disordered: false, score: None }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// One predictor's aligned calls over the whole sequence (None = abstained)
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorColumn {
    pub predictor: Predictor,
    pub calls: Vec<Option<ResidueCall>>,
}

impl PredictorColumn {
    pub fn new(predictor: Predictor, calls: Vec<Option<ResidueCall>>) -> Self {
        Self { predictor, calls }
    }

    /// Build a column with a call at every residue
    pub fn from_states(predictor: Predictor, states: &[bool]) -> Self {
        Self {
            predictor,
            calls: states
                .iter()
                .map(|&d| Some(ResidueCall { disordered: d, score: None }))
                .collect(),
        }
    }
}

/// Errors raised while validating a prediction matrix
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Prediction matrix has no predictor columns")]
    EmptyMatrix,

    #[error("Too many predictor columns: {found} (max: 8)")]
    TooManyPredictors { found: usize },

    #[error("Predictor '{0}' appears more than once")]
    DuplicatePredictor(Predictor),

    #[error("Column '{predictor}' has {found} calls, expected {expected} (sequence length)")]
    ColumnLengthMismatch {
        predictor: Predictor,
        expected: usize,
        found: usize,
    },

    #[error("Non-binary call from '{predictor}' at residue {position}: {value}")]
    NonBinaryCall {
        predictor: Predictor,
        position: usize,
        value: String,
    },

    #[error("Non-finite score from '{predictor}' at residue {position}")]
    NonFiniteScore { predictor: Predictor, position: usize },
}

/// L x N table of per-residue calls for one protein
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionMatrix {
    length: usize,
    columns: Vec<PredictorColumn>,
}

impl PredictionMatrix {
    /// Validate columns against the sequence length
    ///
    /// # Arguments
    /// * `length` - Protein sequence length (L)
    /// * `columns` - One column per active predictor (N <= 8)
    ///
    /// # Returns
    /// * `Ok(PredictionMatrix)` - Every column has exactly L calls
    /// * `Err(InputError)` - Empty, oversized, duplicated or misaligned input
    pub fn new(length: usize, columns: Vec<PredictorColumn>) -> Result<Self, InputError> {
        if columns.is_empty() {
            return Err(InputError::EmptyMatrix);
        }
        if columns.len() > MAX_PREDICTORS {
            return Err(InputError::TooManyPredictors { found: columns.len() });
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.predictor) {
                return Err(InputError::DuplicatePredictor(column.predictor));
            }
            if column.calls.len() != length {
                return Err(InputError::ColumnLengthMismatch {
                    predictor: column.predictor,
                    expected: length,
                    found: column.calls.len(),
                });
            }
            for (idx, call) in column.calls.iter().enumerate() {
                if let Some(score) = call.and_then(|c| c.score) {
                    if !score.is_finite() {
                        return Err(InputError::NonFiniteScore {
                            predictor: column.predictor,
                            position: idx + 1,
                        });
                    }
                }
            }
        }

        Ok(Self { length, columns })
    }

    /// Sequence length (L)
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Active predictor count (N)
    pub fn predictor_count(&self) -> usize {
        self.columns.len()
    }

    pub fn predictors(&self) -> impl Iterator<Item = Predictor> + '_ {
        self.columns.iter().map(|c| c.predictor)
    }

    pub fn columns(&self) -> &[PredictorColumn] {
        &self.columns
    }

    /// Calls at a 0-based residue position, one per column
    pub fn residue(&self, position: usize) -> impl Iterator<Item = Option<&ResidueCall>> + '_ {
        self.columns.iter().map(move |c| c.calls[position].as_ref())
    }

    /// (disordered votes, calls present) at a 0-based position
    pub fn tally(&self, position: usize) -> ResidueVotes {
        let mut votes = ResidueVotes::default();
        for call in self.residue(position).flatten() {
            votes.called += 1;
            if call.disordered {
                votes.disordered += 1;
            }
        }
        votes
    }
}

/// Vote tally at one residue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidueVotes {
    /// Predictors calling the residue disordered (v)
    pub disordered: usize,
    /// Predictors that produced a call (n)
    pub called: usize,
}

impl ResidueVotes {
    /// v / n, or None when every predictor abstained
    pub fn fraction(&self) -> Option<f64> {
        if self.called == 0 {
            None
        } else {
            Some(self.disordered as f64 / self.called as f64)
        }
    }
}

/// Contiguous disordered stretch, 1-based inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Per-residue binary states for one protein (0-based)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsensusTrack {
    states: Vec<DisorderState>,
}

impl ConsensusTrack {
    pub fn new(states: Vec<DisorderState>) -> Self {
        Self { states }
    }

    pub fn all_ordered(length: usize) -> Self {
        Self { states: vec![DisorderState::Ordered; length] }
    }

    pub fn from_bools(states: &[bool]) -> Self {
        Self { states: states.iter().map(|&d| DisorderState::from(d)).collect() }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[DisorderState] {
        &self.states
    }

    pub fn is_disordered(&self, position: usize) -> bool {
        self.states[position].is_disordered()
    }

    pub fn disordered_count(&self) -> usize {
        self.states.iter().filter(|s| s.is_disordered()).count()
    }

    /// Maximal disordered runs, sorted by start, 1-based inclusive
    pub fn regions(&self) -> Vec<Region> {
        let mut regions = Vec::new();
        let mut open: Option<usize> = None;

        for (idx, state) in self.states.iter().enumerate() {
            match (state.is_disordered(), open) {
                (true, None) => open = Some(idx),
                (false, Some(start)) => {
                    regions.push(Region::new(start + 1, idx));
                    open = None;
                }
                _ => {}
            }
        }
        if let Some(start) = open {
            regions.push(Region::new(start + 1, self.states.len()));
        }

        regions
    }

    pub fn into_states(self) -> Vec<DisorderState> {
        self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(pattern: &str) -> ConsensusTrack {
        ConsensusTrack::new(
            pattern
                .chars()
                .map(|c| DisorderState::from(c == 'D'))
                .collect(),
        )
    }

    #[test]
    fn test_regions_are_one_based_inclusive() {
        let t = track("..DDD...DD");
        assert_eq!(t.regions(), vec![Region::new(3, 5), Region::new(9, 10)]);
        assert_eq!(t.disordered_count(), 5);
    }

    #[test]
    fn test_regions_edge_cases() {
        assert!(track("").regions().is_empty());
        assert!(track("....").regions().is_empty());
        assert_eq!(track("DDDD").regions(), vec![Region::new(1, 4)]);
        assert_eq!(track("D..D").regions(), vec![Region::new(1, 1), Region::new(4, 4)]);
    }

    #[test]
    fn test_region_len() {
        assert_eq!(Region::new(6, 15).len(), 10);
        assert_eq!(Region::new(1, 1).len(), 1);
    }

    #[test]
    fn test_matrix_rejects_mismatched_columns() {
        let columns = vec![
            PredictorColumn::from_states(Predictor::IupredLong, &[true, false, true]),
            PredictorColumn::from_states(Predictor::GlobPlot, &[true, false]),
        ];

        let result = PredictionMatrix::new(3, columns);
        assert!(matches!(
            result,
            Err(InputError::ColumnLengthMismatch {
                predictor: Predictor::GlobPlot,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_matrix_rejects_empty_and_duplicates() {
        assert_eq!(PredictionMatrix::new(5, vec![]), Err(InputError::EmptyMatrix));

        let columns = vec![
            PredictorColumn::from_states(Predictor::IupredLong, &[true]),
            PredictorColumn::from_states(Predictor::IupredLong, &[false]),
        ];
        assert_eq!(
            PredictionMatrix::new(1, columns),
            Err(InputError::DuplicatePredictor(Predictor::IupredLong))
        );
    }

    #[test]
    fn test_matrix_rejects_non_finite_score() {
        let mut column = PredictorColumn::from_states(Predictor::EspritzNmr, &[false, false]);
        column.calls[1] = Some(ResidueCall::ordered().with_score(f64::NAN));

        assert_eq!(
            PredictionMatrix::new(2, vec![column]),
            Err(InputError::NonFiniteScore { predictor: Predictor::EspritzNmr, position: 2 })
        );
    }

    #[test]
    fn test_tally_excludes_abstentions() {
        let columns = vec![
            PredictorColumn::new(Predictor::IupredLong, vec![Some(ResidueCall::disordered())]),
            PredictorColumn::new(Predictor::IupredShort, vec![None]),
            PredictorColumn::new(Predictor::GlobPlot, vec![Some(ResidueCall::ordered())]),
        ];
        let matrix = PredictionMatrix::new(1, columns).unwrap();

        let votes = matrix.tally(0);
        assert_eq!(votes, ResidueVotes { disordered: 1, called: 2 });
        assert_eq!(votes.fraction(), Some(0.5));
        assert_eq!(ResidueVotes::default().fraction(), None);
    }

    #[test]
    fn test_predictor_names_round_trip_through_serde() {
        for predictor in Predictor::ALL {
            let json = serde_json::to_string(&predictor).unwrap();
            assert_eq!(json, format!("\"{}\"", predictor.as_str()));
        }
        assert_eq!(
            serde_json::to_string(&PredictorGroup::MobidbLite).unwrap(),
            "\"mobidb_lite\""
        );
    }
}
