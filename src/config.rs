// ==============================================================================
// config.rs - Consensus Configuration
// ==============================================================================
// Description: Quorum thresholds, morphology parameters, startup validation
// Author: Matt Barham
// Created: 2026-09-28
// Modified: 2026-10-12
// Version: 1.1.0
// ==============================================================================
// Settings are deserialized as-is (signed integers, raw fractions) and then
// validated once into ConsensusConfig. Nothing downstream re-checks them.
// ==============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::models::{PredictorGroup, MAX_PREDICTORS};

/// Default agreement for the full consensus: 5 of 8 predictors
pub const DEFAULT_QUORUM: f64 = 5.0 / 8.0;

/// Default agreement for the simple majority consensus
pub const DEFAULT_MAJORITY_QUORUM: f64 = 0.5;

/// Default structuring-element radius for dilation/erosion
pub const DEFAULT_RADIUS: i64 = 2;

/// Default minimum length of a reported disordered region
pub const DEFAULT_MIN_REGION_LENGTH: i64 = 20;

// Absorbs float error in q * n (e.g. 0.6 * 5 = 3.0000000000000004)
const QUORUM_EPSILON: f64 = 1e-9;

/// Errors raised while validating consensus settings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Quorum for group '{group}' must be within [0, 1], got {value}")]
    QuorumOutOfRange { group: &'static str, value: f64 },

    #[error("No quorum configured for group '{0}'")]
    MissingQuorum(&'static str),

    #[error("Structuring-element radius must be non-negative, got {0}")]
    NegativeRadius(i64),

    #[error("Minimum region length must be non-negative, got {0}")]
    NegativeMinRegionLength(i64),

    #[error("Minimum predictor count must be within 1..=8, got {0}")]
    MinPredictorsOutOfRange(usize),
}

/// Agreement fraction in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Quorum(f64);

impl Quorum {
    pub fn new(group: PredictorGroup, value: f64) -> Result<Self, ConfigError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::QuorumOutOfRange { group: group.as_str(), value });
        }
        Ok(Self(value))
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }

    /// Votes needed among `called` predictors: ceil(q * n)
    ///
    /// # Examples
    /// ```
    /// use disorder_consensus::config::Quorum;
    /// use disorder_consensus::models::PredictorGroup;
    ///
    /// let q = Quorum::new(PredictorGroup::MobidbLite, 0.625).unwrap();
    /// assert_eq!(q.required_votes(8), 5);
    /// assert_eq!(q.required_votes(6), 4);
    /// assert_eq!(q.required_votes(0), 0);
    /// ```
    pub fn required_votes(&self, called: usize) -> usize {
        let exact = self.0 * called as f64;
        (exact - QUORUM_EPSILON).ceil().max(0.0) as usize
    }

    /// Quorum test for a single residue; never met when nothing was called
    pub fn is_met(&self, disordered: usize, called: usize) -> bool {
        called > 0 && disordered >= self.required_votes(called)
    }
}

/// Validated quorum per predictor group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdTable {
    quorums: BTreeMap<PredictorGroup, Quorum>,
}

impl ThresholdTable {
    /// Build a table; every group must be present and within [0, 1]
    pub fn new(entries: impl IntoIterator<Item = (PredictorGroup, f64)>) -> Result<Self, ConfigError> {
        let mut quorums = BTreeMap::new();
        for (group, value) in entries {
            quorums.insert(group, Quorum::new(group, value)?);
        }

        for group in PredictorGroup::ALL {
            if !quorums.contains_key(&group) {
                return Err(ConfigError::MissingQuorum(group.as_str()));
            }
        }

        Ok(Self { quorums })
    }

    pub fn quorum(&self, group: PredictorGroup) -> Quorum {
        // Every group is present after construction
        self.quorums[&group]
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            quorums: BTreeMap::from([
                (PredictorGroup::MobidbLite, Quorum(DEFAULT_QUORUM)),
                (PredictorGroup::Majority, Quorum(DEFAULT_MAJORITY_QUORUM)),
            ]),
        }
    }
}

/// Raw consensus settings as read from a JSON config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsensusSettings {
    /// Agreement fraction per predictor group
    pub thresholds: BTreeMap<PredictorGroup, f64>,

    /// Dilation/erosion radius (r)
    pub radius: i64,

    /// Regions shorter than this are dropped (m)
    pub min_region_length: i64,

    /// Predictor columns required before a consensus is computed
    pub min_predictors: usize,

    /// Compute the consensus even when fewer than `min_predictors` ran
    pub force: bool,

    /// Also compute the unsmoothed majority consensus
    pub majority: bool,
}

impl Default for ConsensusSettings {
    fn default() -> Self {
        Self {
            thresholds: BTreeMap::from([
                (PredictorGroup::MobidbLite, DEFAULT_QUORUM),
                (PredictorGroup::Majority, DEFAULT_MAJORITY_QUORUM),
            ]),
            radius: DEFAULT_RADIUS,
            min_region_length: DEFAULT_MIN_REGION_LENGTH,
            min_predictors: MAX_PREDICTORS,
            force: false,
            majority: false,
        }
    }
}

impl ConsensusSettings {
    /// Load settings from a JSON file; missing fields take defaults
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let settings: ConsensusSettings = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        debug!("Loaded consensus settings from {:?}: {:?}", path, settings);
        Ok(settings)
    }

    /// Validate into an immutable configuration
    pub fn validate(&self) -> Result<ConsensusConfig, ConfigError> {
        // Missing groups fall back to their defaults
        let mut merged = ConsensusSettings::default().thresholds;
        merged.extend(self.thresholds.iter().map(|(g, q)| (*g, *q)));
        let thresholds = ThresholdTable::new(merged)?;

        if self.radius < 0 {
            return Err(ConfigError::NegativeRadius(self.radius));
        }
        if self.min_region_length < 0 {
            return Err(ConfigError::NegativeMinRegionLength(self.min_region_length));
        }
        if self.min_predictors == 0 || self.min_predictors > MAX_PREDICTORS {
            return Err(ConfigError::MinPredictorsOutOfRange(self.min_predictors));
        }

        Ok(ConsensusConfig {
            thresholds,
            radius: self.radius as usize,
            min_region_length: self.min_region_length as usize,
            min_predictors: self.min_predictors,
            force: self.force,
            majority: self.majority,
        })
    }
}

/// Validated consensus configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusConfig {
    pub thresholds: ThresholdTable,
    pub radius: usize,
    pub min_region_length: usize,
    pub min_predictors: usize,
    pub force: bool,
    pub majority: bool,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdTable::default(),
            radius: DEFAULT_RADIUS as usize,
            min_region_length: DEFAULT_MIN_REGION_LENGTH as usize,
            min_predictors: MAX_PREDICTORS,
            force: false,
            majority: false,
        }
    }
}

impl TryFrom<ConsensusSettings> for ConsensusConfig {
    type Error = ConfigError;

    fn try_from(settings: ConsensusSettings) -> Result<Self, Self::Error> {
        settings.validate()
    }
}
