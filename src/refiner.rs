// ==============================================================================
// refiner.rs - Morphological Track Refinement
// ==============================================================================
// Description: Closing plus short-region filtering over a raw consensus track
// Author: Matt Barham
// Created: 2026-09-30
// Modified: 2026-10-10
// Version: 1.0.0
// ==============================================================================

use serde::Serialize;
use tracing::debug;

use crate::models::{ConsensusTrack, DisorderState, Region};
use crate::morphology;

/// Final track and the regions derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefinedTrack {
    pub track: ConsensusTrack,
    pub regions: Vec<Region>,
}

/// Closing with radius `r`, then removal of regions shorter than `m`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refiner {
    radius: usize,
    min_region_length: usize,
}

impl Refiner {
    pub fn new(radius: usize, min_region_length: usize) -> Self {
        Self { radius, min_region_length }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn min_region_length(&self) -> usize {
        self.min_region_length
    }

    /// Smooth a raw track and drop short regions
    ///
    /// # Arguments
    /// * `raw` - Track produced by the voter
    ///
    /// # Returns
    /// * `RefinedTrack` - Final track and its regions (each at least `m` long)
    pub fn refine(&self, raw: &ConsensusTrack) -> RefinedTrack {
        let closed = morphology::close(raw, self.radius);
        let track = filter_short_regions(&closed, self.min_region_length);
        let regions = track.regions();

        debug!(
            "Refined track (r={}, m={}): {} -> {} disordered residues, {} regions",
            self.radius,
            self.min_region_length,
            raw.disordered_count(),
            track.disordered_count(),
            regions.len()
        );

        RefinedTrack { track, regions }
    }
}

/// Revert every region shorter than `min_length` to ordered
pub fn filter_short_regions(track: &ConsensusTrack, min_length: usize) -> ConsensusTrack {
    let mut states = track.states().to_vec();

    for region in track.regions() {
        if region.len() < min_length {
            // Regions are 1-based inclusive
            for state in &mut states[region.start - 1..region.end] {
                *state = DisorderState::Ordered;
            }
        }
    }

    ConsensusTrack::new(states)
}
