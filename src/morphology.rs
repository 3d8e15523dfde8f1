// ==============================================================================
// morphology.rs - Binary Mathematical Morphology
// ==============================================================================
// Description: Dilation, erosion and closing over a consensus track
// Author: Matt Barham
// Created: 2026-09-30
// Modified: 2026-10-10
// Version: 1.1.0
// ==============================================================================
// Structuring element: flat window of 2r + 1 residues centred on i.
//   dilation: i disordered iff any residue in the window is disordered
//   erosion:  i disordered iff every residue in the window is disordered
// Windows are clipped to the sequence, so neither step reads or writes
// outside [0, L-1].
// ==============================================================================

use crate::models::{ConsensusTrack, DisorderState};

/// Running count of disordered residues: prefix[j] = count over [0, j)
fn disordered_prefix(states: &[DisorderState]) -> Vec<usize> {
    let mut prefix = Vec::with_capacity(states.len() + 1);
    prefix.push(0);
    for state in states {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + usize::from(state.is_disordered()));
    }
    prefix
}

/// Apply `keep(disordered_in_window, window_len)` at every residue
fn sweep(track: &ConsensusTrack, radius: usize, keep: impl Fn(usize, usize) -> bool) -> ConsensusTrack {
    let states = track.states();
    let length = states.len();
    let prefix = disordered_prefix(states);

    let out = (0..length)
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(length - 1);
            let count = prefix[hi + 1] - prefix[lo];
            DisorderState::from(keep(count, hi + 1 - lo))
        })
        .collect();

    ConsensusTrack::new(out)
}

/// Grow every disordered run by `radius` on each side, capped at the ends
pub fn dilate(track: &ConsensusTrack, radius: usize) -> ConsensusTrack {
    sweep(track, radius, |count, _| count > 0)
}

/// Shrink every disordered run by `radius` on each side
///
/// Runs touching a sequence end are not shrunk at that end.
pub fn erode(track: &ConsensusTrack, radius: usize) -> ConsensusTrack {
    sweep(track, radius, |count, window| count == window)
}

/// Dilation followed by erosion
///
/// Bridges ordered gaps of at most `2 * radius` residues that sit between two
/// disordered residues. Region extents never grow: ordered stretches that
/// touch a sequence end stay ordered, and runs touching an end stay there.
///
/// # Examples
/// ```
/// use disorder_consensus::models::ConsensusTrack;
/// use disorder_consensus::morphology::close;
///
/// let raw = ConsensusTrack::from_bools(&[false, true, true, false, false, true, false]);
/// let closed = close(&raw, 1);
/// assert_eq!(
///     closed,
///     ConsensusTrack::from_bools(&[false, true, true, true, true, true, false])
/// );
/// ```
pub fn close(track: &ConsensusTrack, radius: usize) -> ConsensusTrack {
    let length = track.len();
    if radius == 0 || length == 0 {
        return track.clone();
    }

    // Extend each end with copies of its edge residue so the erosion window
    // never leans on the clipped boundary
    let states = track.states();
    let mut padded = Vec::with_capacity(length + 2 * radius);
    padded.extend(std::iter::repeat(states[0]).take(radius));
    padded.extend_from_slice(states);
    padded.extend(std::iter::repeat(states[length - 1]).take(radius));

    let closed = erode(&dilate(&ConsensusTrack::new(padded), radius), radius);
    ConsensusTrack::new(closed.states()[radius..radius + length].to_vec())
}
