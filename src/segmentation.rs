//! Gap-aware segmentation of a trajectory into per-step displacements.

use std::ops::Range;

use crate::types::{Displacement, Sample, Trajectory};

/// Displacements between every pair of adjacent valid samples.
///
/// A pair touching a `Missing` sample is dropped outright. Each displacement
/// is tagged with the frame index of the earlier sample.
pub fn segment(trajectory: &Trajectory) -> Vec<Displacement> {
    let samples = trajectory.samples();
    let mut displacements = Vec::with_capacity(samples.len().saturating_sub(1));

    // Window index doubles as the frame of the earlier sample
    for (frame, pair) in samples.windows(2).enumerate() {
        // No interpolation across a gap: both endpoints must be observed
        if let (Sample::Valid(curr), Sample::Valid(next)) = (pair[0], pair[1]) {
            let (dx, dy, dz) = next - curr;
            displacements.push(Displacement { dx, dy, dz, frame });
        }
    }

    // Every pair not emitted touched at least one missing sample
    let dropped = samples.len().saturating_sub(1) - displacements.len();
    if dropped > 0 {
        log::debug!(
            "Segmentation dropped {} of {} frame pairs touching missing samples",
            dropped,
            samples.len() - 1
        );
    }

    displacements
}

/// Maximal runs of consecutive valid frames, in frame order.
pub fn valid_runs(trajectory: &Trajectory) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;

    for (frame, sample) in trajectory.samples().iter().enumerate() {
        // Open a run on the first valid frame, close it on the next gap
        match (sample.is_valid(), start) {
            (true, None) => start = Some(frame),
            (false, Some(s)) => {
                runs.push(s..frame);
                start = None;
            }
            _ => {}
        }
    }
    // Trajectory ended inside a run
    if let Some(s) = start {
        runs.push(s..trajectory.len());
    }

    runs
}
