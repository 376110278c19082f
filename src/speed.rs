//! Planar speed estimation from displacements.

use crate::error::ProfileError;
use crate::types::{Displacement, RefreshRate, SpeedSample, SpeedSeries, Velocity};

/// Planar speed of every displacement, `sqrt((dx/r)² + (dy/r)²)`.
///
/// The index of each sample is inherited unchanged from its displacement.
pub fn estimate(displacements: &[Displacement], refresh_rate: RefreshRate) -> SpeedSeries {
    let r = refresh_rate.get();

    let samples = displacements
        .iter()
        .map(|d| {
            // The rate is the frame time step, used exactly as the caller passed it
            let velocity = Velocity {
                vx: d.dx / r,
                vy: d.dy / r,
                vz: d.dz / r,
            };
            // Planar magnitude only; vz is carried along but not part of the norm
            SpeedSample {
                speed: velocity.vx.hypot(velocity.vy),
                frame: d.frame,
                velocity,
            }
        })
        .collect();

    SpeedSeries::new(samples)
}

/// Like [`estimate`], validating a raw refresh rate first.
pub fn estimate_speeds(
    displacements: &[Displacement],
    refresh_rate: f64,
) -> Result<SpeedSeries, ProfileError> {
    Ok(estimate(displacements, RefreshRate::new(refresh_rate)?))
}
