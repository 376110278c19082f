//! Speed-profile pipeline: segmentation, speed estimation, smoothing.

use crate::error::{PipelineError, ProfileError};
use crate::export::ProfileExporter;
use crate::segmentation;
use crate::smoothing::SmoothingBank;
use crate::speed;
use crate::types::{ProfileBundle, ProfileConfig, RefreshRate, SpeedSeries, Trajectory};

#[derive(Clone, Copy, Debug, Default)]
pub struct ProfilePipeline {
    bank: SmoothingBank,
}

impl ProfilePipeline {
    pub fn new(config: ProfileConfig) -> Self {
        Self {
            bank: SmoothingBank::new(config),
        }
    }

    pub fn config(&self) -> &ProfileConfig {
        self.bank.config()
    }

    /// Raw speed series and its frame indices, without smoothing.
    ///
    /// A trajectory with no pair of consecutive valid samples yields empty
    /// series rather than an error.
    pub fn compute_raw_only(
        &self,
        trajectory: &Trajectory,
        refresh_rate: f64,
    ) -> Result<(SpeedSeries, Vec<usize>), ProfileError> {
        // 1. Reject bad inputs before touching the samples
        let rate = RefreshRate::new(refresh_rate)?;
        if trajectory.len() < 2 {
            return Err(ProfileError::EmptyInput {
                len: trajectory.len(),
            });
        }

        // 2. Gap-aware displacements, then planar speed per step
        let displacements = segmentation::segment(trajectory);
        let raw = speed::estimate(&displacements, rate);
        let indices = raw.indices();

        log::debug!(
            "Estimated {} speed samples from {} trajectory frames",
            raw.len(),
            trajectory.len()
        );

        Ok((raw, indices))
    }

    /// Raw speed series plus its three smoothed versions.
    pub fn compute(
        &self,
        trajectory: &Trajectory,
        refresh_rate: f64,
    ) -> Result<ProfileBundle, ProfileError> {
        // 1. Length-independent config checks first, then the raw series
        self.config().validate()?;
        let (raw, _) = self.compute_raw_only(trajectory, refresh_rate)?;
        // No smoother is defined on an empty series
        if raw.is_empty() {
            return Err(ProfileError::NoValidPairs);
        }

        // 2. All three smoothers over the same raw series
        let smoothed = self.bank.apply(&raw)?;
        let len = raw.len();

        // 3. Assemble, enforcing equal lengths across the bundle
        let bundle = ProfileBundle::new(raw, smoothed.mean, smoothed.median, smoothed.polyfit)
            .ok_or_else(|| {
                ProfileError::invalid("smoothing", "smoothed series length differs from raw")
            })?;

        log::info!(
            "Computed speed profile: {} samples over frames {:?}..={:?}",
            len,
            bundle.indices().first(),
            bundle.indices().last()
        );

        Ok(bundle)
    }

    /// Compute the profile and hand it to `exporter` under `label`.
    pub fn compute_and_export(
        &self,
        trajectory: &Trajectory,
        refresh_rate: f64,
        exporter: &mut dyn ProfileExporter,
        label: &str,
    ) -> Result<ProfileBundle, PipelineError> {
        let bundle = self.compute(trajectory, refresh_rate)?;
        exporter.export_bundle(&bundle, label)?;
        Ok(bundle)
    }
}

/// One-shot [`ProfilePipeline::compute`].
pub fn compute_speed_profile(
    trajectory: &Trajectory,
    refresh_rate: f64,
    config: &ProfileConfig,
) -> Result<ProfileBundle, ProfileError> {
    ProfilePipeline::new(*config).compute(trajectory, refresh_rate)
}
