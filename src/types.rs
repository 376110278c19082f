use std::ops::Sub;

use crate::constants::{
    DEFAULT_MEAN_WINDOW, DEFAULT_MEDIAN_WINDOW, DEFAULT_POLYFIT_DEGREE, DEFAULT_POLYFIT_WINDOW,
    SENTINEL_THRESHOLD,
};
use crate::error::ProfileError;

/// Position of the tracked object at one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Sub for Position {
    type Output = (f64, f64, f64);

    fn sub(self, rhs: Position) -> Self::Output {
        (self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// One trajectory entry. Frames with no detection are `Missing`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sample {
    Valid(Position),
    Missing,
}

impl Sample {
    /// Build a sample from raw coordinates using the dropout sentinel.
    ///
    /// The sample is `Missing` when `|x| + |y| + |z|` reaches
    /// [`SENTINEL_THRESHOLD`] or any coordinate is not finite.
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        let magnitude = x.abs() + y.abs() + z.abs();
        // NaN never compares below the threshold
        if magnitude < SENTINEL_THRESHOLD {
            Sample::Valid(Position::new(x, y, z))
        } else {
            Sample::Missing
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Sample::Valid(p) => Some(*p),
            Sample::Missing => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Sample::Valid(_))
    }
}

impl From<Position> for Sample {
    fn from(p: Position) -> Self {
        Sample::Valid(p)
    }
}

/// Per-frame samples of one tracked object; the index is the frame number.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    samples: Vec<Sample>,
}

impl Trajectory {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Build a trajectory from raw `[x, y, z]` triples, applying the sentinel.
    pub fn from_coords<I>(coords: I) -> Self
    where
        I: IntoIterator<Item = [f64; 3]>,
    {
        let samples = coords
            .into_iter()
            .map(|[x, y, z]| Sample::from_coords(x, y, z))
            .collect();
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn get(&self, frame: usize) -> Option<&Sample> {
        self.samples.get(frame)
    }
}

impl From<Vec<Sample>> for Trajectory {
    fn from(samples: Vec<Sample>) -> Self {
        Self::new(samples)
    }
}

/// Time step used to turn displacements into speeds.
///
/// Speeds are computed as `displacement / refresh_rate`, dividing by the
/// value exactly as given. A caller passing frames-per-second instead of the
/// per-frame time delta gets speeds scaled by `1 / fps²`; the naming is kept
/// from the trajectory sources and not reinterpreted here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefreshRate(f64);

impl RefreshRate {
    pub fn new(value: f64) -> Result<Self, ProfileError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ProfileError::invalid(
                "refresh_rate",
                format!("must be a finite positive number, got {}", value),
            ));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> f64 {
        self.0
    }
}

/// Step between two consecutive valid samples, tagged with the earlier frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Displacement {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub frame: usize,
}

/// Displacement per time step along each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
    /// Carried along for callers; the planar speed ignores it.
    pub vz: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedSample {
    /// Planar (XY) speed magnitude, never negative.
    pub speed: f64,
    /// Frame index of the earlier sample of the pair.
    pub frame: usize,
    pub velocity: Velocity,
}

/// Raw speed estimates in frame order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeedSeries {
    samples: Vec<SpeedSample>,
}

impl SpeedSeries {
    pub fn new(samples: Vec<SpeedSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[SpeedSample] {
        &self.samples
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.speed).collect()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.samples.iter().map(|s| s.frame).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SmoothingMethod {
    SlidingMean,
    Median,
    SavitzkyGolay,
}

impl SmoothingMethod {
    pub fn label(&self) -> &'static str {
        match self {
            SmoothingMethod::SlidingMean => "mean",
            SmoothingMethod::Median => "median",
            SmoothingMethod::SavitzkyGolay => "polyfit",
        }
    }
}

/// Output of one smoother, aligned position by position with its source.
#[derive(Clone, Debug, PartialEq)]
pub struct SmoothedSeries {
    method: SmoothingMethod,
    values: Vec<f64>,
}

impl SmoothedSeries {
    pub fn new(method: SmoothingMethod, values: Vec<f64>) -> Self {
        Self { method, values }
    }

    pub fn method(&self) -> SmoothingMethod {
        self.method
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Immutable result of one pipeline run. All series share one index domain.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileBundle {
    raw: SpeedSeries,
    mean: SmoothedSeries,
    median: SmoothedSeries,
    polyfit: SmoothedSeries,
    indices: Vec<usize>,
}

impl ProfileBundle {
    /// Assemble a bundle, returning `None` if any series length disagrees.
    pub(crate) fn new(
        raw: SpeedSeries,
        mean: SmoothedSeries,
        median: SmoothedSeries,
        polyfit: SmoothedSeries,
    ) -> Option<Self> {
        let n = raw.len();
        if mean.len() != n || median.len() != n || polyfit.len() != n {
            return None;
        }
        let indices = raw.indices();
        Some(Self {
            raw,
            mean,
            median,
            polyfit,
            indices,
        })
    }

    pub fn raw(&self) -> &SpeedSeries {
        &self.raw
    }

    pub fn mean(&self) -> &SmoothedSeries {
        &self.mean
    }

    pub fn median(&self) -> &SmoothedSeries {
        &self.median
    }

    pub fn polyfit(&self) -> &SmoothedSeries {
        &self.polyfit
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Smoothing parameters for the profile pipeline.
///
/// `new` rejects every constraint that does not depend on the series length.
/// Length-dependent checks (windows larger than the series) run per call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfileConfig {
    /// Full sliding-mean window; even, the half-window is `mean_window / 2`.
    pub mean_window: usize,
    /// Median filter length; odd.
    pub median_window: usize,
    /// Savitzky–Golay window length; odd.
    pub polyfit_window: usize,
    /// Savitzky–Golay polynomial degree; below `polyfit_window`.
    pub polyfit_degree: usize,
}

impl ProfileConfig {
    pub fn new(
        mean_window: usize,
        median_window: usize,
        polyfit_window: usize,
        polyfit_degree: usize,
    ) -> Result<Self, ProfileError> {
        let config = Self {
            mean_window,
            median_window,
            polyfit_window,
            polyfit_degree,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.mean_window == 0 || self.mean_window % 2 != 0 {
            return Err(ProfileError::invalid(
                "mean_window",
                format!("must be a positive even number, got {}", self.mean_window),
            ));
        }
        if self.median_window % 2 == 0 {
            return Err(ProfileError::invalid(
                "median_window",
                format!("must be odd, got {}", self.median_window),
            ));
        }
        if self.polyfit_window % 2 == 0 {
            return Err(ProfileError::invalid(
                "polyfit_window",
                format!("must be odd, got {}", self.polyfit_window),
            ));
        }
        if self.polyfit_degree >= self.polyfit_window {
            return Err(ProfileError::invalid(
                "polyfit_degree",
                format!(
                    "must be less than polyfit_window ({}), got {}",
                    self.polyfit_window, self.polyfit_degree
                ),
            ));
        }
        Ok(())
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            mean_window: DEFAULT_MEAN_WINDOW,
            median_window: DEFAULT_MEDIAN_WINDOW,
            polyfit_window: DEFAULT_POLYFIT_WINDOW,
            polyfit_degree: DEFAULT_POLYFIT_DEGREE,
        }
    }
}
