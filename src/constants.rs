//! Documented constants for speed-profile smoothing and motion detection.
//!
//! The smoothing defaults are the parameters the speed profiles were
//! tuned with on sprint footage sampled at a fixed frame rate.

// ============================================================================
// Trajectory Constants
// ============================================================================

/// Coordinate magnitude at or above which a raw sample is a dropout marker.
///
/// **Rationale**: Trajectory sources without an explicit validity flag mark
/// frames with no detection by writing a huge coordinate. Any sample whose
/// `|x| + |y| + |z|` reaches this value is read as `Sample::Missing`.
pub const SENTINEL_THRESHOLD: f64 = 1e17;

// ============================================================================
// Smoothing Defaults
// ============================================================================

/// Default full window for the sliding mean. Must be even; the half-window
/// on each side of a sample is `DEFAULT_MEAN_WINDOW / 2`.
pub const DEFAULT_MEAN_WINDOW: usize = 6;

/// Default median filter length. Must be odd.
///
/// **Rationale**: 11 frames reject single-frame detection spikes while
/// keeping the start-of-run acceleration phase visible.
pub const DEFAULT_MEDIAN_WINDOW: usize = 11;

/// Default Savitzky–Golay window length. Must be odd.
pub const DEFAULT_POLYFIT_WINDOW: usize = 13;

/// Default Savitzky–Golay polynomial degree. Must be below the window length.
///
/// **Rationale**: a degree-7 fit over 13 samples follows the stride-level
/// oscillation of the speed curve instead of flattening it like a boxcar.
pub const DEFAULT_POLYFIT_DEGREE: usize = 7;

// ============================================================================
// Motion Detection Defaults
// ============================================================================

/// Gaussian blur sigma applied to grayscale frames before differencing.
///
/// **Rationale**: equivalent to a 21x21 kernel with automatic sigma,
/// `0.3 * ((21 - 1) / 2 - 1) + 0.8 = 3.5`.
pub const MOTION_BLUR_SIGMA: f32 = 3.5;

/// Absolute difference above which a pixel is foreground.
pub const MOTION_DIFF_THRESHOLD: u8 = 20;

/// Number of 3x3 dilation passes over the threshold mask.
pub const MOTION_DILATE_ITERATIONS: u32 = 2;

/// Minimum area in pixels for the largest blob to count as a detection.
///
/// **Rationale**: 10 000 px is roughly a 100x100 region, the size of a runner
/// in 1080p footage filmed from the side of the track.
pub const MOTION_MIN_AREA_PX: u32 = 10_000;

/// Outline thickness used when drawing detections.
pub const BOX_THICKNESS_PX: u32 = 3;
