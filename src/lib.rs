//! Speed profiles from tracked trajectories.
//!
//! A trajectory is a per-frame list of 3D positions where frames without a
//! detection are `Missing`. The pipeline turns it into a planar speed series
//! and three smoothed versions of it (sliding mean, median, Savitzky–Golay),
//! all aligned on the frame index of the earlier sample of each step.
//!
//! ```ignore
//! use speed_profile_processor::{ProfileConfig, ProfilePipeline, Trajectory};
//!
//! let trajectory = Trajectory::from_coords(positions);
//! let bundle = ProfilePipeline::new(ProfileConfig::default()).compute(&trajectory, 0.04)?;
//! for (frame, speed) in bundle.indices().iter().zip(bundle.polyfit().values()) {
//!     println!("{frame}: {speed:.2}");
//! }
//! ```
//!
//! The `motion` module holds a separate frame-differencing detector used to
//! locate the tracked object in video frames.

pub mod constants;
pub mod error;
pub mod export;
pub mod ffi;
pub mod motion;
pub mod pipeline;
pub mod renderer;
pub mod segmentation;
pub mod smoothing;
pub mod speed;
pub mod types;


pub use error::{ExportError, MotionError, PipelineError, ProfileError};
pub use export::{CsvExporter, ProfileExporter};
pub use motion::{BoundingBox, Detection, MotionConfig, MotionDetector, MotionFrame};
pub use pipeline::{compute_speed_profile, ProfilePipeline};
pub use smoothing::{median_filter, savitzky_golay, sliding_mean, SmoothingBank};
pub use types::{
    Displacement, Position, ProfileBundle, ProfileConfig, RefreshRate, Sample, SmoothedSeries,
    SmoothingMethod, SpeedSample, SpeedSeries, Trajectory, Velocity,
};
