//! C ABI for hosts that link the crate as a static library.
//!
//! Samples cross the boundary as plain coordinate triples; dropouts use the
//! legacy sentinel (`|x| + |y| + |z| >= 1e17`). Buffers returned in a
//! [`CSpeedProfile`] are owned by Rust and must be released with
//! [`free_speed_profile`].

use log::LevelFilter;

use crate::error::ProfileError;
use crate::pipeline::ProfilePipeline;
use crate::types::{ProfileConfig, Trajectory};

pub const STATUS_OK: i32 = 0;
pub const STATUS_INVALID_PARAMETER: i32 = 1;
pub const STATUS_EMPTY_INPUT: i32 = 2;
pub const STATUS_NO_VALID_PAIRS: i32 = 3;
pub const STATUS_NULL_POINTER: i32 = -1;

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct CSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct CProfileConfig {
    pub mean_window: u32,
    pub median_window: u32,
    pub polyfit_window: u32,
    pub polyfit_degree: u32,
}

impl Default for CProfileConfig {
    fn default() -> Self {
        let config = ProfileConfig::default();
        Self {
            mean_window: config.mean_window as u32,
            median_window: config.median_window as u32,
            polyfit_window: config.polyfit_window as u32,
            polyfit_degree: config.polyfit_degree as u32,
        }
    }
}

impl From<CProfileConfig> for ProfileConfig {
    fn from(c: CProfileConfig) -> Self {
        ProfileConfig {
            mean_window: c.mean_window as usize,
            median_window: c.median_window as usize,
            polyfit_window: c.polyfit_window as usize,
            polyfit_degree: c.polyfit_degree as usize,
        }
    }
}

/// Profile buffers of length `len`. Smoothed buffers are null for raw-only
/// results, every buffer is null when `status` is not `STATUS_OK`.
#[repr(C)]
pub struct CSpeedProfile {
    pub raw: *mut f64,
    pub mean: *mut f64,
    pub median: *mut f64,
    pub polyfit: *mut f64,
    pub indices: *mut u64,
    pub len: usize,
    pub status: i32,
}

impl CSpeedProfile {
    fn failed(status: i32) -> Self {
        Self {
            raw: std::ptr::null_mut(),
            mean: std::ptr::null_mut(),
            median: std::ptr::null_mut(),
            polyfit: std::ptr::null_mut(),
            indices: std::ptr::null_mut(),
            len: 0,
            status,
        }
    }
}

fn status_of(err: &ProfileError) -> i32 {
    match err {
        ProfileError::InvalidParameter { .. } => STATUS_INVALID_PARAMETER,
        ProfileError::EmptyInput { .. } => STATUS_EMPTY_INPUT,
        ProfileError::NoValidPairs => STATUS_NO_VALID_PAIRS,
    }
}

fn into_raw_buffer<T>(values: Vec<T>) -> *mut T {
    // Boxed slices have capacity == len, which free_buffer relies on
    Box::into_raw(values.into_boxed_slice()) as *mut T
}

unsafe fn free_buffer<T>(ptr: *mut T, len: usize) {
    if !ptr.is_null() {
        drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)));
    }
}

fn read_trajectory(samples_ptr: *const CSample, samples_len: usize) -> Option<Trajectory> {
    if samples_ptr.is_null() {
        return None;
    }
    let samples: &[CSample] = unsafe { std::slice::from_raw_parts(samples_ptr, samples_len) };
    Some(Trajectory::from_coords(samples.iter().map(|s| [s.x, s.y, s.z])))
}

#[no_mangle]
pub extern "C" fn compute_speed_profile(
    samples_ptr: *const CSample,
    samples_len: usize,
    refresh_rate: f64,
    config: CProfileConfig,
) -> CSpeedProfile {
    let Some(trajectory) = read_trajectory(samples_ptr, samples_len) else {
        log::warn!("compute_speed_profile called with a null sample buffer");
        return CSpeedProfile::failed(STATUS_NULL_POINTER);
    };

    match ProfilePipeline::new(config.into()).compute(&trajectory, refresh_rate) {
        Ok(bundle) => CSpeedProfile {
            raw: into_raw_buffer(bundle.raw().values()),
            mean: into_raw_buffer(bundle.mean().values().to_vec()),
            median: into_raw_buffer(bundle.median().values().to_vec()),
            polyfit: into_raw_buffer(bundle.polyfit().values().to_vec()),
            indices: into_raw_buffer(bundle.indices().iter().map(|&i| i as u64).collect()),
            len: bundle.len(),
            status: STATUS_OK,
        },
        Err(err) => {
            log::warn!("compute_speed_profile rejected input: {}", err);
            CSpeedProfile::failed(status_of(&err))
        }
    }
}

#[no_mangle]
pub extern "C" fn compute_raw_speed_profile(
    samples_ptr: *const CSample,
    samples_len: usize,
    refresh_rate: f64,
) -> CSpeedProfile {
    let Some(trajectory) = read_trajectory(samples_ptr, samples_len) else {
        log::warn!("compute_raw_speed_profile called with a null sample buffer");
        return CSpeedProfile::failed(STATUS_NULL_POINTER);
    };

    match ProfilePipeline::default().compute_raw_only(&trajectory, refresh_rate) {
        Ok((raw, indices)) => CSpeedProfile {
            len: raw.len(),
            raw: into_raw_buffer(raw.values()),
            mean: std::ptr::null_mut(),
            median: std::ptr::null_mut(),
            polyfit: std::ptr::null_mut(),
            indices: into_raw_buffer(indices.into_iter().map(|i| i as u64).collect()),
            status: STATUS_OK,
        },
        Err(err) => {
            log::warn!("compute_raw_speed_profile rejected input: {}", err);
            CSpeedProfile::failed(status_of(&err))
        }
    }
}

#[no_mangle]
pub extern "C" fn free_speed_profile(profile: CSpeedProfile) {
    // Reconstruct every boxed slice and let it drop
    unsafe {
        free_buffer(profile.raw, profile.len);
        free_buffer(profile.mean, profile.len);
        free_buffer(profile.median, profile.len);
        free_buffer(profile.polyfit, profile.len);
        free_buffer(profile.indices, profile.len);
    }
}

/// Verbosity: 0=off, 1=error, 2=warn, 3=info, 4=debug, 5=trace.
pub fn level_filter(level: i32) -> LevelFilter {
    match level {
        i32::MIN..=0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[no_mangle]
pub extern "C" fn speed_profile_set_log_level(level: i32) {
    log::set_max_level(level_filter(level));
}
