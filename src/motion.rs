//! Frame-differencing motion detection against a static background.
//!
//! Each frame is reduced to blurred grayscale and compared with the first
//! processed frame. Pixels that changed by more than a threshold form a mask,
//! the mask is dilated to close small holes, and the largest 8-connected blob
//! is reported when it covers enough pixels.

use image::{imageops, DynamicImage, GrayImage, Luma};

use crate::constants::{
    MOTION_BLUR_SIGMA, MOTION_DIFF_THRESHOLD, MOTION_DILATE_ITERATIONS, MOTION_MIN_AREA_PX,
};
use crate::error::MotionError;

const FOREGROUND: u8 = 255;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionConfig {
    /// Leading frames to ignore before capturing the background.
    pub skip_frames: usize,
    /// Gaussian blur sigma applied before differencing.
    pub blur_sigma: f32,
    /// Differences strictly above this value are foreground.
    pub diff_threshold: u8,
    /// 3x3 dilation passes over the threshold mask.
    pub dilate_iterations: u32,
    /// The largest blob must cover strictly more pixels than this.
    pub min_area: u32,
}

impl MotionConfig {
    pub fn validate(&self) -> Result<(), MotionError> {
        if !self.blur_sigma.is_finite() || self.blur_sigma <= 0.0 {
            return Err(MotionError::InvalidParameter {
                name: "blur_sigma",
                reason: format!("must be a finite positive number, got {}", self.blur_sigma),
            });
        }
        Ok(())
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            skip_frames: 0,
            blur_sigma: MOTION_BLUR_SIGMA,
            diff_threshold: MOTION_DIFF_THRESHOLD,
            dilate_iterations: MOTION_DILATE_ITERATIONS,
            min_area: MOTION_MIN_AREA_PX,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Foreground pixel count of the blob.
    pub area: u32,
}

/// Diagnostic output for one processed frame.
#[derive(Clone, Debug)]
pub struct MotionFrame {
    pub diff: GrayImage,
    pub threshold: GrayImage,
    pub detection: Option<Detection>,
}

#[derive(Debug)]
pub struct MotionDetector {
    config: MotionConfig,
    background: Option<GrayImage>,
    frames_seen: usize,
}

impl MotionDetector {
    pub fn new(config: MotionConfig) -> Result<Self, MotionError> {
        config.validate()?;
        Ok(Self {
            config,
            background: None,
            frames_seen: 0,
        })
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    /// Forget the background; the next processed frame becomes the new one.
    pub fn reset(&mut self) {
        self.background = None;
    }

    /// Feed one frame.
    ///
    /// Returns `Ok(None)` for skipped frames and for the frame captured as
    /// background.
    pub fn process(&mut self, frame: &DynamicImage) -> Result<Option<MotionFrame>, MotionError> {
        self.frames_seen += 1;
        if self.frames_seen <= self.config.skip_frames {
            return Ok(None);
        }

        let gray = imageops::blur(&frame.to_luma8(), self.config.blur_sigma);

        let background = match &self.background {
            Some(background) => background,
            None => {
                log::debug!(
                    "Captured {}x{} background at frame {}",
                    gray.width(),
                    gray.height(),
                    self.frames_seen
                );
                self.background = Some(gray);
                return Ok(None);
            }
        };

        if background.dimensions() != gray.dimensions() {
            return Err(MotionError::DimensionMismatch {
                expected_width: background.width(),
                expected_height: background.height(),
                actual_width: gray.width(),
                actual_height: gray.height(),
            });
        }

        let diff = abs_diff(background, &gray);
        let mut mask = threshold(&diff, self.config.diff_threshold);
        for _ in 0..self.config.dilate_iterations {
            mask = dilate(&mask);
        }

        let detection = largest_blob(&mask).filter(|d| d.area > self.config.min_area);
        if let Some(d) = detection {
            log::debug!(
                "Frame {}: motion at {:?} ({} px)",
                self.frames_seen,
                d.bbox,
                d.area
            );
        }

        Ok(Some(MotionFrame {
            diff,
            threshold: mask,
            detection,
        }))
    }
}

fn abs_diff(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y).0[0].abs_diff(b.get_pixel(x, y).0[0])])
    })
}

fn threshold(diff: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(diff.width(), diff.height(), |x, y| {
        if diff.get_pixel(x, y).0[0] > level {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}

/// One pass of 3x3 max filtering.
fn dilate(mask: &GrayImage) -> GrayImage {
    let (w, h) = mask.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let x0 = x.saturating_sub(1);
        let y0 = y.saturating_sub(1);
        let x1 = (x + 1).min(w - 1);
        let y1 = (y + 1).min(h - 1);
        let hit = (y0..=y1).any(|ny| (x0..=x1).any(|nx| mask.get_pixel(nx, ny).0[0] != 0));
        Luma([if hit { FOREGROUND } else { 0 }])
    })
}

/// Largest 8-connected foreground component of `mask`.
fn largest_blob(mask: &GrayImage) -> Option<Detection> {
    let (w, h) = mask.dimensions();
    let mut visited = vec![false; (w as usize) * (h as usize)];
    let mut stack = Vec::new();
    let mut best: Option<Detection> = None;

    for sy in 0..h {
        for sx in 0..w {
            let start = (sy * w + sx) as usize;
            if visited[start] || mask.get_pixel(sx, sy).0[0] == 0 {
                continue;
            }

            visited[start] = true;
            stack.push((sx, sy));
            let (mut min_x, mut min_y, mut max_x, mut max_y) = (sx, sy, sx, sy);
            let mut area = 0u32;

            while let Some((x, y)) = stack.pop() {
                area += 1;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);

                for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                    for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                        let idx = (ny * w + nx) as usize;
                        if !visited[idx] && mask.get_pixel(nx, ny).0[0] != 0 {
                            visited[idx] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }

            if best.map_or(true, |b| area > b.area) {
                best = Some(Detection {
                    bbox: BoundingBox {
                        x: min_x,
                        y: min_y,
                        width: max_x - min_x + 1,
                        height: max_y - min_y + 1,
                    },
                    area,
                });
            }
        }
    }

    best
}
