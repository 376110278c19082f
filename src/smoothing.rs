// Speed-profile smoothing: sliding mean, median filter, Savitzky–Golay fit
use nalgebra::DMatrix;

use crate::error::ProfileError;
use crate::types::{ProfileConfig, SmoothedSeries, SmoothingMethod, SpeedSeries};

// ============================================================================
// Sliding Mean
// ============================================================================

fn check_sliding_mean(n: usize, window_for_mean: usize) -> Result<usize, ProfileError> {
    if window_for_mean == 0 || window_for_mean % 2 != 0 {
        return Err(ProfileError::invalid(
            "mean_window",
            format!("must be a positive even number, got {}", window_for_mean),
        ));
    }
    let half = window_for_mean / 2;
    if 2 * half >= n {
        return Err(ProfileError::invalid(
            "mean_window",
            format!(
                "half-window {} must be below half the series length {}",
                half, n
            ),
        ));
    }
    Ok(half)
}

/// Boxcar mean over `2w + 1` samples with `w = window_for_mean / 2`.
///
/// The first and last `w` samples are copied through unchanged rather than
/// averaged over a shrinking window.
pub fn sliding_mean(raw: &[f64], window_for_mean: usize) -> Result<Vec<f64>, ProfileError> {
    let half = check_sliding_mean(raw.len(), window_for_mean)?;
    let n = raw.len();
    let span = (2 * half + 1) as f64;

    let mut smoothed = raw.to_vec();
    for i in half..n - half {
        smoothed[i] = raw[i - half..=i + half].iter().sum::<f64>() / span;
    }

    Ok(smoothed)
}

// ============================================================================
// Median Filter
// ============================================================================

fn check_median(n: usize, kernel: usize) -> Result<(), ProfileError> {
    if kernel % 2 == 0 {
        return Err(ProfileError::invalid(
            "median_window",
            format!("must be odd, got {}", kernel),
        ));
    }
    if kernel > n {
        return Err(ProfileError::invalid(
            "median_window",
            format!("{} exceeds the series length {}", kernel, n),
        ));
    }
    Ok(())
}

/// Centered median over `kernel` samples; positions outside the series read as zero.
pub fn median_filter(raw: &[f64], kernel: usize) -> Result<Vec<f64>, ProfileError> {
    check_median(raw.len(), kernel)?;
    let n = raw.len() as isize;
    let half = (kernel / 2) as isize;

    let mut window = Vec::with_capacity(kernel);
    let smoothed = (0..n)
        .map(|i| {
            window.clear();
            window.extend((i - half..=i + half).map(|pos| {
                if pos < 0 || pos >= n {
                    0.0
                } else {
                    raw[pos as usize]
                }
            }));
            window.sort_by(f64::total_cmp);
            window[half as usize]
        })
        .collect();

    Ok(smoothed)
}

// ============================================================================
// Savitzky–Golay Filter
// ============================================================================

fn check_savitzky_golay(n: usize, window: usize, degree: usize) -> Result<(), ProfileError> {
    if window % 2 == 0 {
        return Err(ProfileError::invalid(
            "polyfit_window",
            format!("must be odd, got {}", window),
        ));
    }
    if degree >= window {
        return Err(ProfileError::invalid(
            "polyfit_degree",
            format!("must be less than the window length {}, got {}", window, degree),
        ));
    }
    if window > n {
        return Err(ProfileError::invalid(
            "polyfit_window",
            format!("{} exceeds the series length {}", window, n),
        ));
    }
    Ok(())
}

/// Local polynomial smoothing.
///
/// Interior samples take the value at the center of a least-squares
/// polynomial fitted over the centered window. The first and last
/// `window / 2` samples evaluate the fit over the first or last full window
/// at their own position.
pub fn savitzky_golay(
    raw: &[f64],
    window: usize,
    degree: usize,
) -> Result<Vec<f64>, ProfileError> {
    check_savitzky_golay(raw.len(), window, degree)?;
    let n = raw.len();
    let half = window / 2;

    // Every fit shares one window geometry, so one projection serves all of them
    let hat = projection(window, degree);
    let mut smoothed = vec![0.0; n];

    // 1. Interior: centered window, evaluated at its middle sample
    for i in half..n - half {
        smoothed[i] = weighted_sum(&hat, half, &raw[i - half..=i + half]);
    }

    // 2. Edges: first/last full window, evaluated at each edge position
    let head = &raw[..window];
    let tail = &raw[n - window..];
    for offset in 0..half {
        smoothed[offset] = weighted_sum(&hat, offset, head);
        smoothed[n - half + offset] = weighted_sum(&hat, window - half + offset, tail);
    }

    Ok(smoothed)
}

/// Least-squares projection onto polynomials of `degree` over `window`
/// equally spaced samples.
///
/// Row `k` holds the weights that evaluate the fitted polynomial at sample
/// `k`. Built as `Q·Qᵀ` from a Householder QR of the Vandermonde matrix, so
/// low-degree polynomials are reproduced to rounding error even when the
/// monomial basis is badly conditioned.
fn projection(window: usize, degree: usize) -> DMatrix<f64> {
    let half = window / 2;
    let scale = half.max(1) as f64;
    let vandermonde = DMatrix::from_fn(window, degree + 1, |j, k| {
        ((j as f64 - half as f64) / scale).powi(k as i32)
    });

    // degree < window, so Q is window x (degree + 1) with orthonormal columns
    let q = vandermonde.qr().q();
    &q * q.transpose()
}

fn weighted_sum(hat: &DMatrix<f64>, eval_at: usize, samples: &[f64]) -> f64 {
    hat.row(eval_at)
        .iter()
        .zip(samples)
        .map(|(w, y)| w * y)
        .sum()
}

// ============================================================================
// PUBLIC API: Smoothing Bank
// ============================================================================

/// The three smoothers of one profile, each aligned with the raw series.
#[derive(Clone, Debug, PartialEq)]
pub struct SmoothedProfiles {
    pub mean: SmoothedSeries,
    pub median: SmoothedSeries,
    pub polyfit: SmoothedSeries,
}

/// Applies the configured smoothers to raw speed series.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmoothingBank {
    config: ProfileConfig,
}

impl SmoothingBank {
    pub fn new(config: ProfileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Check every smoother's parameters against a series of length `n`.
    pub fn check(&self, n: usize) -> Result<(), ProfileError> {
        check_sliding_mean(n, self.config.mean_window)?;
        check_median(n, self.config.median_window)?;
        check_savitzky_golay(n, self.config.polyfit_window, self.config.polyfit_degree)
    }

    pub fn smooth(
        &self,
        method: SmoothingMethod,
        raw: &[f64],
    ) -> Result<SmoothedSeries, ProfileError> {
        let values = match method {
            SmoothingMethod::SlidingMean => sliding_mean(raw, self.config.mean_window)?,
            SmoothingMethod::Median => median_filter(raw, self.config.median_window)?,
            SmoothingMethod::SavitzkyGolay => savitzky_golay(
                raw,
                self.config.polyfit_window,
                self.config.polyfit_degree,
            )?,
        };
        Ok(SmoothedSeries::new(method, values))
    }

    /// Run all three smoothers over the same raw series.
    ///
    /// Parameters are checked for every smoother before any of them runs.
    pub fn apply(&self, raw: &SpeedSeries) -> Result<SmoothedProfiles, ProfileError> {
        let values = raw.values();
        self.check(values.len())?;

        Ok(SmoothedProfiles {
            mean: self.smooth(SmoothingMethod::SlidingMean, &values)?,
            median: self.smooth(SmoothingMethod::Median, &values)?,
            polyfit: self.smooth(SmoothingMethod::SavitzkyGolay, &values)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < EPSILON, "index {}: got {}, expected {}", i, a, e);
        }
    }

    #[test]
    fn test_sliding_mean_interior_and_boundary() {
        let raw = [1.0, 2.0, 4.0, 8.0, 16.0];
        let smoothed = sliding_mean(&raw, 2).unwrap();
        assert_eq!(smoothed[0], raw[0]);
        assert_eq!(smoothed[4], raw[4]);
        assert_close(&smoothed[1..4], &[7.0 / 3.0, 14.0 / 3.0, 28.0 / 3.0]);
    }

    #[test]
    fn test_sliding_mean_rejects_wide_window() {
        assert!(sliding_mean(&[1.0, 2.0, 3.0, 4.0], 4).is_err());
        assert!(sliding_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 4).is_ok());
        assert!(sliding_mean(&[1.0, 2.0, 3.0], 3).is_err());
        assert!(sliding_mean(&[1.0, 2.0, 3.0], 0).is_err());
    }

    #[test]
    fn test_median_zero_padding_at_edges() {
        let smoothed = median_filter(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_close(&smoothed, &[1.0, 2.0, 3.0, 4.0, 4.0]);

        let smoothed = median_filter(&[9.0, 1.0, 1.0, 1.0, 9.0], 5).unwrap();
        assert_close(&smoothed, &[1.0, 1.0, 1.0, 1.0, 1.0]);

        let smoothed = median_filter(&[-2.0, -2.0, -2.0, -2.0, -2.0], 5).unwrap();
        assert_close(&smoothed, &[-2.0; 5]);
    }

    #[test]
    fn test_median_rejects_spike() {
        let smoothed = median_filter(&[1.0, 1.0, 50.0, 1.0, 1.0, 1.0], 3).unwrap();
        assert_eq!(smoothed[2], 1.0);
    }

    #[test]
    fn test_median_parameter_errors() {
        assert!(median_filter(&[1.0; 12], 10).is_err());
        assert!(median_filter(&[1.0; 5], 7).is_err());
    }

    #[test]
    fn test_savitzky_golay_known_coefficients() {
        // Quadratic fit over 5 samples: (-3, 12, 17, 12, -3) / 35
        let mut impulse = vec![0.0; 9];
        impulse[4] = 1.0;
        let smoothed = savitzky_golay(&impulse, 5, 2).unwrap();
        assert_close(
            &smoothed[2..7],
            &[-3.0 / 35.0, 12.0 / 35.0, 17.0 / 35.0, 12.0 / 35.0, -3.0 / 35.0],
        );
    }

    #[test]
    fn test_savitzky_golay_reproduces_polynomial_edges() {
        let raw: Vec<f64> = (0..9)
            .map(|i| {
                let x = i as f64;
                0.5 * x * x - 2.0 * x + 3.0
            })
            .collect();
        let smoothed = savitzky_golay(&raw, 5, 2).unwrap();
        assert_close(&smoothed, &raw);
    }

    #[test]
    fn test_savitzky_golay_interp_edges_on_noisy_input() {
        // Edges come from the quadratic fitted to the first/last 5 samples
        let raw = [2.0, 5.0, 3.0, 8.0, 1.0, 7.0, 4.0];
        let smoothed = savitzky_golay(&raw, 5, 2).unwrap();
        assert_close(
            &smoothed,
            &[
                61.0 / 35.0,
                162.0 / 35.0,
                198.0 / 35.0,
                148.0 / 35.0,
                176.0 / 35.0,
                172.0 / 35.0,
                153.0 / 35.0,
            ],
        );
    }

    #[test]
    fn test_savitzky_golay_full_degree_reproduces_input() {
        let raw = [2.0, 5.0, 3.0, 8.0, 1.0, 7.0, 4.0, 6.0, 0.5];
        for (window, degree) in [(3, 2), (7, 6), (9, 8)] {
            let smoothed = savitzky_golay(&raw, window, degree).unwrap();
            for (i, (s, r)) in smoothed.iter().zip(&raw).enumerate() {
                assert!((s - r).abs() < 1e-9, "({}, {}) index {}", window, degree, i);
            }
        }
    }

    #[test]
    fn test_savitzky_golay_high_degree_preserves_line() {
        let raw: Vec<f64> = (0..60).map(|i| 0.25 * i as f64 - 3.0).collect();
        for (window, degree) in [(31, 20), (41, 30), (25, 24), (25, 16)] {
            let smoothed = savitzky_golay(&raw, window, degree).unwrap();
            for (i, (s, r)) in smoothed.iter().zip(&raw).enumerate() {
                assert!((s - r).abs() < 1e-6, "({}, {}) index {}", window, degree, i);
            }
        }
    }

    #[test]
    fn test_savitzky_golay_degree_zero_is_boxcar() {
        let raw = [3.0, 6.0, 9.0, 0.0, 3.0];
        let smoothed = savitzky_golay(&raw, 3, 0).unwrap();
        assert_close(&smoothed[1..4], &[6.0, 5.0, 4.0]);
        assert_close(&[smoothed[0], smoothed[4]], &[6.0, 4.0]);
    }

    #[test]
    fn test_savitzky_golay_window_of_one() {
        let raw = [2.0, 7.0, 1.0];
        assert_close(&savitzky_golay(&raw, 1, 0).unwrap(), &raw);
    }

    #[test]
    fn test_bank_checks_before_running() {
        let bank = SmoothingBank::new(ProfileConfig::default());
        assert!(bank.check(12).is_err());
        assert!(bank.check(13).is_ok());
    }
}
