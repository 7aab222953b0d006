//! 2D complex FFT plans for periodic grids.
//!
//! The forward transform is unnormalised; the inverse divides by
//! `nx * ny`, so `inverse(forward(x)) == x`.

use std::fmt;
use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::types::Resolution2D;

/// Forward and inverse 2D FFT plans for one grid resolution.
///
/// Rows (x-direction) are contiguous; columns are transformed through a
/// transposed scratch buffer.
#[derive(Clone)]
pub struct FftPlan {
    resolution: Resolution2D,
    forward_x: Arc<dyn Fft<f64>>,
    inverse_x: Arc<dyn Fft<f64>>,
    forward_y: Arc<dyn Fft<f64>>,
    inverse_y: Arc<dyn Fft<f64>>,
}

impl FftPlan {
    /// Plan transforms for the given resolution.
    pub fn new(resolution: Resolution2D) -> Self {
        let mut planner = FftPlanner::new();
        let (nx, ny) = resolution.as_tuple();
        Self {
            resolution,
            forward_x: planner.plan_fft_forward(nx),
            inverse_x: planner.plan_fft_inverse(nx),
            forward_y: planner.plan_fft_forward(ny),
            inverse_y: planner.plan_fft_inverse(ny),
        }
    }

    /// Resolution this plan was built for.
    #[inline]
    pub fn resolution(&self) -> Resolution2D {
        self.resolution
    }

    /// In-place forward transform (physical → spectral).
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` differs from the number of grid points.
    pub fn forward(&self, data: &mut [Complex64]) {
        self.transform(data, &*self.forward_x, &*self.forward_y);
    }

    /// In-place normalised inverse transform (spectral → physical).
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` differs from the number of grid points.
    pub fn inverse(&self, data: &mut [Complex64]) {
        self.transform(data, &*self.inverse_x, &*self.inverse_y);
        let norm = 1.0 / self.resolution.total_points() as f64;
        for c in data.iter_mut() {
            *c *= norm;
        }
    }

    fn transform(&self, data: &mut [Complex64], fft_x: &dyn Fft<f64>, fft_y: &dyn Fft<f64>) {
        let (nx, ny) = self.resolution.as_tuple();
        assert_eq!(
            data.len(),
            nx * ny,
            "FFT buffer has {} entries, grid {} needs {}",
            data.len(),
            self.resolution,
            nx * ny
        );

        // All rows at once: rustfft processes consecutive chunks of length nx.
        fft_x.process(data);

        let mut columns = vec![Complex64::new(0.0, 0.0); nx * ny];
        for j in 0..ny {
            for i in 0..nx {
                columns[i * ny + j] = data[j * nx + i];
            }
        }
        fft_y.process(&mut columns);
        for j in 0..ny {
            for i in 0..nx {
                data[j * nx + i] = columns[i * ny + j];
            }
        }
    }
}

impl fmt::Debug for FftPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftPlan")
            .field("resolution", &self.resolution)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_roundtrip_identity() {
        let res = Resolution2D::new(8, 4);
        let plan = FftPlan::new(res);
        let original: Vec<Complex64> = (0..32)
            .map(|k| Complex64::new((k as f64 * 0.37).sin(), (k as f64 * 0.11).cos()))
            .collect();
        let mut data = original.clone();
        plan.forward(&mut data);
        plan.inverse(&mut data);
        for (a, b) in data.iter().zip(&original) {
            assert!((a - b).norm() < 1e-13);
        }
    }

    #[test]
    fn test_single_mode_lands_in_expected_bin() {
        // cos(2π·2·i/nx) has energy at p = 2 and p = nx - 2 of row q = 0.
        let res = Resolution2D::new(8, 8);
        let plan = FftPlan::new(res);
        let mut data: Vec<Complex64> = (0..64)
            .map(|k| {
                let i = k % 8;
                Complex64::new((2.0 * PI * 2.0 * i as f64 / 8.0).cos(), 0.0)
            })
            .collect();
        plan.forward(&mut data);
        assert!((data[2].re - 32.0).abs() < 1e-12);
        assert!((data[6].re - 32.0).abs() < 1e-12);
        assert!(data[0].norm() < 1e-12);
        assert!(data[8 + 2].norm() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "FFT buffer")]
    fn test_wrong_length_panics() {
        let plan = FftPlan::new(Resolution2D::square(4));
        let mut data = vec![Complex64::new(0.0, 0.0); 15];
        plan.forward(&mut data);
    }
}
