//! Spectral differential operators on the periodic plane.
//!
//! Derivatives are diagonal in Fourier space: `∂/∂x` multiplies mode
//! `(p, q)` by `i κₓ(p)` with `κₓ = 2π k₀ / s₀`. On even grids the Nyquist
//! mode carries wavenumber zero for first derivatives, which keeps the
//! derivative of a real field real.

use num_complex::Complex64;

use crate::types::{DomainSize, Resolution2D};

use super::fft::FftPlan;
use super::field::PlaneField;

/// Signed mode number of FFT bin `p` on a grid of `n` points.
///
/// Bins below `n/2` are positive modes, bins above are negative. The
/// Nyquist bin (`2p == n`) maps to 0.
///
/// ```
/// use rexi_rs::spectral::mode_number;
///
/// assert_eq!(mode_number(1, 8), 1);
/// assert_eq!(mode_number(7, 8), -1);
/// assert_eq!(mode_number(4, 8), 0);
/// ```
#[inline]
pub fn mode_number(p: usize, n: usize) -> i64 {
    if 2 * p == n {
        0
    } else if 2 * p < n {
        p as i64
    } else {
        p as i64 - n as i64
    }
}

/// Spectral derivative operators with precomputed symbols.
///
/// Each instance owns its FFT plan, so one per worker can be used without
/// sharing.
#[derive(Clone, Debug)]
pub struct SpectralOperators {
    resolution: Resolution2D,
    domain: DomainSize,
    plan: FftPlan,
    /// `i κₓ` per spectral index
    ikx: Vec<Complex64>,
    /// `i κᵧ` per spectral index
    iky: Vec<Complex64>,
    /// `−(κₓ² + κᵧ²)` per spectral index
    laplacian: Vec<f64>,
}

impl SpectralOperators {
    /// Build operators for a grid.
    pub fn new(resolution: Resolution2D, domain: DomainSize) -> Self {
        let (nx, ny) = resolution.as_tuple();
        let n = resolution.total_points();
        let mut ikx = Vec::with_capacity(n);
        let mut iky = Vec::with_capacity(n);
        let mut laplacian = Vec::with_capacity(n);

        let two_pi = 2.0 * std::f64::consts::PI;
        for q in 0..ny {
            let ky = two_pi * mode_number(q, ny) as f64 / domain.sy;
            for p in 0..nx {
                let kx = two_pi * mode_number(p, nx) as f64 / domain.sx;
                ikx.push(Complex64::new(0.0, kx));
                iky.push(Complex64::new(0.0, ky));
                laplacian.push(-(kx * kx + ky * ky));
            }
        }

        Self {
            resolution,
            domain,
            plan: FftPlan::new(resolution),
            ikx,
            iky,
            laplacian,
        }
    }

    /// Grid resolution.
    #[inline]
    pub fn resolution(&self) -> Resolution2D {
        self.resolution
    }

    /// Domain size.
    #[inline]
    pub fn domain(&self) -> DomainSize {
        self.domain
    }

    /// FFT plan shared by all operators of this instance.
    #[inline]
    pub fn plan(&self) -> &FftPlan {
        &self.plan
    }

    /// Angular wavenumber κₓ of spectral column `p`.
    #[inline]
    pub fn kx(&self, p: usize) -> f64 {
        2.0 * std::f64::consts::PI * mode_number(p, self.resolution.nx()) as f64 / self.domain.sx
    }

    /// Angular wavenumber κᵧ of spectral row `q`.
    #[inline]
    pub fn ky(&self, q: usize) -> f64 {
        2.0 * std::f64::consts::PI * mode_number(q, self.resolution.ny()) as f64 / self.domain.sy
    }

    /// Symbol of `∂/∂x` per spectral index.
    #[inline]
    pub fn ikx(&self) -> &[Complex64] {
        &self.ikx
    }

    /// Symbol of `∂/∂y` per spectral index.
    #[inline]
    pub fn iky(&self) -> &[Complex64] {
        &self.iky
    }

    /// Symbol of `∇²` per spectral index.
    #[inline]
    pub fn laplacian_symbol(&self) -> &[f64] {
        &self.laplacian
    }

    fn apply(&self, field: &mut PlaneField, symbol: impl Fn(usize) -> Complex64) -> PlaneField {
        field.request_spectral(&self.plan);
        let data = field
            .spectral()
            .iter()
            .enumerate()
            .map(|(k, c)| *c * symbol(k))
            .collect();
        PlaneField::spectral_from_vec(self.resolution, data)
    }

    /// ∂f/∂x
    pub fn diff_x(&self, field: &mut PlaneField) -> PlaneField {
        self.apply(field, |k| self.ikx[k])
    }

    /// ∂f/∂y
    pub fn diff_y(&self, field: &mut PlaneField) -> PlaneField {
        self.apply(field, |k| self.iky[k])
    }

    /// ∇²f
    pub fn laplacian(&self, field: &mut PlaneField) -> PlaneField {
        self.apply(field, |k| Complex64::new(self.laplacian[k], 0.0))
    }

    /// Divergence ∂u/∂x + ∂v/∂y.
    pub fn divergence(&self, u: &mut PlaneField, v: &mut PlaneField) -> PlaneField {
        u.request_spectral(&self.plan);
        v.request_spectral(&self.plan);
        let data = u
            .spectral()
            .iter()
            .zip(v.spectral())
            .enumerate()
            .map(|(k, (a, b))| self.ikx[k] * a + self.iky[k] * b)
            .collect();
        PlaneField::spectral_from_vec(self.resolution, data)
    }

    /// Relative vorticity ∂v/∂x − ∂u/∂y.
    pub fn vorticity(&self, u: &mut PlaneField, v: &mut PlaneField) -> PlaneField {
        u.request_spectral(&self.plan);
        v.request_spectral(&self.plan);
        let data = u
            .spectral()
            .iter()
            .zip(v.spectral())
            .enumerate()
            .map(|(k, (a, b))| self.ikx[k] * b - self.iky[k] * a)
            .collect();
        PlaneField::spectral_from_vec(self.resolution, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn ops(n: usize, len: f64) -> SpectralOperators {
        SpectralOperators::new(Resolution2D::square(n), DomainSize::square(len))
    }

    #[test]
    fn test_mode_numbers_odd_grid() {
        let modes: Vec<i64> = (0..5).map(|p| mode_number(p, 5)).collect();
        assert_eq!(modes, vec![0, 1, 2, -2, -1]);
    }

    #[test]
    fn test_diff_x_of_sine() {
        let op = ops(16, 2.0 * PI);
        let res = op.resolution();
        let mut f = PlaneField::from_fn(res, op.domain(), |x, _| (2.0 * x).sin());
        let mut df = op.diff_x(&mut f);
        df.request_physical(op.plan());
        let expected = PlaneField::from_fn(res, op.domain(), |x, _| 2.0 * (2.0 * x).cos());
        assert!(df.max_abs_diff(&expected) < 1e-12);
    }

    #[test]
    fn test_laplacian_of_product_mode() {
        let op = ops(16, 1.0);
        let res = op.resolution();
        let k = 2.0 * PI;
        let mut f = PlaneField::from_fn(res, op.domain(), |x, y| (k * x).cos() * (2.0 * k * y).cos());
        let mut lf = op.laplacian(&mut f);
        lf.request_physical(op.plan());
        f.request_physical(op.plan());
        let mut expected = f.clone();
        expected.scale(-5.0 * k * k);
        assert!(lf.max_abs_diff(&expected) < 1e-9);
    }

    #[test]
    fn test_vorticity_of_gradient_vanishes() {
        let op = ops(8, 1.0);
        let res = op.resolution();
        let mut phi = PlaneField::from_fn(res, op.domain(), |x, y| {
            (2.0 * PI * x).sin() * (2.0 * PI * y).cos()
        });
        let mut u = op.diff_x(&mut phi);
        let mut v = op.diff_y(&mut phi);
        let mut zeta = op.vorticity(&mut u, &mut v);
        zeta.request_physical(op.plan());
        assert!(zeta.max_abs() < 1e-10);
    }

    #[test]
    fn test_nyquist_derivative_is_zero() {
        // Checkerboard in x lives entirely in the Nyquist column.
        let op = ops(4, 1.0);
        let res = op.resolution();
        let data: Vec<f64> = (0..16).map(|k| if k % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let mut f = PlaneField::from_physical(res, data).unwrap();
        let mut df = op.diff_x(&mut f);
        df.request_physical(op.plan());
        assert!(df.max_abs() < 1e-14);
        assert_eq!(op.kx(2), 0.0);
    }
}
