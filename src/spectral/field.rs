//! Dual-representation fields on the periodic plane.
//!
//! A [`PlaneField`] holds real grid-point values and/or their Fourier
//! coefficients and records which of the two is currently valid. Conversion
//! between the representations is explicit: call
//! [`PlaneField::request_physical`] or [`PlaneField::request_spectral`]
//! before reading the corresponding data. Reading an invalid representation
//! is a programming error and panics.
//!
//! [`ComplexField`] is the complex-valued counterpart used by the REXI
//! workers; it lives in exactly one space at a time and converts in place.

use num_complex::Complex64;

use crate::error::{Result, RexiError};
use crate::types::{DomainSize, Resolution2D};

use super::fft::FftPlan;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

// =============================================================================
// PlaneField
// =============================================================================

/// Real scalar field with tracked physical/spectral validity.
#[derive(Clone, Debug)]
pub struct PlaneField {
    resolution: Resolution2D,
    physical: Vec<f64>,
    spectral: Vec<Complex64>,
    physical_valid: bool,
    spectral_valid: bool,
}

impl PlaneField {
    /// Zero field; both representations valid.
    pub fn zeros(resolution: Resolution2D) -> Self {
        let n = resolution.total_points();
        Self {
            resolution,
            physical: vec![0.0; n],
            spectral: vec![ZERO; n],
            physical_valid: true,
            spectral_valid: true,
        }
    }

    /// Constant field; both representations valid.
    pub fn constant(resolution: Resolution2D, value: f64) -> Self {
        let n = resolution.total_points();
        let mut spectral = vec![ZERO; n];
        spectral[0] = Complex64::new(value * n as f64, 0.0);
        Self {
            resolution,
            physical: vec![value; n],
            spectral,
            physical_valid: true,
            spectral_valid: true,
        }
    }

    /// Field from grid-point values (row-major, x fastest).
    pub fn from_physical(resolution: Resolution2D, data: Vec<f64>) -> Result<Self> {
        if data.len() != resolution.total_points() {
            return Err(RexiError::dimension_mismatch(
                format!("{} values for grid {}", resolution.total_points(), resolution),
                data.len().to_string(),
            ));
        }
        let n = data.len();
        Ok(Self {
            resolution,
            physical: data,
            spectral: vec![ZERO; n],
            physical_valid: true,
            spectral_valid: false,
        })
    }

    /// Field from Fourier coefficients.
    ///
    /// The coefficients must be conjugate-symmetric for the physical values
    /// to be real; any imaginary residue is dropped on conversion.
    pub fn from_spectral(resolution: Resolution2D, data: Vec<Complex64>) -> Result<Self> {
        if data.len() != resolution.total_points() {
            return Err(RexiError::dimension_mismatch(
                format!("{} coefficients for grid {}", resolution.total_points(), resolution),
                data.len().to_string(),
            ));
        }
        let n = data.len();
        Ok(Self {
            resolution,
            physical: vec![0.0; n],
            spectral: data,
            physical_valid: false,
            spectral_valid: true,
        })
    }

    /// Spectral field from coefficients already known to match the grid.
    pub(crate) fn spectral_from_vec(resolution: Resolution2D, data: Vec<Complex64>) -> Self {
        debug_assert_eq!(data.len(), resolution.total_points());
        let n = data.len();
        Self {
            resolution,
            physical: vec![0.0; n],
            spectral: data,
            physical_valid: false,
            spectral_valid: true,
        }
    }

    /// Sample a function at cell centres `((i + ½)·dx, (j + ½)·dy)`.
    pub fn from_fn<F>(resolution: Resolution2D, domain: DomainSize, f: F) -> Self
    where
        F: Fn(f64, f64) -> f64,
    {
        let (dx, dy) = domain.spacing(resolution);
        let (nx, ny) = resolution.as_tuple();
        let mut data = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                data.push(f((i as f64 + 0.5) * dx, (j as f64 + 0.5) * dy));
            }
        }
        let n = data.len();
        Self {
            resolution,
            physical: data,
            spectral: vec![ZERO; n],
            physical_valid: true,
            spectral_valid: false,
        }
    }

    /// Grid resolution.
    #[inline]
    pub fn resolution(&self) -> Resolution2D {
        self.resolution
    }

    /// Whether grid-point values are current.
    #[inline]
    pub fn is_physical_valid(&self) -> bool {
        self.physical_valid
    }

    /// Whether Fourier coefficients are current.
    #[inline]
    pub fn is_spectral_valid(&self) -> bool {
        self.spectral_valid
    }

    /// Make the physical representation valid (inverse transform if needed).
    pub fn request_physical(&mut self, plan: &FftPlan) {
        if self.physical_valid {
            return;
        }
        debug_assert!(self.spectral_valid, "field has no valid representation");
        let mut buf = self.spectral.clone();
        plan.inverse(&mut buf);
        for (p, c) in self.physical.iter_mut().zip(&buf) {
            *p = c.re;
        }
        self.physical_valid = true;
    }

    /// Make the spectral representation valid (forward transform if needed).
    pub fn request_spectral(&mut self, plan: &FftPlan) {
        if self.spectral_valid {
            return;
        }
        debug_assert!(self.physical_valid, "field has no valid representation");
        for (s, &p) in self.spectral.iter_mut().zip(&self.physical) {
            *s = Complex64::new(p, 0.0);
        }
        plan.forward(&mut self.spectral);
        self.spectral_valid = true;
    }

    /// Grid-point values.
    ///
    /// # Panics
    ///
    /// Panics if the physical representation is not valid.
    pub fn physical(&self) -> &[f64] {
        assert!(
            self.physical_valid,
            "physical data not valid; call request_physical first"
        );
        &self.physical
    }

    /// Mutable grid-point values; invalidates the spectral representation.
    pub fn physical_mut(&mut self) -> &mut [f64] {
        assert!(
            self.physical_valid,
            "physical data not valid; call request_physical first"
        );
        self.spectral_valid = false;
        &mut self.physical
    }

    /// Fourier coefficients.
    ///
    /// # Panics
    ///
    /// Panics if the spectral representation is not valid.
    pub fn spectral(&self) -> &[Complex64] {
        assert!(
            self.spectral_valid,
            "spectral data not valid; call request_spectral first"
        );
        &self.spectral
    }

    /// Mutable Fourier coefficients; invalidates the physical representation.
    pub fn spectral_mut(&mut self) -> &mut [Complex64] {
        assert!(
            self.spectral_valid,
            "spectral data not valid; call request_spectral first"
        );
        self.physical_valid = false;
        &mut self.spectral
    }

    /// Value at grid point (i, j).
    #[inline]
    pub fn physical_get(&self, i: usize, j: usize) -> f64 {
        self.physical()[self.resolution.index(i, j)]
    }

    /// Set the value at grid point (i, j).
    #[inline]
    pub fn physical_set(&mut self, i: usize, j: usize, value: f64) {
        let idx = self.resolution.index(i, j);
        self.physical_mut()[idx] = value;
    }

    /// Fourier coefficient of mode (p, q).
    #[inline]
    pub fn spectral_get(&self, p: usize, q: usize) -> Complex64 {
        self.spectral()[self.resolution.index(p, q)]
    }

    /// Set the Fourier coefficient of mode (p, q).
    #[inline]
    pub fn spectral_set(&mut self, p: usize, q: usize, value: Complex64) {
        let idx = self.resolution.index(p, q);
        self.spectral_mut()[idx] = value;
    }

    /// Overwrite grid-point values; the spectral representation becomes stale.
    pub fn set_physical(&mut self, data: &[f64]) -> Result<()> {
        if data.len() != self.physical.len() {
            return Err(RexiError::dimension_mismatch(
                self.physical.len().to_string(),
                data.len().to_string(),
            ));
        }
        self.physical.copy_from_slice(data);
        self.physical_valid = true;
        self.spectral_valid = false;
        Ok(())
    }

    /// Overwrite Fourier coefficients; the physical representation becomes stale.
    pub fn set_spectral(&mut self, data: &[Complex64]) -> Result<()> {
        if data.len() != self.spectral.len() {
            return Err(RexiError::dimension_mismatch(
                self.spectral.len().to_string(),
                data.len().to_string(),
            ));
        }
        self.spectral.copy_from_slice(data);
        self.spectral_valid = true;
        self.physical_valid = false;
        Ok(())
    }

    /// Scale by a constant in every valid representation: self ← c·self.
    pub fn scale(&mut self, c: f64) {
        if self.physical_valid {
            self.physical.iter_mut().for_each(|v| *v *= c);
        }
        if self.spectral_valid {
            self.spectral.iter_mut().for_each(|v| *v *= c);
        }
    }

    /// Add a scaled field in physical space: self ← self + c·other.
    pub fn axpy(&mut self, c: f64, other: &PlaneField) {
        let other = other.physical();
        for (a, &b) in self.physical_mut().iter_mut().zip(other) {
            *a += c * b;
        }
    }

    /// Add a constant to every grid point.
    pub fn add_scalar(&mut self, c: f64) {
        self.physical_mut().iter_mut().for_each(|v| *v += c);
    }

    /// Pointwise product in physical space.
    pub fn pointwise_mul(&self, other: &PlaneField) -> PlaneField {
        let data = self
            .physical()
            .iter()
            .zip(other.physical())
            .map(|(a, b)| a * b)
            .collect();
        PlaneField {
            resolution: self.resolution,
            physical: data,
            spectral: vec![ZERO; self.spectral.len()],
            physical_valid: true,
            spectral_valid: false,
        }
    }

    /// Sum of grid-point values.
    pub fn sum(&self) -> f64 {
        self.physical().iter().sum()
    }

    /// Maximum absolute grid-point value.
    pub fn max_abs(&self) -> f64 {
        self.physical().iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    /// Maximum absolute pointwise difference to another field.
    pub fn max_abs_diff(&self, other: &PlaneField) -> f64 {
        self.physical()
            .iter()
            .zip(other.physical())
            .fold(0.0_f64, |m, (a, b)| m.max((a - b).abs()))
    }

    /// Whether every value of the valid representation(s) is finite.
    pub fn is_finite(&self) -> bool {
        let phys_ok = !self.physical_valid || self.physical.iter().all(|v| v.is_finite());
        let spec_ok = !self.spectral_valid
            || self
                .spectral
                .iter()
                .all(|c| c.re.is_finite() && c.im.is_finite());
        phys_ok && spec_ok
    }

    /// Complex copy of the physical values, ready for a forward transform.
    pub fn to_complex(&self) -> ComplexField {
        let data = self
            .physical()
            .iter()
            .map(|&v| Complex64::new(v, 0.0))
            .collect();
        ComplexField {
            resolution: self.resolution,
            data,
            space: Space::Physical,
        }
    }
}

// =============================================================================
// ComplexField
// =============================================================================

/// Representation a [`ComplexField`] currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Space {
    /// Grid-point values
    Physical,
    /// Fourier coefficients
    Spectral,
}

/// Complex-valued field stored in one representation at a time.
#[derive(Clone, Debug)]
pub struct ComplexField {
    resolution: Resolution2D,
    data: Vec<Complex64>,
    space: Space,
}

impl ComplexField {
    /// Zero field in spectral space.
    pub fn zeros_spectral(resolution: Resolution2D) -> Self {
        Self {
            resolution,
            data: vec![ZERO; resolution.total_points()],
            space: Space::Spectral,
        }
    }

    /// Wrap existing spectral coefficients.
    pub fn from_spectral(resolution: Resolution2D, data: Vec<Complex64>) -> Result<Self> {
        if data.len() != resolution.total_points() {
            return Err(RexiError::dimension_mismatch(
                resolution.total_points().to_string(),
                data.len().to_string(),
            ));
        }
        Ok(Self {
            resolution,
            data,
            space: Space::Spectral,
        })
    }

    /// Grid resolution.
    #[inline]
    pub fn resolution(&self) -> Resolution2D {
        self.resolution
    }

    /// Current representation.
    #[inline]
    pub fn space(&self) -> Space {
        self.space
    }

    /// Raw data of the current representation.
    #[inline]
    pub fn data(&self) -> &[Complex64] {
        &self.data
    }

    /// Mutable raw data of the current representation.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [Complex64] {
        &mut self.data
    }

    /// Reset to zero in spectral space.
    pub fn set_zero_spectral(&mut self) {
        self.data.iter_mut().for_each(|c| *c = ZERO);
        self.space = Space::Spectral;
    }

    /// Copy coefficients from a slice and mark the field spectral.
    pub fn load_spectral(&mut self, src: &[Complex64]) {
        self.data.copy_from_slice(src);
        self.space = Space::Spectral;
    }

    /// Transform to spectral space if necessary.
    pub fn to_spectral(&mut self, plan: &FftPlan) {
        if self.space == Space::Physical {
            plan.forward(&mut self.data);
            self.space = Space::Spectral;
        }
    }

    /// Transform to physical space if necessary.
    pub fn to_physical(&mut self, plan: &FftPlan) {
        if self.space == Space::Spectral {
            plan.inverse(&mut self.data);
            self.space = Space::Physical;
        }
    }
}
