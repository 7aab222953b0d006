//! Prognostic state of the shallow water system.
//!
//! A [`PlaneState`] holds depth `h` and velocities `(u, v)` on one grid. The
//! three fields track their physical/spectral validity independently.

use crate::error::{Result, RexiError};
use crate::spectral::{FftPlan, PlaneField};
use crate::types::{DomainSize, Resolution2D};

/// State `(h, u, v)` on the periodic plane.
#[derive(Clone, Debug)]
pub struct PlaneState {
    /// Total depth h (m)
    pub h: PlaneField,
    /// x-velocity u (m/s)
    pub u: PlaneField,
    /// y-velocity v (m/s)
    pub v: PlaneField,
}

impl PlaneState {
    /// Assemble a state; all fields must share one resolution.
    pub fn new(h: PlaneField, u: PlaneField, v: PlaneField) -> Result<Self> {
        let res = h.resolution();
        for (name, f) in [("u", &u), ("v", &v)] {
            if f.resolution() != res {
                return Err(RexiError::dimension_mismatch(
                    format!("{name} on grid {res}"),
                    f.resolution().to_string(),
                ));
            }
        }
        Ok(Self { h, u, v })
    }

    /// Fluid at rest with uniform depth.
    pub fn at_rest(resolution: Resolution2D, depth: f64) -> Self {
        Self {
            h: PlaneField::constant(resolution, depth),
            u: PlaneField::zeros(resolution),
            v: PlaneField::zeros(resolution),
        }
    }

    /// All-zero state (used for tendencies).
    pub fn zeros(resolution: Resolution2D) -> Self {
        Self::at_rest(resolution, 0.0)
    }

    /// State sampled from functions of `(x, y)` at cell centres.
    pub fn from_fns<H, U, V>(resolution: Resolution2D, domain: DomainSize, h: H, u: U, v: V) -> Self
    where
        H: Fn(f64, f64) -> f64,
        U: Fn(f64, f64) -> f64,
        V: Fn(f64, f64) -> f64,
    {
        Self {
            h: PlaneField::from_fn(resolution, domain, h),
            u: PlaneField::from_fn(resolution, domain, u),
            v: PlaneField::from_fn(resolution, domain, v),
        }
    }

    /// Grid resolution.
    #[inline]
    pub fn resolution(&self) -> Resolution2D {
        self.h.resolution()
    }

    /// Make every field's physical representation valid.
    pub fn request_physical(&mut self, plan: &FftPlan) {
        self.h.request_physical(plan);
        self.u.request_physical(plan);
        self.v.request_physical(plan);
    }

    /// Make every field's spectral representation valid.
    pub fn request_spectral(&mut self, plan: &FftPlan) {
        self.h.request_spectral(plan);
        self.u.request_spectral(plan);
        self.v.request_spectral(plan);
    }

    /// Whether every valid value is finite.
    pub fn is_finite(&self) -> bool {
        self.h.is_finite() && self.u.is_finite() && self.v.is_finite()
    }

    /// self ← c·self
    pub fn scale(&mut self, c: f64) {
        self.h.scale(c);
        self.u.scale(c);
        self.v.scale(c);
    }

    /// self ← self + c·other, in physical space.
    pub fn axpy(&mut self, c: f64, other: &PlaneState) {
        self.h.axpy(c, &other.h);
        self.u.axpy(c, &other.u);
        self.v.axpy(c, &other.v);
    }

    /// Largest pointwise difference over all three fields.
    pub fn max_abs_diff(&self, other: &PlaneState) -> f64 {
        self.h
            .max_abs_diff(&other.h)
            .max(self.u.max_abs_diff(&other.u))
            .max(self.v.max_abs_diff(&other.v))
    }
}
