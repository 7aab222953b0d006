//! Exact per-wavenumber propagation of the linear system.
//!
//! [`DirectSpectralSolver`] applies `exp(dt·L)` mode by mode using the
//! closed-form eigen-decomposition from [`super::modes`]. It is exact up to
//! round-off and serves as the reference for the REXI engine.

use num_complex::Complex64;

use crate::error::{Result, RexiError};
use crate::physics::GlobalConfig;
use crate::spectral::{SpectralOperators, mode_number};

use super::modes::{ModalDecomposition, SymbolParams, WaveMode, is_finite_matrix};
use super::plane_state::PlaneState;

/// What to do when an eigenvector matrix or its inverse is not finite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DegeneracyPolicy {
    /// Log a warning and leave the affected mode unchanged.
    #[default]
    Warn,
    /// Return [`RexiError::NumericalDegeneracy`].
    Strict,
}

/// Closed-form spectral propagator.
///
/// # Example
///
/// ```
/// use rexi_rs::physics::GlobalConfig;
/// use rexi_rs::solver::{DirectSpectralSolver, PlaneState};
/// use rexi_rs::types::{DomainSize, Resolution2D};
///
/// let res = Resolution2D::square(8);
/// let config = GlobalConfig::f_plane(res, DomainSize::square(1000.0), 1e-4, 9.81, 100.0).unwrap();
/// let solver = DirectSpectralSolver::new(config);
///
/// let mut state = PlaneState::at_rest(res, 100.0);
/// solver.solve(&mut state, 60.0).unwrap();
/// state.request_physical(solver.operators().plan());
/// assert!((state.h.physical_get(0, 0) - 100.0).abs() < 1e-10);
/// ```
#[derive(Clone, Debug)]
pub struct DirectSpectralSolver {
    config: GlobalConfig,
    ops: SpectralOperators,
    policy: DegeneracyPolicy,
}

impl DirectSpectralSolver {
    pub fn new(config: GlobalConfig) -> Self {
        Self {
            ops: SpectralOperators::new(config.resolution(), config.domain()),
            config,
            policy: DegeneracyPolicy::default(),
        }
    }

    /// Set the degeneracy policy.
    pub fn with_policy(mut self, policy: DegeneracyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    pub fn policy(&self) -> DegeneracyPolicy {
        self.policy
    }

    /// Spectral operators of this solver's grid.
    pub fn operators(&self) -> &SpectralOperators {
        &self.ops
    }

    fn symbol_params(&self) -> SymbolParams {
        SymbolParams {
            f0: self.config.f0(),
            gravity: self.config.gravity(),
            mean_depth: self.config.mean_depth(),
        }
    }

    /// Decomposition of the symbol at spectral index `(p, q)`.
    pub fn decompose(&self, p: usize, q: usize) -> ModalDecomposition {
        let res = self.config.resolution();
        let k0 = mode_number(p, res.nx());
        let k1 = mode_number(q, res.ny());
        let mode = WaveMode::classify(k0, k1, self.config.f0());
        ModalDecomposition::new(mode, self.ops.kx(p), self.ops.ky(q), self.symbol_params())
    }

    /// Propagate `state = (h, u, v)` by `dt`.
    ///
    /// The result is left in spectral representation.
    pub fn solve(&self, state: &mut PlaneState, dt: f64) -> Result<()> {
        if !dt.is_finite() {
            return Err(RexiError::configuration(format!("time step must be finite, got {dt}")));
        }
        let res = self.config.resolution();
        if state.resolution() != res {
            return Err(RexiError::dimension_mismatch(
                res.to_string(),
                state.resolution().to_string(),
            ));
        }

        state.request_spectral(self.ops.plan());
        let mut h: Vec<Complex64> = state.h.spectral().to_vec();
        let mut u: Vec<Complex64> = state.u.spectral().to_vec();
        let mut v: Vec<Complex64> = state.v.spectral().to_vec();

        let mut skipped = 0usize;
        for q in 0..res.ny() {
            for p in 0..res.nx() {
                let idx = res.index(p, q);
                let d = self.decompose(p, q);
                let inv = d.inverse();

                if !is_finite_matrix(&d.vectors) || !is_finite_matrix(&inv) {
                    let k0 = mode_number(p, res.nx());
                    let k1 = mode_number(q, res.ny());
                    let detail = format!("{:?} eigenvectors not invertible", d.mode);
                    match self.policy {
                        DegeneracyPolicy::Strict => {
                            return Err(RexiError::NumericalDegeneracy { k0, k1, detail });
                        }
                        DegeneracyPolicy::Warn => {
                            tracing::warn!(k0, k1, %detail, "skipping degenerate mode");
                            skipped += 1;
                            continue;
                        }
                    }
                }

                let out = d.propagate(&inv, [h[idx], u[idx], v[idx]], dt);
                h[idx] = out[0];
                u[idx] = out[1];
                v[idx] = out[2];
            }
        }
        if skipped > 0 {
            tracing::warn!(skipped, "direct solve left degenerate modes unpropagated");
        }

        state.h.set_spectral(&h)?;
        state.u.set_spectral(&u)?;
        state.v.set_spectral(&v)?;
        Ok(())
    }

    /// Propagate a state whose first field is the geopotential `Φ = g h`.
    pub fn solve_geopotential(&self, state: &mut PlaneState, dt: f64) -> Result<()> {
        let g = self.config.gravity();
        state.h.scale(1.0 / g);
        let result = self.solve(state, dt);
        state.h.scale(g);
        result
    }
}
