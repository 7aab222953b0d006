//! Conserved quantities and error norms of a [`PlaneState`].

use crate::physics::GlobalConfig;
use crate::solver::PlaneState;
use crate::spectral::SpectralOperators;

/// Total mass `Σ h ΔA`.
pub fn total_mass(state: &PlaneState, config: &GlobalConfig) -> f64 {
    state.h.sum() * config.domain().cell_area(config.resolution())
}

/// Total energy `½ Σ (h (u² + v²) + g h²) ΔA`.
pub fn total_energy(state: &PlaneState, config: &GlobalConfig) -> f64 {
    let g = config.gravity();
    let area = config.domain().cell_area(config.resolution());
    let sum: f64 = state
        .h
        .physical()
        .iter()
        .zip(state.u.physical())
        .zip(state.v.physical())
        .map(|((&h, &u), &v)| h * (u * u + v * v) + g * h * h)
        .sum();
    0.5 * sum * area
}

/// Potential enstrophy `½ Σ (ζ + f₀)² / h ΔA`, with `ζ = ∂v/∂x − ∂u/∂y`.
///
/// Needs `&mut` to transform the velocities; their values are unchanged.
pub fn potential_enstrophy(
    state: &mut PlaneState,
    ops: &SpectralOperators,
    config: &GlobalConfig,
) -> f64 {
    let f0 = config.f0();
    let area = config.domain().cell_area(config.resolution());
    let mut zeta = ops.vorticity(&mut state.u, &mut state.v);
    zeta.request_physical(ops.plan());
    let sum: f64 = zeta
        .physical()
        .iter()
        .zip(state.h.physical())
        .map(|(&z, &h)| (z + f0).powi(2) / h)
        .sum();
    0.5 * sum * area
}

/// Snapshot of the integral invariants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Diagnostics {
    pub mass: f64,
    pub energy: f64,
    pub potential_enstrophy: f64,
}

impl Diagnostics {
    /// Evaluate all invariants; `state` must have valid physical data.
    pub fn compute(state: &mut PlaneState, ops: &SpectralOperators, config: &GlobalConfig) -> Self {
        Self {
            mass: total_mass(state, config),
            energy: total_energy(state, config),
            potential_enstrophy: potential_enstrophy(state, ops, config),
        }
    }

    /// Largest relative change of any invariant with respect to `reference`.
    pub fn max_relative_drift(&self, reference: &Diagnostics) -> f64 {
        let rel = |a: f64, b: f64| {
            if b == 0.0 {
                a.abs()
            } else {
                ((a - b) / b).abs()
            }
        };
        rel(self.mass, reference.mass)
            .max(rel(self.energy, reference.energy))
            .max(rel(self.potential_enstrophy, reference.potential_enstrophy))
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mass={:.9e} energy={:.9e} enstrophy={:.9e}",
            self.mass, self.energy, self.potential_enstrophy
        )
    }
}

/// Difference norms between two states, taken over all three fields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorNorms {
    /// Root mean square difference.
    pub rms: f64,
    /// Maximum absolute difference.
    pub max: f64,
}

impl ErrorNorms {
    /// Norms of `model − reference`; both need valid physical data.
    ///
    /// # Panics
    ///
    /// Panics if the states are on different grids.
    pub fn compute(model: &PlaneState, reference: &PlaneState) -> Self {
        assert_eq!(
            model.resolution(),
            reference.resolution(),
            "states must share a resolution"
        );
        let mut sq = 0.0;
        let mut max = 0.0_f64;
        let mut n = 0usize;
        for (a, b) in [
            (&model.h, &reference.h),
            (&model.u, &reference.u),
            (&model.v, &reference.v),
        ] {
            for (&x, &y) in a.physical().iter().zip(b.physical()) {
                let e = x - y;
                sq += e * e;
                max = max.max(e.abs());
                n += 1;
            }
        }
        Self {
            rms: (sq / n as f64).sqrt(),
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::types::{DomainSize, Resolution2D};

    fn config(f0: f64) -> GlobalConfig {
        GlobalConfig::f_plane(Resolution2D::square(8), DomainSize::square(800.0), f0, 10.0, 100.0)
            .unwrap()
    }

    #[test]
    fn test_rest_state_invariants() {
        let cfg = config(1e-4);
        let ops = SpectralOperators::new(cfg.resolution(), cfg.domain());
        let mut s = PlaneState::at_rest(cfg.resolution(), 100.0);
        let d = Diagnostics::compute(&mut s, &ops, &cfg);
        let area = 800.0 * 800.0;
        assert_relative_eq!(d.mass, 100.0 * area, max_relative = 1e-12);
        assert_relative_eq!(d.energy, 0.5 * 10.0 * 100.0 * 100.0 * area, max_relative = 1e-12);
        assert_relative_eq!(d.potential_enstrophy, 0.5 * 1e-8 / 100.0 * area, max_relative = 1e-9);
    }

    #[test]
    fn test_kinetic_energy_counted() {
        let cfg = config(0.0);
        let s = PlaneState::from_fns(cfg.resolution(), cfg.domain(), |_, _| 2.0, |_, _| 3.0, |_, _| 4.0);
        let area = 800.0 * 800.0;
        assert_relative_eq!(
            total_energy(&s, &cfg),
            0.5 * (2.0 * 25.0 + 10.0 * 4.0) * area,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_drift_and_norms() {
        let cfg = config(1e-4);
        let ops = SpectralOperators::new(cfg.resolution(), cfg.domain());
        let mut a = PlaneState::at_rest(cfg.resolution(), 100.0);
        let mut b = PlaneState::at_rest(cfg.resolution(), 101.0);
        let da = Diagnostics::compute(&mut a, &ops, &cfg);
        let db = Diagnostics::compute(&mut b, &ops, &cfg);
        assert!(db.max_relative_drift(&da) > 0.01);
        assert_eq!(da.max_relative_drift(&da), 0.0);

        let norms = ErrorNorms::compute(&b, &a);
        assert_relative_eq!(norms.max, 1.0, epsilon = 1e-12);
        assert_relative_eq!(norms.rms, (1.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
    }
}
