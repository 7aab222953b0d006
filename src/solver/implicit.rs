//! Implicit spectral time steps.
//!
//! Both steps reduce to one real-shifted solve `(σ − L) U = R`, diagonal per
//! wavenumber: backward Euler with `σ = 1/dt`, and Crank–Nicolson with
//! `σ = 2/dt` and `R = (σ + L) Uⁿ` evaluated at the departure points.

use num_complex::Complex64;

use crate::error::{Result, RexiError};
use crate::physics::GlobalConfig;
use crate::semi_lagrangian::{BicubicSampler, SemiLagrangian, SemiLagrangianTracer};
use crate::spectral::{PlaneField, SpectralOperators};
use crate::time::NonlinearMode;

use super::helmholtz::ShiftedHelmholtz;
use super::plane_state::PlaneState;

/// Solve `(σ − L) U = R` for real `σ > 0`; `R` in spectral space.
fn shifted_solve(
    ops: &SpectralOperators,
    config: &GlobalConfig,
    sigma: f64,
    rh: &[Complex64],
    ru: &[Complex64],
    rv: &[Complex64],
) -> [Vec<Complex64>; 3] {
    let kernel = ShiftedHelmholtz::new(ops, config, Complex64::from(sigma));
    let n = rh.len();
    let mut out = [Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n)];
    for k in 0..n {
        let [h, u, v] = kernel.solve(k, [rh[k], ru[k], rv[k]]);
        out[0].push(h);
        out[1].push(u);
        out[2].push(v);
    }
    out
}

fn check_step(config: &GlobalConfig, state: &PlaneState, dt: f64) -> Result<()> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(RexiError::configuration(format!(
            "implicit time step must be positive, got {dt}"
        )));
    }
    if state.resolution() != config.resolution() {
        return Err(RexiError::dimension_mismatch(
            config.resolution().to_string(),
            state.resolution().to_string(),
        ));
    }
    Ok(())
}

fn store(state: &mut PlaneState, [h, u, v]: [Vec<Complex64>; 3]) -> Result<()> {
    state.h.set_spectral(&h)?;
    state.u.set_spectral(&u)?;
    state.v.set_spectral(&v)?;
    Ok(())
}

/// Depth anomaly `h − h̄`; the mean-depth part of `h ∇·u` is linear.
pub(crate) fn perturbation(h: &PlaneField, mean_depth: f64) -> PlaneField {
    let mut eta = h.clone();
    eta.add_scalar(-mean_depth);
    eta
}

/// Backward Euler: `(1/dt − L) Uⁿ⁺¹ = Uⁿ/dt`.
///
/// Unconditionally stable and first order; damps gravity waves with
/// `|ω dt| ≳ 1`.
pub fn implicit_euler_step(
    ops: &SpectralOperators,
    config: &GlobalConfig,
    state: &mut PlaneState,
    dt: f64,
) -> Result<()> {
    check_step(config, state, dt)?;
    state.request_spectral(ops.plan());
    let sigma = 1.0 / dt;
    let scaled = |f: &PlaneField| -> Vec<Complex64> { f.spectral().iter().map(|c| *c * sigma).collect() };
    let r = [scaled(&state.h), scaled(&state.u), scaled(&state.v)];
    let out = shifted_solve(ops, config, sigma, &r[0], &r[1], &r[2]);
    store(state, out)
}

/// Semi-Lagrangian semi-implicit Crank–Nicolson step.
///
/// With `α = 2/dt`, solves `(α − L) Uⁿ⁺¹ = [(α + L) Uⁿ]_d` where `[·]_d`
/// is evaluation at the departure points. In [`NonlinearMode::Full`] the
/// depth equation also gets the time-centred `η ∇·u` term, `η = h − h̄`
/// (`½ ηⁿ∇·uⁿ + ½ [2ηⁿ∇·uⁿ − ηⁿ⁻¹∇·uⁿ⁻¹]_d`).
///
/// On success `prev` holds the old `state` and `state` the new one.
#[allow(clippy::too_many_arguments)]
pub fn crank_nicolson_sl_step<T, S>(
    ops: &SpectralOperators,
    config: &GlobalConfig,
    state: &mut PlaneState,
    prev: &mut PlaneState,
    mode: NonlinearMode,
    sl: &SemiLagrangian<T, S>,
    dt: f64,
) -> Result<()>
where
    T: SemiLagrangianTracer,
    S: BicubicSampler,
{
    check_step(config, state, dt)?;
    let plan = ops.plan();
    let alpha = 2.0 / dt;
    let f = config.f0();
    let g = config.gravity();
    let depth = config.mean_depth();

    state.request_physical(plan);
    prev.request_physical(plan);
    let departure = mode
        .is_semi_lagrangian()
        .then(|| sl.departure_points(&prev.u, &prev.v, &state.u, &state.v, dt));

    let mut div = ops.divergence(&mut state.u, &mut state.v);
    let mut dhdx = ops.diff_x(&mut state.h);
    let mut dhdy = ops.diff_y(&mut state.h);
    for fld in [&mut div, &mut dhdx, &mut dhdy] {
        fld.request_physical(plan);
    }

    // (α + L) Uⁿ in physical space
    let mut rhs_u = state.u.clone();
    rhs_u.scale(alpha);
    rhs_u.axpy(f, &state.v);
    rhs_u.axpy(-g, &dhdx);
    let mut rhs_v = state.v.clone();
    rhs_v.scale(alpha);
    rhs_v.axpy(-f, &state.u);
    rhs_v.axpy(-g, &dhdy);
    let mut rhs_h = state.h.clone();
    rhs_h.scale(alpha);
    rhs_h.axpy(-depth, &div);

    if let Some(dep) = &departure {
        rhs_u = sl.sample(&rhs_u, dep);
        rhs_v = sl.sample(&rhs_v, dep);
        rhs_h = sl.sample(&rhs_h, dep);

        if mode.has_divergence_term() {
            let mut div_prev = ops.divergence(&mut prev.u, &mut prev.v);
            div_prev.request_physical(plan);
            let h_div = perturbation(&state.h, depth).pointwise_mul(&div);
            let mut extrapolated = h_div.clone();
            extrapolated.scale(2.0);
            extrapolated.axpy(-1.0, &perturbation(&prev.h, depth).pointwise_mul(&div_prev));
            let at_departure = sl.sample(&extrapolated, dep);
            // rhs_h −= 2·(½ η div + ½ [·]_d)
            rhs_h.axpy(-1.0, &h_div);
            rhs_h.axpy(-1.0, &at_departure);
        }
    }

    for fld in [&mut rhs_h, &mut rhs_u, &mut rhs_v] {
        fld.request_spectral(plan);
    }
    let out = shifted_solve(
        ops,
        config,
        alpha,
        rhs_h.spectral(),
        rhs_u.spectral(),
        rhs_v.spectral(),
    );

    *prev = state.clone();
    store(state, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::DirectSpectralSolver;
    use crate::types::{DomainSize, Resolution2D};

    fn setup(f0: f64) -> (SpectralOperators, GlobalConfig) {
        let res = Resolution2D::square(8);
        let dom = DomainSize::square(1000.0);
        let cfg = GlobalConfig::f_plane(res, dom, f0, 9.81, 1000.0).unwrap();
        (SpectralOperators::new(res, dom), cfg)
    }

    fn bump() -> PlaneState {
        PlaneState::from_fns(
            Resolution2D::square(8),
            DomainSize::square(1000.0),
            |x, y| 1000.0 + 5.0 * (-((x - 500.0).powi(2) + (y - 500.0).powi(2)) / 45000.0).exp(),
            |_, _| 0.0,
            |_, _| 0.0,
        )
    }

    #[test]
    fn test_implicit_euler_rest_state() {
        let (ops, cfg) = setup(1e-4);
        let res = cfg.resolution();
        let mut s = PlaneState::at_rest(res, 1000.0);
        implicit_euler_step(&ops, &cfg, &mut s, 100.0).unwrap();
        s.request_physical(ops.plan());
        assert!(s.max_abs_diff(&PlaneState::at_rest(res, 1000.0)) < 1e-9);
    }

    #[test]
    fn test_implicit_euler_conserves_mass_and_damps() {
        let (ops, cfg) = setup(0.0);
        let mut s = bump();
        let mass = s.h.sum();
        let amplitude = s.h.max_abs() - 1000.0;
        implicit_euler_step(&ops, &cfg, &mut s, 5.0).unwrap();
        s.request_physical(ops.plan());
        assert!((s.h.sum() - mass).abs() < 1e-8 * mass);
        assert!(s.h.max_abs() - 1000.0 < amplitude);
    }

    #[test]
    fn test_small_step_matches_exact() {
        let (ops, cfg) = setup(1e-4);
        let direct = DirectSpectralSolver::new(cfg);
        let mut exact = bump();
        let mut cn = bump();
        let mut prev = bump();
        let sl = SemiLagrangian::new(cfg.resolution(), cfg.domain());
        direct.solve(&mut exact, 0.01).unwrap();
        crank_nicolson_sl_step(&ops, &cfg, &mut cn, &mut prev, NonlinearMode::Linear, &sl, 0.01)
            .unwrap();
        exact.request_physical(ops.plan());
        cn.request_physical(ops.plan());
        assert!(exact.max_abs_diff(&cn) < 1e-6);
        // prev now holds the initial state
        assert!(prev.max_abs_diff(&bump()) < 1e-12);
    }

    #[test]
    fn test_cn_full_mode_at_rest_stays_at_rest() {
        let (ops, cfg) = setup(1e-4);
        let res = cfg.resolution();
        let sl = SemiLagrangian::new(res, cfg.domain());
        let mut s = PlaneState::at_rest(res, 1000.0);
        let mut prev = s.clone();
        crank_nicolson_sl_step(&ops, &cfg, &mut s, &mut prev, NonlinearMode::Full, &sl, 50.0)
            .unwrap();
        s.request_physical(ops.plan());
        assert!(s.max_abs_diff(&PlaneState::at_rest(res, 1000.0)) < 1e-9);
    }

    #[test]
    fn test_non_positive_step_rejected() {
        let (ops, cfg) = setup(0.0);
        let mut s = bump();
        assert!(implicit_euler_step(&ops, &cfg, &mut s, 0.0).is_err());
        assert!(implicit_euler_step(&ops, &cfg, &mut s, -1.0).is_err());
    }
}
