//! Simulation runner implementation.
//!
//! Drives an [`ExponentialTimeIntegrator`] with a fixed time step.

use std::time::Instant;

use crate::analysis::{Diagnostics, StabilityMonitor, StabilityThresholds};
use crate::error::{Result, RexiError};
use crate::solver::PlaneState;
use crate::time::{ExponentialTimeIntegrator, LinearPropagator, Propagator};

// =============================================================================
// Simulation Configuration
// =============================================================================

/// Configuration for a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Time step (s).
    pub dt: f64,
    /// Maximum number of time steps.
    pub max_steps: Option<usize>,
    /// Call the callback every this many steps (every step if unset).
    pub callback_every: Option<usize>,
    /// Stability thresholds; no monitoring if unset.
    pub stability: Option<StabilityThresholds>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            max_steps: None,
            callback_every: None,
            stability: Some(StabilityThresholds::default()),
        }
    }
}

// =============================================================================
// Simulation Result
// =============================================================================

/// Result of a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Final simulation time reached.
    pub final_time: f64,
    /// Total number of time steps taken.
    pub n_steps: usize,
    /// Total wall-clock time in seconds.
    pub wall_time: f64,
    /// Whether the simulation completed successfully.
    pub success: bool,
    /// Error message if the simulation failed.
    pub error: Option<String>,
    /// Invariants at the start of the run.
    pub initial: Option<Diagnostics>,
    /// Invariants of the last state.
    pub last: Option<Diagnostics>,
}

impl SimulationResult {
    /// Create a successful result.
    pub fn success(final_time: f64, n_steps: usize, wall_time: f64) -> Self {
        Self {
            final_time,
            n_steps,
            wall_time,
            success: true,
            error: None,
            initial: None,
            last: None,
        }
    }

    /// Create a failed result.
    pub fn failure(final_time: f64, n_steps: usize, error: String) -> Self {
        Self {
            final_time,
            n_steps,
            wall_time: 0.0,
            success: false,
            error: Some(error),
            initial: None,
            last: None,
        }
    }

    /// Relative mass change over the run, if diagnostics were recorded.
    pub fn mass_drift(&self) -> Option<f64> {
        match (&self.initial, &self.last) {
            (Some(a), Some(b)) => Some(((b.mass - a.mass) / a.mass).abs()),
            _ => None,
        }
    }
}

// =============================================================================
// Simulation Runner
// =============================================================================

/// Fixed-step simulation runner.
///
/// Configuration errors abort the run with `Err`; numerical instabilities
/// end it with a failed [`SimulationResult`].
///
/// The stability monitor looks at the local state only, so enable it only
/// when every rank holds the solution (single process).
pub struct Simulation<P: LinearPropagator = Propagator> {
    integrator: ExponentialTimeIntegrator<P>,
    config: SimulationConfig,
}

impl<P: LinearPropagator> Simulation<P> {
    pub fn new(integrator: ExponentialTimeIntegrator<P>) -> Self {
        Self {
            integrator,
            config: SimulationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the time step.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.config.dt = dt;
        self
    }

    /// Set the maximum number of steps.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.config.max_steps = Some(max_steps);
        self
    }

    /// Call the callback every `steps` steps.
    pub fn with_callback_every(mut self, steps: usize) -> Self {
        self.config.callback_every = Some(steps.max(1));
        self
    }

    pub fn with_stability(mut self, thresholds: Option<StabilityThresholds>) -> Self {
        self.config.stability = thresholds;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn integrator(&self) -> &ExponentialTimeIntegrator<P> {
        &self.integrator
    }

    pub fn into_integrator(self) -> ExponentialTimeIntegrator<P> {
        self.integrator
    }

    pub fn state(&self) -> &PlaneState {
        self.integrator.state()
    }

    /// Run until `t_end`.
    pub fn run(&mut self, t_end: f64) -> Result<SimulationResult> {
        self.run_with_callback(t_end, |_, _| {})
    }

    /// Run until `t_end`, calling `callback(state, time)` at the start and
    /// at the configured interval.
    pub fn run_with_callback<F>(&mut self, t_end: f64, mut callback: F) -> Result<SimulationResult>
    where
        F: FnMut(&PlaneState, f64),
    {
        let dt = self.config.dt;
        if !(dt.is_finite() && dt > 0.0) {
            let err = RexiError::configuration(format!("time step must be positive, got {dt}"));
            tracing::error!(%err, "simulation aborted");
            return Err(err);
        }

        let start_wall = Instant::now();
        let mut monitor = self.config.stability.map(StabilityMonitor::new);
        let initial = self.diagnostics();
        let mean_depth = self.integrator.config().mean_depth();
        let every = self.config.callback_every.unwrap_or(1).max(1);
        let mut n_steps = 0;

        callback(self.integrator.state(), self.integrator.time());
        tracing::debug!(
            propagator = self.integrator.propagator().name(),
            t_start = self.integrator.time(),
            t_end,
            dt,
            "starting simulation"
        );

        // Stop when the remaining interval is a rounding residue.
        while t_end - self.integrator.time() > 1e-9 * dt {
            if let Some(max_steps) = self.config.max_steps
                && n_steps >= max_steps
            {
                return Ok(self.finish_failed(
                    n_steps,
                    format!("Maximum step limit ({max_steps}) reached"),
                    initial,
                ));
            }

            let step_dt = dt.min(t_end - self.integrator.time());
            if let Err(err) = self.integrator.step(step_dt) {
                if err.is_fatal() {
                    tracing::error!(%err, step = n_steps, "simulation aborted");
                    return Err(err);
                }
                tracing::warn!(%err, step = n_steps, "simulation stopped");
                return Ok(self.finish_failed(n_steps, err.to_string(), initial));
            }
            n_steps += 1;

            if let Some(monitor) = monitor.as_mut() {
                let status = monitor.check(self.integrator.state(), mean_depth);
                if !status.is_stable {
                    monitor.report(self.integrator.time(), n_steps);
                }
                if monitor.should_stop() {
                    let reason = status
                        .warnings
                        .first()
                        .map_or_else(|| "stability monitor stop".to_string(), ToString::to_string);
                    return Ok(self.finish_failed(n_steps, reason, initial));
                }
            }

            if n_steps % every == 0 {
                callback(self.integrator.state(), self.integrator.time());
            }
        }

        let wall_time = start_wall.elapsed().as_secs_f64();
        tracing::debug!(steps = n_steps, wall_time, "simulation complete");

        let mut result = SimulationResult::success(self.integrator.time(), n_steps, wall_time);
        result.initial = Some(initial);
        result.last = Some(self.diagnostics());
        Ok(result)
    }

    fn diagnostics(&self) -> Diagnostics {
        let mut state = self.integrator.state().clone();
        Diagnostics::compute(&mut state, self.integrator.operators(), self.integrator.config())
    }

    fn finish_failed(&self, n_steps: usize, error: String, initial: Diagnostics) -> SimulationResult {
        let mut result = SimulationResult::failure(self.integrator.time(), n_steps, error);
        result.initial = Some(initial);
        result.last = Some(self.diagnostics());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::GlobalConfig;
    use crate::time::{NonlinearMode, PropagatorKind, SlRexiConfig};
    use crate::types::{DomainSize, Resolution2D};

    fn create_test_setup(initial: PlaneState) -> ExponentialTimeIntegrator {
        let cfg = GlobalConfig::f_plane(
            Resolution2D::square(8),
            DomainSize::square(1000.0),
            1e-4,
            9.81,
            100.0,
        )
        .unwrap();
        let options = SlRexiConfig::default()
            .with_propagator(PropagatorKind::Direct)
            .with_nonlinear(NonlinearMode::Linear);
        ExponentialTimeIntegrator::new(cfg, options, initial).unwrap()
    }

    fn bump() -> PlaneState {
        PlaneState::from_fns(
            Resolution2D::square(8),
            DomainSize::square(1000.0),
            |x, y| 100.0 + (-((x - 500.0).powi(2) + (y - 500.0).powi(2)) / 30000.0).exp(),
            |_, _| 0.0,
            |_, _| 0.0,
        )
    }

    #[test]
    fn test_simulation_basic() {
        let mut sim = Simulation::new(create_test_setup(bump())).with_dt(10.0);
        let result = sim.run(100.0).unwrap();
        assert!(result.success);
        assert_eq!(result.n_steps, 10);
        assert!((result.final_time - 100.0).abs() < 1e-9);
        assert!(result.mass_drift().unwrap() < 1e-12);
    }

    #[test]
    fn test_last_step_is_shortened() {
        let mut sim = Simulation::new(create_test_setup(bump())).with_dt(30.0);
        let result = sim.run(100.0).unwrap();
        assert_eq!(result.n_steps, 4);
        assert!((sim.integrator().time() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_simulation_with_callback() {
        let mut sim = Simulation::new(create_test_setup(bump()))
            .with_dt(5.0)
            .with_callback_every(2);
        let mut times = Vec::new();
        let result = sim
            .run_with_callback(20.0, |_state, time| times.push(time))
            .unwrap();
        assert!(result.success);
        assert_eq!(times.len(), 3);
        assert!((times[2] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_callback_interval_means_every_step() {
        let config = SimulationConfig {
            dt: 5.0,
            callback_every: Some(0),
            ..SimulationConfig::default()
        };
        let mut sim = Simulation::new(create_test_setup(bump())).with_config(config);
        let mut calls = 0;
        let result = sim.run_with_callback(10.0, |_, _| calls += 1).unwrap();
        assert!(result.success);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_simulation_max_steps() {
        let mut sim = Simulation::new(create_test_setup(bump()))
            .with_dt(1.0)
            .with_max_steps(5);
        let result = sim.run(100.0).unwrap();
        assert!(!result.success);
        assert_eq!(result.n_steps, 5);
    }

    #[test]
    fn test_invalid_dt_aborts() {
        let mut sim = Simulation::new(create_test_setup(bump())).with_dt(-1.0);
        let err = sim.run(10.0).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_monitor_stops_non_finite_run() {
        let mut state = bump();
        state.u.physical_set(3, 3, f64::INFINITY);
        let mut sim = Simulation::new(create_test_setup(state)).with_dt(1.0);
        let result = sim.run(10.0).unwrap();
        assert!(!result.success);
        assert_eq!(result.n_steps, 1);
    }

    #[test]
    fn test_simulation_result() {
        let result = SimulationResult::success(10.0, 100, 1.5);
        assert!(result.success);
        assert!(result.error.is_none());
        assert!(result.mass_drift().is_none());

        let result = SimulationResult::failure(5.0, 50, "Test error".to_string());
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Test error"));
    }
}
