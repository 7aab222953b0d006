//! Linear propagators `U ↦ e^{L dt} U`.

use std::sync::Arc;

use crate::error::Result;
use crate::parallel::ParallelRuntime;
use crate::physics::GlobalConfig;
use crate::rexi::{ParallelSumEngine, RexiParameters};
use crate::solver::{DegeneracyPolicy, DirectSpectralSolver, PlaneState};

/// Applies the exponential of the linear shallow-water operator.
pub trait LinearPropagator {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Replace `state` by `e^{L dt} state`.
    fn propagate(&mut self, state: &mut PlaneState, dt: f64) -> Result<()>;
}

impl LinearPropagator for ParallelSumEngine {
    fn name(&self) -> &'static str {
        "rexi"
    }

    fn propagate(&mut self, state: &mut PlaneState, dt: f64) -> Result<()> {
        self.advance(state, dt)
    }
}

impl LinearPropagator for DirectSpectralSolver {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn propagate(&mut self, state: &mut PlaneState, dt: f64) -> Result<()> {
        self.solve(state, dt)?;
        state.request_physical(self.operators().plan());
        Ok(())
    }
}

/// Which propagator an integrator uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PropagatorKind {
    /// Parallel rational sum.
    #[default]
    Rexi,
    /// Closed-form eigen-decomposition per wavenumber.
    Direct,
}

/// Propagator selected at runtime.
///
/// Enum dispatch over the two built-in propagators.
#[derive(Debug)]
pub enum Propagator {
    Rexi(Box<ParallelSumEngine>),
    Direct(DirectSpectralSolver),
}

impl Propagator {
    /// Build the propagator of the given kind.
    ///
    /// `runtime` is only used by the REXI engine.
    pub fn build(
        kind: PropagatorKind,
        config: GlobalConfig,
        params: RexiParameters,
        policy: DegeneracyPolicy,
        runtime: Arc<dyn ParallelRuntime>,
    ) -> Result<Self> {
        Ok(match kind {
            PropagatorKind::Rexi => {
                Self::Rexi(Box::new(ParallelSumEngine::setup(config, params, runtime)?))
            }
            PropagatorKind::Direct => {
                Self::Direct(DirectSpectralSolver::new(config).with_policy(policy))
            }
        })
    }

    pub fn kind(&self) -> PropagatorKind {
        match self {
            Self::Rexi(_) => PropagatorKind::Rexi,
            Self::Direct(_) => PropagatorKind::Direct,
        }
    }

    /// The REXI engine, if this is one.
    pub fn as_rexi(&self) -> Option<&ParallelSumEngine> {
        match self {
            Self::Rexi(engine) => Some(engine.as_ref()),
            Self::Direct(_) => None,
        }
    }
}

impl LinearPropagator for Propagator {
    fn name(&self) -> &'static str {
        match self {
            Self::Rexi(engine) => engine.name(),
            Self::Direct(solver) => solver.name(),
        }
    }

    fn propagate(&mut self, state: &mut PlaneState, dt: f64) -> Result<()> {
        match self {
            Self::Rexi(engine) => engine.propagate(state, dt),
            Self::Direct(solver) => solver.propagate(state, dt),
        }
    }
}
