//! Time integration.
//!
//! [`ExponentialTimeIntegrator`] combines semi-Lagrangian advection with a
//! [`LinearPropagator`]; the implicit reference steps live in
//! [`crate::solver::implicit`].

mod exponential;
mod nonlinear;
mod propagator;

pub use exponential::{ExponentialTimeIntegrator, SlRexiConfig};
pub use nonlinear::NonlinearMode;
pub use propagator::{LinearPropagator, Propagator, PropagatorKind};
