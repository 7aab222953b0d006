//! # rexi-rs
//!
//! Exponential time integration of the linear rotating shallow water
//! equations on a doubly periodic f-plane.
//!
//! This crate provides:
//! - Rational approximation of the exponential (REXI) coefficients
//! - A parallel-sum propagator over threads and processes
//! - A closed-form spectral propagator for reference solutions
//! - Implicit Euler and semi-Lagrangian Crank–Nicolson steps
//! - A semi-Lagrangian exponential integrator (SL-REXI) and a runner
//! - Conserved-quantity diagnostics and stability monitoring

pub mod analysis;
pub mod error;
pub mod parallel;
pub mod physics;
pub mod rexi;
pub mod semi_lagrangian;
pub mod simulation;
pub mod solver;
pub mod spectral;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use error::{Result, RexiError};
pub use physics::{GlobalConfig, GlobalConfigBuilder};
pub use rexi::{ParallelSumEngine, RexiParameters, RexiTerm, compute_terms};
pub use solver::{DegeneracyPolicy, DirectSpectralSolver, PlaneState};
pub use spectral::{FftPlan, PlaneField, SpectralOperators};
pub use time::{
    ExponentialTimeIntegrator, LinearPropagator, NonlinearMode, PropagatorKind, SlRexiConfig,
};
pub use types::{DomainSize, Resolution2D};
