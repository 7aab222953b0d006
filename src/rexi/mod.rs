//! REXI: rational approximation of the exponential integrator.
//!
//! For a linear operator `L` with purely imaginary spectrum,
//!
//! ```text
//! exp(dt·L) U ≈ Σₙ βₙ (dt·L − αₙ)⁻¹ U
//! ```
//!
//! turns one exponential into N independent shifted linear solves. On the
//! periodic plane each solve is diagonal per wavenumber.
//!
//! - [`compute_terms`]: the `(α, β)` sequence for given [`RexiParameters`]
//! - [`WorkPartitioner`]: static split of the terms over workers
//! - [`ParallelSumEngine`]: the distributed propagator

mod coefficients;
mod engine;
mod partition;
mod timing;
mod worker;

pub use coefficients::{
    DEFAULT_POLES, RexiParameters, RexiTerm, compute_terms, evaluate,
};
pub use engine::ParallelSumEngine;
pub use partition::{PartitionRange, WorkPartitioner};
pub use timing::{Phase, RexiTimings};
pub use worker::{SpectralInput, WorkerState};
