//! Linear shallow-water solvers on the doubly periodic plane.
//!
//! # Submodules
//!
//! - [`modes`]: closed-form eigen-decomposition of the 3×3 wave symbol
//! - [`direct`]: exact exponential propagator, one decomposition per wavenumber
//! - [`implicit`]: backward Euler and semi-Lagrangian Crank–Nicolson steps
//!
//! The shifted solve `(σ − L) U = R` shared by the implicit steps and the
//! REXI terms lives in `helmholtz`.

pub mod direct;
pub(crate) mod helmholtz;
pub mod implicit;
pub mod modes;
mod plane_state;

pub use direct::{DegeneracyPolicy, DirectSpectralSolver};
pub use implicit::{crank_nicolson_sl_step, implicit_euler_step};
pub use modes::{ModalDecomposition, SymbolParams, WaveMode};
pub use plane_state::PlaneState;
