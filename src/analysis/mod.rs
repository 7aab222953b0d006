//! Run-time analysis of plane states.
//!
//! - [`diagnostics`]: mass, energy and potential enstrophy, error norms
//! - [`stability`]: threshold checks per step

pub mod diagnostics;
pub mod stability;

pub use diagnostics::{
    Diagnostics, ErrorNorms, potential_enstrophy, total_energy, total_mass,
};
pub use stability::{StabilityMonitor, StabilityStatus, StabilityThresholds, StabilityWarning};
