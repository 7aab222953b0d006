//! Doubly periodic spectral discretisation.
//!
//! - [`FftPlan`]: 2D forward/inverse transforms backed by `rustfft`
//! - [`PlaneField`] / [`ComplexField`]: fields with physical and spectral
//!   representations
//! - [`SpectralOperators`]: derivative symbols and wavenumber helpers
//!
//! Spectral index `p + q·nx` holds mode `(mode_number(p, nx), mode_number(q, ny))`.

mod fft;
mod field;
mod operators;

pub use fft::FftPlan;
pub use field::{ComplexField, PlaneField, Space};
pub use operators::{SpectralOperators, mode_number};
