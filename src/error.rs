//! Error types for REXI and direct spectral propagation.

use thiserror::Error;

/// Errors that can occur while configuring or running a propagator.
///
/// Errors fall into two classes (see [`RexiError::is_fatal`]):
/// configuration and collective failures indicate a deployment defect and
/// must stop the simulation, while numerical errors are reported to the
/// caller, which decides whether to continue.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RexiError {
    /// Invalid configuration (zero workers, bad pole count, setup inside a
    /// parallel region, ...).
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Non-finite value detected in broadcast input or reduced output.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Non-finite eigenvector or inverse entry for a wavenumber.
    #[error("Numerical degeneracy at wavenumber ({k0}, {k1}): {detail}")]
    NumericalDegeneracy { k0: i64, k1: i64, detail: String },

    /// Field or buffer sizes do not match the grid.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// A collective broadcast/reduce could not complete.
    #[error("Collective operation failed: {0}")]
    Collective(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RexiError>;

impl RexiError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a numerical instability error.
    pub fn instability(msg: impl Into<String>) -> Self {
        Self::NumericalInstability(msg.into())
    }

    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether the error must abort the simulation.
    ///
    /// Numerical instabilities and degeneracies are recoverable at the call
    /// site; everything else indicates a programming or deployment defect.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::DimensionMismatch { .. } | Self::Collective(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(RexiError::configuration("zero threads").is_fatal());
        assert!(RexiError::Collective("rank 1 hung up".into()).is_fatal());
        assert!(RexiError::dimension_mismatch("64", "32").is_fatal());
        assert!(!RexiError::instability("NaN in h").is_fatal());
        assert!(
            !RexiError::NumericalDegeneracy {
                k0: 1,
                k1: 0,
                detail: "inf".into()
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_display() {
        let err = RexiError::dimension_mismatch("8x8", "4x4");
        assert_eq!(err.to_string(), "Dimension mismatch: expected 8x8, got 4x4");
    }
}
