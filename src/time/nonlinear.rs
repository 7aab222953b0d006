//! Degree of nonlinearity of a time step.

use crate::error::{Result, RexiError};

/// Which nonlinear terms a step includes on top of the linear operator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NonlinearMode {
    /// Linear equations only; no trajectories.
    #[default]
    Linear,
    /// Semi-Lagrangian advection plus the `−h ∇·u` tendency.
    Full,
    /// Semi-Lagrangian advection only.
    AdvectionOnly,
}

impl NonlinearMode {
    /// Mode from the integer degree 0 (linear), 1 (full) or 2 (advection only).
    pub fn from_degree(degree: u8) -> Result<Self> {
        match degree {
            0 => Ok(Self::Linear),
            1 => Ok(Self::Full),
            2 => Ok(Self::AdvectionOnly),
            d => Err(RexiError::configuration(format!(
                "nonlinearity degree must be 0, 1 or 2, got {d}"
            ))),
        }
    }

    /// Integer degree of this mode.
    pub fn degree(self) -> u8 {
        match self {
            Self::Linear => 0,
            Self::Full => 1,
            Self::AdvectionOnly => 2,
        }
    }

    /// Whether departure points are traced.
    #[inline]
    pub fn is_semi_lagrangian(self) -> bool {
        self != Self::Linear
    }

    /// Whether the `−h ∇·u` tendency is included.
    #[inline]
    pub fn has_divergence_term(self) -> bool {
        self == Self::Full
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_roundtrip() {
        for d in 0..3 {
            assert_eq!(NonlinearMode::from_degree(d).unwrap().degree(), d);
        }
        assert!(NonlinearMode::from_degree(3).is_err());
    }

    #[test]
    fn test_flags() {
        assert!(!NonlinearMode::Linear.is_semi_lagrangian());
        assert!(NonlinearMode::AdvectionOnly.is_semi_lagrangian());
        assert!(!NonlinearMode::AdvectionOnly.has_divergence_term());
        assert!(NonlinearMode::Full.has_divergence_term());
    }
}
