//! 2D grid resolution types.

use std::fmt;

use crate::error::{Result, RexiError};

/// 2D grid resolution (number of grid points in each direction).
///
/// Provides a strongly-typed way to specify the physical resolution of a
/// periodic plane, preventing mix-ups between nx/ny and other integer
/// parameters such as thread or pole counts.
///
/// # Example
///
/// ```
/// use rexi_rs::types::Resolution2D;
///
/// let res = Resolution2D::new(64, 32);
/// assert_eq!(res.nx(), 64);
/// assert_eq!(res.ny(), 32);
/// assert_eq!(res.total_points(), 2048);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution2D {
    /// Number of grid points in x-direction
    nx: usize,
    /// Number of grid points in y-direction
    ny: usize,
}

impl Resolution2D {
    /// Create a new resolution specification.
    ///
    /// # Panics
    ///
    /// Panics if either `nx` or `ny` is zero.
    pub fn new(nx: usize, ny: usize) -> Self {
        assert!(nx > 0, "nx must be positive, got {}", nx);
        assert!(ny > 0, "ny must be positive, got {}", ny);
        Self { nx, ny }
    }

    /// Create a resolution, returning a configuration error for an empty grid.
    pub fn try_new(nx: usize, ny: usize) -> Result<Self> {
        if nx == 0 || ny == 0 {
            return Err(RexiError::configuration(format!(
                "resolution must be positive in both directions, got {nx}×{ny}"
            )));
        }
        Ok(Self { nx, ny })
    }

    /// Create a square resolution (same in both directions).
    pub fn square(n: usize) -> Self {
        Self::new(n, n)
    }

    /// Number of grid points in x-direction.
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of grid points in y-direction.
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Total number of grid points (and of spectral coefficients).
    #[inline]
    pub fn total_points(&self) -> usize {
        self.nx * self.ny
    }

    /// Linear index of grid point (i, j), row-major in y.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.nx + i
    }

    /// Return as tuple (nx, ny).
    #[inline]
    pub fn as_tuple(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}

impl fmt::Display for Resolution2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.nx, self.ny)
    }
}

impl From<(usize, usize)> for Resolution2D {
    fn from((nx, ny): (usize, usize)) -> Self {
        Self::new(nx, ny)
    }
}

impl From<Resolution2D> for (usize, usize) {
    fn from(res: Resolution2D) -> Self {
        (res.nx, res.ny)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_creation() {
        let r = Resolution2D::new(100, 50);
        assert_eq!(r.nx(), 100);
        assert_eq!(r.ny(), 50);
        assert_eq!(r.total_points(), 5000);
    }

    #[test]
    fn test_row_major_index() {
        let r = Resolution2D::new(8, 4);
        assert_eq!(r.index(0, 0), 0);
        assert_eq!(r.index(7, 0), 7);
        assert_eq!(r.index(0, 1), 8);
        assert_eq!(r.index(7, 3), 31);
    }

    #[test]
    fn test_from_tuple() {
        let r: Resolution2D = (16, 8).into();
        assert_eq!(r.as_tuple(), (16, 8));
        assert_eq!(r.to_string(), "16×8");
    }

    #[test]
    fn test_try_new_empty_grid_is_configuration_error() {
        assert_eq!(Resolution2D::try_new(4, 2).unwrap(), Resolution2D::new(4, 2));
        assert!(Resolution2D::try_new(0, 2).unwrap_err().is_fatal());
        assert!(Resolution2D::try_new(4, 0).unwrap_err().is_fatal());
    }

    #[test]
    #[should_panic(expected = "nx must be positive")]
    fn test_zero_nx() {
        Resolution2D::new(0, 10);
    }

    #[test]
    #[should_panic(expected = "ny must be positive")]
    fn test_zero_ny() {
        Resolution2D::new(10, 0);
    }
}
