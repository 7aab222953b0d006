//! Periodic plane domain size.

use std::fmt;

use super::Resolution2D;
use crate::error::{Result, RexiError};

/// Size of a doubly periodic rectangular domain `[0, sx) × [0, sy)`.
///
/// # Example
///
/// ```
/// use rexi_rs::types::{DomainSize, Resolution2D};
///
/// let domain = DomainSize::new(1000.0, 500.0);
/// let res = Resolution2D::new(10, 5);
/// assert_eq!(domain.area(), 5.0e5);
/// assert_eq!(domain.spacing(res), (100.0, 100.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DomainSize {
    /// Domain length in x (m)
    pub sx: f64,
    /// Domain length in y (m)
    pub sy: f64,
}

impl DomainSize {
    /// Create a new domain size.
    ///
    /// # Panics
    ///
    /// Panics if either length is not strictly positive and finite.
    pub fn new(sx: f64, sy: f64) -> Self {
        assert!(
            sx.is_finite() && sx > 0.0,
            "sx must be positive and finite, got {}",
            sx
        );
        assert!(
            sy.is_finite() && sy > 0.0,
            "sy must be positive and finite, got {}",
            sy
        );
        Self { sx, sy }
    }

    /// Create a domain size, rejecting lengths that are not positive and finite.
    pub fn try_new(sx: f64, sy: f64) -> Result<Self> {
        let domain = Self { sx, sy };
        domain.validate()?;
        Ok(domain)
    }

    /// Check that both lengths are positive and finite.
    ///
    /// The fields are public, so a value built by hand may bypass [`new`](Self::new).
    pub fn validate(&self) -> Result<()> {
        for (name, len) in [("sx", self.sx), ("sy", self.sy)] {
            if !(len.is_finite() && len > 0.0) {
                return Err(RexiError::configuration(format!(
                    "domain length {name} must be positive and finite, got {len}"
                )));
            }
        }
        Ok(())
    }

    /// Square domain of side `s`.
    pub fn square(s: f64) -> Self {
        Self::new(s, s)
    }

    /// Domain area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.sx * self.sy
    }

    /// Grid spacing (dx, dy) for a given resolution.
    #[inline]
    pub fn spacing(&self, res: Resolution2D) -> (f64, f64) {
        (self.sx / res.nx() as f64, self.sy / res.ny() as f64)
    }

    /// Area of one grid cell.
    #[inline]
    pub fn cell_area(&self, res: Resolution2D) -> f64 {
        self.area() / res.total_points() as f64
    }

    /// Domain center point.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (self.sx / 2.0, self.sy / 2.0)
    }

    /// Wrap a coordinate pair into the periodic domain.
    #[inline]
    pub fn wrap(&self, x: f64, y: f64) -> (f64, f64) {
        (x.rem_euclid(self.sx), y.rem_euclid(self.sy))
    }
}

impl fmt::Display for DomainSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} × {:.2}", self.sx, self.sy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_and_area() {
        let d = DomainSize::new(1000.0, 1000.0);
        let r = Resolution2D::square(8);
        assert_eq!(d.spacing(r), (125.0, 125.0));
        assert_eq!(d.cell_area(r), 15625.0);
        assert_eq!(d.center(), (500.0, 500.0));
    }

    #[test]
    fn test_wrap() {
        let d = DomainSize::new(10.0, 20.0);
        let (x, y) = d.wrap(-1.0, 25.0);
        assert!((x - 9.0).abs() < 1e-14);
        assert!((y - 5.0).abs() < 1e-14);
    }

    #[test]
    fn test_try_new_rejects_degenerate_lengths() {
        assert!(DomainSize::try_new(10.0, 20.0).is_ok());
        for (sx, sy) in [(0.0, 1.0), (1.0, -2.0), (f64::NAN, 1.0), (1.0, f64::INFINITY)] {
            let err = DomainSize::try_new(sx, sy).unwrap_err();
            assert!(err.is_fatal(), "{sx} × {sy}");
        }
        assert!(DomainSize { sx: 0.0, sy: 1.0 }.validate().is_err());
    }

    #[test]
    #[should_panic(expected = "sx must be positive")]
    fn test_invalid_sx() {
        DomainSize::new(0.0, 1.0);
    }
}
