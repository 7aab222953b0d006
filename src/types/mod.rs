//! Strongly-typed grid descriptors.
//!
//! Newtypes keep resolution, domain lengths and worker counts from being
//! mixed up in constructor signatures.
//!
//! # Example
//!
//! ```
//! use rexi_rs::types::{DomainSize, Resolution2D};
//!
//! let res = Resolution2D::square(64);
//! let domain = DomainSize::square(1.0e6);
//! let (dx, dy) = domain.spacing(res);
//! assert_eq!(dx, dy);
//! ```

mod domain;
mod resolution;

pub use domain::DomainSize;
pub use resolution::Resolution2D;
