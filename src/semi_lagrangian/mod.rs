//! Semi-Lagrangian trajectory tracing and interpolation.
//!
//! Arrival points are the cell centres of the grid; departure points come
//! from a [`SemiLagrangianTracer`] and fields are evaluated there with a
//! [`BicubicSampler`].

mod context;
mod sampler;
mod tracer;

pub use context::{DeparturePoints, SemiLagrangian};
pub use sampler::{BicubicSampler, CubicLagrangeSampler};
pub use tracer::{SemiLagrangianTracer, SettlsTracer};

use crate::types::{DomainSize, Resolution2D};

/// Stagger of cell-centred data, in grid cells.
pub const CELL_CENTRED: (f64, f64) = (-0.5, -0.5);

/// Physical coordinates of the cell centres, row-major with x fastest.
pub fn arrival_points(resolution: Resolution2D, domain: DomainSize) -> (Vec<f64>, Vec<f64>) {
    let (nx, ny) = resolution.as_tuple();
    let (dx, dy) = domain.spacing(resolution);
    let mut xs = Vec::with_capacity(nx * ny);
    let mut ys = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            xs.push((i as f64 + 0.5) * dx);
            ys.push((j as f64 + 0.5) * dy);
        }
    }
    (xs, ys)
}
