//! Tracer, sampler and arrival grid bundled for one resolution.

use crate::spectral::PlaneField;
use crate::types::{DomainSize, Resolution2D};

use super::sampler::{BicubicSampler, CubicLagrangeSampler};
use super::tracer::{SemiLagrangianTracer, SettlsTracer};
use super::{CELL_CENTRED, arrival_points};

/// Departure points of one step.
#[derive(Clone, Debug, PartialEq)]
pub struct DeparturePoints {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Semi-Lagrangian machinery for cell-centred fields on one grid.
#[derive(Clone, Debug)]
pub struct SemiLagrangian<T = SettlsTracer, S = CubicLagrangeSampler> {
    tracer: T,
    sampler: S,
    arrival_x: Vec<f64>,
    arrival_y: Vec<f64>,
}

impl SemiLagrangian {
    /// SETTLS tracer with cubic Lagrange interpolation.
    pub fn new(resolution: Resolution2D, domain: DomainSize) -> Self {
        Self::with_components(
            SettlsTracer::new(resolution, domain),
            CubicLagrangeSampler::new(resolution, domain),
            resolution,
            domain,
        )
    }
}

impl<T: SemiLagrangianTracer, S: BicubicSampler> SemiLagrangian<T, S> {
    /// Use custom tracer and sampler implementations.
    pub fn with_components(tracer: T, sampler: S, resolution: Resolution2D, domain: DomainSize) -> Self {
        let (arrival_x, arrival_y) = arrival_points(resolution, domain);
        Self {
            tracer,
            sampler,
            arrival_x,
            arrival_y,
        }
    }

    /// Arrival points (cell centres).
    pub fn arrival(&self) -> (&[f64], &[f64]) {
        (&self.arrival_x, &self.arrival_y)
    }

    /// Departure points from previous and current velocities.
    pub fn departure_points(
        &self,
        u_prev: &PlaneField,
        v_prev: &PlaneField,
        u: &PlaneField,
        v: &PlaneField,
        dt: f64,
    ) -> DeparturePoints {
        let (x, y) = self.tracer.departure_points(
            u_prev,
            v_prev,
            u,
            v,
            &self.arrival_x,
            &self.arrival_y,
            dt,
        );
        DeparturePoints { x, y }
    }

    /// Interpolate a cell-centred field at departure points.
    pub fn sample(&self, field: &PlaneField, departure: &DeparturePoints) -> PlaneField {
        self.sampler
            .sample(field, &departure.x, &departure.y, CELL_CENTRED)
    }
}
