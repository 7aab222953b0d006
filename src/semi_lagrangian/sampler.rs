//! Periodic bicubic interpolation of grid fields at arbitrary points.

use crate::spectral::PlaneField;
use crate::types::{DomainSize, Resolution2D};

/// Interpolates a field at scattered physical positions.
pub trait BicubicSampler {
    /// Sample `field` at positions `(x[k], y[k])`.
    ///
    /// `stagger` is the offset, in grid cells, of the field's data points
    /// relative to the position-to-index mapping `i = x/dx`. Cell-centred
    /// data uses `(−0.5, −0.5)`. The field's physical representation must
    /// be valid.
    fn sample(&self, field: &PlaneField, x: &[f64], y: &[f64], stagger: (f64, f64)) -> PlaneField;
}

/// Tensor-product 4-point Lagrange interpolation on a periodic grid.
#[derive(Clone, Copy, Debug)]
pub struct CubicLagrangeSampler {
    resolution: Resolution2D,
    domain: DomainSize,
}

impl CubicLagrangeSampler {
    pub fn new(resolution: Resolution2D, domain: DomainSize) -> Self {
        Self { resolution, domain }
    }

    /// Interpolate at a single position.
    pub fn sample_point(&self, data: &[f64], x: f64, y: f64, stagger: (f64, f64)) -> f64 {
        let (nx, ny) = self.resolution.as_tuple();
        let (dx, dy) = self.domain.spacing(self.resolution);

        let gx = x / dx + stagger.0;
        let gy = y / dy + stagger.1;
        let ix = gx.floor();
        let iy = gy.floor();
        let wx = lagrange_weights(gx - ix);
        let wy = lagrange_weights(gy - iy);
        let ix = ix as i64;
        let iy = iy as i64;

        let mut acc = 0.0;
        for (b, wyb) in wy.iter().enumerate() {
            let j = wrap(iy + b as i64 - 1, ny);
            let row = &data[j * nx..(j + 1) * nx];
            let mut line = 0.0;
            for (a, wxa) in wx.iter().enumerate() {
                line += wxa * row[wrap(ix + a as i64 - 1, nx)];
            }
            acc += wyb * line;
        }
        acc
    }
}

impl BicubicSampler for CubicLagrangeSampler {
    fn sample(&self, field: &PlaneField, x: &[f64], y: &[f64], stagger: (f64, f64)) -> PlaneField {
        let data = field.physical();
        let out: Vec<f64> = x
            .iter()
            .zip(y)
            .map(|(&px, &py)| self.sample_point(data, px, py, stagger))
            .collect();
        let mut result = PlaneField::zeros(self.resolution);
        result.physical_mut().copy_from_slice(&out);
        result
    }
}

/// Weights for nodes −1, 0, 1, 2 at fractional offset `t ∈ [0, 1)`.
#[inline]
fn lagrange_weights(t: f64) -> [f64; 4] {
    [
        -t * (t - 1.0) * (t - 2.0) / 6.0,
        (t + 1.0) * (t - 1.0) * (t - 2.0) / 2.0,
        -(t + 1.0) * t * (t - 2.0) / 2.0,
        (t + 1.0) * t * (t - 1.0) / 6.0,
    ]
}

#[inline]
fn wrap(i: i64, n: usize) -> usize {
    i.rem_euclid(n as i64) as usize
}
