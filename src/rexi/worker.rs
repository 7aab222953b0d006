//! Per-worker REXI buffers and the shifted Helmholtz solve.

use num_complex::Complex64;

use crate::physics::GlobalConfig;
use crate::solver::helmholtz::ShiftedHelmholtz;
use crate::spectral::{ComplexField, SpectralOperators};

use super::coefficients::RexiTerm;
use super::partition::PartitionRange;

/// Spectral input shared read-only by all workers of one `advance` call.
///
/// `h`, `u`, `v` are already scaled by `1/dt`.
#[derive(Clone, Debug)]
pub struct SpectralInput {
    pub h: Vec<Complex64>,
    pub u: Vec<Complex64>,
    pub v: Vec<Complex64>,
    /// ∂u/∂x + ∂v/∂y
    pub divergence: Vec<Complex64>,
    /// ∂v/∂x − ∂u/∂y
    pub vorticity: Vec<Complex64>,
}

/// Buffers owned by one worker thread.
#[derive(Debug)]
pub struct WorkerState {
    range: PartitionRange,
    ops: SpectralOperators,
    eta0: ComplexField,
    u0: ComplexField,
    v0: ComplexField,
    h_sum: ComplexField,
    u_sum: ComplexField,
    v_sum: ComplexField,
}

impl WorkerState {
    /// Allocate zeroed buffers and private operators for a term range.
    pub fn new(config: &GlobalConfig, range: PartitionRange) -> Self {
        let res = config.resolution();
        let zero = ComplexField::zeros_spectral(res);
        Self {
            range,
            ops: SpectralOperators::new(res, config.domain()),
            eta0: zero.clone(),
            u0: zero.clone(),
            v0: zero.clone(),
            h_sum: zero.clone(),
            u_sum: zero.clone(),
            v_sum: zero,
        }
    }

    /// Terms this worker processes.
    #[inline]
    pub fn range(&self) -> PartitionRange {
        self.range
    }

    /// Accumulated `(h, u, v)` sums.
    pub fn sums(&self) -> (&ComplexField, &ComplexField, &ComplexField) {
        (&self.h_sum, &self.u_sum, &self.v_sum)
    }

    /// Sum `β·(η, u, v)` over this worker's terms into its private
    /// accumulators, then transform the sums to physical space.
    pub fn accumulate(
        &mut self,
        terms: &[RexiTerm],
        input: &SpectralInput,
        config: &GlobalConfig,
        dt: f64,
    ) {
        self.h_sum.set_zero_spectral();
        self.u_sum.set_zero_spectral();
        self.v_sum.set_zero_spectral();

        self.eta0.load_spectral(&input.h);
        self.u0.load_spectral(&input.u);
        self.v0.load_spectral(&input.v);

        for term in &terms[self.range.as_range()] {
            self.solve_term(term, input, config, dt);
        }

        let plan = self.ops.plan();
        self.h_sum.to_physical(plan);
        self.u_sum.to_physical(plan);
        self.v_sum.to_physical(plan);
    }

    /// One shifted solve `(σ − L) U = −U₀` with `σ = α/dt`, weighted by `β`.
    fn solve_term(
        &mut self,
        term: &RexiTerm,
        input: &SpectralInput,
        config: &GlobalConfig,
        dt: f64,
    ) {
        let kernel = ShiftedHelmholtz::new(&self.ops, config, term.alpha / dt);
        let beta = term.beta;

        let h0 = self.eta0.data();
        let u0 = self.u0.data();
        let v0 = self.v0.data();
        let h_sum = self.h_sum.data_mut();
        let u_sum = self.u_sum.data_mut();
        let v_sum = self.v_sum.data_mut();
        for k in 0..h0.len() {
            let [eta, u, v] = kernel.solve_mode(
                k,
                [-h0[k], -u0[k], -v0[k]],
                -input.divergence[k],
                -input.vorticity[k],
            );
            h_sum[k] += beta * eta;
            u_sum[k] += beta * u;
            v_sum[k] += beta * v;
        }
    }
}
