//! Parallel-sum REXI engine.
//!
//! One call to [`ParallelSumEngine::advance`] evaluates
//!
//! ```text
//! U(t + dt) ≈ Re Σₙ βₙ (αₙ/dt − L)⁻¹ (−U(t)/dt)
//! ```
//!
//! The N shifted solves are independent. They are split into contiguous
//! blocks over `threads_per_process × num_processes` workers; each worker
//! accumulates its partial sum privately, the partial sums are added in
//! complex arithmetic inside the process and then summed across processes
//! onto rank 0.

use std::sync::Arc;
use std::time::Instant;

use num_complex::Complex64;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Result, RexiError};
use crate::parallel::{ParallelRuntime, SingleProcess};
use crate::physics::GlobalConfig;
use crate::solver::PlaneState;
use crate::spectral::SpectralOperators;

use super::coefficients::{RexiParameters, RexiTerm, compute_terms};
use super::partition::WorkPartitioner;
use super::timing::{Phase, RexiTimings};
use super::worker::{SpectralInput, WorkerState};

const ROOT: usize = 0;

/// REXI exponential propagator distributed over threads and processes.
///
/// # Example
///
/// ```
/// use rexi_rs::physics::GlobalConfig;
/// use rexi_rs::rexi::{ParallelSumEngine, RexiParameters};
/// use rexi_rs::solver::PlaneState;
/// use rexi_rs::types::{DomainSize, Resolution2D};
///
/// let res = Resolution2D::square(8);
/// let config = GlobalConfig::builder(res, DomainSize::square(1000.0))
///     .build()
///     .unwrap();
/// let mut engine = ParallelSumEngine::single(config, RexiParameters::new(1.0, 16)).unwrap();
///
/// let mut state = PlaneState::at_rest(res, 1000.0);
/// engine.advance(&mut state, 1.0).unwrap();
/// assert!((state.h.physical_get(3, 4) - 1000.0).abs() < 1e-6);
/// ```
pub struct ParallelSumEngine {
    config: GlobalConfig,
    params: RexiParameters,
    terms: Vec<RexiTerm>,
    runtime: Arc<dyn ParallelRuntime>,
    ops: SpectralOperators,
    workers: Vec<WorkerState>,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
    timings: RexiTimings,
}

impl std::fmt::Debug for ParallelSumEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelSumEngine")
            .field("config", &self.config)
            .field("params", &self.params)
            .field("terms", &self.terms.len())
            .field("rank", &self.runtime.rank())
            .field("workers", &self.workers.len())
            .finish()
    }
}

impl ParallelSumEngine {
    // =========================================================================
    // Setup
    // =========================================================================

    /// Build the engine: compute the terms, allocate one [`WorkerState`] per
    /// local thread and start the thread pool.
    ///
    /// Must be called outside any parallel region. `runtime.size()` must equal
    /// `config.num_processes()`.
    pub fn setup(
        config: GlobalConfig,
        params: RexiParameters,
        runtime: Arc<dyn ParallelRuntime>,
    ) -> Result<Self> {
        ensure_outside_parallel_region()?;

        if runtime.size() != config.num_processes() {
            return Err(RexiError::configuration(format!(
                "runtime has {} processes, configuration expects {}",
                runtime.size(),
                config.num_processes()
            )));
        }
        if runtime.rank() >= runtime.size() {
            return Err(RexiError::configuration(format!(
                "rank {} outside runtime of size {}",
                runtime.rank(),
                runtime.size()
            )));
        }

        let terms = compute_terms(&params)?;
        let threads = config.threads_per_process();
        let partitioner = WorkPartitioner::new(threads, config.num_processes());
        let rank = runtime.rank();

        let workers: Vec<WorkerState> = (0..threads)
            .map(|t| {
                let range = partitioner.partition_for(partitioner.global_id(rank, t), terms.len());
                WorkerState::new(&config, range)
            })
            .collect();

        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(move |i| format!("rexi-{rank}-{i}"))
            .build()
            .map_err(|e| RexiError::configuration(format!("thread pool: {e}")))?;

        tracing::debug!(
            rank,
            processes = config.num_processes(),
            threads,
            terms = terms.len(),
            block = partitioner.block_size(terms.len()),
            "REXI engine set up"
        );

        Ok(Self {
            ops: SpectralOperators::new(config.resolution(), config.domain()),
            config,
            params,
            terms,
            runtime,
            workers,
            #[cfg(feature = "parallel")]
            pool,
            timings: RexiTimings::default(),
        })
    }

    /// Engine for a single process.
    pub fn single(config: GlobalConfig, params: RexiParameters) -> Result<Self> {
        Self::setup(config, params, Arc::new(SingleProcess))
    }

    /// Replace configuration and parameters, keeping the runtime.
    ///
    /// All existing workers are released before the new ones are allocated.
    /// On error the engine is left without workers and must be reconfigured
    /// again before use.
    pub fn reconfigure(&mut self, config: GlobalConfig, params: RexiParameters) -> Result<()> {
        ensure_outside_parallel_region()?;
        self.workers.clear();
        self.workers.shrink_to_fit();
        *self = Self::setup(config, params, Arc::clone(&self.runtime))?;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    pub fn params(&self) -> &RexiParameters {
        &self.params
    }

    /// The full ordered term sequence.
    pub fn terms(&self) -> &[RexiTerm] {
        &self.terms
    }

    /// Number of local workers.
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Local workers, in thread order.
    pub fn workers(&self) -> &[WorkerState] {
        &self.workers
    }

    /// Process rank of this engine.
    pub fn rank(&self) -> usize {
        self.runtime.rank()
    }

    /// Phase timings accumulated since setup or the last reset.
    pub fn timings(&self) -> &RexiTimings {
        &self.timings
    }

    pub fn reset_timings(&mut self) {
        self.timings.reset();
    }

    // =========================================================================
    // Propagation
    // =========================================================================

    /// Propagate `state` by `dt` with the linear operator.
    ///
    /// On more than one process, rank 0's state is the input and only rank
    /// 0's state holds the result; other ranks' state is unspecified.
    /// Every rank returns the same `Ok`/`Err` outcome.
    ///
    /// # Errors
    ///
    /// - [`RexiError::NumericalInstability`] if the input or the reduced
    ///   output contains a non-finite value. The output is still written.
    /// - [`RexiError::Configuration`] if `dt` is not finite or the engine has
    ///   no workers.
    /// - [`RexiError::DimensionMismatch`] if the state is on another grid.
    pub fn advance(&mut self, state: &mut PlaneState, dt: f64) -> Result<()> {
        if !dt.is_finite() {
            return Err(RexiError::configuration(format!("time step must be finite, got {dt}")));
        }
        if self.workers.is_empty() {
            return Err(RexiError::configuration("engine has no workers; call reconfigure"));
        }
        let res = self.config.resolution();
        if state.resolution() != res {
            return Err(RexiError::dimension_mismatch(
                res.to_string(),
                state.resolution().to_string(),
            ));
        }
        if dt == 0.0 {
            return Ok(());
        }

        let n = res.total_points();
        let multi = self.runtime.size() > 1;

        // 1. Broadcast
        let start = Instant::now();
        state.request_physical(self.ops.plan());
        if multi {
            let mut buf = pack(state);
            self.runtime.broadcast(&mut buf, ROOT)?;
            unpack(state, &buf, n)?;
        }
        self.timings.record(Phase::Broadcast, start);
        if !state.is_finite() {
            return Err(RexiError::instability(format!(
                "non-finite value in input state on rank {}",
                self.runtime.rank()
            )));
        }

        // 2-3. Spectral input and shift-independent quantities
        let start = Instant::now();
        let input = self.preprocess(state, dt);
        self.timings.record(Phase::Preprocessing, start);

        // 4. Shifted solves
        let start = Instant::now();
        let terms = &self.terms;
        let config = &self.config;
        let input = &input;
        #[cfg(feature = "parallel")]
        self.pool.install(|| {
            self.workers
                .par_iter_mut()
                .for_each(|w| w.accumulate(terms, input, config, dt));
        });
        #[cfg(not(feature = "parallel"))]
        for w in &mut self.workers {
            w.accumulate(terms, input, config, dt);
        }
        self.timings.record(Phase::Solve, start);

        // 5-6. Reduction: complex sum over workers, real part, then ranks
        let start = Instant::now();
        let mut buf = self.reduce_workers(n);
        if multi {
            self.runtime.reduce_sum(&mut buf, ROOT)?;
        }

        // 7. Output check on the root, shared with everyone
        let is_root = self.runtime.rank() == ROOT;
        let mut status = [0.0];
        if is_root && !buf.iter().all(|v| v.is_finite()) {
            status[0] = 1.0;
        }
        if multi {
            self.runtime.broadcast(&mut status, ROOT)?;
        }
        if is_root {
            unpack(state, &buf, n)?;
        }
        self.timings.record(Phase::Reduce, start);
        self.timings.calls += 1;

        tracing::debug!(dt, timings = %self.timings, "REXI advance");

        if status[0] != 0.0 {
            return Err(RexiError::instability(
                "non-finite value in reduced REXI output",
            ));
        }
        Ok(())
    }

    fn preprocess(&self, state: &mut PlaneState, dt: f64) -> SpectralInput {
        state.request_spectral(self.ops.plan());
        let inv_dt = 1.0 / dt;
        let scaled = |c: &Complex64| *c * inv_dt;
        let h: Vec<Complex64> = state.h.spectral().iter().map(scaled).collect();
        let u: Vec<Complex64> = state.u.spectral().iter().map(scaled).collect();
        let v: Vec<Complex64> = state.v.spectral().iter().map(scaled).collect();

        let ikx = self.ops.ikx();
        let iky = self.ops.iky();
        let divergence = (0..h.len()).map(|k| ikx[k] * u[k] + iky[k] * v[k]).collect();
        let vorticity = (0..h.len()).map(|k| ikx[k] * v[k] - iky[k] * u[k]).collect();

        SpectralInput {
            h,
            u,
            v,
            divergence,
            vorticity,
        }
    }

    /// Sum worker partials in complex arithmetic, in worker order, and return
    /// the real parts as `[h | u | v]`.
    fn reduce_workers(&self, n: usize) -> Vec<f64> {
        let zero = Complex64::new(0.0, 0.0);
        let mut acc = [vec![zero; n], vec![zero; n], vec![zero; n]];
        for w in &self.workers {
            let (h, u, v) = w.sums();
            for (dst, src) in acc.iter_mut().zip([h, u, v]) {
                for (a, b) in dst.iter_mut().zip(src.data()) {
                    *a += *b;
                }
            }
        }
        acc.iter().flat_map(|f| f.iter().map(|c| c.re)).collect()
    }
}

fn ensure_outside_parallel_region() -> Result<()> {
    #[cfg(feature = "parallel")]
    if let Some(idx) = rayon::current_thread_index() {
        return Err(RexiError::configuration(format!(
            "REXI setup called from inside parallel worker {idx}"
        )));
    }
    Ok(())
}

fn pack(state: &PlaneState) -> Vec<f64> {
    let mut buf = Vec::with_capacity(3 * state.resolution().total_points());
    buf.extend_from_slice(state.h.physical());
    buf.extend_from_slice(state.u.physical());
    buf.extend_from_slice(state.v.physical());
    buf
}

fn unpack(state: &mut PlaneState, buf: &[f64], n: usize) -> Result<()> {
    state.h.set_physical(&buf[..n])?;
    state.u.set_physical(&buf[n..2 * n])?;
    state.v.set_physical(&buf[2 * n..3 * n])?;
    Ok(())
}
