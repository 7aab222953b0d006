//! Benchmarks for REXI coefficients, propagators and the SL-REXI step.
//!
//! Run with: `cargo bench --bench rexi_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rexi_rs::rexi::compute_terms;
use rexi_rs::{
    DirectSpectralSolver, DomainSize, ExponentialTimeIntegrator, GlobalConfig, NonlinearMode,
    ParallelSumEngine, PlaneState, PropagatorKind, Resolution2D, RexiParameters, SlRexiConfig,
};

const DEPTH: f64 = 1000.0;

/// Setup a test problem.
fn setup_problem(n: usize, threads: usize) -> (GlobalConfig, PlaneState) {
    let res = Resolution2D::square(n);
    let dom = DomainSize::square(1.0e5);
    let config = GlobalConfig::f_plane(res, dom, 1e-4, 9.81, DEPTH)
        .and_then(|c| c.with_layout(1, threads))
        .unwrap();
    let state = PlaneState::from_fns(
        res,
        dom,
        |x, y| DEPTH + (-((x - 5.0e4).powi(2) + (y - 5.0e4).powi(2)) / 1.0e8).exp(),
        |_, _| 0.0,
        |_, _| 0.0,
    );
    (config, state)
}

fn bench_compute_terms(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_terms");
    for m in [64, 256] {
        let params = RexiParameters::new(0.2, m);
        group.bench_with_input(BenchmarkId::new("M", m), &params, |b, p| {
            b.iter(|| compute_terms(black_box(p)).unwrap());
        });
    }
    group.finish();
}

/// One REXI propagation per thread count.
fn bench_rexi_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("rexi_advance");
    group.sample_size(20);

    for threads in [1, 2, 4] {
        let (config, state) = setup_problem(64, threads);
        let mut engine = ParallelSumEngine::single(config, RexiParameters::new(0.2, 64)).unwrap();
        group.bench_with_input(
            BenchmarkId::new("threads", threads),
            &threads,
            |b, _| {
                b.iter(|| {
                    let mut s = state.clone();
                    engine.advance(black_box(&mut s), black_box(60.0)).unwrap();
                    s
                });
            },
        );
    }

    group.finish();
}

fn bench_direct_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_solve");
    for n in [32, 64, 128] {
        let (config, state) = setup_problem(n, 1);
        let solver = DirectSpectralSolver::new(config);
        group.bench_with_input(BenchmarkId::new("grid", n), &n, |b, _| {
            b.iter(|| {
                let mut s = state.clone();
                solver.solve(black_box(&mut s), black_box(60.0)).unwrap();
                s
            });
        });
    }
    group.finish();
}

fn bench_sl_rexi_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("sl_rexi_step");
    group.sample_size(10);

    let (config, state) = setup_problem(32, 2);
    for kind in [PropagatorKind::Rexi, PropagatorKind::Direct] {
        let options = SlRexiConfig::default()
            .with_propagator(kind)
            .with_nonlinear(NonlinearMode::Full)
            .with_rexi(RexiParameters::new(0.2, 64));
        let mut integrator = ExponentialTimeIntegrator::new(config, options, state.clone()).unwrap();
        group.bench_function(format!("{kind:?}"), |b| {
            b.iter(|| integrator.step(black_box(30.0)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compute_terms,
    bench_rexi_advance,
    bench_direct_solve,
    bench_sl_rexi_step
);
criterion_main!(benches);
