use criterion::{Criterion, BenchmarkId, criterion_group, criterion_main};
use newtsqrt::{newton_sqrt, newton_tol, reference_sqrt};

fn bench_sqrt(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqrt");
    for x in [2., 9., 20., 40., 70., 100.] {
        group.bench_function(
            BenchmarkId::new("reference", x),
            |b| b.iter(|| reference_sqrt(x)));
        group.bench_function(
            BenchmarkId::new("newton_sqrt", x),
            |b| b.iter(|| newton_sqrt(x)));
        group.bench_function(
            BenchmarkId::new("newton_tol", x),
            |b| b.iter(|| newton_tol(x).atol(0.).rtol(1e-10).root()));
        group.bench_function(
            BenchmarkId::new("roots::newton_raphson", x),
            |b| b.iter(|| {
                let mut tol = Tol { rtol: 1e-10, atol: 0., maxiter: 100 };
                roots::find_root_newton_raphson(
                    1., |z| z * z - x, |z| 2. * z, &mut tol)
            }));
    }
}

criterion_group!(benches, bench_sqrt);
criterion_main!(benches);


// For the "roots" crate.
struct Tol {
    rtol: f64,
    atol: f64,
    maxiter: usize,
}

impl roots::Convergency<f64> for Tol {
    fn is_root_found(&mut self, y: f64) -> bool {
        y == 0.
    }

    fn is_converged(&mut self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.rtol * a.abs().max(b.abs()) + self.atol
    }

    fn is_iteration_limit_reached(&mut self, iter: usize) -> bool {
        iter > self.maxiter
    }
}
