//! Shared fixtures for the integration tests

#![allow(dead_code)]

use math_audio_multigrid::{
    CoarseSolveError, CoarseSolver, CsrMatrix, DirectCoarseSolver, JacobiSmoother, Level,
    TransferOperator, linear_interpolation_1d,
};
use ndarray::Array1;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Tridiagonal matrix with constant `(lower, diag, upper)` stencil
pub fn tridiagonal(n: usize, lower: f64, diag: f64, upper: f64) -> CsrMatrix<f64> {
    let mut triplets = Vec::with_capacity(3 * n);
    for i in 0..n {
        triplets.push((i, i, diag));
        if i > 0 {
            triplets.push((i, i - 1, lower));
        }
        if i + 1 < n {
            triplets.push((i, i + 1, upper));
        }
    }
    CsrMatrix::from_triplets(n, n, triplets)
}

/// 1D Laplacian `tridiag(-1, 2, -1)` on interior points
pub fn poisson_1d(n: usize) -> CsrMatrix<f64> {
    tridiagonal(n, -1.0, 2.0, -1.0)
}

/// Galerkin products for a chain of linear interpolations
///
/// `coarse_sizes` runs finest first (e.g. `[7, 3, 1]` under a 15-point
/// fine grid). Returns the level matrices and the interpolations, both
/// coarsest first; `interpolations[i]` maps level `i` to level `i + 1`.
pub fn galerkin_chain(
    fine: CsrMatrix<f64>,
    coarse_sizes: &[usize],
) -> (Vec<CsrMatrix<f64>>, Vec<CsrMatrix<f64>>) {
    let mut matrices = vec![fine];
    let mut interpolations = Vec::new();
    for &n_coarse in coarse_sizes {
        let p = linear_interpolation_1d(n_coarse);
        let a = &matrices[matrices.len() - 1];
        let coarse = p.transpose().matmul(&a.matmul(&p));
        interpolations.push(p);
        matrices.push(coarse);
    }
    matrices.reverse();
    interpolations.reverse();
    (matrices, interpolations)
}

/// Levels of a Galerkin hierarchy with damped Jacobi on every level above 0
pub fn jacobi_levels(
    matrices: &[CsrMatrix<f64>],
    interpolations: &[CsrMatrix<f64>],
    omega: f64,
) -> Vec<Level<f64>> {
    let mut levels = vec![Level::new(Arc::new(matrices[0].clone()))];
    for (matrix, p) in matrices[1..].iter().zip(interpolations) {
        levels.push(
            Level::new(Arc::new(matrix.clone()))
                .with_transfer(TransferOperator::galerkin(p.clone()))
                .with_smoother(Arc::new(JacobiSmoother::from_csr(matrix, omega))),
        );
    }
    levels
}

/// Direct coarse solver that counts how often it is called
pub struct CountingCoarseSolver {
    inner: DirectCoarseSolver<f64>,
    calls: AtomicUsize,
}

impl CountingCoarseSolver {
    pub fn new(matrix: &CsrMatrix<f64>) -> Self {
        Self {
            inner: DirectCoarseSolver::from_csr(matrix).expect("coarse factorization"),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CoarseSolver<f64> for CountingCoarseSolver {
    fn solve(&self, b: &Array1<f64>) -> Result<Array1<f64>, CoarseSolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.solve(b)
    }

    fn solve_transpose(&self, b: &Array1<f64>) -> Result<Array1<f64>, CoarseSolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.solve_transpose(b)
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

/// Smooth, non-trivial right-hand side
pub fn sine_rhs(n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |i| ((i + 1) as f64 * 0.7).sin() + 0.3)
}
