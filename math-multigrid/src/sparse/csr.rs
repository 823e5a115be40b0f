//! Compressed Sparse Row (CSR) matrix format
//!
//! CSR format stores:
//! - `values`: Non-zero entries in row-major order
//! - `col_indices`: Column index for each value
//! - `row_ptrs`: Index into values/col_indices where each row starts
//!
//! Used for level operators, transfer matrices and Galerkin products.

use crate::traits::{ComplexField, LinearOperator};
use ndarray::{Array1, Array2};
use std::ops::Range;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Row count above which the product is split across the rayon pool
#[cfg(feature = "rayon")]
const PARALLEL_ROW_THRESHOLD: usize = 256;

/// Compressed Sparse Row (CSR) matrix format
#[derive(Debug, Clone)]
pub struct CsrMatrix<T: ComplexField> {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Non-zero values in row-major order
    pub values: Vec<T>,
    /// Column indices for each value
    pub col_indices: Vec<usize>,
    /// Row pointers: row_ptrs[i] is the start index in values/col_indices for row i
    /// row_ptrs[num_rows] = nnz (total number of non-zeros)
    pub row_ptrs: Vec<usize>,
}

impl<T: ComplexField> CsrMatrix<T> {
    /// Create a new empty CSR matrix
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            values: Vec::new(),
            col_indices: Vec::new(),
            row_ptrs: vec![0; num_rows + 1],
        }
    }

    /// Create a CSR matrix from a dense matrix
    ///
    /// Only stores entries with magnitude > threshold
    pub fn from_dense(dense: &Array2<T>, threshold: T::Real) -> Self {
        let num_rows = dense.nrows();
        let num_cols = dense.ncols();

        let mut values = Vec::new();
        let mut col_indices = Vec::new();
        let mut row_ptrs = vec![0usize; num_rows + 1];

        for i in 0..num_rows {
            for j in 0..num_cols {
                let val = dense[[i, j]];
                if val.norm() > threshold {
                    values.push(val);
                    col_indices.push(j);
                }
            }
            row_ptrs[i + 1] = values.len();
        }

        Self {
            num_rows,
            num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Create a CSR matrix from COO (Coordinate) format triplets
    ///
    /// Triplets are (row, col, value). Duplicate entries are summed.
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        mut triplets: Vec<(usize, usize, T)>,
    ) -> Self {
        triplets.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut values: Vec<T> = Vec::with_capacity(triplets.len());
        let mut col_indices = Vec::with_capacity(triplets.len());
        let mut row_counts = vec![0usize; num_rows];
        let mut last: Option<(usize, usize)> = None;

        for (row, col, val) in triplets {
            if last == Some((row, col)) {
                if let Some(acc) = values.last_mut() {
                    *acc += val;
                }
                continue;
            }
            values.push(val);
            col_indices.push(col);
            row_counts[row] += 1;
            last = Some((row, col));
        }

        let mut row_ptrs = Vec::with_capacity(num_rows + 1);
        row_ptrs.push(0);
        for count in row_counts {
            let next = row_ptrs[row_ptrs.len() - 1] + count;
            row_ptrs.push(next);
        }

        Self {
            num_rows,
            num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Create identity matrix in CSR format
    pub fn identity(n: usize) -> Self {
        Self::from_diagonal(&Array1::from_elem(n, T::one()))
    }

    /// Create diagonal matrix from vector
    pub fn from_diagonal(diag: &Array1<T>) -> Self {
        let n = diag.len();
        Self {
            num_rows: n,
            num_cols: n,
            values: diag.to_vec(),
            col_indices: (0..n).collect(),
            row_ptrs: (0..=n).collect(),
        }
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Get the range of indices in values/col_indices for a given row
    pub fn row_range(&self, row: usize) -> Range<usize> {
        self.row_ptrs[row]..self.row_ptrs[row + 1]
    }

    /// Get the (col, value) pairs for a row
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = self.row_range(row);
        self.col_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Matrix-vector product: y = A * x
    ///
    /// Uses parallel processing when the `rayon` feature is enabled and the
    /// matrix is large enough to benefit from parallelization.
    pub fn matvec(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_cols, "Input vector size mismatch");

        #[cfg(feature = "rayon")]
        {
            if self.num_rows >= PARALLEL_ROW_THRESHOLD {
                return self.matvec_parallel(x);
            }
        }

        Array1::from_iter((0..self.num_rows).map(|i| self.row_dot(i, x)))
    }

    #[inline]
    fn row_dot(&self, row: usize, x: &Array1<T>) -> T {
        let mut sum = T::zero();
        for (j, val) in self.row_entries(row) {
            sum += val * x[j];
        }
        sum
    }

    #[cfg(feature = "rayon")]
    fn matvec_parallel(&self, x: &Array1<T>) -> Array1<T> {
        let results: Vec<T> = (0..self.num_rows)
            .into_par_iter()
            .map(|i| self.row_dot(i, x))
            .collect();
        Array1::from_vec(results)
    }

    /// Transpose matrix-vector product: y = A^T * x
    pub fn matvec_transpose(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_rows, "Input vector size mismatch");

        let mut y = Array1::from_elem(self.num_cols, T::zero());
        for i in 0..self.num_rows {
            for (j, val) in self.row_entries(i) {
                y[j] += val * x[i];
            }
        }
        y
    }

    /// Get element at (i, j), returns 0 if not stored
    pub fn get(&self, i: usize, j: usize) -> T {
        self.row_entries(i)
            .find(|&(col, _)| col == j)
            .map(|(_, val)| val)
            .unwrap_or_else(T::zero)
    }

    /// Extract diagonal elements
    pub fn diagonal(&self) -> Array1<T> {
        let n = self.num_rows.min(self.num_cols);
        Array1::from_iter((0..n).map(|i| self.get(i, i)))
    }

    /// Explicit transpose A^T as a new CSR matrix
    pub fn transpose(&self) -> Self {
        let triplets = (0..self.num_rows)
            .flat_map(|i| self.row_entries(i).map(move |(j, val)| (j, i, val)))
            .collect();
        Self::from_triplets(self.num_cols, self.num_rows, triplets)
    }

    /// Sparse product C = A * B
    ///
    /// Row-wise accumulation sorted by column; exact zeros produced by
    /// cancellation are kept out of the pattern.
    pub fn matmul(&self, other: &CsrMatrix<T>) -> CsrMatrix<T> {
        assert_eq!(
            self.num_cols, other.num_rows,
            "Matrix dimension mismatch: A.cols ({}) != B.rows ({})",
            self.num_cols, other.num_rows
        );

        let mut triplets: Vec<(usize, usize, T)> = Vec::with_capacity(self.nnz() * 2);
        let mut row_data: Vec<(usize, T)> = Vec::new();

        for i in 0..self.num_rows {
            row_data.clear();
            for (k, a_ik) in self.row_entries(i) {
                for (j, b_kj) in other.row_entries(k) {
                    row_data.push((j, a_ik * b_kj));
                }
            }
            row_data.sort_by_key(|&(j, _)| j);

            let mut iter = row_data.iter().copied();
            let Some((mut current_j, mut current_val)) = iter.next() else {
                continue;
            };
            for (j, val) in iter {
                if j == current_j {
                    current_val += val;
                } else {
                    if !current_val.is_zero() {
                        triplets.push((i, current_j, current_val));
                    }
                    current_j = j;
                    current_val = val;
                }
            }
            if !current_val.is_zero() {
                triplets.push((i, current_j, current_val));
            }
        }

        CsrMatrix::from_triplets(self.num_rows, other.num_cols, triplets)
    }

    /// Convert to dense matrix (for small coarse levels and tests)
    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::from_elem((self.num_rows, self.num_cols), T::zero());
        for i in 0..self.num_rows {
            for (j, val) in self.row_entries(i) {
                dense[[i, j]] += val;
            }
        }
        dense
    }
}

impl<T: ComplexField> LinearOperator<T> for CsrMatrix<T> {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_cols(&self) -> usize {
        self.num_cols
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        self.matvec(x)
    }

    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T> {
        self.matvec_transpose(x)
    }
}
