//! Sparse matrix structures (CSR format)
//!
//! Compressed Sparse Row storage for level operators and transfer matrices.

mod csr;

pub use csr::CsrMatrix;
