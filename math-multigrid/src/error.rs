//! Error types for hierarchy construction, cycling and the outer solve loop

use thiserror::Error;

/// Failure reported by a smoother
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SmootherError {
    #[error("Smoother produced a non-finite iterate at sweep {sweep}")]
    NonFinite { sweep: usize },
    #[error("Smoother dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Failure reported by a coarse-level solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoarseSolveError {
    #[error("Coarse operator is singular or nearly singular")]
    Singular,
    #[error("Coarse solve did not converge after {iterations} iterations (residual {residual:.3e})")]
    NotConverged { iterations: usize, residual: f64 },
    #[error("Coarse solve produced a non-finite solution")]
    NonFinite,
    #[error("Coarse solve dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Errors raised by the multigrid engine
#[derive(Error, Debug)]
pub enum MultigridError {
    #[error("Dimension mismatch at level {level} ({context}): expected {expected}, got {got}")]
    DimensionMismatch {
        level: usize,
        context: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Level index {index} out of range for a hierarchy of {len} levels")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Level {level} is missing its {component}")]
    MissingComponent {
        level: usize,
        component: &'static str,
    },

    #[error("Smoother failed on level {level}")]
    SmootherFailure {
        level: usize,
        #[source]
        source: SmootherError,
    },

    #[error("Coarse-level solve failed")]
    CoarseSolveFailure {
        #[source]
        source: CoarseSolveError,
    },

    #[error("Residual diverged at cycle {cycle}: {norm:.3e} after {previous:.3e}")]
    Diverged {
        cycle: usize,
        norm: f64,
        previous: f64,
    },

    #[error("No convergence after {cycles} cycles (residual {norm:.3e})")]
    IterationLimitExceeded { cycles: usize, norm: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MultigridError>;
