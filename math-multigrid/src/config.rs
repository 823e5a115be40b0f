//! JSON configuration for hierarchies and the outer solve loop
//!
//! Every field has a default, so a partial document such as
//! `{"hierarchy": {"cycle_type": "w"}}` is a complete configuration.

use crate::coarse::{CgCoarseSolver, CoarseSolver, DirectCoarseSolver, SmoothingCoarseSolver};
use crate::error::{MultigridError, Result};
use crate::multigrid::{CycleType, LevelOrder};
use crate::smoothers::{
    GaussSeidelSmoother, JacobiSmoother, RichardsonSmoother, Smoother, SweepDirection,
};
use crate::sparse::CsrMatrix;
use crate::traits::ComplexField;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Smoother selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SmootherKind {
    /// Damped Jacobi
    Jacobi {
        #[serde(default = "default_jacobi_omega")]
        omega: f64,
    },
    /// Richardson with a fixed step
    Richardson {
        #[serde(default = "default_richardson_omega")]
        omega: f64,
    },
    /// Gauss-Seidel sweeps
    GaussSeidel {
        #[serde(default)]
        direction: SweepDirection,
    },
}

impl Default for SmootherKind {
    fn default() -> Self {
        SmootherKind::Jacobi {
            omega: default_jacobi_omega(),
        }
    }
}

fn default_jacobi_omega() -> f64 {
    2.0 / 3.0
}

fn default_richardson_omega() -> f64 {
    0.5
}

impl SmootherKind {
    /// Instantiate for one level's matrix
    pub fn build<T: ComplexField>(&self, matrix: &CsrMatrix<T>) -> Arc<dyn Smoother<T>> {
        match *self {
            SmootherKind::Jacobi { omega } => Arc::new(JacobiSmoother::from_csr(matrix, omega)),
            SmootherKind::Richardson { omega } => Arc::new(RichardsonSmoother::new(omega)),
            SmootherKind::GaussSeidel { direction } => {
                Arc::new(GaussSeidelSmoother::new(matrix, direction))
            }
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            SmootherKind::Jacobi { omega } | SmootherKind::Richardson { omega }
                if !(omega > 0.0 && omega.is_finite()) =>
            {
                Err(MultigridError::InvalidConfig(format!(
                    "smoother damping must be positive, got {omega}"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Coarse solver selection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoarseSolverKind {
    /// Dense LU of the coarsest operator
    #[default]
    Direct,
    /// Conjugate gradients (SPD coarse operators only)
    ConjugateGradient {
        #[serde(default = "default_cg_iterations")]
        max_iterations: usize,
        #[serde(default = "default_cg_tolerance")]
        tolerance: f64,
    },
    /// Sweeps of the configured smoother
    Smoothing {
        #[serde(default = "default_coarse_sweeps")]
        sweeps: usize,
    },
}

fn default_cg_iterations() -> usize {
    500
}

fn default_cg_tolerance() -> f64 {
    1e-12
}

fn default_coarse_sweeps() -> usize {
    20
}

impl CoarseSolverKind {
    /// Instantiate for the coarsest matrix
    pub fn build<T: ComplexField>(
        &self,
        matrix: &CsrMatrix<T>,
        smoother: &SmootherKind,
    ) -> Result<Arc<dyn CoarseSolver<T>>> {
        let solver: Arc<dyn CoarseSolver<T>> = match *self {
            CoarseSolverKind::Direct => Arc::new(
                DirectCoarseSolver::from_csr(matrix)
                    .map_err(|source| MultigridError::CoarseSolveFailure { source })?,
            ),
            CoarseSolverKind::ConjugateGradient {
                max_iterations,
                tolerance,
            } => Arc::new(CgCoarseSolver::new(
                Arc::new(matrix.clone()),
                max_iterations,
                tolerance,
            )),
            CoarseSolverKind::Smoothing { sweeps } => Arc::new(SmoothingCoarseSolver::new(
                Arc::new(matrix.clone()),
                smoother.build(matrix),
                sweeps,
            )),
        };
        Ok(solver)
    }
}

/// Shape of a Galerkin-built hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    #[serde(default)]
    pub cycle_type: CycleType,
    /// Sweeps before restriction (ν₁)
    #[serde(default = "default_smooth_steps")]
    pub pre_smooth_steps: usize,
    /// Sweeps after interpolation (ν₂)
    #[serde(default = "default_smooth_steps")]
    pub post_smooth_steps: usize,
    #[serde(default)]
    pub smoother: SmootherKind,
    #[serde(default)]
    pub coarse_solver: CoarseSolverKind,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            cycle_type: CycleType::default(),
            pre_smooth_steps: default_smooth_steps(),
            post_smooth_steps: default_smooth_steps(),
            smoother: SmootherKind::default(),
            coarse_solver: CoarseSolverKind::default(),
        }
    }
}

fn default_smooth_steps() -> usize {
    2
}

impl HierarchyConfig {
    pub fn validate(&self) -> Result<()> {
        self.smoother.validate()
    }
}

/// Outer solve loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultigridConfig {
    /// Absolute residual tolerance
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Tolerance relative to the initial residual (0 disables it)
    #[serde(default)]
    pub relative_tolerance: f64,
    #[serde(default = "default_max_cycles")]
    pub max_cycles: usize,
    /// A cycle diverges when the residual grows by more than this factor
    #[serde(default = "default_divergence_factor")]
    pub divergence_factor: f64,
    /// Log progress every N cycles (0 = no output)
    #[serde(default)]
    pub print_interval: usize,
    /// Report divergence as an error instead of a termination reason
    #[serde(default)]
    pub fail_on_divergence: bool,
    /// Report an exhausted cycle budget as an error
    #[serde(default)]
    pub require_convergence: bool,
    /// Solve with `Aᵀ`
    #[serde(default)]
    pub transpose: bool,
    #[serde(default)]
    pub additive_order: LevelOrder,
    /// Wall-clock budget checked between cycles
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
}

impl Default for MultigridConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            relative_tolerance: 0.0,
            max_cycles: default_max_cycles(),
            divergence_factor: default_divergence_factor(),
            print_interval: 0,
            fail_on_divergence: false,
            require_convergence: false,
            transpose: false,
            additive_order: LevelOrder::default(),
            time_limit_ms: None,
        }
    }
}

fn default_tolerance() -> f64 {
    1e-8
}

fn default_max_cycles() -> usize {
    100
}

fn default_divergence_factor() -> f64 {
    1e3
}

impl MultigridConfig {
    /// Every abnormal stop is an error
    pub fn strict() -> Self {
        Self {
            fail_on_divergence: true,
            require_convergence: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance >= 0.0) || !(self.relative_tolerance >= 0.0) {
            return Err(MultigridError::InvalidConfig(
                "tolerances must be non-negative".to_string(),
            ));
        }
        if self.max_cycles == 0 {
            return Err(MultigridError::InvalidConfig(
                "max_cycles must be at least 1".to_string(),
            ));
        }
        if !(self.divergence_factor > 0.0) {
            return Err(MultigridError::InvalidConfig(format!(
                "divergence_factor must be positive, got {}",
                self.divergence_factor
            )));
        }
        Ok(())
    }
}

/// Complete settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultigridSettings {
    #[serde(default)]
    pub hierarchy: HierarchyConfig,
    #[serde(default)]
    pub solver: MultigridConfig,
}

impl MultigridSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.hierarchy.validate()?;
        self.solver.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_uses_defaults() {
        let settings = MultigridSettings::from_json_str(
            r#"{"hierarchy": {"cycle_type": "w", "smoother": {"type": "gauss_seidel"}}}"#,
        )
        .expect("valid settings");

        assert_eq!(settings.hierarchy.cycle_type, CycleType::W);
        assert_eq!(
            settings.hierarchy.smoother,
            SmootherKind::GaussSeidel {
                direction: SweepDirection::Forward
            }
        );
        assert_eq!(settings.hierarchy.pre_smooth_steps, 2);
        assert_eq!(settings.solver, MultigridConfig::default());
    }

    #[test]
    fn test_round_trip() {
        let settings = MultigridSettings {
            hierarchy: HierarchyConfig {
                cycle_type: CycleType::Kaskade,
                coarse_solver: CoarseSolverKind::ConjugateGradient {
                    max_iterations: 40,
                    tolerance: 1e-9,
                },
                ..HierarchyConfig::default()
            },
            solver: MultigridConfig {
                additive_order: LevelOrder::FineToCoarse,
                time_limit_ms: Some(250),
                ..MultigridConfig::strict()
            },
        };

        let json = settings.to_json_string().expect("serialize");
        let back = MultigridSettings::from_json_str(&json).expect("deserialize");
        assert_eq!(back, settings);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "math_audio_multigrid_settings_{}.json",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"{"hierarchy": {"cycle_type": "f", "post_smooth_steps": 3}, "solver": {"max_cycles": 12}}"#,
        )
        .expect("write settings");

        let loaded = MultigridSettings::from_json_file(&path);
        let _ = fs::remove_file(&path);
        let settings = loaded.expect("load settings");

        assert_eq!(settings.hierarchy.cycle_type, CycleType::F);
        assert_eq!(settings.hierarchy.post_smooth_steps, 3);
        assert_eq!(settings.hierarchy.pre_smooth_steps, 2);
        assert_eq!(settings.solver.max_cycles, 12);

        let missing = MultigridSettings::from_json_file(&path).unwrap_err();
        assert!(matches!(missing, MultigridError::Io(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = MultigridSettings::from_json_str(r#"{"solver": {"max_cycles": 0}}"#).unwrap_err();
        assert!(matches!(err, MultigridError::InvalidConfig(_)));

        let err = MultigridSettings::from_json_str(
            r#"{"hierarchy": {"smoother": {"type": "jacobi", "omega": -1.0}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, MultigridError::InvalidConfig(_)));

        let err = MultigridSettings::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, MultigridError::Json(_)));
    }
}
