//! Level hierarchy
//!
//! Ordered levels from the coarsest (index 0) to the finest (index L-1), the
//! coarse solver and the cycle defaults. Validated once in
//! [`LevelHierarchy::build`] and immutable afterwards.

use super::context::CycleContext;
use super::cycle::CycleScheduler;
use super::level::Level;
use super::transfer::TransferOperator;
use super::workspace::Workspace;
use crate::coarse::CoarseSolver;
use crate::config::HierarchyConfig;
use crate::error::{MultigridError, Result};
use crate::sparse::CsrMatrix;
use crate::traits::{ComplexField, LinearOperator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Shape of one multigrid cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleType {
    /// One coarse visit per level
    #[default]
    V,
    /// Two coarse visits per level
    W,
    /// An F-cycle on the next coarser level followed by a V-cycle
    F,
    /// Independent corrections from every level, summed
    Additive,
    /// Sequential coarse-grid correction; one visit unless a level overrides it
    Multiplicative,
    /// Cascadic: one upward sweep with smoothing, no re-restriction
    Kaskade,
}

/// Summary of a hierarchy's shape
#[derive(Debug, Clone)]
pub struct HierarchyDiagnostics {
    pub num_levels: usize,
    /// Unknowns per level, coarsest first
    pub level_dofs: Vec<usize>,
    /// Total unknowns over finest-level unknowns
    pub grid_complexity: f64,
    /// Time spent assembling coarse operators (Galerkin builds only)
    pub setup_time_ms: f64,
}

/// Validated, immutable level hierarchy
pub struct LevelHierarchy<T: ComplexField> {
    levels: Vec<Level<T>>,
    coarse_solver: Arc<dyn CoarseSolver<T>>,
    cycle_type: CycleType,
    pre_smooth_steps: usize,
    post_smooth_steps: usize,
    setup_time_ms: f64,
}

impl<T: ComplexField> LevelHierarchy<T> {
    /// Validate and assemble a hierarchy from levels ordered coarsest first
    pub fn build(
        mut levels: Vec<Level<T>>,
        coarse_solver: Arc<dyn CoarseSolver<T>>,
        cycle_type: CycleType,
        pre_smooth_steps: usize,
        post_smooth_steps: usize,
    ) -> Result<Self> {
        if levels.is_empty() {
            return Err(MultigridError::DimensionMismatch {
                level: 0,
                context: "number of levels",
                expected: 1,
                got: 0,
            });
        }

        for (index, level) in levels.iter_mut().enumerate() {
            level.index = index;
            if !level.operator.is_square() {
                return Err(MultigridError::DimensionMismatch {
                    level: index,
                    context: "operator columns",
                    expected: level.operator.num_rows(),
                    got: level.operator.num_cols(),
                });
            }
            if level.cycles == Some(0) {
                return Err(MultigridError::InvalidConfig(format!(
                    "level {index} requests zero coarse-grid visits"
                )));
            }
            if index == 0 && level.transfer.take().is_some() {
                log::warn!("Ignoring transfer operator on the coarsest level");
            }
        }

        let coarse_size = levels[0].size();
        if coarse_solver.size() != coarse_size {
            return Err(MultigridError::DimensionMismatch {
                level: 0,
                context: "coarse solver",
                expected: coarse_size,
                got: coarse_solver.size(),
            });
        }

        for index in 1..levels.len() {
            let fine = levels[index].size();
            let coarse = levels[index - 1].size();
            let level = &levels[index];

            let transfer = level.transfer.as_ref().ok_or(MultigridError::MissingComponent {
                level: index,
                component: "transfer operator",
            })?;
            if let Some((context, expected, got)) = transfer.shape_mismatch(fine, coarse) {
                return Err(MultigridError::DimensionMismatch {
                    level: index,
                    context,
                    expected,
                    got,
                });
            }

            let pre = level.pre_smooth_steps.unwrap_or(pre_smooth_steps);
            let post = level.post_smooth_steps.unwrap_or(post_smooth_steps);
            // Transpose cycles smooth with the opposite side, so every cycle
            // shape needs both smoothers whenever its count is nonzero
            if pre > 0 && level.smoother_down.is_none() {
                return Err(MultigridError::MissingComponent {
                    level: index,
                    component: "down smoother",
                });
            }
            if post > 0 && level.smoother_up.is_none() {
                return Err(MultigridError::MissingComponent {
                    level: index,
                    component: "up smoother",
                });
            }
        }

        log::debug!(
            "Built {:?}-cycle hierarchy with {} levels (sizes {:?}), coarse solver {}",
            cycle_type,
            levels.len(),
            levels.iter().map(Level::size).collect::<Vec<_>>(),
            coarse_solver.name()
        );

        Ok(Self {
            levels,
            coarse_solver,
            cycle_type,
            pre_smooth_steps,
            post_smooth_steps,
            setup_time_ms: 0.0,
        })
    }

    /// Build every level from a fine matrix and interpolation matrices
    ///
    /// `interpolations[k]` maps level `L-2-k` to level `L-1-k`, i.e. the list
    /// runs from the finest pair downward. Coarse operators are the Galerkin
    /// products `Pᵀ A P` and restriction is `Pᵀ`.
    pub fn from_galerkin(
        fine: CsrMatrix<T>,
        interpolations: Vec<CsrMatrix<T>>,
        config: &HierarchyConfig,
    ) -> Result<Self> {
        config.validate()?;
        let start = Instant::now();
        let num_levels = interpolations.len() + 1;

        let mut matrices = Vec::with_capacity(num_levels);
        matrices.push(fine);
        for (k, p) in interpolations.iter().enumerate() {
            let level = num_levels - 1 - k;
            let a = &matrices[k];
            if p.num_rows != a.num_rows {
                return Err(MultigridError::DimensionMismatch {
                    level,
                    context: "interpolation output",
                    expected: a.num_rows,
                    got: p.num_rows,
                });
            }
            let coarse = p.transpose().matmul(&a.matmul(p));
            log::debug!(
                "Galerkin level {}: {} -> {} unknowns, nnz {}",
                level - 1,
                a.num_rows,
                coarse.num_rows,
                coarse.nnz()
            );
            matrices.push(coarse);
        }

        // Coarsest first from here on
        matrices.reverse();
        let mut transfers: Vec<Option<TransferOperator<T>>> = vec![None];
        transfers.extend(
            interpolations
                .into_iter()
                .rev()
                .map(|p| Some(TransferOperator::galerkin(p))),
        );

        let coarse_solver = config.coarse_solver.build(&matrices[0], &config.smoother)?;

        let levels = matrices
            .into_iter()
            .zip(transfers)
            .map(|(matrix, transfer)| {
                let smoother = config.smoother.build(&matrix);
                let level = Level::new(Arc::new(matrix)).with_smoother(smoother);
                match transfer {
                    Some(transfer) => level.with_transfer(transfer),
                    None => level,
                }
            })
            .collect();

        let mut hierarchy = Self::build(
            levels,
            coarse_solver,
            config.cycle_type,
            config.pre_smooth_steps,
            config.post_smooth_steps,
        )?;
        hierarchy.setup_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        Ok(hierarchy)
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Bounds-checked level access
    pub fn level(&self, index: usize) -> Result<&Level<T>> {
        self.levels.get(index).ok_or(MultigridError::IndexOutOfRange {
            index,
            len: self.levels.len(),
        })
    }

    pub fn levels(&self) -> &[Level<T>] {
        &self.levels
    }

    pub fn finest(&self) -> &Level<T> {
        &self.levels[self.levels.len() - 1]
    }

    pub fn finest_index(&self) -> usize {
        self.levels.len() - 1
    }

    /// The finest operator
    pub fn operator(&self) -> &dyn LinearOperator<T> {
        self.finest().operator()
    }

    pub fn coarse_solver(&self) -> &dyn CoarseSolver<T> {
        self.coarse_solver.as_ref()
    }

    pub fn cycle_type(&self) -> CycleType {
        self.cycle_type
    }

    pub fn pre_smooth_steps(&self) -> usize {
        self.pre_smooth_steps
    }

    pub fn post_smooth_steps(&self) -> usize {
        self.post_smooth_steps
    }

    /// Pre-smoothing count on a level after its override
    pub(crate) fn pre_steps_at(&self, index: usize) -> usize {
        self.levels[index]
            .pre_smooth_steps
            .unwrap_or(self.pre_smooth_steps)
    }

    pub(crate) fn post_steps_at(&self, index: usize) -> usize {
        self.levels[index]
            .post_smooth_steps
            .unwrap_or(self.post_smooth_steps)
    }

    /// Fresh zeroed work vectors for one solve
    pub fn workspace(&self) -> Workspace<T> {
        Workspace::new(self.levels.iter().map(Level::size))
    }

    /// Context sized for this hierarchy
    pub fn context(&self) -> CycleContext {
        CycleContext::new(self.levels.len())
    }

    /// Apply one cycle at `level`, in place on the workspace's `x` of that level
    pub fn apply_cycle(
        &self,
        level: usize,
        workspace: &mut Workspace<T>,
        context: &mut CycleContext,
    ) -> Result<()> {
        CycleScheduler::new(self).apply_cycle(level, workspace, context)
    }

    pub fn diagnostics(&self) -> HierarchyDiagnostics {
        let level_dofs: Vec<usize> = self.levels.iter().map(Level::size).collect();
        let total: usize = level_dofs.iter().sum();
        let finest = self.finest().size().max(1);
        HierarchyDiagnostics {
            num_levels: self.levels.len(),
            grid_complexity: total as f64 / finest as f64,
            level_dofs,
            setup_time_ms: self.setup_time_ms,
        }
    }
}

impl<T: ComplexField> std::fmt::Debug for LevelHierarchy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelHierarchy")
            .field("levels", &self.levels)
            .field("coarse_solver", &self.coarse_solver.name())
            .field("cycle_type", &self.cycle_type)
            .field("pre_smooth_steps", &self.pre_smooth_steps)
            .field("post_smooth_steps", &self.post_smooth_steps)
            .finish()
    }
}
