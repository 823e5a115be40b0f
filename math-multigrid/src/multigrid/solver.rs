//! Outer solve loop
//!
//! Runs cycles at the finest level until the [`ConvergenceMonitor`] stops it,
//! a wall-clock budget runs out between cycles, or a nested failure
//! propagates. Divergence and exhaustion are reported as termination reasons
//! unless the configuration turns them into errors.

use super::context::{CycleContext, CycleStats};
use super::cycle::CycleScheduler;
use super::hierarchy::LevelHierarchy;
use super::level::Level;
use super::monitor::{ConvergenceMonitor, ConvergenceStatus};
use super::workspace::Workspace;
use crate::config::MultigridConfig;
use crate::error::{MultigridError, Result};
use crate::traits::ComplexField;
use crate::vector::{residual_into, vector_norm};
use ndarray::Array1;
use num_traits::ToPrimitive;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why the outer loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Converged,
    Diverged,
    IterationLimitExceeded,
    TimedOut,
}

/// Result of a multigrid solve
#[derive(Debug, Clone)]
pub struct MultigridSolution<T: ComplexField> {
    /// Final iterate
    pub x: Array1<T>,
    /// Completed cycles
    pub cycles: usize,
    /// Final residual norm
    pub residual: T::Real,
    pub initial_residual: T::Real,
    /// Residual norm after each cycle
    pub history: Vec<T::Real>,
    pub termination: Termination,
    pub converged: bool,
    pub stats: CycleStats,
}

impl<T: ComplexField> MultigridSolution<T> {
    /// Geometric mean residual reduction per cycle
    pub fn convergence_rate(&self) -> Option<f64> {
        let initial = self.initial_residual.to_f64()?;
        let last = self.residual.to_f64()?;
        if self.cycles == 0 || initial <= 0.0 {
            return None;
        }
        Some((last / initial).powf(1.0 / self.cycles as f64))
    }
}

fn as_f64<R: ToPrimitive>(value: R) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Stationary multigrid iteration over a shared hierarchy
#[derive(Debug, Clone)]
pub struct MultigridSolver<T: ComplexField> {
    hierarchy: Arc<LevelHierarchy<T>>,
    config: MultigridConfig,
}

impl<T: ComplexField> MultigridSolver<T> {
    pub fn new(hierarchy: LevelHierarchy<T>, config: MultigridConfig) -> Result<Self> {
        Self::from_shared(Arc::new(hierarchy), config)
    }

    /// Share one hierarchy between several solvers
    pub fn from_shared(hierarchy: Arc<LevelHierarchy<T>>, config: MultigridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { hierarchy, config })
    }

    pub fn hierarchy(&self) -> &LevelHierarchy<T> {
        &self.hierarchy
    }

    pub fn config(&self) -> &MultigridConfig {
        &self.config
    }

    /// Solve `A x = b` from `x0` (zero when absent)
    pub fn solve(&self, b: &Array1<T>, x0: Option<&Array1<T>>) -> Result<MultigridSolution<T>> {
        let mut workspace = self.hierarchy.workspace();
        self.solve_with_workspace(b, x0, &mut workspace)
    }

    /// Solve `Aᵀ x = b` with transposed cycles
    pub fn solve_transpose(
        &self,
        b: &Array1<T>,
        x0: Option<&Array1<T>>,
    ) -> Result<MultigridSolution<T>> {
        let mut workspace = self.hierarchy.workspace();
        self.run(b, x0, &mut workspace, true)
    }

    /// Solve reusing caller-owned work vectors, for repeated right-hand sides
    pub fn solve_with_workspace(
        &self,
        b: &Array1<T>,
        x0: Option<&Array1<T>>,
        workspace: &mut Workspace<T>,
    ) -> Result<MultigridSolution<T>> {
        self.run(b, x0, workspace, self.config.transpose)
    }

    fn run(
        &self,
        b: &Array1<T>,
        x0: Option<&Array1<T>>,
        workspace: &mut Workspace<T>,
        transpose: bool,
    ) -> Result<MultigridSolution<T>> {
        let hierarchy = self.hierarchy.as_ref();
        let top = hierarchy.finest_index();
        let n = hierarchy.finest().size();
        if b.len() != n {
            return Err(MultigridError::DimensionMismatch {
                level: top,
                context: "right-hand side",
                expected: n,
                got: b.len(),
            });
        }
        if let Some(x0) = x0
            && x0.len() != n
        {
            return Err(MultigridError::DimensionMismatch {
                level: top,
                context: "initial guess",
                expected: n,
                got: x0.len(),
            });
        }

        workspace.check_sizes(hierarchy.levels().iter().map(Level::size))?;

        let scheduler = CycleScheduler::new(hierarchy);
        let mut context = hierarchy
            .context()
            .with_transpose(transpose)
            .with_additive_order(self.config.additive_order);

        let slot = workspace.level_mut(top)?;
        slot.b.assign(b);
        match x0 {
            Some(x0) => slot.x.assign(x0),
            None => slot.x.fill(T::zero()),
        }

        let initial = self.finest_residual(workspace, top, transpose)?;
        let mut monitor = ConvergenceMonitor::new(
            T::real_from_f64(self.config.tolerance),
            self.config.max_cycles,
        )
        .with_relative_tolerance(T::real_from_f64(self.config.relative_tolerance))
        .with_divergence_factor(T::real_from_f64(self.config.divergence_factor))
        .with_initial(initial);

        log::debug!(
            "Multigrid solve: {} levels, {:?} cycle, initial residual {:.6e}{}",
            hierarchy.num_levels(),
            hierarchy.cycle_type(),
            as_f64(initial),
            if transpose { " (transpose)" } else { "" }
        );

        let started = Instant::now();
        let time_limit = self.config.time_limit_ms.map(Duration::from_millis);

        let termination = if monitor.is_converged() {
            Termination::Converged
        } else {
            self.iterate(&scheduler, workspace, &mut context, &mut monitor, started, time_limit)?
        };

        let x = workspace.slot(top).x.clone();
        let residual = monitor.latest().unwrap_or(initial);
        let cycles = monitor.cycles();

        log::info!(
            "Multigrid finished after {} cycles: {:?}, residual {:.6e}",
            cycles,
            termination,
            as_f64(residual)
        );

        Ok(MultigridSolution {
            x,
            cycles,
            residual,
            initial_residual: initial,
            history: monitor.history().to_vec(),
            termination,
            converged: termination == Termination::Converged,
            stats: context.into_stats(),
        })
    }

    fn iterate(
        &self,
        scheduler: &CycleScheduler<'_, T>,
        workspace: &mut Workspace<T>,
        context: &mut CycleContext,
        monitor: &mut ConvergenceMonitor<T::Real>,
        started: Instant,
        time_limit: Option<Duration>,
    ) -> Result<Termination> {
        let top = self.hierarchy.finest_index();
        let transpose = context.transpose();

        loop {
            let previous = monitor.latest();
            scheduler.apply_cycle(top, workspace, context)?;
            let norm = self.finest_residual(workspace, top, transpose)?;
            let status = monitor.record_residual(norm);
            let cycle = monitor.cycles();

            if self.config.print_interval > 0 && cycle % self.config.print_interval == 0 {
                log::info!("Multigrid cycle {}: residual = {:.6e}", cycle, as_f64(norm));
            }

            match status {
                ConvergenceStatus::Iterating => {}
                ConvergenceStatus::Converged => return Ok(Termination::Converged),
                ConvergenceStatus::Diverged => {
                    let previous = previous.map(as_f64).unwrap_or(f64::NAN);
                    log::warn!(
                        "Multigrid diverged at cycle {}: {:.3e} after {:.3e}",
                        cycle,
                        as_f64(norm),
                        previous
                    );
                    if self.config.fail_on_divergence {
                        return Err(MultigridError::Diverged {
                            cycle,
                            norm: as_f64(norm),
                            previous,
                        });
                    }
                    return Ok(Termination::Diverged);
                }
                ConvergenceStatus::Exhausted => {
                    if self.config.require_convergence {
                        return Err(MultigridError::IterationLimitExceeded {
                            cycles: cycle,
                            norm: as_f64(norm),
                        });
                    }
                    return Ok(Termination::IterationLimitExceeded);
                }
            }

            if let Some(limit) = time_limit
                && started.elapsed() >= limit
            {
                log::warn!("Multigrid stopped by time limit after {} cycles", cycle);
                return Ok(Termination::TimedOut);
            }
        }
    }

    fn finest_residual(
        &self,
        workspace: &mut Workspace<T>,
        top: usize,
        transpose: bool,
    ) -> Result<T::Real> {
        let operator = self.hierarchy.finest().operator();
        let slot = workspace.level_mut(top)?;
        residual_into(operator, &slot.x, &slot.b, &mut slot.r, transpose);
        Ok(vector_norm(&slot.r))
    }
}
