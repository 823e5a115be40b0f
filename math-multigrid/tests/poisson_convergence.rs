//! Convergence on the 1D Poisson problem
//!
//! `-u'' = f` on a uniform grid with Galerkin coarse operators built from
//! linear interpolation, solved with every cycle shape and smoother.

mod common;

use approx::assert_relative_eq;
use common::{init_logger, poisson_1d, sine_rhs};
use math_audio_multigrid::vector::residual_norm;
use math_audio_multigrid::{
    CoarseSolverKind, ComplexField, CsrMatrix, CycleType, HierarchyConfig, LevelHierarchy,
    MultigridConfig, MultigridSettings, MultigridSolver, SmootherKind, SweepDirection,
    Termination, linear_interpolation_1d,
};
use ndarray::Array1;
use num_complex::Complex64;

/// 31 fine points down to a single coarse unknown
fn interpolations<T: ComplexField>() -> Vec<CsrMatrix<T>> {
    [15, 7, 3, 1]
        .into_iter()
        .map(linear_interpolation_1d)
        .collect()
}

fn poisson<T: ComplexField>(n: usize) -> CsrMatrix<T> {
    let value = |v: f64| T::from_real(T::real_from_f64(v));
    let mut triplets = Vec::with_capacity(3 * n);
    for i in 0..n {
        triplets.push((i, i, value(2.0)));
        if i > 0 {
            triplets.push((i, i - 1, value(-1.0)));
        }
        if i + 1 < n {
            triplets.push((i, i + 1, value(-1.0)));
        }
    }
    CsrMatrix::from_triplets(n, n, triplets)
}

fn hierarchy(config: &HierarchyConfig) -> LevelHierarchy<f64> {
    LevelHierarchy::from_galerkin(poisson_1d(31), interpolations(), config)
        .expect("galerkin hierarchy")
}

fn relative(tolerance: f64, max_cycles: usize) -> MultigridConfig {
    MultigridConfig {
        tolerance: 0.0,
        relative_tolerance: tolerance,
        max_cycles,
        ..MultigridConfig::default()
    }
}

#[test]
fn test_galerkin_hierarchy_shape() {
    init_logger();
    let hierarchy = hierarchy(&HierarchyConfig::default());
    let diagnostics = hierarchy.diagnostics();

    assert_eq!(diagnostics.num_levels, 5);
    assert_eq!(diagnostics.level_dofs, vec![1, 3, 7, 15, 31]);
    assert_relative_eq!(diagnostics.grid_complexity, 57.0 / 31.0, epsilon = 1e-12);
    assert!(diagnostics.setup_time_ms >= 0.0);
}

#[test]
fn test_v_w_f_cycles_converge() {
    init_logger();
    let b = sine_rhs(31);
    let a = poisson_1d(31);

    for cycle_type in [CycleType::V, CycleType::W, CycleType::F] {
        let config = HierarchyConfig {
            cycle_type,
            ..HierarchyConfig::default()
        };
        let solver = MultigridSolver::new(hierarchy(&config), relative(1e-8, 50)).expect("config");
        let solution = solver.solve(&b, None).expect("solve");

        assert_eq!(solution.termination, Termination::Converged, "{cycle_type:?}");
        assert!(solution.cycles <= 20, "{cycle_type:?} took {} cycles", solution.cycles);
        let rate = solution.convergence_rate().expect("rate");
        assert!(rate < 0.5, "{cycle_type:?} rate {rate}");

        let true_residual = residual_norm(&a, &solution.x, &b);
        assert!(true_residual <= 1e-8 * solution.initial_residual * 1.0001);
    }
}

#[test]
fn test_w_cycle_beats_v_cycle_per_cycle() {
    init_logger();
    let b = sine_rhs(31);
    let stats = |cycle_type| {
        let config = HierarchyConfig {
            cycle_type,
            ..HierarchyConfig::default()
        };
        MultigridSolver::new(hierarchy(&config), relative(1e-10, 50))
            .expect("config")
            .solve(&b, None)
            .expect("solve")
            .stats
    };

    let v = stats(CycleType::V);
    let w = stats(CycleType::W);
    assert!(w.coarse_solves > w.cycles);
    assert_eq!(v.coarse_solves, v.cycles);
    assert!(w.cycles <= v.cycles);
}

#[test]
fn test_kaskade_reduces_residual() {
    init_logger();
    let config = HierarchyConfig {
        cycle_type: CycleType::Kaskade,
        ..HierarchyConfig::default()
    };
    let solver = MultigridSolver::new(hierarchy(&config), relative(0.1, 10)).expect("config");
    let solution = solver.solve(&sine_rhs(31), None).expect("solve");

    assert!(solution.converged, "history {:?}", solution.history);
    // Kaskade never pre-smooths
    assert!(solution.stats.levels.iter().all(|l| l.pre_smooth_sweeps == 0));
}

#[test]
fn test_smoother_variants_converge() {
    init_logger();
    let b = sine_rhs(31);
    for smoother in [
        SmootherKind::Jacobi { omega: 0.8 },
        SmootherKind::GaussSeidel {
            direction: SweepDirection::Symmetric,
        },
        SmootherKind::GaussSeidel {
            direction: SweepDirection::Forward,
        },
    ] {
        let config = HierarchyConfig {
            smoother: smoother.clone(),
            ..HierarchyConfig::default()
        };
        let solution = MultigridSolver::new(hierarchy(&config), relative(1e-8, 60))
            .expect("config")
            .solve(&b, None)
            .expect("solve");
        assert!(solution.converged, "{smoother:?} after {} cycles", solution.cycles);
    }
}

#[test]
fn test_workspace_reuse_matches_fresh_solve() {
    init_logger();
    let solver = MultigridSolver::new(hierarchy(&HierarchyConfig::default()), relative(1e-8, 50))
        .expect("config");
    let mut workspace = solver.hierarchy().workspace();

    let first = sine_rhs(31);
    let second = Array1::from_shape_fn(31, |i| if i % 2 == 0 { 1.0 } else { -0.5 });

    let reused_first = solver
        .solve_with_workspace(&first, None, &mut workspace)
        .expect("first solve");
    let reused_second = solver
        .solve_with_workspace(&second, None, &mut workspace)
        .expect("second solve");
    let fresh_second = solver.solve(&second, None).expect("fresh solve");

    assert!(reused_first.converged);
    assert_eq!(reused_second.x, fresh_second.x);
    assert_eq!(reused_second.cycles, fresh_second.cycles);
}

#[test]
fn test_initial_guess_is_used() {
    init_logger();
    let a = poisson_1d(31);
    let exact = Array1::from_shape_fn(31, |i| ((i + 1) as f64 / 32.0 * std::f64::consts::PI).sin());
    let b = a.matvec(&exact);
    let solver = MultigridSolver::new(hierarchy(&HierarchyConfig::default()), relative(1e-6, 50))
        .expect("config");

    let cold = solver.solve(&b, None).expect("cold");
    let perturbed = exact.mapv(|v| v + 1e-3);
    let warm = solver.solve(&b, Some(&perturbed)).expect("warm");

    assert!(warm.initial_residual < cold.initial_residual);
    for (x, e) in warm.x.iter().zip(exact.iter()) {
        assert_relative_eq!(*x, *e, epsilon = 1e-5);
    }
}

#[test]
fn test_single_precision() {
    init_logger();
    let hierarchy = LevelHierarchy::<f32>::from_galerkin(
        poisson(31),
        interpolations(),
        &HierarchyConfig::default(),
    )
    .expect("f32 hierarchy");
    let b = Array1::from_elem(31, 1.0f32);

    let solution = MultigridSolver::new(hierarchy, relative(5e-4, 30))
        .expect("config")
        .solve(&b, None)
        .expect("solve");

    assert!(solution.converged);
    // Discrete solution of -u'' = 1 with h = 1 is u_i = i (32 - i) / 2;
    // ||A^-1|| is about 104, which bounds the error by 0.3
    for (i, x) in solution.x.iter().enumerate() {
        let node = (i + 1) as f32;
        let exact = node * (32.0 - node) / 2.0;
        assert!((x - exact).abs() <= 0.5, "{x} vs {exact}");
    }
}

#[test]
fn test_complex_scalars() {
    init_logger();
    let hierarchy = LevelHierarchy::<Complex64>::from_galerkin(
        poisson(31),
        interpolations(),
        &HierarchyConfig {
            cycle_type: CycleType::W,
            ..HierarchyConfig::default()
        },
    )
    .expect("complex hierarchy");
    let b = Array1::from_shape_fn(31, |i| Complex64::new(1.0, (i as f64 * 0.3).cos()));

    let solution = MultigridSolver::new(hierarchy, relative(1e-9, 40))
        .expect("config")
        .solve(&b, None)
        .expect("solve");

    assert!(solution.converged);
    let a: CsrMatrix<Complex64> = poisson(31);
    assert!(residual_norm(&a, &solution.x, &b) <= 1e-9 * solution.initial_residual * 1.0001);
}

#[test]
fn test_settings_document_drives_setup() {
    init_logger();
    let settings = MultigridSettings::from_json_str(
        r#"{
            "hierarchy": {
                "cycle_type": "f",
                "pre_smooth_steps": 1,
                "post_smooth_steps": 1,
                "smoother": {"type": "gauss_seidel", "direction": "symmetric"},
                "coarse_solver": {"type": "conjugate_gradient", "max_iterations": 50}
            },
            "solver": {"tolerance": 0.0, "relative_tolerance": 1e-8, "max_cycles": 40}
        }"#,
    )
    .expect("settings");
    assert_eq!(
        settings.hierarchy.coarse_solver,
        CoarseSolverKind::ConjugateGradient {
            max_iterations: 50,
            tolerance: 1e-12
        }
    );

    // Stop at three coarse unknowns so CG has real work to do
    let hierarchy = LevelHierarchy::from_galerkin(
        poisson_1d(31),
        [15, 7, 3].into_iter().map(linear_interpolation_1d).collect(),
        &settings.hierarchy,
    )
    .expect("hierarchy");
    assert_eq!(hierarchy.coarse_solver().name(), "cg");
    assert_eq!(hierarchy.finest().smoother_down().map(|s| s.name()), Some("symmetric-gauss-seidel"));

    let solution = MultigridSolver::new(hierarchy, settings.solver)
        .expect("config")
        .solve(&sine_rhs(31), None)
        .expect("solve");
    assert!(solution.converged);
    assert_eq!(solution.stats.levels[3].pre_smooth_sweeps, solution.cycles);
}
