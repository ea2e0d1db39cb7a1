// tests/periodic_conservation.rs

//! 周期网格上的离散守恒
//!
//! 全周期网格没有边界面，每个界面通量对两侧单元等值反号，
//! 全局时间步下 Σ U_i A_i 对任意通量、重构和网格类型都应保持到舍入误差。

use glam::DVec2;

use ef_config::GradientMethod;
use ef_physics::boundary::BoundaryCondition;
use ef_physics::builder::SolverSettings;
use ef_physics::engine::EulerSolver;
use ef_physics::exact::{ExactFunction, ExactSolution};
use ef_physics::mesh::{polygon_mesh, CartesianMesh, FvMesh, MeshTopology};
use ef_physics::numerics::MusclConfig;
use ef_physics::schemes::FluxKind;
use ef_physics::state::{Conserved, FlowState, GasModel, Primitive};

// ============================================================================
// 测试辅助函数
// ============================================================================

fn periodic_cartesian(n: usize) -> FvMesh {
    CartesianMesh::new(n, n, DVec2::ZERO, DVec2::ONE)
        .with_sides([1, 2, 1, 2])
        .with_periodic(1, DVec2::Y)
        .with_periodic(2, DVec2::X)
        .build()
        .unwrap()
}

/// 单位方箱剖分为 2 n² 个三角形，四边两两周期配对
fn periodic_triangles(n: usize) -> FvMesh {
    let h = 1.0 / n as f64;
    let mut nodes = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            nodes.push(DVec2::new(i as f64 * h, j as f64 * h));
        }
    }
    let mut polygons = Vec::with_capacity(2 * n * n);
    for j in 0..n {
        for i in 0..n {
            let n0 = i + (n + 1) * j;
            let (n1, n2, n3) = (n0 + 1, n0 + n + 2, n0 + n + 1);
            // 交替对角线方向
            if (i + j) % 2 == 0 {
                polygons.push(vec![n0, n1, n2]);
                polygons.push(vec![n0, n2, n3]);
            } else {
                polygons.push(vec![n0, n1, n3]);
                polygons.push(vec![n1, n2, n3]);
            }
        }
    }
    polygon_mesh(&nodes, &polygons, |_, normal| if normal.y.abs() > 0.5 { 1 } else { 2 })
        .unwrap()
        .pair_periodic(1, DVec2::Y)
        .unwrap()
        .pair_periodic(2, DVec2::X)
        .unwrap()
        .build()
        .unwrap()
}

fn periodic_settings(gas: GasModel) -> SolverSettings {
    SolverSettings::new(gas)
        .with_boundary(1, BoundaryCondition::periodic(DVec2::Y))
        .with_boundary(2, BoundaryCondition::periodic(DVec2::X))
}

fn pulse(mesh: &FvMesh, gas: GasModel) -> FlowState {
    ExactSolution::new(ExactFunction::GaussianPulse, gas).fill(mesh, 0.0).unwrap()
}

fn assert_conserved(before: Conserved, after: Conserved, what: &str) {
    let b = before.to_array();
    let a = after.to_array();
    let scale = before.max_abs().max(1.0);
    for k in 0..4 {
        assert!((a[k] - b[k]).abs() < 1e-12 * scale, "{what} var {k}: {} -> {}", b[k], a[k]);
    }
}

fn run_and_check(mesh: &FvMesh, settings: SolverSettings, initial: &FlowState, steps: usize, what: &str) -> FlowState {
    let areas = mesh.cell_areas();
    let before = initial.totals(&areas);
    let mut solver = EulerSolver::new(mesh, settings).unwrap();
    let mut state = initial.clone();
    for _ in 0..steps {
        state = solver.advance_step(mesh, &state).unwrap().state;
        assert_conserved(before, state.totals(&areas), what);
    }
    state
}

// ============================================================================
// 笛卡尔网格
// ============================================================================

#[test]
fn test_pulse_conserved_on_periodic_cartesian_mesh() {
    let gas = GasModel::default();
    let mesh = periodic_cartesian(16);
    let initial = pulse(&mesh, gas);

    for kind in [FluxKind::Hllc, FluxKind::Roe, FluxKind::Ausmdv, FluxKind::StegerWarming] {
        let settings = periodic_settings(gas).with_flux(kind);
        let state = run_and_check(&mesh, settings, &initial, 20, kind.short_name());
        assert_ne!(state, initial, "{kind}: 脉冲应已传播");
    }
}

#[test]
fn test_pulse_leaves_and_reenters_through_periodic_faces() {
    // 脉冲向右输运，越过右边界后从左边界重新进入
    let gas = GasModel::default();
    let mesh = periodic_cartesian(12);
    let initial = FlowState::from_fn(mesh.n_cells(), |i| {
        let c = mesh.cell_center(i);
        let rho = 1.0 + 0.5 * (-((c.x - 0.8).powi(2) + (c.y - 0.5).powi(2)) / 0.01).exp();
        gas.to_conservative(&Primitive::new(rho, 1.0, 0.0, 1.0))
    });
    let settings = periodic_settings(gas)
        .with_flux(FluxKind::Hllc)
        .with_end_time(0.4);
    let areas = mesh.cell_areas();
    let before = initial.totals(&areas);

    let mut solver = EulerSolver::new(&mesh, settings).unwrap();
    let mut state = initial.clone();
    while !solver.is_finished() {
        state = solver.advance_step(&mesh, &state).unwrap().state;
    }
    assert_conserved(before, state.totals(&areas), "advection");

    // 密度峰值移到 x ≈ 0.2（越过周期边界）
    let peak = (0..mesh.n_cells())
        .max_by(|&a, &b| state.rho[a].total_cmp(&state.rho[b]))
        .unwrap();
    let x = mesh.cell_center(peak).x;
    assert!(x < 0.4, "peak at x = {x}");
}

// ============================================================================
// 非结构网格
// ============================================================================

#[test]
fn test_periodic_triangle_mesh_pairs_every_boundary_face() {
    let mesh = periodic_triangles(6);
    assert_eq!(mesh.n_cells(), 72);
    assert!(mesh.boundary_tags().is_empty());
    assert!((0..mesh.n_faces()).all(|f| mesh.face_neighbor(f).is_some()));
    // 三角形每个单元 3 个面，每个面被两个单元共享
    assert_eq!(mesh.n_faces(), 72 * 3 / 2);
}

#[test]
fn test_pulse_conserved_on_periodic_triangle_mesh() {
    let gas = GasModel::default();
    let mesh = periodic_triangles(8);
    let initial = pulse(&mesh, gas);

    let reconstructions = [
        ("first_order", MusclConfig::first_order()),
        ("lsq_barth", MusclConfig::default()),
        ("lsq_venkat", MusclConfig::smooth(5.0)),
        ("green_gauss", MusclConfig::default().with_gradient(GradientMethod::GreenGauss)),
    ];
    for (name, reconstruction) in reconstructions {
        let settings = periodic_settings(gas)
            .with_flux(FluxKind::Hll)
            .with_reconstruction(reconstruction);
        run_and_check(&mesh, settings, &initial, 15, name);
    }
}
