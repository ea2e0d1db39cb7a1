// tests/sod_shock_tube.rs

//! Sod 激波管验证
//!
//! 一维黎曼问题 (ρ, u, p) = (1, 0, 1) | (0.125, 0, 0.1)，γ = 1.4，t = 0.2。
//! 单排笛卡尔网格，上下滑移壁面，左右零梯度出流。
//! 与精确黎曼解比较密度的 L1 误差和各波的位置。

use glam::DVec2;

use ef_physics::analysis::ErrorNorms;
use ef_physics::boundary::BoundaryCondition;
use ef_physics::builder::SolverSettings;
use ef_physics::engine::EulerSolver;
use ef_physics::exact::{ExactFunction, ExactSolution};
use ef_physics::mesh::{CartesianMesh, FvMesh, MeshTopology};
use ef_physics::numerics::{LimiterKind, MusclConfig};
use ef_physics::schemes::FluxKind;
use ef_physics::state::{FlowState, GasModel};

const END_TIME: f64 = 0.2;
const NX: usize = 200;

// ============================================================================
// 测试辅助函数
// ============================================================================

fn tube() -> FvMesh {
    // 单元高度为宽度的 10 倍，时间步由 x 方向控制
    CartesianMesh::new(NX, 1, DVec2::ZERO, DVec2::new(1.0, 10.0 / NX as f64))
        .with_sides([1, 2, 1, 2])
        .build()
        .unwrap()
}

fn exact(gas: GasModel) -> ExactSolution {
    ExactSolution::new(ExactFunction::Riemann, gas)
}

/// 推进到结束时间，返回 (最终状态, 步数)
fn solve(flux: FluxKind, reconstruction: MusclConfig) -> (FlowState, usize) {
    let gas = GasModel::default();
    let mesh = tube();
    let settings = SolverSettings::new(gas)
        .with_flux(flux)
        .with_reconstruction(reconstruction)
        .with_boundary(1, BoundaryCondition::slip_wall())
        .with_boundary(2, BoundaryCondition::outflow())
        .with_cfl(0.5)
        .with_end_time(END_TIME);

    let mut solver = EulerSolver::new(&mesh, settings).unwrap();
    let mut state = exact(gas).fill(&mesh, 0.0).unwrap();
    while !solver.is_finished() {
        assert!(solver.step() < 10_000, "时间推进未结束");
        state = solver.advance_step(&mesh, &state).unwrap().state;
    }
    assert!((solver.time() - END_TIME).abs() < 1e-12);
    (state, solver.step())
}

/// 密度 L1 误差 Σ |ρ - ρ_exact| A / Σ A
fn density_l1_error(state: &FlowState) -> f64 {
    let gas = GasModel::default();
    ErrorNorms::against_exact(&exact(gas), &tube(), state, END_TIME)
        .unwrap()
        .density_l1()
}

/// 在 x ∈ (lo, hi) 内密度首次穿过 `level` 的位置（相邻单元中心线性插值）
fn crossing(state: &FlowState, level: f64, lo: f64, hi: f64) -> f64 {
    let mesh = tube();
    let x: Vec<f64> = (0..mesh.n_cells()).map(|i| mesh.cell_center(i).x).collect();
    for i in 0..x.len() - 1 {
        if x[i] < lo || x[i + 1] > hi {
            continue;
        }
        let (a, b) = (state.rho[i] - level, state.rho[i + 1] - level);
        if a == 0.0 {
            return x[i];
        }
        if a * b < 0.0 {
            return x[i] + (x[i + 1] - x[i]) * a / (a - b);
        }
    }
    panic!("密度在 ({lo}, {hi}) 内未穿过 {level}");
}

// ============================================================================
// 测试
// ============================================================================

#[test]
fn test_exact_solution_star_region() {
    // 星区压力与速度的经典值 p* = 0.30313, u* = 0.92745
    let gas = GasModel::default();
    let w = exact(gas).primitive(DVec2::new(0.6, 0.0), END_TIME).unwrap();
    assert!((w.p - 0.30313).abs() < 1e-4, "p* = {}", w.p);
    assert!((w.u - 0.92745).abs() < 1e-4, "u* = {}", w.u);
    // 接触间断左侧 ρ*L = 0.42632，右侧 ρ*R = 0.26557
    assert!((w.rho - 0.42632).abs() < 1e-4, "rho*L = {}", w.rho);
    let w = exact(gas).primitive(DVec2::new(0.75, 0.0), END_TIME).unwrap();
    assert!((w.rho - 0.26557).abs() < 1e-4, "rho*R = {}", w.rho);
}

#[test]
fn test_first_order_hllc_converges_to_exact_solution() {
    let (state, steps) = solve(FluxKind::Hllc, MusclConfig::first_order());
    assert!(steps > 50);
    let error = density_l1_error(&state);
    assert!(error < 0.03, "L1 = {error}");
}

#[test]
fn test_second_order_improves_on_first_order() {
    let (first, _) = solve(FluxKind::Hllc, MusclConfig::first_order());
    let (second, _) = solve(FluxKind::Hllc, MusclConfig::default());
    let e1 = density_l1_error(&first);
    let e2 = density_l1_error(&second);
    assert!(e2 < 0.015, "L1 = {e2}");
    assert!(e2 < e1, "second order {e2} vs first order {e1}");
}

#[test]
fn test_limited_solution_stays_within_initial_bounds() {
    // 限制重构不产生明显超出初始范围的密度与压力
    let gas = GasModel::default();
    for limiter in [LimiterKind::BarthJespersen, LimiterKind::Venkatakrishnan] {
        let (state, _) = solve(FluxKind::Roe, MusclConfig::default().with_limiter(limiter));
        let prims = state.primitives(&gas).unwrap();
        for w in prims {
            assert!(w.rho > 0.125 - 2e-2 && w.rho < 1.0 + 2e-2, "{limiter}: rho = {}", w.rho);
            assert!(w.p > 0.1 - 2e-2 && w.p < 1.0 + 2e-2, "{limiter}: p = {}", w.p);
        }
    }
}

#[test]
fn test_mass_is_conserved_before_waves_reach_the_ends() {
    // t = 0.2 时最快的波（激波 x ≈ 0.85，稀疏波头 x ≈ 0.26）尚未到达端点
    let gas = GasModel::default();
    let mesh = tube();
    let areas = mesh.cell_areas();
    let initial = exact(gas).fill(&mesh, 0.0).unwrap();
    let (state, _) = solve(FluxKind::Hll, MusclConfig::default());
    let m0 = initial.totals(&areas);
    let m1 = state.totals(&areas);
    assert!((m1.rho - m0.rho).abs() < 1e-12 * m0.rho);
    assert!((m1.rho_e - m0.rho_e).abs() < 1e-12 * m0.rho_e);
}

#[test]
fn test_wave_positions_match_exact_solution() {
    // t = 0.2 时：稀疏波头 0.2634，波尾 0.4859，接触间断 0.6855，激波 0.8504
    let dx = 1.0 / NX as f64;
    let gas = GasModel::default();
    let (state, _) = solve(FluxKind::Hllc, MusclConfig::default());
    let reference = exact(gas).fill(&tube(), END_TIME).unwrap();

    // 间断：取两侧平台密度的中值
    let shock = crossing(&state, 0.5 * (0.26557 + 0.125), 0.78, 0.95);
    let contact = crossing(&state, 0.5 * (0.42632 + 0.26557), 0.6, 0.78);
    assert!((shock - 0.8504).abs() < 2.0 * dx, "shock at {shock}");
    assert!((contact - 0.6855).abs() < 2.0 * dx, "contact at {contact}");

    // 稀疏波边缘为折点：与精确剖面在同一密度水平上的位置比较
    let head_level = 0.95;
    let tail_level = 0.42632 + 0.05;
    let head = crossing(&state, head_level, 0.1, 0.4);
    let tail = crossing(&state, tail_level, 0.4, 0.6);
    let head_exact = crossing(&reference, head_level, 0.1, 0.4);
    let tail_exact = crossing(&reference, tail_level, 0.4, 0.6);
    assert!(head_exact > 0.2634 && head_exact < 0.2634 + 0.05, "head level at {head_exact}");
    assert!(tail_exact < 0.4859 && tail_exact > 0.4859 - 0.05, "tail level at {tail_exact}");
    assert!((head - head_exact).abs() < 3.0 * dx, "rarefaction head {head} vs {head_exact}");
    assert!((tail - tail_exact).abs() < 3.0 * dx, "rarefaction tail {tail} vs {tail_exact}");
}
