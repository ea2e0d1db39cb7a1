// tests/flux_laws.rs

//! 数值通量基本性质
//!
//! 对所有通量类型检查：
//! - 相容性：F(W, W, n) = F_phys(W)·n
//! - 守恒性：F(L, R, n) = -F(R, L, -n)
//! - 超声速迎风：两侧均超声速流向 +n 时，迎风格式取左侧物理通量

use glam::DVec2;

use ef_physics::schemes::{create_riemann_solver, FluxKind, SolverParams};
use ef_physics::state::{Conserved, GasModel, Primitive};

// ============================================================================
// 测试辅助函数
// ============================================================================

fn gas() -> GasModel {
    GasModel::default()
}

fn normals() -> Vec<DVec2> {
    vec![
        DVec2::X,
        DVec2::Y,
        -DVec2::X,
        DVec2::new(0.6, 0.8),
        DVec2::new(-0.28, 0.96),
    ]
}

fn sample_states() -> Vec<Primitive> {
    vec![
        Primitive::new(1.0, 0.0, 0.0, 1.0),
        Primitive::new(1.2, 0.3, -0.1, 0.9),
        Primitive::new(0.4, -0.5, 0.7, 0.3),
        Primitive::new(1.0, 2.5, 0.2, 1.0),
        Primitive::new(0.8, -1.9, -1.2, 0.5),
    ]
}

fn assert_close(a: Conserved, b: Conserved, tol: f64, what: &str) {
    let scale = 1.0 + a.max_abs().max(b.max_abs());
    let diff = (a - b).max_abs();
    assert!(diff < tol * scale, "{what}: {a:?} vs {b:?} (diff {diff:.3e})");
}

// ============================================================================
// 相容性
// ============================================================================

#[test]
fn test_every_flux_is_consistent() {
    let gas = gas();
    for kind in FluxKind::ALL {
        let solver = create_riemann_solver(kind, gas, SolverParams::default());
        for w in sample_states() {
            for n in normals() {
                let f = solver.solve(&w, &w, n).unwrap();
                assert_close(f.flux, gas.physical_flux(&w, n), 1e-10, &format!("{kind} at {w:?}, n={n}"));
                assert!(f.max_wave_speed.is_finite() && f.max_wave_speed > 0.0);
            }
        }
    }
}

// ============================================================================
// 守恒性
// ============================================================================

#[test]
fn test_every_flux_is_antisymmetric() {
    let gas = gas();
    let states = sample_states();
    for kind in FluxKind::ALL {
        let solver = create_riemann_solver(kind, gas, SolverParams::default());
        for (a, l) in states.iter().enumerate() {
            for r in states.iter().skip(a + 1) {
                for n in normals() {
                    let forward = solver.solve(l, r, n).unwrap().flux;
                    let backward = solver.solve(r, l, -n).unwrap().flux;
                    assert_close(forward, -backward, 1e-9, &format!("{kind} n={n}"));
                }
            }
        }
    }
}

// ============================================================================
// 迎风性
// ============================================================================

#[test]
fn test_supersonic_upwinding() {
    let gas = gas();
    let l = Primitive::new(1.0, 2.0, 0.3, 1.0);
    let r = Primitive::new(0.9, 2.1, 0.2, 0.8);
    assert!(l.u > gas.sound_speed(&l) && r.u > gas.sound_speed(&r));

    let upwind = [
        FluxKind::Godunov,
        FluxKind::Roe,
        FluxKind::Hll,
        FluxKind::Hlle,
        FluxKind::Hllc,
        FluxKind::StegerWarming,
        FluxKind::Ausmd,
        FluxKind::Ausmdv,
        FluxKind::VanLeer,
    ];
    for kind in upwind {
        let solver = create_riemann_solver(kind, gas, SolverParams::default());
        let f = solver.solve(&l, &r, DVec2::X).unwrap();
        assert_close(f.flux, gas.physical_flux(&l, DVec2::X), 1e-10, &format!("{kind}"));

        // 反向来流取右侧
        let f = solver.solve(&r.rotate(-DVec2::X), &l.rotate(-DVec2::X), DVec2::X).unwrap();
        let expected = gas.physical_flux(&l.rotate(-DVec2::X), DVec2::X);
        assert_close(f.flux, expected, 1e-10, &format!("{kind} reversed"));
    }
}

#[test]
fn test_stationary_contact_is_exact_for_contact_resolving_fluxes() {
    // 静止接触间断：质量与能量通量为零，动量通量为压力
    let gas = gas();
    let l = Primitive::new(1.0, 0.0, 0.0, 1.0);
    let r = Primitive::new(0.25, 0.0, 0.0, 1.0);
    for kind in [FluxKind::Godunov, FluxKind::Hllc, FluxKind::Ausmd] {
        let solver = create_riemann_solver(kind, gas, SolverParams::default());
        assert!(solver.capabilities().resolves_contact, "{kind}");
        let f = solver.solve(&l, &r, DVec2::X).unwrap().flux;
        assert!(f.rho.abs() < 1e-12, "{kind}: mass {}", f.rho);
        assert!((f.rho_u - 1.0).abs() < 1e-12, "{kind}: momentum {}", f.rho_u);
        assert!(f.rho_e.abs() < 1e-12, "{kind}: energy {}", f.rho_e);
    }
}
