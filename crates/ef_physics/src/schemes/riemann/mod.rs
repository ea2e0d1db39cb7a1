// crates/ef_physics/src/schemes/riemann/mod.rs

//! 黎曼求解器模块
//!
//! 提供可压缩 Euler 方程的数值通量族，所有求解器实现同一个
//! [`RiemannSolver`] trait，在初始化时按 [`FluxKind`] 选定一次，
//! 全程对所有界面统一调用。
//!
//! # 求解器选择指南
//!
//! | 求解器 | 接触间断 | 耗散 | 计算成本 | 适用场景 |
//! |--------|---------|------|---------|---------|
//! | Godunov | 精确 | 低 | 高 | 验证、强间断 |
//! | Roe | 精确 | 低 | 中 | 通用（带熵修正） |
//! | HLL / HLLE | 抹平 | 中 | 低 | 鲁棒性优先 |
//! | HLLC | 精确 | 低 | 中 | 通用推荐 |
//! | Rusanov | 抹平 | 高 | 低 | 强间断、调试 |
//! | Steger-Warming / Van Leer | 抹平 | 中 | 低 | 隐式、超音速 |
//! | AUSMD / AUSMDV | 精确 | 低 | 中 | 高速流 |
//! | Central | - | 无 | 最低 | 光滑问题 |
//!
//! # 使用示例
//!
//! ```
//! use ef_physics::schemes::riemann::{create_riemann_solver, FluxKind, SolverParams};
//! use ef_physics::state::{GasModel, Primitive};
//! use glam::DVec2;
//!
//! let solver = create_riemann_solver(FluxKind::Hllc, GasModel::default(), SolverParams::default());
//! let w = Primitive::new(1.0, 0.0, 0.0, 1.0);
//! let flux = solver.solve(&w, &w, DVec2::X).unwrap();
//! assert!((flux.flux.rho_u - 1.0).abs() < 1e-14);
//! ```

mod ausm;
mod exact;
mod hll;
mod hllc;
mod roe;
mod rusanov;
mod splitting;
mod traits;

use std::sync::Arc;

use crate::state::GasModel;

// 核心类型
pub use traits::{FluxKind, RiemannError, RiemannFlux, RiemannSolver, SolverCapabilities, SolverParams};

// 求解器实现
pub use ausm::{AusmdSolver, AusmdvSolver};
pub use exact::{ExactRiemann, GodunovSolver, RiemannSample, StarState};
pub use hll::{HllSolver, HlleSolver};
pub use hllc::HllcSolver;
pub use roe::RoeSolver;
pub use rusanov::{CentralSolver, RusanovSolver};
pub use splitting::{StegerWarmingSolver, VanLeerSolver};

/// 按类型创建求解器
pub fn create_riemann_solver(kind: FluxKind, gas: GasModel, params: SolverParams) -> Arc<dyn RiemannSolver> {
    match kind {
        FluxKind::Godunov => Arc::new(GodunovSolver::new(gas)),
        FluxKind::Roe => Arc::new(RoeSolver::new(gas, params)),
        FluxKind::Hll => Arc::new(HllSolver::new(gas)),
        FluxKind::Hlle => Arc::new(HlleSolver::new(gas)),
        FluxKind::Hllc => Arc::new(HllcSolver::new(gas)),
        FluxKind::LaxFriedrichs => Arc::new(RusanovSolver::new(gas)),
        FluxKind::StegerWarming => Arc::new(StegerWarmingSolver::new(gas)),
        FluxKind::Central => Arc::new(CentralSolver::new(gas)),
        FluxKind::Ausmd => Arc::new(AusmdSolver::new(gas)),
        FluxKind::Ausmdv => Arc::new(AusmdvSolver::new(gas)),
        FluxKind::VanLeer => Arc::new(VanLeerSolver::new(gas)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Primitive;
    use glam::DVec2;

    #[test]
    fn test_factory_kinds_match() {
        for kind in FluxKind::ALL {
            let solver = create_riemann_solver(kind, GasModel::default(), SolverParams::default());
            assert_eq!(solver.kind(), kind);
        }
    }

    #[test]
    fn test_invalid_input_rejected() {
        let solver = create_riemann_solver(FluxKind::Roe, GasModel::default(), SolverParams::default());
        let good = Primitive::new(1.0, 0.0, 0.0, 1.0);
        let bad = Primitive::new(1.0, 0.0, 0.0, -1.0);
        assert!(matches!(
            solver.solve(&good, &bad, DVec2::X),
            Err(RiemannError::InvalidInput { .. })
        ));
        let nan = Primitive::new(f64::NAN, 0.0, 0.0, 1.0);
        assert!(solver.solve(&nan, &good, DVec2::Y).is_err());
    }
}
