// crates/ef_physics/src/schemes/mod.rs

//! 数值格式模块
//!
//! 提供可压缩 Euler 方程的界面数值通量（黎曼求解器族）。

pub mod riemann;

// 重导出常用类型
pub use riemann::{
    create_riemann_solver, FluxKind, RiemannError, RiemannFlux, RiemannSolver, SolverCapabilities,
    SolverParams,
};
