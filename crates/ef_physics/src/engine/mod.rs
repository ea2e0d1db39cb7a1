// crates/ef_physics/src/engine/mod.rs

//! 物理引擎模块
//!
//! 提供残差组装、时间步控制、显式与隐式时间推进以及主求解器。
//!
//! # 模块结构
//!
//! - `residual` - 界面通量并行计算与按单元收集
//! - `timestep` - CFL 全局/当地时间步
//! - `time_integrator` - 显式 Runge-Kutta (1-4 级)
//! - `jacobian` - 一阶通量有限差分 Jacobian
//! - `implicit` - 后向欧拉 Newton-Krylov
//! - `solver` - 主求解器与单步入口

pub mod implicit;
pub mod jacobian;
pub mod residual;
pub mod solver;
pub mod time_integrator;
pub mod timestep;

pub use implicit::{ImplicitIntegrator, ImplicitReport};
pub use jacobian::{FaceBlocks, JacobianAssembler};
pub use residual::{first_order_face_flux, gather_residual, FluxContext, ResidualAssembler};
pub use solver::{advance_step, EulerSolver, SolverStats, StepOutcome};
pub use time_integrator::{MeshRhs, RhsComputer, RkScheme, RkStage, RungeKutta};
pub use timestep::{CflCalculator, TimeStep};
