// crates/ef_physics/src/lib.rs

//! EulerFlow 物理求解器
//!
//! 二维可压缩 Euler 方程有限体积求解，包括：
//! - 网格拓扑 (mesh) - 笛卡尔与多边形非结构网格、周期配对
//! - 状态变换 (state) - 守恒/原始变量、波速、物理通量
//! - 数值通量 (schemes) - 11 种黎曼求解器
//! - 重构与限制器 (numerics) - 梯度、Barth-Jespersen / Venkatakrishnan、MUSCL
//! - 边界条件 (boundary) - 幽灵状态
//! - 引擎 (engine) - 残差组装、CFL、Runge-Kutta、Newton-Krylov
//! - 分析 (analysis) - 残差范数、气动力系数
//! - 参考解 (exact) - 验证算例的解析/精确场
//! - 构建 (builder) - 从算例配置装配
//!
//! # 示例
//!
//! ```
//! use ef_physics::boundary::BoundaryCondition;
//! use ef_physics::builder::SolverSettings;
//! use ef_physics::engine::EulerSolver;
//! use ef_physics::mesh::{CartesianMesh, MeshTopology};
//! use ef_physics::state::{FlowState, GasModel, Primitive};
//! use glam::DVec2;
//!
//! let gas = GasModel::default();
//! let mesh = CartesianMesh::new(8, 8, DVec2::ZERO, DVec2::ONE).build().unwrap();
//! let settings = SolverSettings::new(gas).with_boundary(1, BoundaryCondition::slip_wall());
//! let mut solver = EulerSolver::new(&mesh, settings).unwrap();
//!
//! let still = gas.to_conservative(&Primitive::new(1.0, 0.0, 0.0, 1.0));
//! let state = FlowState::uniform(mesh.n_cells(), still);
//! let outcome = solver.advance_step(&mesh, &state).unwrap();
//! assert_eq!(outcome.state, state);
//! ```

pub mod analysis;
pub mod boundary;
pub mod builder;
pub mod engine;
pub mod error;
pub mod exact;
pub mod mesh;
pub mod numerics;
pub mod schemes;
pub mod state;

// 重导出常用类型
pub use analysis::{ErrorNorms, ForceCoefficients, ForceMonitor, ForceSettings, ResidualNorms};
pub use boundary::{BoundaryCondition, BoundaryKind, BoundaryManager, Freestream};
pub use builder::{CaseSetup, SolverSettings};
pub use engine::{advance_step, EulerSolver, StepOutcome};
pub use error::{PhysicsError, PhysicsResult};
pub use exact::{ExactFunction, ExactSolution};
pub use mesh::{CartesianMesh, FvMesh, MeshTopology};
pub use numerics::{LimiterKind, MusclConfig};
pub use schemes::{create_riemann_solver, FluxKind, RiemannSolver, SolverParams};
pub use state::{Conserved, FlowState, GasModel, Primitive, NVAR};
