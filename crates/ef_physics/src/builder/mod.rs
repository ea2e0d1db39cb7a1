// crates/ef_physics/src/builder/mod.rs

//! 求解器构建模块
//!
//! 把算例配置转换为物理层对象。
//!
//! ```text
//! CaseConfig (字符串名称)
//!     │
//!     ▼ SolverSettings::from_config（未知名称在此报错）
//! SolverSettings ──┬──> CartesianMesh + 周期配对 ──> FvMesh
//!                  │
//!                  └──> 初始场（参考解 / 均匀状态）
//!     │
//!     ▼
//! EulerSolver::new(mesh, settings)
//! ```

pub mod case;
pub mod settings;

pub use case::{build_mesh, initial_state, reference_solution, CaseSetup};
pub use settings::{exact_template, primitive_from_config, SolverSettings};
