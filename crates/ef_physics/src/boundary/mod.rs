// crates/ef_physics/src/boundary/mod.rs

//! 边界条件模块
//!
//! 本模块为边界面生成幽灵（外部）状态，供黎曼求解器像普通相邻单元一样使用：
//!
//! # 子模块
//!
//! - [`types`]: 边界类型与带参数的边界条件
//! - [`manager`]: 按网格标签管理边界条件
//! - [`ghost`]: 幽灵状态计算器
//!
//! # 使用示例
//!
//! ```
//! use ef_physics::boundary::{BoundaryCondition, GhostContext, GhostStateCalculator};
//! use ef_physics::state::{GasModel, Primitive};
//! use glam::DVec2;
//!
//! let calc = GhostStateCalculator::new(GasModel::default());
//! let interior = Primitive::new(1.0, 0.5, 0.0, 1.0);
//! let ctx = GhostContext::new(DVec2::X, DVec2::ZERO, 0.0);
//! let ghost = calc.ghost_state(&BoundaryCondition::slip_wall(), &interior, &ctx).unwrap();
//! assert_eq!(ghost.u, -0.5);
//! ```

pub mod ghost;
pub mod manager;
pub mod types;

pub use ghost::{reflect_velocity, GhostContext, GhostStateCalculator};
pub use manager::BoundaryManager;
pub use types::{BoundaryCondition, BoundaryKind, Freestream};
