// crates/ef_physics/src/numerics/reconstruction/mod.rs

//! # MUSCL 重构模块
//!
//! 将一阶单元中心值扩展到二阶精度的面值重构，重构在原始变量上进行。
//!
//! ## 重构过程
//!
//! 1. 计算单元梯度 (Least-Squares 或 Green-Gauss)，边界幽灵状态作为虚拟邻居
//! 2. 应用限制器 (Barth-Jespersen, Venkatakrishnan)
//! 3. 在面上进行线性外推
//!
//! ## 参考文献
//!
//! van Leer, B. (1979). "Towards the ultimate conservative difference
//! scheme. V. A second-order sequel to Godunov's method".
//! Journal of Computational Physics.

mod config;
mod muscl;
mod traits;

pub use config::MusclConfig;
pub use muscl::MusclReconstructor;
pub use traits::Reconstructor;
