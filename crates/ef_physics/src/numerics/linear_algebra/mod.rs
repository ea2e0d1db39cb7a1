// crates/ef_physics/src/numerics/linear_algebra/mod.rs

//! 线性代数模块
//!
//! 隐式时间推进的稀疏线性系统求解：
//!
//! - [`block_csr`]: 4×4 块 CSR 矩阵与块运算
//! - [`vector_ops`]: BLAS Level 1 向量运算
//! - [`preconditioner`]: 恒等与块 Jacobi 预条件器
//! - [`solver`]: 线性算子抽象与 BiCGStab / GMRES(m) 求解器

pub mod block_csr;
pub mod preconditioner;
pub mod solver;
pub mod vector_ops;

pub use block_csr::{block_identity, block_inverse, block_mul_vec, Block, BlockCsrMatrix, BlockCsrPattern, ZERO_BLOCK};
pub use preconditioner::{BlockJacobiPreconditioner, IdentityPreconditioner, Preconditioner};
pub use solver::{
    create_solver, BiCgStabSolver, GmresSolver, IterativeSolver, LinearOperator, SolverConfig,
    SolverResult, SolverStatus,
};
