// crates/ef_physics/src/numerics/mod.rs

//! 数值方法模块
//!
//! 包含：
//! - gradient/ - 梯度计算 (Green-Gauss, Least-Squares)
//! - limiter/ - 梯度限制器 (Barth-Jespersen, Venkatakrishnan)
//! - reconstruction/ - MUSCL 二阶重构
//! - linear_algebra/ - 块稀疏线性代数 (BCSR, 块 Jacobi, BiCGStab, GMRES)

pub mod gradient;
pub mod limiter;
pub mod linear_algebra;
pub mod reconstruction;

pub use gradient::{
    create_gradient, FaceInterpolation, FieldView, GradientField, GradientMethod,
    GreenGaussGradient, LeastSquaresGradient,
};

pub use limiter::{
    create_limiter, BarthJespersen, LimiterContext, LimiterKind, NoLimiter, SlopeLimiter,
    Venkatakrishnan,
};

pub use reconstruction::{MusclConfig, MusclReconstructor, Reconstructor};

pub use linear_algebra::{
    create_solver, BiCgStabSolver, BlockCsrMatrix, BlockCsrPattern, BlockJacobiPreconditioner,
    GmresSolver, IdentityPreconditioner, IterativeSolver, LinearOperator, Preconditioner,
    SolverConfig, SolverResult, SolverStatus,
};
