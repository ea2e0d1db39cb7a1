// crates/ef_physics/src/numerics/linear_algebra/solver.rs
//! 迭代线性求解器
//!
//! 求解隐式时间推进中的线性化系统 `(A/Δt − J) ΔU = R`。
//! 系数矩阵以 [`LinearOperator`] 抽象，既可以是组装好的
//! [`BlockCsrMatrix`]，也可以是有限差分的无矩阵乘积。
//!
//! # 求解器类型
//!
//! - [`BiCgStabSolver`]: 双共轭梯度稳定法（BiCGStab）
//! - [`GmresSolver`]: 重启 GMRES(m)，右预条件
//!
//! 达到最大迭代次数不是错误：求解器返回当前最优解及
//! [`SolverStatus::MaxIterationsReached`]，由调用方通过
//! [`SolverResult::stagnation_warning`] 转为非致命警告。
//! 只有算子本身失败（例如无矩阵乘积遇到非物理扰动状态）才返回 `Err`。
//!
//! # 使用示例
//!
//! ```
//! use ef_physics::numerics::linear_algebra::{
//!     block_identity, BlockCsrMatrix, BlockCsrPattern, BlockJacobiPreconditioner,
//!     GmresSolver, IterativeSolver, SolverConfig,
//! };
//!
//! let mut a = BlockCsrMatrix::new(BlockCsrPattern::from_pairs(2, [(0, 1)]));
//! *a.diagonal_block_mut(0) = block_identity(4.0);
//! *a.diagonal_block_mut(1) = block_identity(4.0);
//! a.add_block(0, 1, &block_identity(-1.0));
//! a.add_block(1, 0, &block_identity(-1.0));
//!
//! let b = vec![1.0; 8];
//! let mut x = vec![0.0; 8];
//! let precond = BlockJacobiPreconditioner::from_matrix(&a);
//! let mut solver = GmresSolver::new(SolverConfig::new(1e-10, 50));
//! let result = solver.solve(&mut a, &b, &mut x, &precond).unwrap();
//! assert!(result.is_converged());
//! ```

use serde::{Deserialize, Serialize};

use super::block_csr::BlockCsrMatrix;
use super::preconditioner::Preconditioner;
use super::vector_ops::{axpy, copy, dot, norm2, scale};
use crate::error::{PhysicsError, PhysicsResult};

// ============================================================================
// 线性算子
// ============================================================================

/// 线性算子 y = A x
///
/// `apply` 取 `&mut self`，无矩阵实现可以复用内部缓冲区。
pub trait LinearOperator {
    /// 标量维数
    fn dim(&self) -> usize;

    /// 计算 y = A x
    fn apply(&mut self, x: &[f64], y: &mut [f64]) -> PhysicsResult<()>;
}

impl LinearOperator for BlockCsrMatrix {
    fn dim(&self) -> usize {
        BlockCsrMatrix::dim(self)
    }

    fn apply(&mut self, x: &[f64], y: &mut [f64]) -> PhysicsResult<()> {
        self.mul_vec(x, y);
        Ok(())
    }
}

// ============================================================================
// 配置与结果
// ============================================================================

/// 求解器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// 相对收敛容差
    pub rtol: f64,
    /// 绝对收敛容差
    pub atol: f64,
    /// 最大迭代次数
    pub max_iter: usize,
    /// GMRES 重启维数
    pub restart: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-14,
            max_iter: 1000,
            restart: 30,
        }
    }
}

impl SolverConfig {
    /// 创建求解器配置
    pub fn new(rtol: f64, max_iter: usize) -> Self {
        Self {
            rtol,
            max_iter,
            ..Default::default()
        }
    }

    /// 设置 GMRES 重启维数
    pub fn with_restart(mut self, restart: usize) -> Self {
        self.restart = restart.max(1);
        self
    }
}

/// 求解器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolverStatus {
    /// 收敛
    Converged,
    /// 达到最大迭代次数
    MaxIterationsReached,
    /// 发散
    Diverged,
    /// 停滞（Krylov 过程崩溃）
    Stagnated,
}

/// 求解器结果
#[derive(Debug, Clone, Serialize)]
pub struct SolverResult {
    /// 求解状态
    pub status: SolverStatus,
    /// 迭代次数
    pub iterations: usize,
    /// 最终残差范数
    pub residual_norm: f64,
    /// 初始残差范数
    pub initial_residual_norm: f64,
    /// 相对残差
    pub relative_residual: f64,
    /// 目标相对容差
    pub target: f64,
}

impl SolverResult {
    fn new(status: SolverStatus, iterations: usize, residual: f64, initial: f64, target: f64) -> Self {
        let relative_residual = if initial > 0.0 { residual / initial } else { 0.0 };
        Self {
            status,
            iterations,
            residual_norm: residual,
            initial_residual_norm: initial,
            relative_residual,
            target,
        }
    }

    /// 是否成功收敛
    pub fn is_converged(&self) -> bool {
        self.status == SolverStatus::Converged
    }

    /// 未收敛时的非致命警告
    pub fn stagnation_warning(&self) -> Option<PhysicsError> {
        (!self.is_converged()).then(|| PhysicsError::LinearSolverStagnation {
            iterations: self.iterations,
            achieved: self.relative_residual,
            target: self.target,
        })
    }
}

/// 迭代求解器 trait
pub trait IterativeSolver: Send {
    /// 求解线性系统 Ax = b
    ///
    /// # 参数
    ///
    /// - `op`: 系数算子 A
    /// - `b`: 右端项向量
    /// - `x`: 解向量（输入初始猜测，输出解）
    /// - `precond`: 预条件器
    fn solve(
        &mut self,
        op: &mut dyn LinearOperator,
        b: &[f64],
        x: &mut [f64],
        precond: &dyn Preconditioner,
    ) -> PhysicsResult<SolverResult>;

    /// 求解器名称
    fn name(&self) -> &'static str;
}

/// 按配置创建 Krylov 求解器
pub fn create_solver(method: ef_config::KrylovMethod, config: SolverConfig) -> Box<dyn IterativeSolver> {
    match method {
        ef_config::KrylovMethod::Bicgstab => Box::new(BiCgStabSolver::new(config)),
        ef_config::KrylovMethod::Gmres => Box::new(GmresSolver::new(config)),
    }
}

/// r = b - A x
fn residual(op: &mut dyn LinearOperator, b: &[f64], x: &[f64], r: &mut [f64]) -> PhysicsResult<()> {
    op.apply(x, r)?;
    for (ri, &bi) in r.iter_mut().zip(b) {
        *ri = bi - *ri;
    }
    Ok(())
}

const BREAKDOWN_TOL: f64 = 1e-30;
const DIVERGENCE_FACTOR: f64 = 1e6;

// ============================================================================
// BiCGStab
// ============================================================================

/// 双共轭梯度稳定法求解器
///
/// 适用于非对称矩阵
pub struct BiCgStabSolver {
    config: SolverConfig,
    r: Vec<f64>,
    r0: Vec<f64>,
    p: Vec<f64>,
    v: Vec<f64>,
    s: Vec<f64>,
    t: Vec<f64>,
    z: Vec<f64>,
}

impl BiCgStabSolver {
    /// 创建 BiCGStab 求解器
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            r: Vec::new(),
            r0: Vec::new(),
            p: Vec::new(),
            v: Vec::new(),
            s: Vec::new(),
            t: Vec::new(),
            z: Vec::new(),
        }
    }

    /// 确保工作向量大小正确
    fn ensure_workspace(&mut self, n: usize) {
        if self.r.len() != n {
            for w in [
                &mut self.r,
                &mut self.r0,
                &mut self.p,
                &mut self.v,
                &mut self.s,
                &mut self.t,
                &mut self.z,
            ] {
                *w = vec![0.0; n];
            }
        }
    }
}

impl IterativeSolver for BiCgStabSolver {
    fn solve(
        &mut self,
        op: &mut dyn LinearOperator,
        b: &[f64],
        x: &mut [f64],
        precond: &dyn Preconditioner,
    ) -> PhysicsResult<SolverResult> {
        let n = b.len();
        self.ensure_workspace(n);
        let SolverConfig { rtol, atol, max_iter, .. } = self.config;
        let done = |status, iterations, res: f64, initial| Ok(SolverResult::new(status, iterations, res, initial, rtol));

        residual(op, b, x, &mut self.r)?;
        let initial_norm = norm2(&self.r);
        if initial_norm <= atol {
            return done(SolverStatus::Converged, 0, initial_norm, initial_norm);
        }

        // 影子残差固定为初始残差
        copy(&self.r, &mut self.r0);

        let mut rho_old = 1.0;
        let mut alpha = 1.0;
        let mut omega = 1.0;
        self.v.fill(0.0);
        self.p.fill(0.0);

        for iter in 0..max_iter {
            let rho = dot(&self.r0, &self.r);
            if rho.abs() < BREAKDOWN_TOL {
                return done(SolverStatus::Stagnated, iter, norm2(&self.r), initial_norm);
            }

            let beta = if iter == 0 { 0.0 } else { (rho / rho_old) * (alpha / omega) };
            rho_old = rho;

            // p = r + beta * (p - omega * v)
            for i in 0..n {
                self.p[i] = self.r[i] + beta * (self.p[i] - omega * self.v[i]);
            }

            // v = A M⁻¹ p
            precond.apply(&self.p, &mut self.z);
            op.apply(&self.z, &mut self.v)?;

            let r0v = dot(&self.r0, &self.v);
            if r0v.abs() < BREAKDOWN_TOL {
                return done(SolverStatus::Stagnated, iter, norm2(&self.r), initial_norm);
            }
            alpha = rho / r0v;

            // x += alpha * M⁻¹ p
            axpy(alpha, &self.z, x);

            // s = r - alpha * v
            for i in 0..n {
                self.s[i] = self.r[i] - alpha * self.v[i];
            }
            let s_norm = norm2(&self.s);
            if s_norm <= atol || s_norm / initial_norm < rtol {
                log::trace!("BiCGStab iter {}: residual = {:.6e}", iter + 1, s_norm);
                return done(SolverStatus::Converged, iter + 1, s_norm, initial_norm);
            }

            // t = A M⁻¹ s
            precond.apply(&self.s, &mut self.z);
            op.apply(&self.z, &mut self.t)?;

            let tt = dot(&self.t, &self.t);
            omega = if tt < BREAKDOWN_TOL { 0.0 } else { dot(&self.t, &self.s) / tt };
            if omega.abs() < BREAKDOWN_TOL {
                copy(&self.s, &mut self.r);
                return done(SolverStatus::Stagnated, iter + 1, s_norm, initial_norm);
            }

            // x += omega * M⁻¹ s
            axpy(omega, &self.z, x);

            // r = s - omega * t
            for i in 0..n {
                self.r[i] = self.s[i] - omega * self.t[i];
            }

            let res_norm = norm2(&self.r);
            log::trace!("BiCGStab iter {}: residual = {:.6e}", iter + 1, res_norm);

            if res_norm <= atol || res_norm / initial_norm < rtol {
                return done(SolverStatus::Converged, iter + 1, res_norm, initial_norm);
            }
            if !res_norm.is_finite() || res_norm > initial_norm * DIVERGENCE_FACTOR {
                return done(SolverStatus::Diverged, iter + 1, res_norm, initial_norm);
            }
        }

        done(SolverStatus::MaxIterationsReached, max_iter, norm2(&self.r), initial_norm)
    }

    fn name(&self) -> &'static str {
        "BiCGStab"
    }
}

// ============================================================================
// GMRES(m)
// ============================================================================

/// 重启 GMRES(m) 求解器
///
/// 右预条件：求解 A M⁻¹ y = b，x = M⁻¹ y。Arnoldi 过程使用修正 Gram-Schmidt，
/// Hessenberg 矩阵用 Givens 旋转逐列化为上三角。
pub struct GmresSolver {
    config: SolverConfig,
    r: Vec<f64>,
    w: Vec<f64>,
    /// Krylov 基 V（m+1 个）
    basis: Vec<Vec<f64>>,
    /// 预条件方向 Z = M⁻¹ V（m 个）
    precond_basis: Vec<Vec<f64>>,
    /// Hessenberg 矩阵，按行存储 (m+1) × m
    hessenberg: Vec<Vec<f64>>,
    cs: Vec<f64>,
    sn: Vec<f64>,
    g: Vec<f64>,
    y: Vec<f64>,
}

impl GmresSolver {
    /// 创建 GMRES 求解器
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            r: Vec::new(),
            w: Vec::new(),
            basis: Vec::new(),
            precond_basis: Vec::new(),
            hessenberg: Vec::new(),
            cs: Vec::new(),
            sn: Vec::new(),
            g: Vec::new(),
            y: Vec::new(),
        }
    }

    fn ensure_workspace(&mut self, n: usize, m: usize) {
        if self.r.len() != n || self.precond_basis.len() != m {
            self.r = vec![0.0; n];
            self.w = vec![0.0; n];
            self.basis = vec![vec![0.0; n]; m + 1];
            self.precond_basis = vec![vec![0.0; n]; m];
            self.hessenberg = vec![vec![0.0; m]; m + 1];
            self.cs = vec![0.0; m];
            self.sn = vec![0.0; m];
            self.g = vec![0.0; m + 1];
            self.y = vec![0.0; m];
        }
    }

    /// 消去 (a, b) 中 b 的 Givens 旋转
    #[inline]
    fn givens(a: f64, b: f64) -> (f64, f64) {
        if b == 0.0 {
            (1.0, 0.0)
        } else {
            let r = a.hypot(b);
            (a / r, b / r)
        }
    }

    /// 用前 k 列回代求解上三角系统，并更新 x += Z y
    fn update_solution(&mut self, k: usize, x: &mut [f64]) {
        for i in (0..k).rev() {
            let mut sum = self.g[i];
            for l in (i + 1)..k {
                sum -= self.hessenberg[i][l] * self.y[l];
            }
            let d = self.hessenberg[i][i];
            self.y[i] = if d.abs() > 0.0 { sum / d } else { 0.0 };
        }
        for i in 0..k {
            axpy(self.y[i], &self.precond_basis[i], x);
        }
    }
}

impl IterativeSolver for GmresSolver {
    fn solve(
        &mut self,
        op: &mut dyn LinearOperator,
        b: &[f64],
        x: &mut [f64],
        precond: &dyn Preconditioner,
    ) -> PhysicsResult<SolverResult> {
        let n = b.len();
        let m = self.config.restart.clamp(1, n.max(1));
        self.ensure_workspace(n, m);
        let SolverConfig { rtol, atol, max_iter, .. } = self.config;
        let done = |status, iterations, res: f64, initial| Ok(SolverResult::new(status, iterations, res, initial, rtol));

        residual(op, b, x, &mut self.r)?;
        let initial_norm = norm2(&self.r);
        if initial_norm <= atol {
            return done(SolverStatus::Converged, 0, initial_norm, initial_norm);
        }

        let mut beta = initial_norm;
        let mut iterations = 0;
        loop {
            copy(&self.r, &mut self.basis[0]);
            scale(1.0 / beta, &mut self.basis[0]);
            self.g.fill(0.0);
            self.g[0] = beta;

            let mut k = 0;
            let mut breakdown = false;
            for j in 0..m {
                precond.apply(&self.basis[j], &mut self.precond_basis[j]);
                op.apply(&self.precond_basis[j], &mut self.w)?;

                // 修正 Gram-Schmidt
                for i in 0..=j {
                    let h = dot(&self.w, &self.basis[i]);
                    self.hessenberg[i][j] = h;
                    axpy(-h, &self.basis[i], &mut self.w);
                }
                let h_next = norm2(&self.w);
                self.hessenberg[j + 1][j] = h_next;

                // 已有旋转作用到新列
                for i in 0..j {
                    let (c, s) = (self.cs[i], self.sn[i]);
                    let (hi, hi1) = (self.hessenberg[i][j], self.hessenberg[i + 1][j]);
                    self.hessenberg[i][j] = c * hi + s * hi1;
                    self.hessenberg[i + 1][j] = -s * hi + c * hi1;
                }
                let (c, s) = Self::givens(self.hessenberg[j][j], h_next);
                self.cs[j] = c;
                self.sn[j] = s;
                self.hessenberg[j][j] = c * self.hessenberg[j][j] + s * h_next;
                self.hessenberg[j + 1][j] = 0.0;
                self.g[j + 1] = -s * self.g[j];
                self.g[j] *= c;

                k = j + 1;
                iterations += 1;
                let res = self.g[j + 1].abs();
                log::trace!("GMRES iter {}: residual = {:.6e}", iterations, res);

                if res <= atol || res / initial_norm < rtol || iterations >= max_iter {
                    break;
                }
                if h_next <= BREAKDOWN_TOL * beta.max(1.0) {
                    breakdown = true;
                    break;
                }
                if j + 1 < m {
                    copy(&self.w, &mut self.basis[j + 1]);
                    scale(1.0 / h_next, &mut self.basis[j + 1]);
                }
            }

            self.update_solution(k, x);

            // 以真实残差判断收敛并作为重启向量
            residual(op, b, x, &mut self.r)?;
            let prev_beta = beta;
            beta = norm2(&self.r);

            if beta <= atol || beta / initial_norm < rtol {
                return done(SolverStatus::Converged, iterations, beta, initial_norm);
            }
            if !beta.is_finite() || beta > initial_norm * DIVERGENCE_FACTOR {
                return done(SolverStatus::Diverged, iterations, beta, initial_norm);
            }
            if iterations >= max_iter {
                return done(SolverStatus::MaxIterationsReached, iterations, beta, initial_norm);
            }
            if breakdown || beta >= prev_beta {
                return done(SolverStatus::Stagnated, iterations, beta, initial_norm);
            }
        }
    }

    fn name(&self) -> &'static str {
        "GMRES"
    }
}
