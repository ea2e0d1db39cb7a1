// crates/ef_physics/src/engine/implicit.rs

//! 后向欧拉隐式积分器
//!
//! 每个时间步解非线性方程
//!
//! $$ \frac{A_i}{\Delta t_i} (U^{n+1}_i - U^n_i) = R_i(U^{n+1}) $$
//!
//! 以 Newton 迭代线性化，第 k 次迭代解
//!
//! $$ \left(\frac{A}{\Delta t} I - \frac{\partial R}{\partial U}\right) \Delta U
//!    = R(U^k) - \frac{A}{\Delta t}(U^k - U^n) $$
//!
//! 系统矩阵有两种处理方式：
//! - 组装：一阶通量有限差分得到块稀疏矩阵
//! - 无矩阵：y = (A/Δt) x - (R(U + εx) - R(U)) / ε，
//!   ε = √ε_mach (1 + ‖U‖) / ‖x‖，R 为完整（含重构）残差
//!
//! 无矩阵模式仍组装一阶矩阵，只用其对角块构造块 Jacobi 预条件器。
//! 线性求解未收敛不中止计算，结果原样接受并返回警告。

use ef_config::{ImplicitConfig, JacobianMode, PreconditionerKind};

use super::jacobian::JacobianAssembler;
use super::residual::ResidualAssembler;
use super::timestep::TimeStep;
use crate::error::PhysicsResult;
use crate::mesh::MeshTopology;
use crate::numerics::linear_algebra::{
    create_solver, vector_ops, BlockCsrMatrix, BlockCsrPattern, BlockJacobiPreconditioner, IdentityPreconditioner,
    IterativeSolver, LinearOperator, Preconditioner, SolverConfig, SolverResult,
};
use crate::state::{Conserved, FlowState, NVAR};

/// 一个隐式步的求解记录
#[derive(Debug, Clone, Default)]
pub struct ImplicitReport {
    /// 执行的 Newton 迭代次数
    pub newton_iterations: usize,
    /// 最后一次 Newton 更新的相对范数
    pub newton_update: f64,
    /// 每次 Newton 迭代的线性求解结果
    pub linear: Vec<SolverResult>,
}

/// 无矩阵线性算子
struct MatrixFreeOperator<'a> {
    assembler: &'a mut ResidualAssembler,
    mesh: &'a dyn MeshTopology,
    base: &'a [f64],
    base_residual: &'a [Conserved],
    diagonal: &'a [f64],
    base_norm: f64,
    time: f64,
    perturbed: Vec<f64>,
    residual: Vec<Conserved>,
}

impl LinearOperator for MatrixFreeOperator<'_> {
    fn dim(&self) -> usize {
        self.base.len()
    }

    fn apply(&mut self, x: &[f64], y: &mut [f64]) -> PhysicsResult<()> {
        let x_norm = vector_ops::norm2(x);
        if x_norm == 0.0 {
            y.fill(0.0);
            return Ok(());
        }
        let eps = f64::EPSILON.sqrt() * (1.0 + self.base_norm) / x_norm;

        self.perturbed.clear();
        self.perturbed
            .extend(self.base.iter().zip(x).map(|(u, dx)| u + eps * dx));
        let state = FlowState::from_flat(&self.perturbed);
        self.residual.resize(self.base_residual.len(), Conserved::ZERO);
        self.assembler.assemble(self.mesh, &state, self.time, &mut self.residual)?;

        for (i, ((r1, r0), d)) in self
            .residual
            .iter()
            .zip(self.base_residual)
            .zip(self.diagonal)
            .enumerate()
        {
            let dr = ((*r1 - *r0) * (1.0 / eps)).to_array();
            for k in 0..NVAR {
                let idx = NVAR * i + k;
                y[idx] = d * x[idx] - dr[k];
            }
        }
        Ok(())
    }
}

/// 后向欧拉 Newton-Krylov 积分器
pub struct ImplicitIntegrator {
    config: ImplicitConfig,
    solver: Box<dyn IterativeSolver>,
    jacobian: JacobianAssembler,
    matrix: Option<BlockCsrMatrix>,
    residual: Vec<Conserved>,
    first_residual: Vec<Conserved>,
    diagonal: Vec<f64>,
    rhs: Vec<f64>,
    delta: Vec<f64>,
}

impl ImplicitIntegrator {
    /// 按配置创建
    pub fn new(config: &ImplicitConfig) -> Self {
        let solver_config = SolverConfig::new(config.tolerance, config.max_iterations).with_restart(config.krylov_dim);
        Self {
            solver: create_solver(config.method, solver_config),
            config: config.clone(),
            jacobian: JacobianAssembler::new(),
            matrix: None,
            residual: Vec::new(),
            first_residual: Vec::new(),
            diagonal: Vec::new(),
            rhs: Vec::new(),
            delta: Vec::new(),
        }
    }

    /// 配置
    pub fn config(&self) -> &ImplicitConfig {
        &self.config
    }

    /// 线性求解器名称
    pub fn solver_name(&self) -> &'static str {
        self.solver.name()
    }

    /// 第一次 Newton 迭代的残差 R(U^n)
    pub fn first_residual(&self) -> &[Conserved] {
        &self.first_residual
    }

    /// 推进一个时间步，结果写入 `out`
    #[allow(clippy::too_many_arguments)]
    pub fn advance(
        &mut self,
        assembler: &mut ResidualAssembler,
        mesh: &dyn MeshTopology,
        areas: &[f64],
        state: &FlowState,
        time: f64,
        dt: &TimeStep,
        out: &mut FlowState,
    ) -> PhysicsResult<ImplicitReport> {
        let n = state.n_cells();
        let gas = *assembler.context().gas();
        let t_new = time + dt.global;

        if self.matrix.as_ref().is_some_and(|m| m.n_rows() != n) {
            self.matrix = None;
        }

        if out.n_cells() != n {
            *out = state.clone();
        } else {
            out.copy_from(state);
        }
        self.residual.resize(n, Conserved::ZERO);
        self.diagonal.clear();
        self.diagonal
            .extend(areas.iter().zip(&dt.local).map(|(a, dt)| a / dt));

        let mut report = ImplicitReport::default();
        let newton_iterations = self.config.newton_iterations.max(1);
        for it in 0..newton_iterations {
            assembler.assemble(mesh, out, t_new, &mut self.residual)?;
            if it == 0 {
                self.first_residual.clone_from(&self.residual);
            }

            // rhs = R(U^k) - A/Δt (U^k - U^n)
            self.rhs.clear();
            for i in 0..n {
                let r = (self.residual[i] - self.diagonal[i] * (out.get(i) - state.get(i))).to_array();
                self.rhs.extend_from_slice(&r);
            }

            let cells = assembler.primitives().to_vec();
            let ctx = assembler.context().clone();
            let matrix = self
                .matrix
                .get_or_insert_with(|| BlockCsrMatrix::new(BlockCsrPattern::from_mesh(mesh)));
            self.jacobian
                .assemble(&ctx, mesh, &cells, t_new, &self.diagonal, matrix)?;

            let precond: Box<dyn Preconditioner> = match self.config.preconditioner {
                PreconditionerKind::BlockJacobi => Box::new(BlockJacobiPreconditioner::from_matrix(matrix)),
                PreconditionerKind::None => Box::new(IdentityPreconditioner::new()),
            };

            self.delta.clear();
            self.delta.resize(n * NVAR, 0.0);
            let result = match self.config.jacobian {
                JacobianMode::Assembled => {
                    self.solver
                        .solve(matrix, &self.rhs, &mut self.delta, precond.as_ref())?
                }
                JacobianMode::MatrixFree => {
                    let base = out.to_flat();
                    let mut op = MatrixFreeOperator {
                        assembler: &mut *assembler,
                        mesh,
                        base_norm: vector_ops::norm2(&base),
                        base: &base,
                        base_residual: &self.residual,
                        diagonal: &self.diagonal,
                        time: t_new,
                        perturbed: Vec::with_capacity(n * NVAR),
                        residual: Vec::with_capacity(n),
                    };
                    self.solver
                        .solve(&mut op, &self.rhs, &mut self.delta, precond.as_ref())?
                }
            };
            log::trace!(
                "Newton {}: {} {:?} 迭代 {} 次，相对残差 {:.3e}",
                it,
                self.solver.name(),
                result.status,
                result.iterations,
                result.relative_residual
            );
            report.linear.push(result);

            let mut flat = out.to_flat();
            vector_ops::axpy(1.0, &self.delta, &mut flat);
            *out = FlowState::from_flat(&flat);
            out.validate(&gas)?;

            report.newton_iterations = it + 1;
            report.newton_update = vector_ops::norm2(&self.delta) / vector_ops::norm2(&flat).max(f64::MIN_POSITIVE);
            if report.newton_update < self.config.newton_tolerance {
                break;
            }
        }
        Ok(report)
    }
}

impl std::fmt::Debug for ImplicitIntegrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImplicitIntegrator")
            .field("solver", &self.solver.name())
            .field("config", &self.config)
            .finish()
    }
}
