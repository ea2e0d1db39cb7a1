// crates/ef_physics/src/engine/solver.rs

//! Euler 方程求解器
//!
//! 每一步的流程：
//! 1. 由当前状态计算原始变量与 CFL 时间步
//! 2. 显式 Runge-Kutta 或隐式 Newton-Krylov 推进，结果写入内部缓冲区
//! 3. 由 R(U^n) 计算残差范数，由新状态计算气动力系数
//!
//! 输入状态在整个步内只读，新状态写入独立缓冲区后才返回，
//! 步内任何界面计算都不会看到部分更新的状态。
//!
//! 数值失败（密度或压力非正、通量输入非法）立即中止本步，
//! 错误中附带最后有效步号；线性求解停滞只作为警告返回。

use std::sync::Arc;

use ef_config::TimeMode;
use ef_foundation::EfError;

use super::implicit::ImplicitIntegrator;
use super::residual::{FluxContext, ResidualAssembler};
use super::time_integrator::{MeshRhs, RungeKutta};
use super::timestep::CflCalculator;
use crate::analysis::{ForceCoefficients, ForceMonitor, ResidualNorms};
use crate::builder::SolverSettings;
use crate::error::{PhysicsError, PhysicsResult};
use crate::mesh::MeshTopology;
use crate::numerics::linear_algebra::SolverResult;
use crate::numerics::reconstruction::MusclReconstructor;
use crate::schemes::create_riemann_solver;
use crate::state::FlowState;

// ============================================================
// 步进结果
// ============================================================

/// 单步推进结果
#[derive(Debug)]
pub struct StepOutcome {
    /// 更新后的状态
    pub state: FlowState,
    /// 残差范数（由步初状态计算）
    pub residual_norms: ResidualNorms,
    /// 相对第一步归一化的残差范数
    pub normalized_residual: ResidualNorms,
    /// 气动力系数（未配置时为 None）
    pub forces: Option<ForceCoefficients>,
    /// 全局时间步长
    pub dt: f64,
    /// 步末时间
    pub time: f64,
    /// 已完成步数（含本步）
    pub step: usize,
    /// 最大波速
    pub max_wave_speed: f64,
    /// 隐式步的线性求解结果
    pub linear: Vec<SolverResult>,
    /// 非致命警告
    pub warnings: Vec<PhysicsError>,
}

/// 求解器累计统计
#[derive(Debug, Clone, Default)]
pub struct SolverStats {
    /// 已完成步数
    pub steps: usize,
    /// 最近一步的时间步长
    pub dt: f64,
    /// 最近一步的最大波速
    pub max_wave_speed: f64,
    /// 线性迭代总数
    pub linear_iterations: usize,
    /// 线性求解停滞次数
    pub stagnations: usize,
}

impl SolverStats {
    /// 生成诊断摘要
    pub fn summary(&self) -> String {
        format!(
            "steps={}, dt={:.4e}, wave_speed={:.3}, linear_iters={}, stagnations={}",
            self.steps, self.dt, self.max_wave_speed, self.linear_iterations, self.stagnations
        )
    }
}

// ============================================================
// 求解器
// ============================================================

/// 二维可压缩 Euler 求解器
pub struct EulerSolver {
    settings: SolverSettings,
    assembler: ResidualAssembler,
    cfl: CflCalculator,
    explicit: RungeKutta,
    implicit: Option<ImplicitIntegrator>,
    forces: Option<ForceMonitor>,
    areas: Vec<f64>,
    next: FlowState,
    reference_norms: Option<ResidualNorms>,
    time: f64,
    step: usize,
    stats: SolverStats,
}

impl EulerSolver {
    /// 创建求解器
    ///
    /// 检查网格的每个边界标签都有对应条件。
    pub fn new(mesh: &dyn MeshTopology, settings: SolverSettings) -> PhysicsResult<Self> {
        settings.boundaries.validate(mesh)?;
        if !(settings.cfl > 0.0) && settings.fixed_dt.is_none() {
            return Err(PhysicsError::invalid_config("time.cfl", format!("CFL 数必须为正: {}", settings.cfl)));
        }

        let gas = settings.gas;
        let ctx = FluxContext::new(
            gas,
            create_riemann_solver(settings.flux, gas, settings.flux_params),
            Arc::new(settings.boundaries.clone()),
        );
        let assembler = ResidualAssembler::new(ctx, Box::new(MusclReconstructor::new(settings.reconstruction)));
        let cfl = CflCalculator::new(settings.cfl, settings.stepping).with_fixed_dt(settings.fixed_dt);
        let implicit = match settings.mode {
            TimeMode::Implicit => Some(ImplicitIntegrator::new(&settings.implicit)),
            TimeMode::Explicit => None,
        };
        let forces = settings.forces.map(|f| ForceMonitor::new(f, gas));

        log::debug!(
            "EulerSolver: {} 单元, 通量 {}, {:?}/{:?}, {}",
            mesh.n_cells(),
            settings.flux.short_name(),
            settings.mode,
            settings.stepping,
            match &implicit {
                Some(i) => i.solver_name(),
                None => settings.rk.name(),
            }
        );

        Ok(Self {
            explicit: RungeKutta::new(settings.rk),
            areas: mesh.cell_areas(),
            next: FlowState::new(mesh.n_cells()),
            settings,
            assembler,
            cfl,
            implicit,
            forces,
            reference_norms: None,
            time: 0.0,
            step: 0,
            stats: SolverStats::default(),
        })
    }

    /// 设置
    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// 当前时间
    pub fn time(&self) -> f64 {
        self.time
    }

    /// 已完成步数
    pub fn step(&self) -> usize {
        self.step
    }

    /// 统计信息
    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// 是否已到达结束时间
    pub fn is_finished(&self) -> bool {
        self.settings
            .end_time
            .is_some_and(|t| self.time >= t * (1.0 - 1e-12))
    }

    /// 推进一个时间步
    ///
    /// # 错误
    /// 数值失败时返回带最后有效步号的错误，输入状态不受影响。
    pub fn advance_step(&mut self, mesh: &dyn MeshTopology, state: &FlowState) -> PhysicsResult<StepOutcome> {
        let last_valid = self.step;
        self.try_advance(mesh, state).map_err(|e| e.at_step(last_valid))
    }

    fn try_advance(&mut self, mesh: &dyn MeshTopology, state: &FlowState) -> PhysicsResult<StepOutcome> {
        EfError::check_size("state", mesh.n_cells(), state.n_cells())?;
        EfError::check_size("areas", mesh.n_cells(), self.areas.len())?;

        let gas = self.settings.gas;
        let cells = state.primitives(&gas)?;
        let remaining = self.settings.end_time.map(|t| t - self.time);
        let dt = self.cfl.compute(mesh, &gas, &cells, remaining)?;

        let (max_wave_speed, residual_norms, linear) = match self.implicit.as_mut() {
            None => {
                let mut rhs = MeshRhs {
                    assembler: &mut self.assembler,
                    mesh,
                };
                let speed = self
                    .explicit
                    .advance(&mut rhs, &gas, &self.areas, state, self.time, &dt, &mut self.next)?;
                let norms = ResidualNorms::compute(self.explicit.first_residual(), &self.areas);
                (speed, norms, Vec::new())
            }
            Some(implicit) => {
                let report = implicit.advance(
                    &mut self.assembler,
                    mesh,
                    &self.areas,
                    state,
                    self.time,
                    &dt,
                    &mut self.next,
                )?;
                let speed = self
                    .assembler
                    .primitives()
                    .iter()
                    .map(|w| w.velocity().length() + gas.sound_speed(w))
                    .fold(0.0, f64::max);
                let norms = ResidualNorms::compute(implicit.first_residual(), &self.areas);
                (speed, norms, report.linear)
            }
        };

        let mut warnings = Vec::new();
        for result in &linear {
            self.stats.linear_iterations += result.iterations;
            if let Some(warning) = result.stagnation_warning() {
                log::warn!("步 {}: {}", self.step + 1, warning);
                self.stats.stagnations += 1;
                warnings.push(warning);
            }
        }

        let reference = *self.reference_norms.get_or_insert(residual_norms);
        let normalized_residual = residual_norms.normalized(&reference);

        let forces = match self.forces.as_mut() {
            Some(monitor) => {
                let prims = self.next.primitives(&gas)?;
                Some(monitor.update(mesh, &prims))
            }
            None => None,
        };

        self.time += dt.global;
        self.step += 1;
        self.stats.steps = self.step;
        self.stats.dt = dt.global;
        self.stats.max_wave_speed = max_wave_speed;

        log::trace!(
            "步 {}: t={:.6e}, dt={:.4e}, 残差 {}",
            self.step,
            self.time,
            dt.global,
            residual_norms
        );

        Ok(StepOutcome {
            state: self.next.clone(),
            residual_norms,
            normalized_residual,
            forces,
            dt: dt.global,
            time: self.time,
            step: self.step,
            max_wave_speed,
            linear,
            warnings,
        })
    }
}

impl std::fmt::Debug for EulerSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EulerSolver")
            .field("assembler", &self.assembler)
            .field("implicit", &self.implicit)
            .field("time", &self.time)
            .field("step", &self.step)
            .finish()
    }
}

/// 单次推进：按设置构建求解器并前进一步
pub fn advance_step(mesh: &dyn MeshTopology, state: &FlowState, settings: &SolverSettings) -> PhysicsResult<StepOutcome> {
    EulerSolver::new(mesh, settings.clone())?.advance_step(mesh, state)
}
