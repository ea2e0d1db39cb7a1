// crates/ef_physics/src/engine/time_integrator.rs

//! 显式 Runge-Kutta 时间积分器
//!
//! ### Shu-Osher 形式
//!
//! 每一级写成初值、上一级状态与上一级残差的组合：
//!
//! $$ U^{(k)} = a_0 U^n + a_1 U^{(k-1)} + b \, \Delta t \, R(U^{(k-1)}) / A $$
//!
//! | 级数 | 格式 | (a0, a1, b) |
//! |------|------|-------------|
//! | 1 | 前向欧拉 | (1, 0, 1) |
//! | 2 | SSP-RK2 (Heun) | (1, 0, 1), (1/2, 1/2, 1/2) |
//! | 3 | SSP-RK3 (Shu-Osher) | (1, 0, 1), (3/4, 1/4, 1/4), (1/3, 2/3, 2/3) |
//! | 4 | 低存储四级 | (1, 0, α_k)，α = 1/4, 1/3, 1/2, 1 |
//!
//! 每一级结束后检查全场密度与压力为正，失效立即中止本步。
//!
//! ## 参考文献
//!
//! 1. Gottlieb, S., Shu, C.-W., & Tadmor, E. (2001). Strong stability-preserving
//!    high-order time discretization methods. SIAM Review, 43(1), 89-112.
//!
//! 2. Shu, C.-W., & Osher, S. (1988). Efficient implementation of essentially
//!    non-oscillatory shock-capturing schemes. Journal of Computational Physics,
//!    77(2), 439-471.

use rayon::prelude::*;

use super::residual::ResidualAssembler;
use super::timestep::TimeStep;
use crate::error::{PhysicsError, PhysicsResult};
use crate::mesh::MeshTopology;
use crate::state::{Conserved, FlowState, GasModel};

/// RHS 计算器 trait
///
/// 实现此 trait 的类型计算空间残差 R(U)（未除以面积）
pub trait RhsComputer {
    /// 计算残差，返回最大波速
    fn compute_rhs(&mut self, state: &FlowState, time: f64, output: &mut [Conserved]) -> PhysicsResult<f64>;
}

/// 网格上的残差组装器
pub struct MeshRhs<'a> {
    /// 组装器
    pub assembler: &'a mut ResidualAssembler,
    /// 网格
    pub mesh: &'a dyn MeshTopology,
}

impl RhsComputer for MeshRhs<'_> {
    fn compute_rhs(&mut self, state: &FlowState, time: f64, output: &mut [Conserved]) -> PhysicsResult<f64> {
        self.assembler.assemble(self.mesh, state, time, output)
    }
}

/// Shu-Osher 级系数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RkStage {
    /// U^n 的系数
    pub a0: f64,
    /// 上一级状态的系数
    pub a1: f64,
    /// 残差项系数
    pub b: f64,
    /// 级时间偏移（以 Δt 计）
    pub c: f64,
}

const fn stage(a0: f64, a1: f64, b: f64, c: f64) -> RkStage {
    RkStage { a0, a1, b, c }
}

const FORWARD_EULER: [RkStage; 1] = [stage(1.0, 0.0, 1.0, 0.0)];
const SSP_RK2: [RkStage; 2] = [stage(1.0, 0.0, 1.0, 0.0), stage(0.5, 0.5, 0.5, 1.0)];
const SSP_RK3: [RkStage; 3] = [
    stage(1.0, 0.0, 1.0, 0.0),
    stage(0.75, 0.25, 0.25, 1.0),
    stage(1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0, 0.5),
];
const LOW_STORAGE_RK4: [RkStage; 4] = [
    stage(1.0, 0.0, 0.25, 0.0),
    stage(1.0, 0.0, 1.0 / 3.0, 0.25),
    stage(1.0, 0.0, 0.5, 1.0 / 3.0),
    stage(1.0, 0.0, 1.0, 0.5),
];

/// Runge-Kutta 格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RkScheme {
    /// 前向欧拉
    ForwardEuler,
    /// SSP-RK2
    SspRk2,
    /// SSP-RK3
    #[default]
    SspRk3,
    /// 低存储四级
    LowStorageRk4,
}

impl RkScheme {
    /// 按级数选择格式
    pub fn from_stages(stages: u8) -> PhysicsResult<Self> {
        match stages {
            1 => Ok(Self::ForwardEuler),
            2 => Ok(Self::SspRk2),
            3 => Ok(Self::SspRk3),
            4 => Ok(Self::LowStorageRk4),
            n => Err(PhysicsError::invalid_config("time.rk_stages", format!("不支持 {n} 级"))),
        }
    }

    /// 各级系数
    pub fn coefficients(self) -> &'static [RkStage] {
        match self {
            Self::ForwardEuler => &FORWARD_EULER,
            Self::SspRk2 => &SSP_RK2,
            Self::SspRk3 => &SSP_RK3,
            Self::LowStorageRk4 => &LOW_STORAGE_RK4,
        }
    }

    /// 级数
    pub fn stages(self) -> usize {
        self.coefficients().len()
    }

    /// 名称
    pub fn name(self) -> &'static str {
        match self {
            Self::ForwardEuler => "ForwardEuler",
            Self::SspRk2 => "SSP-RK2",
            Self::SspRk3 => "SSP-RK3",
            Self::LowStorageRk4 => "RK4-LowStorage",
        }
    }
}

/// Runge-Kutta 积分器
#[derive(Debug, Clone)]
pub struct RungeKutta {
    scheme: RkScheme,
    rhs: Vec<Conserved>,
    first_residual: Vec<Conserved>,
}

impl RungeKutta {
    /// 创建积分器
    pub fn new(scheme: RkScheme) -> Self {
        Self {
            scheme,
            rhs: Vec::new(),
            first_residual: Vec::new(),
        }
    }

    /// 格式
    pub fn scheme(&self) -> RkScheme {
        self.scheme
    }

    /// 第一级残差 R(U^n)
    pub fn first_residual(&self) -> &[Conserved] {
        &self.first_residual
    }

    /// 推进一个时间步
    ///
    /// 结果写入 `out`，`state` 在整个步内保持不变。
    ///
    /// # 返回
    /// 各级中的最大波速
    #[allow(clippy::too_many_arguments)]
    pub fn advance(
        &mut self,
        rhs_computer: &mut dyn RhsComputer,
        gas: &GasModel,
        areas: &[f64],
        state: &FlowState,
        time: f64,
        dt: &TimeStep,
        out: &mut FlowState,
    ) -> PhysicsResult<f64> {
        let n = state.n_cells();
        if out.n_cells() != n {
            *out = state.clone();
        } else {
            out.copy_from(state);
        }
        self.rhs.resize(n, Conserved::ZERO);

        let mut max_wave_speed = 0.0f64;
        for (k, st) in self.scheme.coefficients().iter().enumerate() {
            let speed = rhs_computer.compute_rhs(out, time + st.c * dt.global, &mut self.rhs)?;
            max_wave_speed = max_wave_speed.max(speed);
            if k == 0 {
                self.first_residual.clone_from(&self.rhs);
            }

            let rhs = &self.rhs;
            let local = &dt.local;
            (
                out.rho.par_iter_mut(),
                out.rho_u.par_iter_mut(),
                out.rho_v.par_iter_mut(),
                out.rho_e.par_iter_mut(),
            )
                .into_par_iter()
                .enumerate()
                .for_each(|(i, (rho, rho_u, rho_v, rho_e))| {
                    let u0 = state.get(i);
                    let prev = Conserved::new(*rho, *rho_u, *rho_v, *rho_e);
                    let next = st.a0 * u0 + st.a1 * prev + (st.b * local[i] / areas[i]) * rhs[i];
                    *rho = next.rho;
                    *rho_u = next.rho_u;
                    *rho_v = next.rho_v;
                    *rho_e = next.rho_e;
                });

            out.validate(gas)?;
        }

        Ok(max_wave_speed)
    }
}
