// crates/ef_physics/src/builder/settings.rs

//! 求解器设置
//!
//! 把算例配置中的名称（通量、限制器、边界类型）一次性解析为强类型，
//! 未知名称在进入时间推进之前报错。

use glam::DVec2;

use ef_config::{CaseConfig, ImplicitConfig, PrimitiveConfig, TimeMode, TimeStepping};

use crate::analysis::ForceSettings;
use crate::boundary::{BoundaryCondition, BoundaryManager, Freestream};
use crate::engine::time_integrator::RkScheme;
use crate::error::{PhysicsError, PhysicsResult};
use crate::exact::{ExactFunction, ExactSolution};
use crate::numerics::limiter::LimiterKind;
use crate::numerics::reconstruction::MusclConfig;
use crate::schemes::{FluxKind, SolverParams};
use crate::state::{GasModel, Primitive};

/// 求解器设置
#[derive(Debug, Clone)]
pub struct SolverSettings {
    /// 气体模型
    pub gas: GasModel,
    /// 数值通量
    pub flux: FluxKind,
    /// 通量参数
    pub flux_params: SolverParams,
    /// 重构
    pub reconstruction: MusclConfig,
    /// 显式或隐式
    pub mode: TimeMode,
    /// 全局或当地时间步
    pub stepping: TimeStepping,
    /// CFL 数
    pub cfl: f64,
    /// 固定时间步长
    pub fixed_dt: Option<f64>,
    /// 显式 Runge-Kutta 格式
    pub rk: RkScheme,
    /// 结束时间（全局时间步时截断最后一步）
    pub end_time: Option<f64>,
    /// 隐式求解器
    pub implicit: ImplicitConfig,
    /// 边界条件
    pub boundaries: BoundaryManager,
    /// 气动力积分
    pub forces: Option<ForceSettings>,
}

impl SolverSettings {
    /// 默认设置：HLLC、二阶 MUSCL、SSP-RK3、CFL 0.5
    pub fn new(gas: GasModel) -> Self {
        Self {
            gas,
            flux: FluxKind::Hllc,
            flux_params: SolverParams::default(),
            reconstruction: MusclConfig::default(),
            mode: TimeMode::Explicit,
            stepping: TimeStepping::Global,
            cfl: 0.5,
            fixed_dt: None,
            rk: RkScheme::SspRk3,
            end_time: None,
            implicit: ImplicitConfig::default(),
            boundaries: BoundaryManager::new(gas),
            forces: None,
        }
    }

    /// 设置数值通量
    pub fn with_flux(mut self, flux: FluxKind) -> Self {
        self.flux = flux;
        self
    }

    /// 设置重构
    pub fn with_reconstruction(mut self, reconstruction: MusclConfig) -> Self {
        self.reconstruction = reconstruction;
        self
    }

    /// 添加边界条件
    pub fn with_boundary(mut self, tag: u32, condition: BoundaryCondition) -> Self {
        self.boundaries.add_condition(tag, condition);
        self
    }

    /// 设置 CFL 数
    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.cfl = cfl;
        self
    }

    /// 设置固定时间步长
    pub fn with_fixed_dt(mut self, dt: f64) -> Self {
        self.fixed_dt = Some(dt);
        self
    }

    /// 设置时间步类型
    pub fn with_stepping(mut self, stepping: TimeStepping) -> Self {
        self.stepping = stepping;
        self
    }

    /// 设置 Runge-Kutta 格式
    pub fn with_rk(mut self, rk: RkScheme) -> Self {
        self.rk = rk;
        self
    }

    /// 设置结束时间
    pub fn with_end_time(mut self, end_time: f64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// 切换为隐式推进
    pub fn with_implicit(mut self, implicit: ImplicitConfig) -> Self {
        self.mode = TimeMode::Implicit;
        self.implicit = implicit;
        self
    }

    /// 启用气动力积分
    pub fn with_forces(mut self, forces: ForceSettings) -> Self {
        self.forces = Some(forces);
        self
    }

    /// 从算例配置解析
    ///
    /// # 错误
    /// - `UnknownFluxKind` / `UnknownLimiterKind` / `UnknownBoundaryKind`
    /// - 边界参数缺失或 Runge-Kutta 级数无效时为 `InvalidConfig`
    pub fn from_config(config: &CaseConfig) -> PhysicsResult<Self> {
        let gas = GasModel::new(config.gas.gamma);
        let flux: FluxKind = config.numerics.flux.parse()?;
        let limiter: LimiterKind = config.numerics.limiter.parse()?;

        let reconstruction = MusclConfig {
            second_order: config.numerics.order >= 2,
            gradient_type: config.numerics.gradient,
            limiter,
            venkat_k: config.numerics.venkat_k,
        };

        let template = exact_template(config, gas);
        let boundaries = BoundaryManager::from_configs(&config.boundaries, gas, &template)?;

        let forces = match config.analysis.wall_id {
            Some(wall_tag) => {
                let freestream = config.analysis.freestream.as_ref().ok_or_else(|| {
                    PhysicsError::invalid_config("analysis.freestream", "气动力积分需要来流状态")
                })?;
                Some(ForceSettings {
                    wall_tag,
                    reference_length: config.analysis.reference_length,
                    freestream: Freestream::from(freestream),
                })
            }
            None => None,
        };

        let end_time = match config.time.stepping {
            TimeStepping::Global => Some(config.time.end_time),
            TimeStepping::Local => None,
        };

        Ok(Self {
            gas,
            flux,
            flux_params: SolverParams::default(),
            reconstruction,
            mode: config.time.mode,
            stepping: config.time.stepping,
            cfl: config.time.cfl,
            fixed_dt: config.time.fixed_dt,
            rk: RkScheme::from_stages(config.time.rk_stages)?,
            end_time,
            implicit: config.implicit.clone(),
            boundaries,
            forces,
        })
    }
}

/// 原始变量配置转换
pub fn primitive_from_config(cfg: &PrimitiveConfig) -> Primitive {
    Primitive::new(cfg.rho, cfg.u, cfg.v, cfg.p)
}

/// 精确解模板：计算域、网格尺度与黎曼状态取自配置
pub fn exact_template(config: &CaseConfig, gas: GasModel) -> ExactSolution {
    let lower = DVec2::from_array(config.mesh.lower);
    let upper = DVec2::from_array(config.mesh.upper);
    let dx = (upper.x - lower.x) / config.mesh.nx.max(1) as f64;
    ExactSolution::new(ExactFunction::Riemann, gas)
        .with_domain(lower, upper)
        .with_reference_spacing(dx)
        .with_riemann(
            primitive_from_config(&config.initial.left),
            primitive_from_config(&config.initial.right),
            config.initial.interface_x,
        )
}
