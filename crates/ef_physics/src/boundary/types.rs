// crates/ef_physics/src/boundary/types.rs

//! 边界条件类型定义
//!
//! 本模块定义可压缩 Euler 方程的边界条件：
//! - BoundaryKind: 边界类型枚举（配置名称解析）
//! - BoundaryCondition: 带参数的边界条件（标签变体）
//! - Freestream: 来流状态（密度、马赫数、攻角、压力）

use std::fmt;
use std::str::FromStr;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use ef_config::{BoundaryConfig, FreestreamConfig};

use crate::error::PhysicsError;
use crate::exact::{ExactFunction, ExactSolution};
use crate::state::{GasModel, Primitive};

// ============================================================
// 边界类型枚举
// ============================================================

/// 边界类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum BoundaryKind {
    /// 滑移壁（无穿透）
    ///
    /// 法向速度反射，切向速度、密度、压力保持。
    #[default]
    SlipWall = 0,

    /// 无滑移壁
    ///
    /// 速度整体反向；可选固定壁面温度。
    Wall = 1,

    /// 入流
    ///
    /// 外部状态固定为来流状态。
    Inflow = 2,

    /// 出流
    ///
    /// 零梯度外推。
    Outflow = 3,

    /// 背压出流
    ///
    /// 保留内部密度和速度，亚音速出流时压力取背压。
    PressureOutflow = 4,

    /// 特征边界（远场）
    ///
    /// 按各特征族波速符号从内部或来流选取黎曼不变量。
    Characteristic = 5,

    /// 精确解边界
    ExactSolution = 6,

    /// 周期边界
    ///
    /// 在网格构建阶段配对为内部面，不产生幽灵状态。
    Periodic = 7,
}

impl BoundaryKind {
    /// 全部类型
    pub const ALL: [BoundaryKind; 8] = [
        Self::SlipWall,
        Self::Wall,
        Self::Inflow,
        Self::Outflow,
        Self::PressureOutflow,
        Self::Characteristic,
        Self::ExactSolution,
        Self::Periodic,
    ];

    /// 是否为固壁类型（无穿透）
    #[inline]
    pub fn is_solid(&self) -> bool {
        matches!(self, Self::SlipWall | Self::Wall)
    }

    /// 是否为开边界类型
    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            Self::Inflow | Self::Outflow | Self::PressureOutflow | Self::Characteristic | Self::ExactSolution
        )
    }

    /// 是否需要来流状态
    #[inline]
    pub fn requires_freestream(&self) -> bool {
        matches!(self, Self::Inflow | Self::Characteristic)
    }

    /// 配置文件中的名称
    pub fn short_name(self) -> &'static str {
        match self {
            Self::SlipWall => "slip_wall",
            Self::Wall => "wall",
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
            Self::PressureOutflow => "pressure_outflow",
            Self::Characteristic => "characteristic",
            Self::ExactSolution => "exact",
            Self::Periodic => "periodic",
        }
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl FromStr for BoundaryKind {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let kind = match key.as_str() {
            "slip_wall" | "slipwall" | "euler_wall" | "symmetry" => Self::SlipWall,
            "wall" | "no_slip" | "noslip" | "no_slip_wall" => Self::Wall,
            "inflow" | "freestream" => Self::Inflow,
            "outflow" | "extrapolate" => Self::Outflow,
            "pressure_outflow" | "pressureoutflow" | "back_pressure" => Self::PressureOutflow,
            "characteristic" | "farfield" | "far_field" => Self::Characteristic,
            "exact" | "exact_solution" => Self::ExactSolution,
            "periodic" => Self::Periodic,
            _ => return Err(PhysicsError::UnknownBoundaryKind { name: s.to_string() }),
        };
        Ok(kind)
    }
}

// ============================================================
// 来流状态
// ============================================================

/// 来流状态
///
/// 以马赫数和攻角（度）给出，速度大小 |v| = M · c∞。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Freestream {
    /// 密度
    pub rho: f64,
    /// 马赫数
    pub mach: f64,
    /// 攻角 [度]
    pub alpha: f64,
    /// 压力
    pub pressure: f64,
}

impl Freestream {
    /// 创建来流状态
    pub fn new(rho: f64, mach: f64, alpha: f64, pressure: f64) -> Self {
        Self {
            rho,
            mach,
            alpha,
            pressure,
        }
    }

    /// 攻角（弧度）
    #[inline]
    pub fn alpha_rad(&self) -> f64 {
        self.alpha.to_radians()
    }

    /// 来流方向单位向量
    #[inline]
    pub fn direction(&self) -> DVec2 {
        let a = self.alpha_rad();
        DVec2::new(a.cos(), a.sin())
    }

    /// 来流速度向量
    pub fn velocity(&self, gas: &GasModel) -> DVec2 {
        let c = (gas.gamma * self.pressure / self.rho).sqrt();
        self.direction() * (self.mach * c)
    }

    /// 原始变量
    pub fn primitive(&self, gas: &GasModel) -> Primitive {
        let v = self.velocity(gas);
        Primitive::new(self.rho, v.x, v.y, self.pressure)
    }

    /// 动压 ½ρ∞|v∞|²
    pub fn dynamic_pressure(&self, gas: &GasModel) -> f64 {
        0.5 * self.rho * self.velocity(gas).length_squared()
    }
}

impl From<&FreestreamConfig> for Freestream {
    fn from(cfg: &FreestreamConfig) -> Self {
        Self::new(cfg.rho, cfg.mach, cfg.alpha, cfg.pressure)
    }
}

// ============================================================
// 边界条件
// ============================================================

/// 带参数的边界条件
#[derive(Debug, Clone, Copy)]
pub enum BoundaryCondition {
    /// 滑移壁
    SlipWall,
    /// 无滑移壁，`temperature` 为 None 时绝热
    Wall {
        /// 壁面温度 T = p/ρ
        temperature: Option<f64>,
    },
    /// 入流
    Inflow {
        /// 来流原始状态
        state: Primitive,
    },
    /// 零梯度出流
    Outflow,
    /// 背压出流
    PressureOutflow {
        /// 背压
        back_pressure: f64,
    },
    /// 特征远场
    Characteristic {
        /// 来流原始状态
        freestream: Primitive,
    },
    /// 精确解
    ExactSolution {
        /// 参考解
        solution: ExactSolution,
    },
    /// 周期
    Periodic {
        /// 从本标签面到配对面的平移
        shift: DVec2,
    },
}

impl BoundaryCondition {
    /// 创建滑移壁
    pub fn slip_wall() -> Self {
        Self::SlipWall
    }

    /// 创建绝热无滑移壁
    pub fn wall() -> Self {
        Self::Wall { temperature: None }
    }

    /// 创建等温无滑移壁
    pub fn isothermal_wall(temperature: f64) -> Self {
        Self::Wall {
            temperature: Some(temperature),
        }
    }

    /// 创建入流边界
    pub fn inflow(state: Primitive) -> Self {
        Self::Inflow { state }
    }

    /// 创建零梯度出流
    pub fn outflow() -> Self {
        Self::Outflow
    }

    /// 创建背压出流
    pub fn pressure_outflow(back_pressure: f64) -> Self {
        Self::PressureOutflow { back_pressure }
    }

    /// 创建特征远场边界
    pub fn characteristic(freestream: Primitive) -> Self {
        Self::Characteristic { freestream }
    }

    /// 创建精确解边界
    pub fn exact(solution: ExactSolution) -> Self {
        Self::ExactSolution { solution }
    }

    /// 创建周期边界
    pub fn periodic(shift: DVec2) -> Self {
        Self::Periodic { shift }
    }

    /// 边界类型
    pub fn kind(&self) -> BoundaryKind {
        match self {
            Self::SlipWall => BoundaryKind::SlipWall,
            Self::Wall { .. } => BoundaryKind::Wall,
            Self::Inflow { .. } => BoundaryKind::Inflow,
            Self::Outflow => BoundaryKind::Outflow,
            Self::PressureOutflow { .. } => BoundaryKind::PressureOutflow,
            Self::Characteristic { .. } => BoundaryKind::Characteristic,
            Self::ExactSolution { .. } => BoundaryKind::ExactSolution,
            Self::Periodic { .. } => BoundaryKind::Periodic,
        }
    }

    /// 从配置项解析
    ///
    /// `exact_template` 提供精确解的计算域和黎曼状态，
    /// 其类型由配置项的 `exact_function` 替换。
    pub fn from_config(
        cfg: &BoundaryConfig,
        gas: &GasModel,
        exact_template: &ExactSolution,
    ) -> Result<Self, PhysicsError> {
        let kind: BoundaryKind = cfg.kind.parse()?;
        let key = |field: &str| format!("boundaries[{}].{field}", cfg.id);
        let freestream = || {
            cfg.freestream
                .as_ref()
                .map(|fs| Freestream::from(fs).primitive(gas))
                .ok_or_else(|| PhysicsError::invalid_config(key("freestream"), format!("{kind} 边界需要来流状态")))
        };

        let bc = match kind {
            BoundaryKind::SlipWall => Self::SlipWall,
            BoundaryKind::Wall => Self::Wall {
                temperature: cfg.wall_temperature,
            },
            BoundaryKind::Inflow => Self::inflow(freestream()?),
            BoundaryKind::Outflow => Self::Outflow,
            BoundaryKind::PressureOutflow => {
                let p = cfg
                    .back_pressure
                    .ok_or_else(|| PhysicsError::invalid_config(key("back_pressure"), "背压出流需要 back_pressure"))?;
                Self::pressure_outflow(p)
            }
            BoundaryKind::Characteristic => Self::characteristic(freestream()?),
            BoundaryKind::ExactSolution => {
                let id = cfg
                    .exact_function
                    .ok_or_else(|| PhysicsError::invalid_config(key("exact_function"), "精确解边界需要 exact_function"))?;
                Self::exact(exact_template.with_function(ExactFunction::from_id(id)?))
            }
            BoundaryKind::Periodic => {
                let shift = cfg
                    .periodic_shift
                    .ok_or_else(|| PhysicsError::invalid_config(key("periodic_shift"), "周期边界需要 periodic_shift"))?;
                Self::periodic(DVec2::from_array(shift))
            }
        };
        Ok(bc)
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_kind_properties() {
        assert!(BoundaryKind::SlipWall.is_solid());
        assert!(BoundaryKind::Wall.is_solid());
        assert!(!BoundaryKind::Outflow.is_solid());
        assert!(BoundaryKind::Characteristic.is_open());
        assert!(!BoundaryKind::Periodic.is_open());
        assert!(BoundaryKind::Inflow.requires_freestream());
    }

    #[test]
    fn test_boundary_kind_parse() {
        for kind in BoundaryKind::ALL {
            assert_eq!(kind.short_name().parse::<BoundaryKind>().unwrap(), kind);
        }
        assert_eq!("Far-Field".parse::<BoundaryKind>().unwrap(), BoundaryKind::Characteristic);
        assert!(matches!(
            "moving_lid".parse::<BoundaryKind>(),
            Err(PhysicsError::UnknownBoundaryKind { .. })
        ));
    }

    #[test]
    fn test_freestream_velocity() {
        let gas = GasModel::default();
        let fs = Freestream::new(1.4, 2.0, 90.0, 1.0);
        let w = fs.primitive(&gas);
        // c∞ = 1，速度沿 +y
        assert!(w.u.abs() < 1e-14);
        assert!((w.v - 2.0).abs() < 1e-14);
        assert!((fs.dynamic_pressure(&gas) - 2.8).abs() < 1e-12);
    }

    #[test]
    fn test_from_config_requires_parameters() {
        let gas = GasModel::default();
        let template = ExactSolution::new(ExactFunction::SineWave, gas);

        let cfg = BoundaryConfig::new(3, "pressure_outflow");
        assert!(matches!(
            BoundaryCondition::from_config(&cfg, &gas, &template),
            Err(PhysicsError::InvalidConfig { .. })
        ));

        let cfg = BoundaryConfig::new(3, "pressure_outflow").with_back_pressure(0.8);
        let bc = BoundaryCondition::from_config(&cfg, &gas, &template).unwrap();
        assert_eq!(bc.kind(), BoundaryKind::PressureOutflow);

        let cfg = BoundaryConfig::new(4, "exact").with_exact_function(4);
        match BoundaryCondition::from_config(&cfg, &gas, &template).unwrap() {
            BoundaryCondition::ExactSolution { solution } => {
                assert_eq!(solution.function(), ExactFunction::DoubleMach)
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
