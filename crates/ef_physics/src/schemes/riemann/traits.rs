// crates/ef_physics/src/schemes/riemann/traits.rs

//! 黎曼求解器统一接口
//!
//! 所有数值通量在界面法向坐标系中以一维问题求解：
//! 左状态位于法向反方向一侧，`u` 为法向速度，`v` 为切向速度
//! （切向 t = (-n.y, n.x)）。[`RiemannSolver::solve`] 负责旋转、
//! 输入检查和结果回转，具体格式只实现 [`RiemannSolver::solve_rotated`]。

use glam::DVec2;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::PhysicsError;
use crate::state::{Conserved, GasModel, Primitive};

/// 黎曼求解结果通量
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiemannFlux {
    /// 通量向量（质量、动量、能量）
    pub flux: Conserved,
    /// 最大波速
    pub max_wave_speed: f64,
}

impl RiemannFlux {
    /// 零通量
    pub const ZERO: Self = Self {
        flux: Conserved::ZERO,
        max_wave_speed: 0.0,
    };

    /// 创建通量
    #[inline]
    pub fn new(flux: Conserved, max_wave_speed: f64) -> Self {
        Self { flux, max_wave_speed }
    }

    /// 从旋转坐标系转换到全局坐标系
    ///
    /// `rotated.rho_u` 为法向动量通量，`rotated.rho_v` 为切向动量通量。
    #[inline]
    pub fn from_rotated(rotated: Conserved, normal: DVec2, max_wave_speed: f64) -> Self {
        Self {
            flux: rotated.unrotate(normal),
            max_wave_speed,
        }
    }

    /// 缩放通量（波速不变）
    #[inline]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            flux: self.flux * factor,
            max_wave_speed: self.max_wave_speed,
        }
    }

    /// 检查数值有效性
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.flux.is_finite() && self.max_wave_speed.is_finite() && self.max_wave_speed >= 0.0
    }
}

/// 求解器能力标志
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverCapabilities {
    /// 是否包含熵修正
    pub has_entropy_fix: bool,
    /// 是否分辨接触间断
    pub resolves_contact: bool,
    /// 是否为精确求解
    pub exact: bool,
    /// 是否为迎风格式（中心格式为 false）
    pub upwind: bool,
}

/// 求解器参数
#[derive(Debug, Clone, Copy)]
pub struct SolverParams {
    /// 熵修正比例（相对平均声速）
    pub entropy_ratio: f64,
    /// 通量零阈值
    pub flux_eps: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            entropy_ratio: 0.1,
            flux_eps: 1e-14,
        }
    }
}

impl SolverParams {
    /// 计算熵修正阈值
    #[inline]
    pub fn entropy_threshold(&self, wave_speed_scale: f64) -> f64 {
        (self.entropy_ratio * wave_speed_scale.abs()).max(self.flux_eps)
    }
}

/// 数值通量类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FluxKind {
    /// Godunov（精确黎曼解）
    Godunov,
    /// Roe（带 Harten 熵修正）
    Roe,
    /// HLL（Roe 平均波速）
    Hll,
    /// HLLE（Einfeldt 波速）
    Hlle,
    /// HLLC
    Hllc,
    /// 局部 Lax-Friedrichs (Rusanov)
    LaxFriedrichs,
    /// Steger-Warming 通量矢量分裂
    StegerWarming,
    /// 中心通量
    Central,
    /// AUSMD
    Ausmd,
    /// AUSMDV
    Ausmdv,
    /// Van Leer 通量矢量分裂
    VanLeer,
}

impl FluxKind {
    /// 所有通量类型
    pub const ALL: [FluxKind; 11] = [
        FluxKind::Godunov,
        FluxKind::Roe,
        FluxKind::Hll,
        FluxKind::Hlle,
        FluxKind::Hllc,
        FluxKind::LaxFriedrichs,
        FluxKind::StegerWarming,
        FluxKind::Central,
        FluxKind::Ausmd,
        FluxKind::Ausmdv,
        FluxKind::VanLeer,
    ];

    /// 配置中使用的短名称
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Godunov => "god",
            Self::Roe => "roe",
            Self::Hll => "hll",
            Self::Hlle => "hlle",
            Self::Hllc => "hllc",
            Self::LaxFriedrichs => "lxf",
            Self::StegerWarming => "stw",
            Self::Central => "cen",
            Self::Ausmd => "ausmd",
            Self::Ausmdv => "ausmdv",
            Self::VanLeer => "vanleer",
        }
    }
}

impl fmt::Display for FluxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for FluxKind {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "god" | "godunov" | "exact" => Self::Godunov,
            "roe" => Self::Roe,
            "hll" => Self::Hll,
            "hlle" => Self::Hlle,
            "hllc" => Self::Hllc,
            "lxf" | "rusanov" | "lax_friedrichs" => Self::LaxFriedrichs,
            "stw" | "steger_warming" => Self::StegerWarming,
            "cen" | "central" => Self::Central,
            "ausmd" => Self::Ausmd,
            "ausmdv" => Self::Ausmdv,
            "vanleer" | "van_leer" => Self::VanLeer,
            _ => {
                return Err(PhysicsError::UnknownFluxKind {
                    name: s.to_string(),
                })
            }
        };
        Ok(kind)
    }
}

/// 黎曼求解器 trait
pub trait RiemannSolver: Send + Sync {
    /// 求解器名称
    fn name(&self) -> &'static str;

    /// 通量类型
    fn kind(&self) -> FluxKind;

    /// 求解器能力
    fn capabilities(&self) -> SolverCapabilities;

    /// 气体模型
    fn gas(&self) -> &GasModel;

    /// 在法向坐标系中求解一维问题，返回旋转坐标系中的通量
    fn solve_rotated(&self, left: &Primitive, right: &Primitive) -> Result<RiemannFlux, RiemannError>;

    /// 求解黎曼问题
    ///
    /// # 参数
    /// - `left`: 法向反方向一侧的状态
    /// - `right`: 法向一侧的状态
    /// - `normal`: 界面单位法向量（指向右侧）
    ///
    /// # 返回
    /// 全局坐标系中的界面数值通量
    fn solve(&self, left: &Primitive, right: &Primitive, normal: DVec2) -> Result<RiemannFlux, RiemannError> {
        check_input(left, "左")?;
        check_input(right, "右")?;
        let rotated = self.solve_rotated(&left.rotate(normal), &right.rotate(normal))?;
        let flux = RiemannFlux::from_rotated(rotated.flux, normal, rotated.max_wave_speed);
        if !flux.is_valid() {
            return Err(RiemannError::Numerical {
                message: format!("{} 通量含 NaN/Inf", self.name()),
            });
        }
        Ok(flux)
    }
}

#[inline]
fn check_input(w: &Primitive, side: &str) -> Result<(), RiemannError> {
    if !w.is_finite() {
        return Err(RiemannError::InvalidInput {
            message: format!("{side}状态含 NaN/Inf"),
        });
    }
    if !(w.rho > 0.0 && w.p > 0.0) {
        return Err(RiemannError::InvalidInput {
            message: format!("{side}状态非物理 (rho={:.3e}, p={:.3e})", w.rho, w.p),
        });
    }
    Ok(())
}

/// 黎曼求解器错误
#[derive(Debug, Clone, Error)]
pub enum RiemannError {
    /// 数值错误
    #[error("数值错误: {message}")]
    Numerical {
        /// 详细信息
        message: String,
    },
    /// 无效输入
    #[error("输入无效: {message}")]
    InvalidInput {
        /// 详细信息
        message: String,
    },
}

impl RiemannError {
    /// 附加界面编号，转换为物理层错误
    pub fn at_face(self, face: usize) -> PhysicsError {
        let message = match self {
            Self::Numerical { message } | Self::InvalidInput { message } => message,
        };
        PhysicsError::invalid_flux_input(face, message)
    }
}

/// 法向坐标系中的一维物理通量，返回 (通量, 守恒量)
#[inline]
pub(crate) fn rotated_flux(gas: &GasModel, w: &Primitive) -> (Conserved, Conserved) {
    let u = gas.to_conservative(w);
    let mass = w.rho * w.u;
    let f = Conserved::new(mass, mass * w.u + w.p, mass * w.v, w.u * (u.rho_e + w.p));
    (f, u)
}

/// Roe 平均 (ũ, ṽ, H̃, c̃)
#[derive(Debug, Clone, Copy)]
pub(crate) struct RoeAverage {
    pub u: f64,
    pub v: f64,
    pub h: f64,
    pub c: f64,
}

impl RoeAverage {
    #[inline]
    pub fn new(gas: &GasModel, l: &Primitive, r: &Primitive) -> Self {
        let sl = l.rho.sqrt();
        let sr = r.rho.sqrt();
        let inv = 1.0 / (sl + sr);
        let u = (sl * l.u + sr * r.u) * inv;
        let v = (sl * l.v + sr * r.v) * inv;
        let h = (sl * gas.total_enthalpy(l) + sr * gas.total_enthalpy(r)) * inv;
        let c2 = gas.gm1() * (h - 0.5 * (u * u + v * v));
        Self { u, v, h, c: c2.max(0.0).sqrt() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_riemann_flux_zero() {
        let flux = RiemannFlux::ZERO;
        assert_eq!(flux.flux, Conserved::ZERO);
        assert!(flux.is_valid());
    }

    #[test]
    fn test_riemann_flux_from_rotated() {
        let rotated = Conserved::new(1.0, 2.0, 3.0, 4.0);
        let flux = RiemannFlux::from_rotated(rotated, DVec2::X, 5.0);
        assert_eq!(flux.flux.rho_u, 2.0);
        assert_eq!(flux.flux.rho_v, 3.0);

        let flux = RiemannFlux::from_rotated(rotated, DVec2::Y, 5.0);
        assert_eq!(flux.flux.rho_v, 2.0);
        assert!((flux.flux.rho_u - (-3.0)).abs() < 1e-10);
    }

    #[test]
    fn test_flux_kind_parse() {
        for kind in FluxKind::ALL {
            assert_eq!(kind.short_name().parse::<FluxKind>().unwrap(), kind);
        }
        assert_eq!("Rusanov".parse::<FluxKind>().unwrap(), FluxKind::LaxFriedrichs);
        assert!(matches!(
            "osher".parse::<FluxKind>(),
            Err(PhysicsError::UnknownFluxKind { .. })
        ));
    }

    #[test]
    fn test_solver_params() {
        let params = SolverParams::default();
        assert!((params.entropy_threshold(10.0) - 1.0).abs() < 1e-14);
        assert!(params.entropy_threshold(0.0) > 0.0);
    }

    #[test]
    fn test_roe_average_equal_states() {
        let gas = GasModel::default();
        let w = Primitive::new(1.0, 0.5, 0.2, 1.0);
        let avg = RoeAverage::new(&gas, &w, &w);
        assert!((avg.u - 0.5).abs() < 1e-14);
        assert!((avg.c - gas.sound_speed(&w)).abs() < 1e-12);
    }
}
