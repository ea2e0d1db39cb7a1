// crates/ef_physics/src/exact.rs

//! 解析参考解
//!
//! 提供验证算例使用的解析初始场/精确解，供初始化和 `exact` 边界共用。
//!
//! | 编号 | 名称 | 说明 |
//! |------|------|------|
//! | 1 | Richtmyer-Meshkov | 扰动界面 + 入射激波初始场 |
//! | 2 | Gaussian pulse | 域中心的高斯压力脉冲，静止背景 |
//! | 3 | Sine wave | 沿 (1,1) 对流的正弦波，q = 2 + 0.1 sin(π(x+y) - 2πt) |
//! | 4 | Double Mach | 60° 斜激波，tanh 光滑过渡 |
//! | 5 | Riemann 1D | x 方向一维黎曼问题，精确求解器采样 |
//! | 6 | Acoustic wave | 叠加在均匀流上的小振幅一维声波 |
//!
//! 所有函数返回守恒变量，坐标相对域左下角计算。

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use glam::DVec2;

use crate::error::PhysicsError;
use crate::mesh::MeshTopology;
use crate::schemes::riemann::ExactRiemann;
use crate::state::{Conserved, FlowState, GasModel, Primitive};

/// 参考解类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExactFunction {
    /// Richtmyer-Meshkov 不稳定性初始场
    RichtmyerMeshkov,
    /// 高斯压力脉冲
    GaussianPulse,
    /// 对流正弦波
    SineWave,
    /// 双马赫反射激波
    DoubleMach,
    /// 一维黎曼问题
    Riemann,
    /// 一维声波
    AcousticWave,
}

impl ExactFunction {
    /// 全部类型（按编号排列）
    pub const ALL: [ExactFunction; 6] = [
        Self::RichtmyerMeshkov,
        Self::GaussianPulse,
        Self::SineWave,
        Self::DoubleMach,
        Self::Riemann,
        Self::AcousticWave,
    ];

    /// 配置文件中的编号
    pub fn id(self) -> u32 {
        match self {
            Self::RichtmyerMeshkov => 1,
            Self::GaussianPulse => 2,
            Self::SineWave => 3,
            Self::DoubleMach => 4,
            Self::Riemann => 5,
            Self::AcousticWave => 6,
        }
    }

    /// 由编号解析
    pub fn from_id(id: u32) -> Result<Self, PhysicsError> {
        Self::ALL
            .into_iter()
            .find(|f| f.id() == id)
            .ok_or_else(|| PhysicsError::invalid_config("exact_function", format!("未知参考解编号 {id}")))
    }

    /// 短名称
    pub fn short_name(self) -> &'static str {
        match self {
            Self::RichtmyerMeshkov => "richtmyer_meshkov",
            Self::GaussianPulse => "gaussian_pulse",
            Self::SineWave => "sine_wave",
            Self::DoubleMach => "double_mach",
            Self::Riemann => "riemann",
            Self::AcousticWave => "acoustic_wave",
        }
    }
}

impl fmt::Display for ExactFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl FromStr for ExactFunction {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        if let Ok(id) = key.parse::<u32>() {
            return Self::from_id(id);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.short_name() == key)
            .ok_or_else(|| PhysicsError::invalid_config("exact_function", format!("未知参考解 '{s}'")))
    }
}

// ============================================================
// 参考解求值
// ============================================================

/// 双马赫反射激波两侧守恒量之和/差
const DMR_SUM: [f64; 4] = [9.4, 57.157676649772950686, -33.0, 566.0];
const DMR_DIFF: [f64; 4] = [6.6, 57.157676649772950686, -33.0, 561.0];

/// 声波振幅
const ACOUSTIC_AMPLITUDE: f64 = 1e-5;

/// 带参数的参考解
#[derive(Debug, Clone, Copy)]
pub struct ExactSolution {
    function: ExactFunction,
    gas: GasModel,
    lower: DVec2,
    upper: DVec2,
    dx_ref: f64,
    left: Primitive,
    right: Primitive,
    interface_x: f64,
}

impl ExactSolution {
    /// 创建参考解（单位正方形域，Sod 黎曼状态）
    pub fn new(function: ExactFunction, gas: GasModel) -> Self {
        Self {
            function,
            gas,
            lower: DVec2::ZERO,
            upper: DVec2::ONE,
            dx_ref: 0.01,
            left: Primitive::new(1.0, 0.0, 0.0, 1.0),
            right: Primitive::new(0.125, 0.0, 0.0, 0.1),
            interface_x: 0.5,
        }
    }

    /// 替换参考解类型（保留其余参数）
    pub fn with_function(mut self, function: ExactFunction) -> Self {
        self.function = function;
        self
    }

    /// 设置计算域
    pub fn with_domain(mut self, lower: DVec2, upper: DVec2) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// 设置参考网格尺度（双马赫激波过渡宽度）
    pub fn with_reference_spacing(mut self, dx: f64) -> Self {
        self.dx_ref = dx;
        self
    }

    /// 设置黎曼问题左右状态与间断位置
    pub fn with_riemann(mut self, left: Primitive, right: Primitive, interface_x: f64) -> Self {
        self.left = left;
        self.right = right;
        self.interface_x = interface_x;
        self
    }

    /// 参考解类型
    pub fn function(&self) -> ExactFunction {
        self.function
    }

    /// 点 `x`、时刻 `t` 的守恒状态
    pub fn conservative(&self, x: DVec2, t: f64) -> Result<Conserved, PhysicsError> {
        let len = self.upper - self.lower;
        let rel = x - self.lower;
        let u = match self.function {
            ExactFunction::RichtmyerMeshkov => {
                let interface = 0.3 * len.x + len.x / 30.0 * (2.0 * PI * 3.0 * rel.y / len.y).cos();
                let (rho, p) = if rel.x >= len.x / 30.0 && rel.x <= 0.1 * len.x {
                    (4.22, 4.9)
                } else if rel.x >= interface {
                    (0.25, 1.0)
                } else {
                    (1.0, 1.0)
                };
                self.gas.to_conservative(&Primitive::new(rho, 0.0, 0.0, p))
            }
            ExactFunction::GaussianPulse => {
                let half_width = len.x.min(len.y) * 0.06;
                let r2 = (x - 0.5 * (self.lower + self.upper)).length_squared();
                let p = 1.0 + (-(2.0f64.ln()) * r2 / (half_width * half_width)).exp();
                self.gas.to_conservative(&Primitive::new(1.0, 0.0, 0.0, p))
            }
            ExactFunction::SineWave => {
                let q = 2.0 + 0.1 * (PI * (rel.x + rel.y) - 2.0 * PI * t).sin();
                Conserved::new(q, q, q, q * q)
            }
            ExactFunction::DoubleMach => {
                let front = 1.0 / 6.0 + (20.0 * t + rel.y) / 3.0f64.sqrt();
                let blend = ((rel.x - front) * PI / (0.2 * self.dx_ref)).tanh();
                let c = |k: usize| 0.5 * (DMR_SUM[k] - DMR_DIFF[k] * blend);
                Conserved::new(c(0), c(1), c(2), c(3))
            }
            ExactFunction::Riemann => self.riemann_state(x.x, t)?,
            ExactFunction::AcousticWave => self.acoustic_state(rel.x, t),
        };
        Ok(u)
    }

    /// 点 `x`、时刻 `t` 的原始变量
    pub fn primitive(&self, x: DVec2, t: f64) -> Result<Primitive, PhysicsError> {
        let u = self.conservative(x, t)?;
        self.gas.to_primitive(&u).map_err(|v| {
            PhysicsError::invalid_config(
                "exact_function",
                format!("{} 在 ({:.4}, {:.4}) 处状态非物理: {v:?}", self.function, x.x, x.y),
            )
        })
    }

    /// 在所有单元中心求值，生成全场状态
    pub fn fill<M: MeshTopology + ?Sized>(&self, mesh: &M, t: f64) -> Result<FlowState, PhysicsError> {
        let mut state = FlowState::new(mesh.n_cells());
        for i in 0..mesh.n_cells() {
            state.set(i, self.conservative(mesh.cell_center(i), t)?);
        }
        Ok(state)
    }

    fn riemann_state(&self, x: f64, t: f64) -> Result<Conserved, PhysicsError> {
        let dx = x - self.interface_x;
        let w = if t <= 0.0 {
            if dx < 0.0 {
                self.left
            } else {
                self.right
            }
        } else {
            let solver = ExactRiemann::new(self.gas);
            let sample = solver
                .sample(&self.left, &self.right, dx / t)
                .map_err(|e| PhysicsError::invalid_config("exact_function", e.to_string()))?;
            let v = if sample.left_of_contact { self.left.v } else { self.right.v };
            Primitive::new(sample.rho, sample.u, v, sample.p)
        };
        Ok(self.gas.to_conservative(&w))
    }

    fn acoustic_state(&self, x: f64, t: f64) -> Conserved {
        let base = Conserved::new(1.0, 0.1, 0.0, 1.0);
        let (u, v) = (base.rho_u / base.rho, base.rho_v / base.rho);
        let p = self.gas.pressure(&base);
        let c = (self.gas.gamma * p / base.rho).sqrt();
        let h = (base.rho_e + p) / base.rho;
        // 仅激发右行声波（第四特征族）
        let amp = ACOUSTIC_AMPLITUDE * (PI * (x - (c + u) * t)).sin();
        base + Conserved::new(1.0, u + c, v, h + u * c) * amp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        for f in ExactFunction::ALL {
            assert_eq!(ExactFunction::from_id(f.id()).unwrap(), f);
            assert_eq!(f.short_name().parse::<ExactFunction>().unwrap(), f);
        }
        assert!(ExactFunction::from_id(7).is_err());
        assert_eq!("4".parse::<ExactFunction>().unwrap(), ExactFunction::DoubleMach);
    }

    #[test]
    fn test_double_mach_far_states() {
        let exact = ExactSolution::new(ExactFunction::DoubleMach, GasModel::default());
        let pre = exact.primitive(DVec2::new(0.9, 0.0), 0.0).unwrap();
        assert!((pre.rho - 1.4).abs() < 1e-10);
        assert!((pre.p - 1.0).abs() < 1e-9);
        let post = exact.primitive(DVec2::new(0.0, 0.0), 0.0).unwrap();
        assert!((post.rho - 8.0).abs() < 1e-10);
        assert!((post.p - 116.5).abs() < 1e-6);
    }

    #[test]
    fn test_sine_wave_is_periodic_in_time() {
        let exact = ExactSolution::new(ExactFunction::SineWave, GasModel::default());
        let x = DVec2::new(0.3, 0.1);
        let a = exact.conservative(x, 0.0).unwrap();
        let b = exact.conservative(x, 1.0).unwrap();
        assert!((a - b).max_abs() < 1e-12);
        assert!(exact.primitive(x, 0.25).unwrap().is_physical());
    }

    #[test]
    fn test_riemann_initial_step_and_star_region() {
        let exact = ExactSolution::new(ExactFunction::Riemann, GasModel::default());
        let l = exact.primitive(DVec2::new(0.2, 0.0), 0.0).unwrap();
        let r = exact.primitive(DVec2::new(0.8, 0.0), 0.0).unwrap();
        assert!((l.rho - 1.0).abs() < 1e-14 && (r.rho - 0.125).abs() < 1e-14);

        // t = 0.2 时 x = 0.6 位于接触间断（x≈0.685）左侧的星区
        let star = exact.primitive(DVec2::new(0.6, 0.0), 0.2).unwrap();
        assert!((star.p - 0.30313).abs() < 1e-4);
        assert!((star.rho - 0.42632).abs() < 1e-4);
    }

    #[test]
    fn test_gaussian_peak_at_center() {
        let exact = ExactSolution::new(ExactFunction::GaussianPulse, GasModel::default());
        let peak = exact.primitive(DVec2::splat(0.5), 0.0).unwrap();
        assert!((peak.p - 2.0).abs() < 1e-12);
        // 半宽处压力增量减半
        let half = exact.primitive(DVec2::new(0.56, 0.5), 0.0).unwrap();
        assert!((half.p - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_acoustic_wave_small_perturbation() {
        let exact = ExactSolution::new(ExactFunction::AcousticWave, GasModel::default());
        let u = exact.conservative(DVec2::new(0.5, 0.0), 0.0).unwrap();
        assert!((u.rho - 1.0 - 1e-5).abs() < 1e-12);
        assert!(u.rho_v.abs() < 1e-15);
    }

    #[test]
    fn test_richtmyer_meshkov_regions() {
        let exact = ExactSolution::new(ExactFunction::RichtmyerMeshkov, GasModel::default());
        assert!((exact.primitive(DVec2::new(0.05, 0.5), 0.0).unwrap().rho - 4.22).abs() < 1e-12);
        assert!((exact.primitive(DVec2::new(0.2, 0.5), 0.0).unwrap().rho - 1.0).abs() < 1e-12);
        assert!((exact.primitive(DVec2::new(0.8, 0.5), 0.0).unwrap().rho - 0.25).abs() < 1e-12);
    }
}
