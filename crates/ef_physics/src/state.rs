// crates/ef_physics/src/state.rs

//! Euler 方程状态管理
//!
//! 本模块提供可压缩 Euler 方程求解所需的状态表示：
//! - Conserved: 单个单元的守恒变量 (ρ, ρu, ρv, ρE)，同时用作通量向量
//! - Primitive: 原始变量 (ρ, u, v, p)
//! - GasModel: 理想气体状态方程，守恒/原始变换与波速
//! - FlowState: 全场守恒状态（SoA 布局）
//!
//! # 布局设计
//!
//! 采用 SoA (Structure of Arrays) 布局：
//! ```text
//! rho:   [ρ_0,  ρ_1,  ρ_2,  ...]
//! rho_u: [ρu_0, ρu_1, ρu_2, ...]
//! rho_v: [ρv_0, ρv_1, ρv_2, ...]
//! rho_e: [ρE_0, ρE_1, ρE_2, ...]
//! ```
//!
//! 隐式求解使用按单元交错的扁平向量 `[ρ_0, ρu_0, ρv_0, ρE_0, ρ_1, ...]`，
//! 见 [`FlowState::to_flat`] / [`FlowState::from_flat`]。

use glam::DVec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use ef_foundation::float::KahanSum;

use crate::error::PhysicsError;

/// 守恒变量个数
pub const NVAR: usize = 4;

// ============================================================
// 守恒状态
// ============================================================

/// 单个单元的守恒状态，也用作数值通量向量
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Conserved {
    /// 密度
    pub rho: f64,
    /// x 方向动量
    pub rho_u: f64,
    /// y 方向动量
    pub rho_v: f64,
    /// 单位体积总能
    pub rho_e: f64,
}

impl Conserved {
    /// 零状态
    pub const ZERO: Self = Self {
        rho: 0.0,
        rho_u: 0.0,
        rho_v: 0.0,
        rho_e: 0.0,
    };

    /// 创建守恒状态
    #[inline]
    pub const fn new(rho: f64, rho_u: f64, rho_v: f64, rho_e: f64) -> Self {
        Self { rho, rho_u, rho_v, rho_e }
    }

    /// 从数组创建
    #[inline]
    pub fn from_array(a: [f64; NVAR]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }

    /// 转换为数组
    #[inline]
    pub fn to_array(self) -> [f64; NVAR] {
        [self.rho, self.rho_u, self.rho_v, self.rho_e]
    }

    /// 第 k 个分量
    #[inline]
    pub fn component(&self, k: usize) -> f64 {
        match k {
            0 => self.rho,
            1 => self.rho_u,
            2 => self.rho_v,
            _ => self.rho_e,
        }
    }

    /// 动量向量
    #[inline]
    pub fn momentum(&self) -> DVec2 {
        DVec2::new(self.rho_u, self.rho_v)
    }

    /// 所有分量都有限
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.rho.is_finite() && self.rho_u.is_finite() && self.rho_v.is_finite() && self.rho_e.is_finite()
    }

    /// 最大分量绝对值
    #[inline]
    pub fn max_abs(&self) -> f64 {
        self.rho
            .abs()
            .max(self.rho_u.abs())
            .max(self.rho_v.abs())
            .max(self.rho_e.abs())
    }

    /// 将动量分量旋转到法向坐标系 (n, t)，t = (-n.y, n.x)
    #[inline]
    pub fn rotate(self, n: DVec2) -> Self {
        let m = self.momentum();
        Self::new(self.rho, m.dot(n), m.x * -n.y + m.y * n.x, self.rho_e)
    }

    /// 从法向坐标系旋转回全局坐标系
    #[inline]
    pub fn unrotate(self, n: DVec2) -> Self {
        Self::new(
            self.rho,
            self.rho_u * n.x - self.rho_v * n.y,
            self.rho_u * n.y + self.rho_v * n.x,
            self.rho_e,
        )
    }
}

impl Add for Conserved {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.rho + rhs.rho,
            self.rho_u + rhs.rho_u,
            self.rho_v + rhs.rho_v,
            self.rho_e + rhs.rho_e,
        )
    }
}

impl AddAssign for Conserved {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Conserved {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.rho - rhs.rho,
            self.rho_u - rhs.rho_u,
            self.rho_v - rhs.rho_v,
            self.rho_e - rhs.rho_e,
        )
    }
}

impl SubAssign for Conserved {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Conserved {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.rho, -self.rho_u, -self.rho_v, -self.rho_e)
    }
}

impl Mul<f64> for Conserved {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.rho * rhs, self.rho_u * rhs, self.rho_v * rhs, self.rho_e * rhs)
    }
}

impl Mul<Conserved> for f64 {
    type Output = Conserved;
    #[inline]
    fn mul(self, rhs: Conserved) -> Conserved {
        rhs * self
    }
}

// ============================================================
// 原始变量
// ============================================================

/// 原始变量 (ρ, u, v, p)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    /// 密度
    pub rho: f64,
    /// x 速度
    pub u: f64,
    /// y 速度
    pub v: f64,
    /// 压力
    pub p: f64,
}

impl Primitive {
    /// 创建原始变量
    #[inline]
    pub const fn new(rho: f64, u: f64, v: f64, p: f64) -> Self {
        Self { rho, u, v, p }
    }

    /// 从数组创建
    #[inline]
    pub fn from_array(a: [f64; NVAR]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }

    /// 转换为数组
    #[inline]
    pub fn to_array(self) -> [f64; NVAR] {
        [self.rho, self.u, self.v, self.p]
    }

    /// 速度向量
    #[inline]
    pub fn velocity(&self) -> DVec2 {
        DVec2::new(self.u, self.v)
    }

    /// 法向速度
    #[inline]
    pub fn normal_velocity(&self, n: DVec2) -> f64 {
        self.u * n.x + self.v * n.y
    }

    /// 所有分量都有限
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.rho.is_finite() && self.u.is_finite() && self.v.is_finite() && self.p.is_finite()
    }

    /// 密度和压力都严格为正
    #[inline]
    pub fn is_physical(&self) -> bool {
        self.is_finite() && self.rho > 0.0 && self.p > 0.0
    }

    /// 旋转到法向坐标系：u ← u·n，v ← u·t
    #[inline]
    pub fn rotate(self, n: DVec2) -> Self {
        Self::new(self.rho, self.u * n.x + self.v * n.y, -self.u * n.y + self.v * n.x, self.p)
    }

    /// 从法向坐标系旋转回全局坐标系
    #[inline]
    pub fn unrotate(self, n: DVec2) -> Self {
        Self::new(self.rho, self.u * n.x - self.v * n.y, self.u * n.y + self.v * n.x, self.p)
    }
}

// ============================================================
// 状态失效
// ============================================================

/// 单个状态的物理失效
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateViolation {
    /// 密度非正
    NegativeDensity(f64),
    /// 压力非正
    NegativePressure(f64),
    /// 出现 NaN/Inf
    NonFinite,
}

impl StateViolation {
    /// 附加单元编号，转换为物理层错误
    pub fn at_cell(self, cell: usize) -> PhysicsError {
        match self {
            Self::NegativeDensity(value) => PhysicsError::NegativeDensity { cell, step: 0, value },
            Self::NegativePressure(value) => PhysicsError::NegativePressure { cell, step: 0, value },
            Self::NonFinite => PhysicsError::NonFiniteState { cell, step: 0 },
        }
    }

    /// 附加界面编号，转换为通量输入错误
    pub fn at_face(self, face: usize) -> PhysicsError {
        let message = match self {
            Self::NegativeDensity(v) => format!("密度非正 ({v:.6e})"),
            Self::NegativePressure(v) => format!("压力非正 ({v:.6e})"),
            Self::NonFinite => "状态含 NaN/Inf".to_string(),
        };
        PhysicsError::invalid_flux_input(face, message)
    }
}

// ============================================================
// 理想气体模型
// ============================================================

/// 理想气体（固定比热比）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasModel {
    /// 比热比 γ
    pub gamma: f64,
}

impl Default for GasModel {
    fn default() -> Self {
        Self { gamma: 1.4 }
    }
}

impl GasModel {
    /// 创建气体模型
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    /// γ - 1
    #[inline]
    pub fn gm1(&self) -> f64 {
        self.gamma - 1.0
    }

    /// 由守恒变量计算压力（不做检查）
    #[inline]
    pub fn pressure(&self, u: &Conserved) -> f64 {
        let kinetic = 0.5 * (u.rho_u * u.rho_u + u.rho_v * u.rho_v) / u.rho;
        self.gm1() * (u.rho_e - kinetic)
    }

    /// 守恒变量 → 原始变量
    ///
    /// 密度或压力非正时返回失效类型，调用方按致命错误处理。
    #[inline]
    pub fn to_primitive(&self, u: &Conserved) -> Result<Primitive, StateViolation> {
        if !u.is_finite() {
            return Err(StateViolation::NonFinite);
        }
        if u.rho <= 0.0 {
            return Err(StateViolation::NegativeDensity(u.rho));
        }
        let p = self.pressure(u);
        if !(p > 0.0) {
            return Err(StateViolation::NegativePressure(p));
        }
        Ok(Primitive::new(u.rho, u.rho_u / u.rho, u.rho_v / u.rho, p))
    }

    /// 原始变量 → 守恒变量
    #[inline]
    pub fn to_conservative(&self, w: &Primitive) -> Conserved {
        Conserved::new(
            w.rho,
            w.rho * w.u,
            w.rho * w.v,
            w.p / self.gm1() + 0.5 * w.rho * (w.u * w.u + w.v * w.v),
        )
    }

    /// 声速
    #[inline]
    pub fn sound_speed(&self, w: &Primitive) -> f64 {
        (self.gamma * w.p / w.rho).sqrt()
    }

    /// 总焓 H = (E + p) / ρ
    #[inline]
    pub fn total_enthalpy(&self, w: &Primitive) -> f64 {
        self.gamma / self.gm1() * w.p / w.rho + 0.5 * (w.u * w.u + w.v * w.v)
    }

    /// 沿法向的三个特征速度 (u·n − c, u·n, u·n + c)
    #[inline]
    pub fn wave_speeds(&self, w: &Primitive, n: DVec2) -> [f64; 3] {
        let un = w.normal_velocity(n);
        let c = self.sound_speed(w);
        [un - c, un, un + c]
    }

    /// 谱半径 |u·n| + c
    #[inline]
    pub fn spectral_radius(&self, w: &Primitive, n: DVec2) -> f64 {
        w.normal_velocity(n).abs() + self.sound_speed(w)
    }

    /// 法向物理通量 F(U)·n
    #[inline]
    pub fn physical_flux(&self, w: &Primitive, n: DVec2) -> Conserved {
        let un = w.normal_velocity(n);
        let mass = w.rho * un;
        Conserved::new(
            mass,
            mass * w.u + w.p * n.x,
            mass * w.v + w.p * n.y,
            mass * self.total_enthalpy(w),
        )
    }
}

// ============================================================
// 全场状态 (SoA 布局)
// ============================================================

/// 全场守恒状态（SoA 布局）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    /// 密度
    pub rho: Vec<f64>,
    /// x 方向动量
    pub rho_u: Vec<f64>,
    /// y 方向动量
    pub rho_v: Vec<f64>,
    /// 单位体积总能
    pub rho_e: Vec<f64>,
}

impl FlowState {
    /// 创建零状态
    pub fn new(n_cells: usize) -> Self {
        Self {
            rho: vec![0.0; n_cells],
            rho_u: vec![0.0; n_cells],
            rho_v: vec![0.0; n_cells],
            rho_e: vec![0.0; n_cells],
        }
    }

    /// 创建均匀状态
    pub fn uniform(n_cells: usize, u: Conserved) -> Self {
        Self {
            rho: vec![u.rho; n_cells],
            rho_u: vec![u.rho_u; n_cells],
            rho_v: vec![u.rho_v; n_cells],
            rho_e: vec![u.rho_e; n_cells],
        }
    }

    /// 由逐单元函数创建
    pub fn from_fn<F>(n_cells: usize, mut f: F) -> Self
    where
        F: FnMut(usize) -> Conserved,
    {
        let mut state = Self::new(n_cells);
        for i in 0..n_cells {
            state.set(i, f(i));
        }
        state
    }

    /// 单元数量
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.rho.len()
    }

    /// 读取单元状态
    #[inline]
    pub fn get(&self, i: usize) -> Conserved {
        Conserved::new(self.rho[i], self.rho_u[i], self.rho_v[i], self.rho_e[i])
    }

    /// 写入单元状态
    #[inline]
    pub fn set(&mut self, i: usize, u: Conserved) {
        self.rho[i] = u.rho;
        self.rho_u[i] = u.rho_u;
        self.rho_v[i] = u.rho_v;
        self.rho_e[i] = u.rho_e;
    }

    /// 从另一个状态复制（尺寸需一致）
    pub fn copy_from(&mut self, other: &Self) {
        self.rho.copy_from_slice(&other.rho);
        self.rho_u.copy_from_slice(&other.rho_u);
        self.rho_v.copy_from_slice(&other.rho_v);
        self.rho_e.copy_from_slice(&other.rho_e);
    }

    /// 转换为所有单元的原始变量
    ///
    /// 返回第一个（编号最小的）失效单元对应的错误。
    pub fn primitives(&self, gas: &GasModel) -> Result<Vec<Primitive>, PhysicsError> {
        let results: Vec<Result<Primitive, StateViolation>> = (0..self.n_cells())
            .into_par_iter()
            .map(|i| gas.to_primitive(&self.get(i)))
            .collect();
        results
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.map_err(|v| v.at_cell(i)))
            .collect()
    }

    /// 检查所有单元的密度与压力为正
    pub fn validate(&self, gas: &GasModel) -> Result<(), PhysicsError> {
        for i in 0..self.n_cells() {
            gas.to_primitive(&self.get(i)).map_err(|v| v.at_cell(i))?;
        }
        Ok(())
    }

    /// 守恒量总量 Σ U_i A_i（Kahan 求和）
    pub fn totals(&self, cell_areas: &[f64]) -> Conserved {
        let sum = |values: &[f64]| {
            KahanSum::sum_iter(values.iter().zip(cell_areas).map(|(v, a)| v * a))
        };
        Conserved::new(
            sum(&self.rho),
            sum(&self.rho_u),
            sum(&self.rho_v),
            sum(&self.rho_e),
        )
    }

    /// 按单元交错的扁平向量
    pub fn to_flat(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(self.n_cells() * NVAR);
        for i in 0..self.n_cells() {
            flat.extend_from_slice(&self.get(i).to_array());
        }
        flat
    }

    /// 从扁平向量恢复
    pub fn from_flat(flat: &[f64]) -> Self {
        let n = flat.len() / NVAR;
        Self::from_fn(n, |i| {
            Conserved::new(
                flat[NVAR * i],
                flat[NVAR * i + 1],
                flat[NVAR * i + 2],
                flat[NVAR * i + 3],
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gas() -> GasModel {
        GasModel::new(1.4)
    }

    #[test]
    fn test_round_trip() {
        let g = gas();
        let w = Primitive::new(1.2, 0.3, -0.7, 2.5);
        let u = g.to_conservative(&w);
        let w2 = g.to_primitive(&u).unwrap();
        let u2 = g.to_conservative(&w2);
        assert!((u - u2).max_abs() < 1e-12);
        assert!((w2.p - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_negative_pressure_detected() {
        let g = gas();
        let u = Conserved::new(1.0, 2.0, 0.0, 1.0);
        assert!(matches!(g.to_primitive(&u), Err(StateViolation::NegativePressure(_))));
    }

    #[test]
    fn test_negative_density_detected() {
        let g = gas();
        let u = Conserved::new(-1.0, 0.0, 0.0, 1.0);
        assert!(matches!(g.to_primitive(&u), Err(StateViolation::NegativeDensity(_))));
    }

    #[test]
    fn test_non_finite_state_is_reported_as_such() {
        let g = gas();
        let mut s = FlowState::uniform(3, g.to_conservative(&Primitive::new(1.0, 0.0, 0.0, 1.0)));
        s.set(1, Conserved::new(f64::NAN, 0.0, 0.0, 1.0));
        assert_eq!(g.to_primitive(&s.get(1)), Err(StateViolation::NonFinite));
        match s.validate(&g) {
            Err(PhysicsError::NonFiniteState { cell, .. }) => assert_eq!(cell, 1),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_wave_speeds() {
        let g = gas();
        let w = Primitive::new(1.4, 0.5, 0.0, 1.0);
        let s = g.wave_speeds(&w, DVec2::X);
        assert!((s[0] + 0.5).abs() < 1e-12);
        assert!((s[1] - 0.5).abs() < 1e-12);
        assert!((s[2] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_inverse() {
        let n = DVec2::new(0.6, 0.8);
        let w = Primitive::new(1.0, 0.3, -0.4, 1.0);
        let back = w.rotate(n).unrotate(n);
        assert!((back.u - w.u).abs() < 1e-14);
        assert!((back.v - w.v).abs() < 1e-14);
        assert!((w.rotate(n).u - w.normal_velocity(n)).abs() < 1e-14);

        let u = Conserved::new(1.0, 0.3, -0.4, 2.0);
        let back = u.rotate(n).unrotate(n);
        assert!((back - u).max_abs() < 1e-14);
    }

    #[test]
    fn test_physical_flux_x() {
        let g = gas();
        let w = Primitive::new(1.0, 2.0, 0.0, 1.0);
        let f = g.physical_flux(&w, DVec2::X);
        assert!((f.rho - 2.0).abs() < 1e-14);
        assert!((f.rho_u - 5.0).abs() < 1e-14);
        assert!(f.rho_v.abs() < 1e-14);
    }

    #[test]
    fn test_flow_state_flat_round_trip() {
        let s = FlowState::from_fn(3, |i| Conserved::new(1.0 + i as f64, 0.1, 0.2, 3.0));
        let flat = s.to_flat();
        assert_eq!(flat.len(), 12);
        assert_eq!(FlowState::from_flat(&flat), s);
    }

    #[test]
    fn test_validate_reports_first_cell() {
        let g = gas();
        let mut s = FlowState::uniform(4, g.to_conservative(&Primitive::new(1.0, 0.0, 0.0, 1.0)));
        s.set(2, Conserved::new(1.0, 0.0, 0.0, -1.0));
        s.set(3, Conserved::new(-1.0, 0.0, 0.0, 1.0));
        match s.validate(&g) {
            Err(PhysicsError::NegativePressure { cell, .. }) => assert_eq!(cell, 2),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(s.primitives(&g).is_err());
    }

    #[test]
    fn test_totals() {
        let s = FlowState::uniform(4, Conserved::new(1.0, 2.0, 0.0, 3.0));
        let t = s.totals(&[0.25; 4]);
        assert!((t.rho - 1.0).abs() < 1e-14);
        assert!((t.rho_u - 2.0).abs() < 1e-14);
        assert!((t.rho_e - 3.0).abs() < 1e-14);
    }
}
