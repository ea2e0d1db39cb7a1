// crates/ef_physics/src/numerics/limiter/traits.rs

//! 限制器 trait 定义和上下文结构
//!
//! 定义了所有梯度限制器的公共接口。限制因子逐面计算，
//! 单元的限制因子由重构器取其所有面的最小值。

use std::fmt::Debug;

/// 单个面上计算限制因子所需的上下文
///
/// 限制因子 α ∈ [0, 1]，用于限制梯度重构:
///
/// ```text
/// q_face = q_cell + α * (∇q · r_f)
/// ```
///
/// 其中 r_f 是从单元中心到面中心的向量。
#[derive(Debug, Clone, Copy)]
pub struct LimiterContext {
    /// 当前单元的场值 q_i
    pub cell_value: f64,

    /// 面上的无限制增量 Δ_f = ∇q · r_f
    pub face_delta: f64,

    /// 单元及相邻单元的最小值 q_min
    pub min_neighbor: f64,

    /// 单元及相邻单元的最大值 q_max
    pub max_neighbor: f64,

    /// 单元特征长度 h = sqrt(A)
    pub cell_length: f64,
}

impl LimiterContext {
    /// 创建新的限制器上下文
    #[inline]
    pub fn new(cell_value: f64, face_delta: f64, min_neighbor: f64, max_neighbor: f64, cell_length: f64) -> Self {
        Self {
            cell_value,
            face_delta,
            min_neighbor,
            max_neighbor,
            cell_length,
        }
    }

    /// 允许的最大正向变化 Δ_max = q_max - q_i
    #[inline]
    pub fn delta_max(&self) -> f64 {
        self.max_neighbor - self.cell_value
    }

    /// 允许的最小负向变化 Δ_min = q_min - q_i
    #[inline]
    pub fn delta_min(&self) -> f64 {
        self.min_neighbor - self.cell_value
    }

    /// 面增量方向上允许的增量：Δ_f > 0 时为 Δ_max，否则为 Δ_min
    #[inline]
    pub fn allowed_delta(&self) -> f64 {
        if self.face_delta > 0.0 {
            self.delta_max()
        } else {
            self.delta_min()
        }
    }

    /// 面增量是否为零（或接近零）
    #[inline]
    pub fn is_delta_zero(&self, eps: f64) -> bool {
        self.face_delta.abs() < eps
    }
}

impl Default for LimiterContext {
    fn default() -> Self {
        Self {
            cell_value: 0.0,
            face_delta: 0.0,
            min_neighbor: 0.0,
            max_neighbor: 0.0,
            cell_length: 1.0,
        }
    }
}

/// 梯度限制器 trait
///
/// 限制器确保重构后的面值不超过相邻单元值的范围:
///
/// ```text
/// q_min ≤ q_face ≤ q_max
/// ```
pub trait SlopeLimiter: Debug + Send + Sync {
    /// 计算单个面的限制因子 α ∈ [0, 1]
    fn compute_limiter(&self, ctx: &LimiterContext) -> f64;

    /// 返回限制器名称
    fn name(&self) -> &'static str;
}

/// 无限制器
///
/// 始终返回 1.0，不限制梯度。
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLimiter;

impl SlopeLimiter for NoLimiter {
    #[inline]
    fn compute_limiter(&self, _ctx: &LimiterContext) -> f64 {
        1.0
    }

    fn name(&self) -> &'static str {
        "NoLimiter"
    }
}
