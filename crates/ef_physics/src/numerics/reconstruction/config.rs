// crates/ef_physics/src/numerics/reconstruction/config.rs

//! MUSCL 重构配置

use ef_config::GradientMethod as GradientType;

use crate::numerics::limiter::LimiterKind;

/// MUSCL 重构配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MusclConfig {
    /// 是否启用二阶精度
    pub second_order: bool,

    /// 梯度计算方法
    pub gradient_type: GradientType,

    /// 限制器类型
    pub limiter: LimiterKind,

    /// Venkatakrishnan 限制器的 K 参数
    pub venkat_k: f64,
}

impl Default for MusclConfig {
    fn default() -> Self {
        Self {
            second_order: true,
            gradient_type: GradientType::LeastSquares,
            limiter: LimiterKind::BarthJespersen,
            venkat_k: 1.0,
        }
    }
}

impl MusclConfig {
    /// 一阶精度配置（无梯度重构）
    pub fn first_order() -> Self {
        Self {
            second_order: false,
            ..Default::default()
        }
    }

    /// 光滑流动配置（最小二乘 + Venkatakrishnan）
    pub fn smooth(venkat_k: f64) -> Self {
        Self {
            second_order: true,
            gradient_type: GradientType::LeastSquares,
            limiter: LimiterKind::Venkatakrishnan,
            venkat_k,
        }
    }

    /// 设置限制器
    pub fn with_limiter(mut self, limiter: LimiterKind) -> Self {
        self.limiter = limiter;
        self
    }

    /// 设置梯度方法
    pub fn with_gradient(mut self, gradient_type: GradientType) -> Self {
        self.gradient_type = gradient_type;
        self
    }
}
